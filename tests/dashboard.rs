mod common;

use std::sync::Arc;
use std::time::Duration;

use coinboard::{Column, Dashboard, SortOrder};
use common::FakeMarket;

const REFRESH: Duration = Duration::from_secs(60);

#[tokio::test]
async fn loads_first_page_on_start_and_more_on_sentinel() {
    let api = Arc::new(FakeMarket::new(25));
    let mut handle = Dashboard::new(Arc::clone(&api), 10, REFRESH).spawn();

    let snap = handle.wait_for(|s| s.rows.len() == 10 && !s.loading).await.unwrap();
    assert!(snap.has_more);

    handle.load_more().await.unwrap();
    handle.wait_for(|s| s.rows.len() == 20 && !s.loading).await.unwrap();

    handle.load_more().await.unwrap();
    let snap = handle.wait_for(|s| s.rows.len() == 25).await.unwrap();
    assert!(!snap.has_more);
    assert_eq!(snap.pages_loaded, 3);

    handle.shutdown().await;
    let pages: Vec<u32> = api.calls().iter().map(|c| c.0).collect();
    assert_eq!(pages, vec![1, 2, 3]);
}

#[tokio::test]
async fn sort_command_resets_and_reloads() {
    let api = Arc::new(FakeMarket::new(40));
    let mut handle = Dashboard::new(Arc::clone(&api), 10, REFRESH).spawn();
    handle.wait_for(|s| s.rows.len() == 10 && !s.loading).await.unwrap();

    handle.sort_by(Column::Coin).await.unwrap();
    let snap = handle
        .wait_for(|s| s.sort.column == Column::Coin && s.rows.len() == 10)
        .await
        .unwrap();
    assert_eq!(snap.sort.order(), SortOrder::IdAsc);
    assert_eq!(snap.pages_loaded, 1);

    handle.sort_by(Column::Coin).await.unwrap();
    let snap = handle
        .wait_for(|s| s.sort.order() == SortOrder::IdDesc && s.rows.len() == 10)
        .await
        .unwrap();
    assert_eq!(snap.rows[0].id, "coin-0039");

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn timer_refreshes_first_page() {
    let api = Arc::new(FakeMarket::new(30));
    let mut handle = Dashboard::new(Arc::clone(&api), 10, REFRESH).spawn();
    handle.wait_for(|s| s.rows.len() == 10 && !s.loading).await.unwrap();
    handle.load_more().await.unwrap();
    handle.wait_for(|s| s.rows.len() == 20 && !s.loading).await.unwrap();

    api.bump_prices(1.0);
    let snap = handle
        .wait_for(|s| s.rows[0].current_price == Some(101.0))
        .await
        .unwrap();
    assert_eq!(snap.rows.len(), 20);
    assert_eq!(snap.pages_loaded, 2);

    handle.shutdown().await;
    let calls = api.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2].0, 1);
}

#[tokio::test]
async fn fetch_failure_surfaces_generic_error() {
    let api = Arc::new(FakeMarket::new(30));
    api.fail_page(1);
    let mut handle = Dashboard::new(Arc::clone(&api), 10, REFRESH).spawn();

    let snap = handle.wait_for(|s| s.error.is_some()).await.unwrap();
    assert_eq!(snap.error.as_deref(), Some("Failed to fetch data"));
    assert!(snap.rows.is_empty());

    handle.load_more().await.unwrap();
    let snap = handle.wait_for(|s| s.rows.len() == 10).await.unwrap();
    assert!(snap.error.is_none());

    handle.shutdown().await;
}
