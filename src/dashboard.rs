//! The table's event loop.
//!
//! One task owns the [`TableLoader`]. Header clicks, scroll signals and the
//! refresh timer arrive as events; fetches run as spawned futures whose
//! results come back to the same task, so loader state is only ever touched
//! in one place. Every state change is published as a [`TableSnapshot`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{DashboardClosed, FetchError};
use crate::fetch::MarketApi;
use crate::loader::{PageRequest, TableLoader, TableSnapshot};
use crate::model::Coin;
use crate::sort::{Column, SortState};

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SortBy(Column),
    /// The end-of-list sentinel scrolled into view.
    SentinelVisible,
    Refresh,
    Shutdown,
}

type Completion = (PageRequest, Result<Vec<Coin>, FetchError>);

pub struct Dashboard<A: ?Sized> {
    api: Arc<A>,
    loader: TableLoader,
    refresh_interval: Duration,
}

impl<A> Dashboard<A>
where
    A: MarketApi + ?Sized + 'static,
{
    pub fn new(api: Arc<A>, per_page: u32, refresh_interval: Duration) -> Self {
        Self::with_sort(api, per_page, SortState::default(), refresh_interval)
    }

    pub fn with_sort(
        api: Arc<A>,
        per_page: u32,
        sort: SortState,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            api,
            loader: TableLoader::with_sort(per_page, sort),
            refresh_interval,
        }
    }

    /// Starts the loop on the current runtime and loads page 1.
    pub fn spawn(self) -> DashboardHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(self.loader.snapshot());
        let task = tokio::spawn(self.run(command_rx, snapshot_tx));
        DashboardHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        snapshots: watch::Sender<TableSnapshot>,
    ) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();

        let mut ticker = interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; page 1 is loaded below instead.
        ticker.tick().await;

        info!(
            per_page = self.loader.per_page(),
            order = %self.loader.order(),
            refresh_secs = self.refresh_interval.as_secs(),
            "dashboard started"
        );
        let first = self.loader.begin_next_page();
        self.dispatch(first, &done_tx);
        snapshots.send_replace(self.loader.snapshot());

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    debug!(?command, "command");
                    match command {
                        Command::Shutdown => break,
                        Command::SortBy(column) => {
                            if self.loader.set_sort_column(column) {
                                let request = self.loader.begin_next_page();
                                self.dispatch(request, &done_tx);
                            }
                        }
                        Command::SentinelVisible => {
                            let request = self.loader.sentinel_visible();
                            self.dispatch(request, &done_tx);
                        }
                        Command::Refresh => {
                            let request = self.loader.begin_refresh();
                            self.dispatch(request, &done_tx);
                        }
                    }
                }
                _ = ticker.tick() => {
                    let request = self.loader.begin_refresh();
                    self.dispatch(request, &done_tx);
                }
                Some((request, result)) = done_rx.recv() => {
                    self.loader.complete(request, result);
                }
            }
            snapshots.send_replace(self.loader.snapshot());
        }

        info!(rows = self.loader.rows().len(), "dashboard stopped");
    }

    fn dispatch(&self, request: Option<PageRequest>, done: &mpsc::UnboundedSender<Completion>) {
        let Some(request) = request else { return };
        debug!(
            kind = ?request.kind,
            page = request.page,
            order = %request.order,
            "fetching"
        );
        let api = Arc::clone(&self.api);
        let done = done.clone();
        tokio::spawn(async move {
            let result = request.fetch(api.as_ref()).await;
            // The loop may already be gone; nothing left to update then.
            let _ = done.send((request, result));
        });
    }
}

/// Caller side of a running dashboard.
pub struct DashboardHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<TableSnapshot>,
    task: JoinHandle<()>,
}

impl DashboardHandle {
    pub async fn send(&self, command: Command) -> Result<(), DashboardClosed> {
        self.commands.send(command).await.map_err(|_| DashboardClosed)
    }

    pub async fn sort_by(&self, column: Column) -> Result<(), DashboardClosed> {
        self.send(Command::SortBy(column)).await
    }

    pub async fn load_more(&self) -> Result<(), DashboardClosed> {
        self.send(Command::SentinelVisible).await
    }

    pub async fn refresh(&self) -> Result<(), DashboardClosed> {
        self.send(Command::Refresh).await
    }

    pub fn snapshot(&self) -> TableSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Waits for the next published snapshot.
    pub async fn changed(&mut self) -> Result<TableSnapshot, DashboardClosed> {
        self.snapshots.changed().await.map_err(|_| DashboardClosed)?;
        Ok(self.snapshots.borrow_and_update().clone())
    }

    pub async fn wait_for<F>(&mut self, mut predicate: F) -> Result<TableSnapshot, DashboardClosed>
    where
        F: FnMut(&TableSnapshot) -> bool,
    {
        let snapshot = self
            .snapshots
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| DashboardClosed)?;
        Ok(snapshot.clone())
    }

    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown).await;
        let _ = self.task.await;
    }
}
