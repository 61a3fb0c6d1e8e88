use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command as Cli};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use coinboard::chart::{ChartSummary, TimePeriod};
use coinboard::config::validate_per_page;
use coinboard::convert::Converter;
use coinboard::view::{render_detail, render_table};
use coinboard::{
    generate_filename, save_to_csv, CoinGeckoClient, Column, Config, Dashboard, MarketApi,
    PageOutcome, SortState, TableLoader,
};

fn cli() -> Cli {
    let per_page = Arg::new("per-page")
        .long("per-page")
        .value_parser(value_parser!(u64))
        .help("Rows per page (1-250), overrides COINBOARD_PER_PAGE");
    let sort = Arg::new("sort")
        .long("sort")
        .value_parser(value_parser!(String))
        .help("Initial sort column: rank, coin, volume or market_cap (re-selecting toggles)");

    Cli::new("coinboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Cryptocurrency prices from the CoinGecko API")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Cli::new("table")
                .about("Print the coin table once")
                .arg(per_page.clone())
                .arg(sort.clone())
                .arg(
                    Arg::new("pages")
                        .long("pages")
                        .default_value("1")
                        .value_parser(value_parser!(u32))
                        .help("Number of pages to load"),
                )
                .arg(
                    Arg::new("csv")
                        .long("csv")
                        .value_parser(value_parser!(String))
                        .help("Also write the rows to this CSV file"),
                ),
        )
        .subcommand(
            Cli::new("watch")
                .about("Interactive table with background refresh")
                .arg(per_page)
                .arg(sort),
        )
        .subcommand(
            Cli::new("coin")
                .about("Detail view, price chart and converter for one coin")
                .arg(Arg::new("id").required(true).help("CoinGecko coin id, e.g. bitcoin"))
                .arg(
                    Arg::new("period")
                        .long("period")
                        .default_value("7d")
                        .value_parser(value_parser!(String))
                        .help("Chart window: 24h, 7d, 1m, 3m, 1y or max"),
                )
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .value_parser(value_parser!(String))
                        .help("Coin amount to convert to USD"),
                )
                .arg(
                    Arg::new("usd")
                        .long("usd")
                        .value_parser(value_parser!(String))
                        .conflicts_with("amount")
                        .help("USD amount to convert to the coin"),
                ),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let mut config = Config::from_env().context("invalid configuration")?;

    match matches.subcommand() {
        Some(("table", args)) => {
            apply_overrides(&mut config, args)?;
            let api = CoinGeckoClient::new(&config)?;
            run_table(&api, &config, args).await
        }
        Some(("watch", args)) => {
            apply_overrides(&mut config, args)?;
            let api = Arc::new(CoinGeckoClient::new(&config)?);
            run_watch(api, &config, args).await
        }
        Some(("coin", args)) => {
            let api = CoinGeckoClient::new(&config)?;
            run_coin(&api, args).await
        }
        _ => unreachable!("subcommand_required"),
    }
}

const DEFAULT_LOG: &str = "warn,coinboard=info";

/// `RUST_LOG` replaces the defaults outright when set.
fn log_filter(rust_log: Option<String>) -> EnvFilter {
    let directives = rust_log
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG.to_string());
    EnvFilter::new(directives)
}

fn apply_overrides(config: &mut Config, args: &ArgMatches) -> Result<()> {
    if let Some(&per_page) = args.get_one::<u64>("per-page") {
        config.per_page = validate_per_page(per_page)?;
    }
    Ok(())
}

fn initial_sort(args: &ArgMatches) -> Result<SortState> {
    let mut sort = SortState::default();
    if let Some(raw) = args.get_one::<String>("sort") {
        let column: Column = raw.parse().map_err(anyhow::Error::msg)?;
        if !sort.select(column) {
            bail!("column {raw} is not sortable");
        }
    }
    Ok(sort)
}

async fn run_table(api: &CoinGeckoClient, config: &Config, args: &ArgMatches) -> Result<()> {
    let pages = args.get_one::<u32>("pages").copied().unwrap_or(1);
    let mut loader = TableLoader::with_sort(config.per_page, initial_sort(args)?);

    for _ in 0..pages {
        match loader.load_next_page(api).await {
            PageOutcome::Failed(err) => return Err(err).context("loading coin table"),
            PageOutcome::Skipped => break,
            _ => {}
        }
    }

    print!("{}", render_table(&loader.snapshot()));

    if let Some(path) = args.get_one::<String>("csv") {
        let n = save_to_csv(loader.rows(), path)?;
        println!("\n{n} rows saved to: {path}");
    }
    Ok(())
}

const WATCH_HELP: &str =
    "commands: sort <rank|coin|volume|market_cap>, more, refresh, export [file], quit";

async fn run_watch(api: Arc<CoinGeckoClient>, config: &Config, args: &ArgMatches) -> Result<()> {
    let dashboard = Dashboard::with_sort(
        api,
        config.per_page,
        initial_sort(args)?,
        config.refresh_interval,
    );
    let mut handle = dashboard.spawn();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{WATCH_HELP}");
    loop {
        tokio::select! {
            snapshot = handle.changed() => {
                let snapshot = snapshot?;
                print!("{}", render_table(&snapshot));
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let mut words = line.split_whitespace();
                match (words.next(), words.next()) {
                    (None, _) => {}
                    (Some("quit" | "q" | "exit"), _) => break,
                    (Some("more" | "m"), _) => handle.load_more().await?,
                    (Some("refresh" | "r"), _) => handle.refresh().await?,
                    (Some("sort" | "s"), Some(raw)) => match raw.parse::<Column>() {
                        Ok(column) if column.is_sortable() => handle.sort_by(column).await?,
                        Ok(_) => println!("column {raw} is not sortable"),
                        Err(err) => println!("{err}"),
                    },
                    (Some("export" | "e"), path) => {
                        let path = path.map_or_else(generate_filename, str::to_string);
                        let snapshot = handle.snapshot();
                        match save_to_csv(&snapshot.rows, &path) {
                            Ok(n) => println!("{n} rows saved to: {path}"),
                            Err(err) => warn!(error = %err, %path, "export failed"),
                        }
                    }
                    _ => println!("{WATCH_HELP}"),
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

async fn run_coin(api: &CoinGeckoClient, args: &ArgMatches) -> Result<()> {
    let id = args
        .get_one::<String>("id")
        .context("coin id is required")?;
    let period: TimePeriod = args
        .get_one::<String>("period")
        .map(|p| p.parse::<TimePeriod>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();

    let (detail, chart) = tokio::join!(
        api.fetch_coin_details(id),
        api.fetch_market_chart(id, period.days())
    );
    let detail = detail.with_context(|| format!("loading coin {id}"))?;
    let chart = match chart {
        Ok(chart) => Some(ChartSummary::new(period, &chart.points())),
        Err(err) => {
            warn!(error = %err, "chart unavailable");
            None
        }
    };

    let price = detail.market_data.current_price.usd.unwrap_or(0.0);
    let mut converter = Converter::new(&detail.symbol, price);
    if let Some(amount) = args.get_one::<String>("amount") {
        converter.set_crypto(amount);
    } else if let Some(usd) = args.get_one::<String>("usd") {
        converter.set_usd(usd);
    }

    info!(id = %detail.id, %period, "coin loaded");
    print!("{}", render_detail(&detail, chart.as_ref(), &converter));
    Ok(())
}
