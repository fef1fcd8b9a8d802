//! busyboard-api server binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use busyboard_api::config::{load_catalog, load_networks};
use busyboard_api::db::RedisStore;
use busyboard_api::state::AppState;
use busyboard_core::{KeyStore, RateLimitConfig, SummaryConfig, ValidationRules};

#[derive(Parser, Debug)]
#[command(name = "busyboard-api", about = "Anonymous class-is-busy reporting service")]
struct Cli {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:8080")]
    addr: SocketAddr,

    /// Redis connection URL.
    #[arg(long, default_value = "redis://127.0.0.1:6379/0")]
    db: String,

    /// Maximum submissions per identity per day.
    #[arg(long, default_value_t = 10)]
    rl: i64,

    /// Collapse section detail in the summary.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    anon: bool,

    /// Minimum report count for a summary entry.
    #[arg(long, default_value_t = 5)]
    minreports: u32,

    /// Maximum number of summary entries.
    #[arg(long, default_value_t = 20)]
    maxsummary: usize,

    /// Trust local ranges and skip the per-entry dedup lock.
    #[arg(long)]
    testmode: bool,

    /// Course catalog JSON (object of code → name).
    #[arg(long, default_value = "courses.json")]
    courses: PathBuf,

    /// Trusted networks JSON (array of CIDR strings).
    #[arg(long, default_value = "networks.json")]
    networks: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("busyboard_api=info,busyboard_core=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let catalog = Arc::new(load_catalog(&cli.courses)?);
    let networks = Arc::new(load_networks(&cli.networks, cli.testmode)?);
    tracing::info!(
        courses = catalog.len(),
        networks = networks.len(),
        testmode = cli.testmode,
        "configuration loaded"
    );

    let store = RedisStore::connect(&cli.db)
        .await
        .with_context(|| format!("connecting to store at {}", cli.db))?;
    // Fail fast on a dead backend rather than serving 503s.
    store.ping().await.context("store did not answer ping")?;

    let state = AppState {
        store: Arc::new(store),
        catalog,
        rules: Arc::new(ValidationRules::new()),
        networks,
        limits: RateLimitConfig {
            max_daily: cli.rl,
            dedup_enabled: !cli.testmode,
        },
        summary: SummaryConfig {
            anonymize: cli.anon,
            min_reports: cli.minreports,
            max_entries: cli.maxsummary,
        },
    };

    let app = busyboard_api::app(state);

    let listener = tokio::net::TcpListener::bind(cli.addr)
        .await
        .with_context(|| format!("binding {}", cli.addr))?;
    tracing::info!(addr = %cli.addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
