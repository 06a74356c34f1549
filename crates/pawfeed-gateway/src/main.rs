use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

mod app;
mod hardware;
mod http;
mod tasks;

#[derive(Debug, Parser)]
#[command(name = "pawfeed-gateway", about = "Pet feeder controller")]
struct Cli {
    /// Path to pawfeed.toml (default: ~/.pawfeed/pawfeed.toml).
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pawfeed_gateway=info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = pawfeed_core::PawfeedConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        pawfeed_core::PawfeedConfig::default()
    });

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    // initialize SQLite database
    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let conn = rusqlite::Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    let store = Arc::new(pawfeed_store::FeedStore::new(conn)?);
    info!("database migrations complete");

    // peripherals: disabled or failed hardware degrades to None
    let dispenser = hardware::build_dispenser(&config);
    let display = hardware::build_display(&config);
    let hopper = hardware::build_hopper(&config);

    let coordinator = Arc::new(pawfeed_feeder::FeedCoordinator::new(
        Arc::clone(&store),
        dispenser,
        display.clone(),
        Duration::from_secs(config.tasks.feed_timeout_secs),
    ));

    // background jobs: queued first, then started as a set
    let task_manager = Arc::new(pawfeed_tasks::TaskManager::with_tick(Duration::from_millis(
        config.tasks.tick_ms,
    )));
    tasks::register_background_tasks(
        &task_manager,
        &config,
        &coordinator,
        display.as_ref(),
        hopper.as_ref(),
    )
    .await?;
    task_manager.start().await?;

    let state = Arc::new(app::AppState {
        config,
        store,
        coordinator,
        tasks: Arc::clone(&task_manager),
        hopper,
    });
    let router = app::build_router(Arc::clone(&state));

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("pawfeed gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    // join every background job before exiting
    task_manager.stop().await;
    Ok(())
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
