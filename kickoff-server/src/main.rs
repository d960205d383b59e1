//! Kickoff Server
//!
//! Fantasy-football backend: accounts, automatic squad assignment and a
//! transfer market between managers.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use kickoff_core::allocation::AllocationQueue;
use kickoff_core::framework::DatabaseProcessor;
use kickoff_core::pool::SquadPool;
use kickoff_core::processors::TeamAllocator;
use server::{build_router, run_server};
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Kickoff - fantasy-football transfer market server
#[derive(Parser, Debug)]
#[command(name = "kickoff-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./kickoff-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting kickoff-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.listen);
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.server.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Load the squad pool
    let squad_pool = SquadPool::load(&loaded_config.pool_path).map_err(|e| {
        tracing::error!(path = ?loaded_config.pool_path, "Failed to load squad pool: {}", e);
        e
    })?;
    tracing::info!(squads = squad_pool.len(), "Squad pool loaded");
    let squad_pool = Arc::new(squad_pool);

    // Get database URL from environment
    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    // Run migrations if requested
    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    // Start the team allocator
    let queue = Arc::new(AllocationQueue::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let allocator = TeamAllocator::new(
        DatabaseProcessor::new(db_pool.clone()),
        squad_pool.clone(),
        queue.clone(),
    );
    let allocator_handle = tokio::spawn(allocator.run(shutdown_rx));

    // Create application state
    let state = AppState::new(
        db_pool.clone(),
        queue,
        squad_pool,
        loaded_config.auth,
        loaded_config.market,
    );

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Stop the allocator and wait for its current job to finish
    let _ = shutdown_tx.send(true);
    if let Err(e) = allocator_handle.await {
        tracing::error!("Team allocator task failed: {}", e);
    }

    // Close database connections gracefully
    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
