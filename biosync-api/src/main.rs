//! biosync-api - Registry specimen API service entry point

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biosync_api::{build_router, AppState};
use biosync_common::config::resolve_database_path;
use biosync_common::db::init_database;

/// Command-line arguments for biosync-api
#[derive(Parser, Debug)]
#[command(name = "biosync-api")]
#[command(about = "Specimen registry API service for BioSync")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5600", env = "BIOSYNC_API_PORT")]
    port: u16,

    /// Path to the registry database
    #[arg(short, long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biosync_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(
        "Starting BioSync API v{} on port {}",
        env!("CARGO_PKG_VERSION"),
        args.port
    );

    let db_path = resolve_database_path(args.database.as_deref(), "BIOSYNC_DATABASE")
        .context("Failed to resolve database path")?;
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("biosync-api listening on http://127.0.0.1:{}", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
