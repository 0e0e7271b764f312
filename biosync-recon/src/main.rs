//! biosync-recon - Specimen inventory reconciliation report

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biosync_common::config::{resolve_database_path, ReconSettings};
use biosync_common::db::init_database;
use biosync_common::time;
use biosync_recon::report;

/// Command-line arguments for biosync-recon
#[derive(Parser, Debug)]
#[command(name = "biosync-recon")]
#[command(about = "Inventory reconciliation report for BioSync")]
#[command(version)]
struct Args {
    /// Window start date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    start_date: String,

    /// Window end date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    end_date: String,

    /// Path to the registry database
    #[arg(short, long)]
    database: Option<String>,

    /// Timestamp skew between the two pipelines still treated as equal
    #[arg(long, default_value = "3600")]
    tolerance_secs: i64,

    /// Inventory report observation window in days
    #[arg(long, default_value = "10")]
    staleness_days: i64,

    /// Emit one JSON object per difference instead of formatted lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biosync_recon=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let Some(start) = time::parse_date_bound(&args.start_date) else {
        bail!("Invalid start date: {}", args.start_date);
    };
    let Some(end) = time::parse_date_bound(&args.end_date) else {
        bail!("Invalid end date: {}", args.end_date);
    };

    let (start_ts, end_ts) = time::window_bounds(start, end);
    if end_ts < start_ts {
        bail!("End date precedes start date");
    }

    let settings = ReconSettings {
        timestamp_tolerance_secs: args.tolerance_secs,
        staleness_window_days: args.staleness_days,
    };

    let db_path = resolve_database_path(args.database.as_deref(), "BIOSYNC_DATABASE")
        .context("Failed to resolve database path")?;
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let recon = report::run_report(&pool, start_ts, end_ts, &settings).await?;

    for difference in &recon.differences {
        if args.json {
            println!("{}", serde_json::to_string(difference)?);
        } else {
            println!("{difference}");
        }
    }
    println!(
        "Examined {} report rows: {} differences ({} stale pairs skipped, {} lag artifacts suppressed)",
        recon.samples_examined,
        recon.differences.len(),
        recon.stale_skipped,
        recon.suppressed_lag
    );

    Ok(())
}
