//! Dealer dashboard report binary.
//!
//! Loads a JSON snapshot of the record store, builds the dashboard report and
//! prints it as pretty JSON on stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin dealer-report -- snapshot.json
//!
//! DASHBOARD_CONFIG=dashboard.toml ANCHOR_DATE=31/03/2025 \
//!   cargo run --bin dealer-report -- snapshot.json
//! ```
//!
//! # Environment Variables
//!
//! - `DASHBOARD_CONFIG`: Config file path (default: search for `dashboard.toml`)
//! - `ANCHOR_DATE`: Report date in any accepted date format (default: today)
//! - `RUST_LOG`: Log filter (default: info)

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use dealer_ops::io::SnapshotLoader;
use dealer_ops::time::today;
use dealer_ops::{DashboardConfig, DashboardReport};

fn main() -> Result<()> {
    // Initialize logging on stderr so stdout stays valid JSON
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let snapshot_path: PathBuf = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("Usage: dealer-report <snapshot.json>")?;

    let config = match env::var("DASHBOARD_CONFIG") {
        Ok(path) => DashboardConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        Err(_) => DashboardConfig::load_or_default().context("Failed to load dashboard.toml")?,
    };

    let normalizer = config.normalizer();
    let anchor = match env::var("ANCHOR_DATE") {
        Ok(raw) => normalizer
            .parse(raw.as_str())
            .with_context(|| format!("Invalid ANCHOR_DATE '{}'", raw))?,
        Err(_) => today(),
    };

    info!("Loading snapshot from {}", snapshot_path.display());
    let snapshot = SnapshotLoader::load_from_file(&snapshot_path)?;
    info!(
        "Loaded {} rows ({} skipped), anchor {}",
        snapshot.len(),
        snapshot.skipped,
        anchor
    );

    let report = DashboardReport::build(&snapshot, &config, anchor);
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{}", json);

    Ok(())
}
