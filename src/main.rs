use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{info, warn};

use merch_watch::cli::{Cli, render_site_list};
use merch_watch::config::AppConfig;
use merch_watch::runner::Runner;
use merch_watch::sitelog;

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so MERCH_WATCH_* variables are visible to the config layer
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing; --quiet routes output to the per-site logs only
    let default_filter = if cli.quiet { "error" } else { "merch_watch=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    if cli.list {
        print!("{}", render_site_list());
        return Ok(());
    }

    let config = AppConfig::from_env()?;
    let tokens = cli.tokens_to_run()?;

    let logs_dir = Path::new(&config.storage.data_dir).join("logs");
    if let Err(err) = sitelog::prune_logs(&logs_dir, config.storage.log_retention_days) {
        warn!(%err, "log pruning failed");
    }

    let runner = Runner::new(&config)?;
    let results = runner.run_tokens(&tokens).await?;

    for result in &results {
        match &result.error {
            Some(error) => warn!(site = %result.site, %error, "run failed"),
            None => info!(
                site = %result.site,
                fetched = result.fetched_count,
                new = result.new_products.len(),
                "run complete"
            ),
        }
    }

    // Per-site transient failures are logged, not surfaced as a process
    // failure; cron should not see this run as broken.
    Ok(())
}
