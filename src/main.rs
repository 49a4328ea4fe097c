//! # Motors Harvest
//!
//! Harvests vehicle listings from a paginated, script-rendered classifieds
//! site and flattens the results into a CSV file.
//!
//! ```bash
//! # Crawl the results chain (or reuse listings.json) and visit every listing
//! motors-harvest harvest --config ./harvest.toml
//!
//! # Flatten listings/*/data.json into output.csv
//! motors-harvest export
//! ```

mod config;
mod export;
mod models;
mod pipeline;
mod rate_limit;
mod scrapers;
mod store;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use scrapers::HeadlessBrowser;
use std::path::PathBuf;
use store::ListingStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "motors-harvest", version, about = "Vehicle listing harvester")]
struct Cli {
    /// Path to the TOML configuration file; defaults apply when it is missing
    #[arg(long, global = true, default_value = "harvest.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover listings and scrape every listing page
    Harvest {
        /// Crawl the results pages even if listings were saved before
        #[arg(long, conflicts_with = "reuse")]
        rescan: bool,
        /// Reuse the saved listings without asking
        #[arg(long)]
        reuse: bool,
        /// Override harvest.start_url
        #[arg(long)]
        start_url: Option<String>,
    },
    /// Write all scraped records to one CSV file
    Export {
        /// Defaults to harvest.listings_dir
        #[arg(long)]
        input: Option<PathBuf>,
        /// Defaults to harvest.export_file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Harvest {
            rescan,
            reuse,
            start_url,
        } => {
            if let Some(url) = start_url {
                config.harvest.start_url = url;
                config::validate(&config)?;
            }

            let mut store = ListingStore::load(&config.harvest.state_file).await?;
            let rescan = match forced_rescan(store.is_empty(), rescan, reuse) {
                Some(choice) => choice,
                None => Confirm::new()
                    .with_prompt("Found existing listings, would you like to rescan for new listings?")
                    .default(false)
                    .interact()
                    .context("Failed to read answer")?,
            };

            let mut browser = HeadlessBrowser::launch(&config.browser)?;
            let report = pipeline::harvest(&mut browser, &config, &mut store, rescan).await?;
            info!(
                "Visited {} results pages, {} new of {} known listings",
                report.pages_visited, report.new_listings, report.known_listings
            );
            if let Some(summary) = failure_summary(&report.failed) {
                warn!("{}", summary);
            }
        }
        Commands::Export { input, output } => {
            let input = input.unwrap_or_else(|| config.harvest.listings_dir.clone());
            let output = output.unwrap_or_else(|| config.harvest.export_file.clone());
            let summary = export::export_csv(&input, &output)?;
            info!("💾 Exported {} listings", summary.rows);
        }
    }

    Ok(())
}

/// Rescan decision that needs no prompt: an empty store always rescans,
/// and explicit flags win. `None` means ask.
fn forced_rescan(store_empty: bool, rescan: bool, reuse: bool) -> Option<bool> {
    if store_empty || rescan {
        Some(true)
    } else if reuse {
        Some(false)
    } else {
        None
    }
}

/// One line naming the listings that produced no record, if any
fn failure_summary(failed: &[(u128, String)]) -> Option<String> {
    if failed.is_empty() {
        return None;
    }
    let ids: Vec<String> = failed.iter().map(|(id, _)| id.to_string()).collect();
    Some(format!("{} listings produced no record: {}", failed.len(), ids.join(", ")))
}
