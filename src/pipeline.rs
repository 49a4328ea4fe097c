//! Harvest entry point: discovery, then per-listing extraction.

use crate::config::Config;
use crate::rate_limit::RateLimiter;
use crate::scrapers::{DetailExtractor, PaginationCrawler, RenderingClient};
use crate::store::ListingStore;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

/// What a harvest run did
#[derive(Debug, Default)]
pub struct HarvestReport {
    pub pages_visited: usize,
    pub new_listings: usize,
    pub known_listings: usize,
    pub records_written: usize,
    /// Listings whose extraction aborted, with the reason
    pub failed: Vec<(u128, String)>,
}

/// Run the harvest against one browser session.
///
/// With `rescan`, the results chain is crawled from `harvest.start_url`
/// and the state file is rewritten once the whole pass has finished.
/// Every stored listing is then visited in discovery order. A listing
/// without a description is recorded as failed and skipped; a page that
/// cannot be loaded ends the run.
pub async fn harvest<C: RenderingClient + ?Sized>(
    client: &mut C,
    config: &Config,
    store: &mut ListingStore,
    rescan: bool,
) -> Result<HarvestReport> {
    let mut report = HarvestReport::default();

    if rescan {
        let crawler = PaginationCrawler::new(&config.selectors, &config.timing);
        let outcome = crawler.crawl_chain(client, &config.harvest.start_url).await?;
        report.pages_visited = outcome.pages_visited;
        report.new_listings = store.extend(outcome.references);
        info!(
            "Pagination pass visited {} pages, {} new listings",
            report.pages_visited, report.new_listings
        );
        store.save().await?;
    }
    report.known_listings = store.len();

    info!("Scraping individual listings...");
    let extractor = DetailExtractor::new(&config.selectors, &config.timing, &config.harvest.listings_dir);
    let mut limiter = RateLimiter::new(config.rate_limit.min_delay(), config.rate_limit.max_delay());
    let pb = progress_bar(store.len() as u64)?;

    for reference in store.listings() {
        limiter.pause().await;
        pb.set_message(reference.title.clone());

        match extractor.extract(client, reference).await {
            Ok(_) => report.records_written += 1,
            Err(e) if e.is_listing_local() => {
                error!("Skipping listing {}: {:#}", reference.id, anyhow::Error::from(e));
                report.failed.push((reference.id, reference.url.clone()));
            }
            Err(e) => {
                pb.abandon();
                return Err(e.into());
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(
        "✅ Done: {} records written, {} failed",
        report.records_written,
        report.failed.len()
    );
    Ok(report)
}

fn progress_bar(total: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.green/dim}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    Ok(pb)
}
