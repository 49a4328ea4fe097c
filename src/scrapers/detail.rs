//! Listing detail extraction.
//!
//! Visits a listing, captures its raw artifacts and parses the structured
//! fields. Artifacts land in `<listings_dir>/<id>/`:
//!
//! | File        | Content                                  |
//! |-------------|------------------------------------------|
//! | `0.png`     | screenshot before the scroll pass        |
//! | `1.png`     | screenshot after the page settled        |
//! | `page.html` | rendered markup                          |
//! | `data.json` | `{ listing, scraped_listing, scraped_at }` |
//!
//! Every write replaces the previous file, so extracting a listing again
//! overwrites its artifact set. The previous `data.json` is removed as soon
//! as the page is reached, so a visit that fails part way leaves no record
//! from an older visit behind.

use crate::models::{ListingRecord, ListingReference, ScrapedDetail};
use crate::scrapers::dom::{Dom, FieldError};
use crate::scrapers::fields::{self, settle};
use crate::scrapers::scroll::scroll_to_bottom;
use crate::scrapers::traits::{InteractionError, RenderingClient};
use crate::scrapers::types::{RenderTimings, SiteSelectors};
use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const BEFORE_SCROLL_SCREENSHOT: &str = "0.png";
pub const AFTER_SCROLL_SCREENSHOT: &str = "1.png";
pub const PAGE_MARKUP_FILE: &str = "page.html";
pub const RECORD_FILE: &str = "data.json";

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The listing page could not be reached at all
    #[error("failed to load listing {url}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },
    /// The description block is missing; the record would be worthless
    #[error("listing {id} has no description")]
    MissingDescription {
        id: u128,
        #[source]
        source: FieldError,
    },
    #[error("failed to write artifacts for listing {id}")]
    Artifacts {
        id: u128,
        #[source]
        source: anyhow::Error,
    },
}

impl ExtractError {
    /// Whether the run can carry on with the next listing
    pub fn is_listing_local(&self) -> bool {
        matches!(self, ExtractError::MissingDescription { .. })
    }
}

pub struct DetailExtractor<'a> {
    selectors: &'a SiteSelectors,
    timings: &'a RenderTimings,
    listings_dir: &'a Path,
}

impl<'a> DetailExtractor<'a> {
    pub fn new(selectors: &'a SiteSelectors, timings: &'a RenderTimings, listings_dir: &'a Path) -> Self {
        Self {
            selectors,
            timings,
            listings_dir,
        }
    }

    /// Directory holding the artifacts of `reference`
    pub fn artifact_dir(&self, reference: &ListingReference) -> PathBuf {
        self.listings_dir.join(reference.id.to_string())
    }

    /// Visit `reference`, persist its artifacts and return the parsed detail
    pub async fn extract<C: RenderingClient + ?Sized>(
        &self,
        client: &mut C,
        reference: &ListingReference,
    ) -> Result<ScrapedDetail, ExtractError> {
        info!("Scraping listing {}...", reference.url);
        let dir = self.artifact_dir(reference);
        let artifacts = |source: anyhow::Error| ExtractError::Artifacts {
            id: reference.id,
            source,
        };

        client
            .navigate(&reference.url)
            .await
            .map_err(|source| ExtractError::Navigation {
                url: reference.url.clone(),
                source,
            })?;

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| artifacts(e.into()))?;
        // The record must never outlive the visit it describes
        match tokio::fs::remove_file(dir.join(RECORD_FILE)).await {
            Ok(()) => debug!("Removed previous record for listing {}", reference.id),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(artifacts(e.into())),
        }

        client.wait(self.timings.detail_load()).await;

        self.expand_description(client).await;

        client
            .screenshot(&dir.join(BEFORE_SCROLL_SCREENSHOT))
            .await
            .map_err(artifacts)?;

        scroll_to_bottom(client, self.timings).await;
        client.wait(self.timings.detail_settle()).await;

        let markup = client.page_markup().await.map_err(artifacts)?;
        tokio::fs::write(dir.join(PAGE_MARKUP_FILE), &markup)
            .await
            .map_err(|e| artifacts(e.into()))?;

        client
            .screenshot(&dir.join(AFTER_SCROLL_SCREENSHOT))
            .await
            .map_err(artifacts)?;

        let detail = self.parse(&Dom::parse(&markup)).map_err(|source| {
            ExtractError::MissingDescription {
                id: reference.id,
                source,
            }
        })?;

        let record = ListingRecord {
            listing: reference.clone(),
            scraped_listing: detail.clone(),
            scraped_at: Some(Utc::now()),
        };
        let json = serde_json::to_string_pretty(&record).map_err(|e| artifacts(e.into()))?;
        tokio::fs::write(dir.join(RECORD_FILE), json)
            .await
            .map_err(|e| artifacts(e.into()))?;
        debug!("Wrote {}", dir.join(RECORD_FILE).display());

        Ok(detail)
    }

    /// Click the "show more" control so the full description is rendered.
    /// Best effort: the truncated description is still usable.
    async fn expand_description<C: RenderingClient + ?Sized>(&self, client: &mut C) {
        let selector = self.selectors.show_more.as_str();
        let outcome = match client.scroll_into_view(selector).await {
            Ok(()) => {
                client.wait(self.timings.show_more_pause()).await;
                client.click(selector).await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => debug!("Expanded description"),
            Err(InteractionError::NotFound(_)) => warn!("Could not find show more button"),
            Err(e @ InteractionError::Intercepted { .. }) => {
                warn!("Could not click show more button: {}", e)
            }
        }
    }

    /// Apply every field parser. Only the description can fail the listing.
    pub fn parse(&self, dom: &Dom) -> Result<ScrapedDetail, FieldError> {
        let description = fields::description(dom, self.selectors)?;

        Ok(ScrapedDetail {
            make: settle("make", fields::make(dom, self.selectors)),
            model: settle("model", fields::model(dom, self.selectors)),
            year: settle("year", fields::year(dom, self.selectors)),
            kilometers: settle("kilometers", fields::kilometers(dom, self.selectors)),
            import_history: settle("import history", fields::import_history(dom, self.selectors)),
            fuel_economy: settle("fuel economy", fields::fuel_economy(dom, self.selectors)),
            description,
        })
    }
}
