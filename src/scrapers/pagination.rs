//! Search results crawler: walks the chain of result pages and collects
//! listing references.

use crate::models::ListingReference;
use crate::scrapers::dom::{find_in, inline_text, Dom, FieldError};
use crate::scrapers::scroll::scroll_to_bottom;
use crate::scrapers::traits::RenderingClient;
use crate::scrapers::types::{RenderTimings, SiteSelectors};
use anyhow::{Context, Result};
use reqwest::Url;
use scraper::ElementRef;
use tracing::{info, warn};

/// One search results page worth of references
#[derive(Debug, Default)]
pub struct ResultsPage {
    pub references: Vec<ListingReference>,
    pub next_url: Option<String>,
}

/// Every reference found by following the chain to its end
#[derive(Debug, Default)]
pub struct ChainOutcome {
    pub references: Vec<ListingReference>,
    pub pages_visited: usize,
}

pub struct PaginationCrawler<'a> {
    selectors: &'a SiteSelectors,
    timings: &'a RenderTimings,
}

impl<'a> PaginationCrawler<'a> {
    pub fn new(selectors: &'a SiteSelectors, timings: &'a RenderTimings) -> Self {
        Self { selectors, timings }
    }

    /// Load one results page, let it render, and read its cards plus the
    /// link to the following page.
    pub async fn crawl_page<C: RenderingClient + ?Sized>(&self, client: &mut C, url: &str) -> Result<ResultsPage> {
        client
            .navigate(url)
            .await
            .with_context(|| format!("Failed to load results page {}", url))?;
        client.wait(self.timings.page_load()).await;

        scroll_to_bottom(client, self.timings).await;
        client.wait(self.timings.list_settle()).await;

        let markup = client.page_markup().await?;
        let page = self.parse_page(&markup, url);
        info!("Found {} listings on page {}", page.references.len(), url);
        Ok(page)
    }

    /// Follow next links from `start_url` until a page has none.
    ///
    /// There is no page cap: markup that always advertises a next page
    /// keeps this running.
    pub async fn crawl_chain<C: RenderingClient + ?Sized>(&self, client: &mut C, start_url: &str) -> Result<ChainOutcome> {
        let mut outcome = ChainOutcome::default();
        let mut next = Some(start_url.to_string());

        while let Some(url) = next {
            let page = self.crawl_page(client, &url).await?;
            outcome.pages_visited += 1;
            outcome.references.extend(page.references);
            info!(
                "Chain at page {} with {} references so far",
                outcome.pages_visited,
                outcome.references.len()
            );
            next = page.next_url;
        }

        Ok(outcome)
    }

    fn parse_page(&self, markup: &str, page_url: &str) -> ResultsPage {
        let dom = Dom::parse(markup);
        let base = Url::parse(page_url).ok();

        let cards = match dom.query(&self.selectors.card_link) {
            Ok(cards) => cards,
            Err(e) => {
                warn!("Could not query listing cards: {}", e);
                Vec::new()
            }
        };

        let references = cards
            .into_iter()
            .enumerate()
            .filter_map(|(idx, card)| match self.parse_card(card, base.as_ref()) {
                Ok(reference) => Some(reference),
                Err(e) => {
                    warn!("Dropping card {} on {}: {}", idx, page_url, e);
                    None
                }
            })
            .collect();

        ResultsPage {
            references,
            next_url: self.next_link(&dom, base.as_ref()),
        }
    }

    fn parse_card(&self, card: ElementRef<'_>, base: Option<&Url>) -> Result<ListingReference, FieldError> {
        let href = card
            .value()
            .attr("href")
            .ok_or_else(|| FieldError::NotFound("href".to_string()))?;
        let image = find_in(card, &self.selectors.card_image)?;
        let src = image
            .value()
            .attr("src")
            .ok_or_else(|| FieldError::NotFound(format!("{} src", self.selectors.card_image)))?;
        let title = inline_text(find_in(card, &self.selectors.card_title)?);

        Ok(ListingReference::new(resolve(base, href), resolve(base, src), title))
    }

    /// Address of the following page, if the first element matching the
    /// last-item selector is the next control. A page without pagination is the end of the chain.
    fn next_link(&self, dom: &Dom, base: Option<&Url>) -> Option<String> {
        let link = dom.first(&self.selectors.pagination_last).ok()?;
        if inline_text(link) != self.selectors.next_label {
            return None;
        }
        link.value().attr("href").map(|href| resolve(base, href))
    }
}

/// Absolute form of `href`, as a browser would report it
fn resolve(base: Option<&Url>, href: &str) -> String {
    base.and_then(|b| b.join(href).ok())
        .map(String::from)
        .unwrap_or_else(|| href.to_string())
}
