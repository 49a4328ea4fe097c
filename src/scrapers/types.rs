use serde::{Deserialize, Serialize};
use std::time::Duration;

/// CSS selectors for the listing site's markup.
///
/// Defaults target the Trade Me motors pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSelectors {
    /// Anchor wrapping each search result card
    pub card_link: String,
    /// Thumbnail inside a card
    pub card_image: String,
    /// Title inside a card
    pub card_title: String,
    /// Last item of the pagination control
    pub pagination_last: String,
    /// Label the last pagination item carries when another page follows
    pub next_label: String,
    pub show_more: String,
    pub breadcrumbs: String,
    pub breadcrumb_item: String,
    pub attribute_tag: String,
    pub import_history_tag: String,
    pub odometer_icon: String,
    /// Tag name of the element enclosing the odometer icon
    pub odometer_tag: String,
    pub fuel_rating: String,
    pub description: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            card_link: "a.tm-motors-search-card__link".to_string(),
            card_image: "img.tm-progressive-image-loader__full".to_string(),
            card_title: "div.tm-motors-search-card__title".to_string(),
            pagination_last: ".o-pagination__nav-item--last a".to_string(),
            next_label: "Next".to_string(),
            show_more: ".tm-motors-listing-body__item-show-more-button.o-transparent-button2"
                .to_string(),
            breadcrumbs: ".tm-breadcrumbs.o-breadcrumbs".to_string(),
            breadcrumb_item: "li.o-breadcrumbs__item".to_string(),
            attribute_tag: ".tm-motors-vehicle-attributes__tag".to_string(),
            import_history_tag: "tg-tag.tm-motors-vehicle-attributes__tag.o-tag".to_string(),
            odometer_icon: "tg-icon[name='vehicle-odometer']".to_string(),
            odometer_tag: "tg-tag".to_string(),
            fuel_rating: ".tm-motors-listing-ratings__fuel".to_string(),
            description: ".tm-markdown".to_string(),
        }
    }
}

/// Fixed waits standing in for "the page is ready".
///
/// The site gives no reliable loaded signal, so every settle step is a
/// timed suspension. Values are seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderTimings {
    /// After navigating to a search results page
    pub page_load_secs: f64,
    /// After the scroll pass on a search results page
    pub list_settle_secs: f64,
    /// After navigating to a listing detail page
    pub detail_load_secs: f64,
    /// After the scroll pass on a detail page
    pub detail_settle_secs: f64,
    /// Between scrolling the "show more" control into view and clicking it
    pub show_more_pause_secs: f64,
    pub scroll_steps: u32,
    /// Total time spent across all scroll steps
    pub scroll_duration_secs: f64,
}

impl Default for RenderTimings {
    fn default() -> Self {
        Self {
            page_load_secs: 2.0,
            list_settle_secs: 1.0,
            detail_load_secs: 2.5,
            detail_settle_secs: 1.5,
            show_more_pause_secs: 0.5,
            scroll_steps: 30,
            scroll_duration_secs: 1.5,
        }
    }
}

impl RenderTimings {
    /// No waiting at all; for scripted sessions
    #[cfg(test)]
    pub fn immediate() -> Self {
        Self {
            page_load_secs: 0.0,
            list_settle_secs: 0.0,
            detail_load_secs: 0.0,
            detail_settle_secs: 0.0,
            show_more_pause_secs: 0.0,
            scroll_steps: 4,
            scroll_duration_secs: 0.0,
        }
    }

    pub fn page_load(&self) -> Duration {
        secs(self.page_load_secs)
    }

    pub fn list_settle(&self) -> Duration {
        secs(self.list_settle_secs)
    }

    pub fn detail_load(&self) -> Duration {
        secs(self.detail_load_secs)
    }

    pub fn detail_settle(&self) -> Duration {
        secs(self.detail_settle_secs)
    }

    pub fn show_more_pause(&self) -> Duration {
        secs(self.show_more_pause_secs)
    }

    /// Pause between two scroll steps
    pub fn scroll_pause(&self) -> Duration {
        if self.scroll_steps == 0 {
            return Duration::ZERO;
        }
        secs(self.scroll_duration_secs / self.scroll_steps as f64)
    }
}

fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value.max(0.0))
}
