pub mod sentinel;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A listing discovered on a search results page, before its detail page
/// has been visited.
///
/// Equality and hashing cover every field, surrogate id included, so only
/// exact duplicates collapse when the harvest state is deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ListingReference {
    pub url: String,
    #[serde(rename = "img_url")]
    pub image_url: String,
    pub title: String,
    /// Process-generated surrogate; also the name of the listing's artifact directory.
    pub id: u128,
}

impl ListingReference {
    /// Create a reference with a freshly generated surrogate id
    pub fn new(url: impl Into<String>, image_url: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_id(url, image_url, title, Uuid::new_v4().as_u128())
    }

    pub fn with_id(
        url: impl Into<String>,
        image_url: impl Into<String>,
        title: impl Into<String>,
        id: u128,
    ) -> Self {
        Self {
            url: url.into(),
            image_url: image_url.into(),
            title: title.into(),
            id,
        }
    }
}

/// Where the vehicle was first registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportHistory {
    NzNew,
    Imported,
}

impl fmt::Display for ImportHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportHistory::NzNew => f.write_str("NZ New"),
            ImportHistory::Imported => f.write_str("Imported"),
        }
    }
}

impl FromStr for ImportHistory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NZ New" => Ok(ImportHistory::NzNew),
            "Imported" => Ok(ImportHistory::Imported),
            other => Err(format!("unknown import history '{}'", other)),
        }
    }
}

/// Structured data parsed from a listing's detail page.
///
/// `None` means the field could not be extracted. On disk it is written
/// as `-1` for numbers and `"Unknown"` for text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrapedDetail {
    #[serde(with = "sentinel::label")]
    pub make: Option<String>,
    #[serde(with = "sentinel::label")]
    pub model: Option<String>,
    #[serde(with = "sentinel::int")]
    pub year: Option<i32>,
    #[serde(with = "sentinel::int")]
    pub kilometers: Option<i64>,
    #[serde(with = "sentinel::label")]
    pub import_history: Option<ImportHistory>,
    /// Litres per 100km
    #[serde(rename = "litres_per_100_km", with = "sentinel::float")]
    pub fuel_economy: Option<f64>,
    pub description: String,
}

/// The combined `data.json` written for every visited listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub listing: ListingReference,
    pub scraped_listing: ScrapedDetail,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<DateTime<Utc>>,
}
