//! Per-field parsers for a listing detail page.
//!
//! Each parser is independent: a missing element or unparsable text only
//! costs that one field. [`settle`] turns a failure into `None` and logs
//! which field was lost.

use crate::models::ImportHistory;
use crate::scrapers::dom::{block_text, find_all_in, inline_text, Dom, FieldError};
use crate::scrapers::types::SiteSelectors;
use tracing::warn;

const YEAR_LABEL: &str = "Year:";
const IMPORT_HISTORY_LABEL: &str = "Import history:";
const NZ_NEW: &str = "NZ New";
const KM_SUFFIX: &str = "km";
const FUEL_SUFFIX: &str = "L/100km";

/// Keep a parsed value, or log the failure against `field` and drop it
pub fn settle<T>(field: &str, result: Result<T, FieldError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Could not extract {}: {}", field, e);
            None
        }
    }
}

fn breadcrumb_from_end(dom: &Dom, selectors: &SiteSelectors, from_end: usize) -> Result<String, FieldError> {
    let trail = dom.first(&selectors.breadcrumbs)?;
    let items = find_all_in(trail, &selectors.breadcrumb_item)?;
    items
        .len()
        .checked_sub(from_end)
        .and_then(|idx| items.get(idx))
        .map(|item| inline_text(*item))
        .ok_or_else(|| FieldError::NotFound(format!("breadcrumb #{} from the end", from_end)))
}

/// Second-to-last breadcrumb
pub fn make(dom: &Dom, selectors: &SiteSelectors) -> Result<String, FieldError> {
    breadcrumb_from_end(dom, selectors, 2)
}

/// Last breadcrumb
pub fn model(dom: &Dom, selectors: &SiteSelectors) -> Result<String, FieldError> {
    breadcrumb_from_end(dom, selectors, 1)
}

/// First attribute tag carrying a `Year:` label wins
pub fn year(dom: &Dom, selectors: &SiteSelectors) -> Result<i32, FieldError> {
    let tag = dom
        .query(&selectors.attribute_tag)?
        .into_iter()
        .map(inline_text)
        .find(|text| text.contains(YEAR_LABEL))
        .ok_or_else(|| FieldError::NotFound(format!("{} {}", selectors.attribute_tag, YEAR_LABEL)))?;

    let value = tag.replace(YEAR_LABEL, "");
    let value = value.trim();
    value.parse().map_err(|_| FieldError::Coercion {
        text: value.to_string(),
        expected: "a year",
    })
}

/// Slice `text` from its first digit through its last digit, dropping
/// thousands separators. `None` when there are no digits at all.
pub fn trim_to_digits(text: &str) -> Option<String> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let end = text.rfind(|c: char| c.is_ascii_digit())?;
    Some(text[start..=end].replace(',', ""))
}

/// Odometer reading, located through the tag enclosing the odometer icon
pub fn kilometers(dom: &Dom, selectors: &SiteSelectors) -> Result<i64, FieldError> {
    let tag = dom.enclosing(&selectors.odometer_icon, &selectors.odometer_tag)?;
    let text = inline_text(tag).replace(',', "").replace(KM_SUFFIX, "");
    let digits = trim_to_digits(text.trim()).ok_or_else(|| FieldError::Coercion {
        text: text.clone(),
        expected: "a distance",
    })?;
    digits.parse().map_err(|_| FieldError::Coercion {
        text: digits,
        expected: "a distance",
    })
}

/// Classify the text of an attribute tag. `None` when the label is absent.
pub fn classify_import_history(text: &str) -> Option<ImportHistory> {
    let rest = text.split_once(IMPORT_HISTORY_LABEL)?.1;
    if rest.contains(NZ_NEW) {
        Some(ImportHistory::NzNew)
    } else {
        Some(ImportHistory::Imported)
    }
}

pub fn import_history(dom: &Dom, selectors: &SiteSelectors) -> Result<ImportHistory, FieldError> {
    dom.query(&selectors.import_history_tag)?
        .into_iter()
        .find_map(|tag| classify_import_history(&inline_text(tag)))
        .ok_or_else(|| {
            FieldError::NotFound(format!("{} {}", selectors.import_history_tag, IMPORT_HISTORY_LABEL))
        })
}

/// Fuel economy rating in litres per 100km
pub fn fuel_economy(dom: &Dom, selectors: &SiteSelectors) -> Result<f64, FieldError> {
    let rating = dom.first(&selectors.fuel_rating)?;
    let text: String = inline_text(rating).split_whitespace().collect();
    let value = text.replace(FUEL_SUFFIX, "");
    value.parse().map_err(|_| FieldError::Coercion {
        text: value,
        expected: "litres per 100km",
    })
}

/// Full text of the description block. Callers treat failure as fatal
/// for the listing.
pub fn description(dom: &Dom, selectors: &SiteSelectors) -> Result<String, FieldError> {
    dom.first(&selectors.description).map(block_text)
}
