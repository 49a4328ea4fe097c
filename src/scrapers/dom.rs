//! Queryable snapshot of a rendered page.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Why a single field could not be read from a page
#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("no element matches '{0}'")]
    NotFound(String),
    #[error("cannot parse '{text}' as {expected}")]
    Coercion { text: String, expected: &'static str },
    #[error("invalid selector '{0}'")]
    Selector(String),
}

/// Parsed markup of the page as it was when captured.
pub struct Dom {
    document: Html,
}

impl Dom {
    pub fn parse(markup: &str) -> Self {
        Self {
            document: Html::parse_document(markup),
        }
    }

    /// All elements matching `css`, in document order
    pub fn query(&self, css: &str) -> Result<Vec<ElementRef<'_>>, FieldError> {
        let selector = selector(css)?;
        Ok(self.document.select(&selector).collect())
    }

    /// First element matching `css`
    pub fn first(&self, css: &str) -> Result<ElementRef<'_>, FieldError> {
        let selector = selector(css)?;
        self.document
            .select(&selector)
            .next()
            .ok_or_else(|| FieldError::NotFound(css.to_string()))
    }

    /// Nearest `tag` ancestor of the first element matching `css`.
    ///
    /// Equivalent of `//css/ancestor::tag`.
    pub fn enclosing(&self, css: &str, tag: &str) -> Result<ElementRef<'_>, FieldError> {
        let inner = self.first(css)?;
        inner
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name().eq_ignore_ascii_case(tag))
            .ok_or_else(|| FieldError::NotFound(format!("{} enclosing {}", tag, css)))
    }
}

/// First descendant of `element` matching `css`
pub fn find_in<'a>(element: ElementRef<'a>, css: &str) -> Result<ElementRef<'a>, FieldError> {
    let selector = selector(css)?;
    element
        .select(&selector)
        .next()
        .ok_or_else(|| FieldError::NotFound(css.to_string()))
}

/// Descendants of `element` matching `css`
pub fn find_all_in<'a>(element: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>, FieldError> {
    let selector = selector(css)?;
    Ok(element.select(&selector).collect())
}

/// Visible text on a single line, whitespace runs collapsed
pub fn inline_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Visible text keeping line structure; blank lines dropped
pub fn block_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn selector(css: &str) -> Result<Selector, FieldError> {
    Selector::parse(css).map_err(|_| FieldError::Selector(css.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <ul class="crumbs"><li>Home</li><li> Cars </li></ul>
          <tg-tag class="attr"><tg-icon name="vehicle-odometer"></tg-icon><span>12,345 km</span></tg-tag>
          <div class="md"><p>First line</p>
          <p>Second   line</p></div>
        </body></html>
    "#;

    #[test]
    fn test_query_in_document_order() {
        let dom = Dom::parse(PAGE);
        let items = dom.query("ul.crumbs li").unwrap();
        let texts: Vec<_> = items.into_iter().map(inline_text).collect();
        assert_eq!(texts, vec!["Home", "Cars"]);
    }

    #[test]
    fn test_first_reports_missing_selector() {
        let dom = Dom::parse(PAGE);
        assert_eq!(
            dom.first(".nope").err(),
            Some(FieldError::NotFound(".nope".to_string()))
        );
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let dom = Dom::parse(PAGE);
        assert!(matches!(dom.query("[["), Err(FieldError::Selector(_))));
    }

    #[test]
    fn test_enclosing_walks_up_to_tag() {
        let dom = Dom::parse(PAGE);
        let tag = dom.enclosing("tg-icon[name='vehicle-odometer']", "tg-tag").unwrap();
        assert_eq!(inline_text(tag), "12,345 km");
        assert!(dom.enclosing("tg-icon", "section").is_err());
    }

    #[test]
    fn test_block_text_keeps_lines() {
        let dom = Dom::parse(PAGE);
        let block = dom.first(".md").unwrap();
        assert_eq!(block_text(block), "First line\nSecond line");
    }
}
