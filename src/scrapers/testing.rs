//! Scripted in-memory browser session for tests.

use crate::scrapers::dom::Dom;
use crate::scrapers::traits::{InteractionError, RenderingClient};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

/// Serves canned markup per URL and records everything it is asked to do.
#[derive(Default)]
pub struct ScriptedBrowser {
    pages: HashMap<String, String>,
    unreachable: HashSet<String>,
    current: Option<String>,
    pub intercept_clicks: bool,
    pub scroll_height: f64,
    pub visited: Vec<String>,
    pub waits: Vec<Duration>,
    pub scripts: Vec<String>,
    pub clicks: Vec<String>,
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        Self {
            scroll_height: 3000.0,
            ..Default::default()
        }
    }

    pub fn with_page(mut self, url: &str, markup: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), markup.into());
        self
    }

    pub fn with_unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }

    fn current_dom(&self) -> Option<Dom> {
        let url = self.current.as_ref()?;
        self.pages.get(url).map(|markup| Dom::parse(markup))
    }

    fn locate(&self, selector: &str) -> Result<(), InteractionError> {
        let found = self
            .current_dom()
            .map(|dom| dom.first(selector).is_ok())
            .unwrap_or(false);
        if found {
            Ok(())
        } else {
            Err(InteractionError::NotFound(selector.to_string()))
        }
    }
}

#[async_trait]
impl RenderingClient for ScriptedBrowser {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        if self.unreachable.contains(url) || !self.pages.contains_key(url) {
            bail!("net::ERR_NAME_NOT_RESOLVED at {}", url);
        }
        self.current = Some(url.to_string());
        self.visited.push(url.to_string());
        Ok(())
    }

    async fn wait(&mut self, duration: Duration) {
        self.waits.push(duration);
    }

    async fn execute_script(&mut self, script: &str) -> Result<Value> {
        self.scripts.push(script.to_string());
        if script.contains("scrollHeight") {
            Ok(json!(self.scroll_height))
        } else {
            Ok(Value::Null)
        }
    }

    async fn scroll_into_view(&mut self, selector: &str) -> Result<(), InteractionError> {
        self.locate(selector)
    }

    async fn click(&mut self, selector: &str) -> Result<(), InteractionError> {
        self.locate(selector)?;
        if self.intercept_clicks {
            return Err(InteractionError::Intercepted {
                selector: selector.to_string(),
                reason: "cookie banner covers the element".to_string(),
            });
        }
        self.clicks.push(selector.to_string());
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path) -> Result<()> {
        tokio::fs::write(path, b"\x89PNG\r\n")
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    async fn page_markup(&mut self) -> Result<String> {
        let url = self.current.as_ref().context("No page loaded")?;
        Ok(self.pages.get(url).cloned().unwrap_or_default())
    }
}

/// A search result card
pub fn card(href: &str, title: &str) -> String {
    format!(
        r#"<a class="tm-motors-search-card__link" href="{href}">
             <img class="tm-progressive-image-loader__full" src="/photos/{title}.jpg">
             <div class="tm-motors-search-card__title">{title}</div>
           </a>"#
    )
}

/// A results page holding `cards`, with a next control when `next` is set
pub fn results(cards: &[String], next: Option<&str>) -> String {
    let pagination = match next {
        Some(href) => format!(
            r#"<ul class="o-pagination"><li class="o-pagination__nav-item"><a href="/p1">1</a></li>
               <li class="o-pagination__nav-item--last"><a href="{href}">Next</a></li></ul>"#
        ),
        None => r#"<ul class="o-pagination"><li class="o-pagination__nav-item--last"><a href="/p1">1</a></li></ul>"#
            .to_string(),
    };
    format!("<html><body>{}{}</body></html>", cards.join("\n"), pagination)
}

/// Builder for a listing detail page; `None` leaves the fragment out
pub struct DetailFixture {
    pub breadcrumbs: Vec<&'static str>,
    pub year: Option<&'static str>,
    pub odometer: Option<&'static str>,
    pub import_history: Option<&'static str>,
    pub fuel: Option<&'static str>,
    pub description: Option<&'static str>,
    pub show_more: bool,
}

impl Default for DetailFixture {
    fn default() -> Self {
        Self {
            breadcrumbs: vec!["Motors", "Cars", "Mitsubishi", "Outlander"],
            year: Some("2019"),
            odometer: Some("61,250 km"),
            import_history: Some("NZ New"),
            fuel: Some("1.9 L/100km"),
            description: Some("PHEV, one owner.\nFull service history."),
            show_more: true,
        }
    }
}

impl DetailFixture {
    pub fn markup(&self) -> String {
        let crumbs: String = self
            .breadcrumbs
            .iter()
            .map(|c| format!(r#"<li class="o-breadcrumbs__item">{c}</li>"#))
            .collect();
        let mut tags = String::from(
            r#"<tg-tag class="tm-motors-vehicle-attributes__tag o-tag">Body style: SUV</tg-tag>"#,
        );
        if let Some(year) = self.year {
            tags.push_str(&format!(
                r#"<tg-tag class="tm-motors-vehicle-attributes__tag o-tag">Year: {year}</tg-tag>"#
            ));
        }
        if let Some(km) = self.odometer {
            tags.push_str(&format!(
                r#"<tg-tag class="tm-motors-vehicle-attributes__tag o-tag"><tg-icon name="vehicle-odometer"></tg-icon><span>{km}</span></tg-tag>"#
            ));
        }
        if let Some(history) = self.import_history {
            tags.push_str(&format!(
                r#"<tg-tag class="tm-motors-vehicle-attributes__tag o-tag">Import history: {history}</tg-tag>"#
            ));
        }
        let fuel = self
            .fuel
            .map(|f| format!(r#"<div class="tm-motors-listing-ratings__fuel">{f}</div>"#))
            .unwrap_or_default();
        let description = self
            .description
            .map(|d| {
                let paragraphs: Vec<String> = d.lines().map(|l| format!("<p>{l}</p>")).collect();
                format!(r#"<div class="tm-markdown">{}</div>"#, paragraphs.join("\n"))
            })
            .unwrap_or_default();
        let show_more = if self.show_more {
            r#"<button class="tm-motors-listing-body__item-show-more-button o-transparent-button2">Show more</button>"#
        } else {
            ""
        };

        format!(
            r#"<html><body>
                 <nav class="tm-breadcrumbs o-breadcrumbs"><ul>{crumbs}</ul></nav>
                 <div class="tm-motors-vehicle-attributes">{tags}</div>
                 {fuel}
                 {description}
                 {show_more}
               </body></html>"#
        )
    }
}
