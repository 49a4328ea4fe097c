use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Why a click or scroll on a page element did not happen
#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("no element matches '{0}'")]
    NotFound(String),
    #[error("interaction with '{selector}' was intercepted: {reason}")]
    Intercepted { selector: String, reason: String },
}

/// A rendering browser session.
///
/// One session is shared by the pagination crawler and the detail
/// extractor, so every method takes `&mut self`: whoever holds the
/// session drives it exclusively. DOM queries are not part of the seam;
/// callers snapshot [`RenderingClient::page_markup`] into a
/// [`Dom`](crate::scrapers::dom::Dom) and query that.
#[async_trait]
pub trait RenderingClient: Send {
    /// Load `url` and block until the navigation has completed
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Suspend for a fixed duration while the page keeps rendering
    async fn wait(&mut self, duration: Duration);

    /// Evaluate JavaScript in the page and return its JSON value
    async fn execute_script(&mut self, script: &str) -> Result<Value>;

    async fn scroll_into_view(&mut self, selector: &str) -> Result<(), InteractionError>;

    async fn click(&mut self, selector: &str) -> Result<(), InteractionError>;

    /// Capture the viewport as PNG into `path`, replacing any existing file
    async fn screenshot(&mut self, path: &Path) -> Result<()>;

    /// The current rendered document markup
    async fn page_markup(&mut self) -> Result<String>;
}
