use crate::scrapers::types::{RenderTimings, SiteSelectors};
use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub harvest: HarvestConfig,
    pub timing: RenderTimings,
    pub rate_limit: RateLimitConfig,
    pub browser: BrowserConfig,
    pub selectors: SiteSelectors,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HarvestConfig {
    /// First search results page of the chain
    pub start_url: String,
    /// One sub-directory per listing, named by surrogate id
    pub listings_dir: PathBuf,
    /// Persisted listing references
    pub state_file: PathBuf,
    pub export_file: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            start_url: "https://www.trademe.co.nz/a/motors/cars/plug-in-hybrid".to_string(),
            listings_dir: PathBuf::from("listings"),
            state_file: PathBuf::from("listings.json"),
            export_file: PathBuf::from("output.csv"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RateLimitConfig {
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: 0.01,
            max_delay_secs: 3.0,
        }
    }
}

impl RateLimitConfig {
    pub fn min_delay(&self) -> Duration {
        Duration::from_secs_f64(self.min_delay_secs)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_secs_f64(self.max_delay_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Chrome is torn down after this long without any DevTools traffic
    pub idle_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            idle_timeout_secs: 300,
        }
    }
}

/// Read `path` if it exists, otherwise fall back to defaults
pub fn load_config(path: &Path) -> Result<Config> {
    let config: Config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        Config::default()
    };
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    Url::parse(&config.harvest.start_url)
        .with_context(|| format!("harvest.start_url is not a URL: {}", config.harvest.start_url))?;

    if config.timing.scroll_steps == 0 {
        anyhow::bail!("timing.scroll_steps must be > 0");
    }

    let timing = &config.timing;
    let waits = [
        ("page_load_secs", timing.page_load_secs),
        ("list_settle_secs", timing.list_settle_secs),
        ("detail_load_secs", timing.detail_load_secs),
        ("detail_settle_secs", timing.detail_settle_secs),
        ("show_more_pause_secs", timing.show_more_pause_secs),
        ("scroll_duration_secs", timing.scroll_duration_secs),
    ];
    for (name, value) in waits {
        if !value.is_finite() || value < 0.0 {
            anyhow::bail!("timing.{} must be >= 0", name);
        }
    }

    let rate = &config.rate_limit;
    if !rate.min_delay_secs.is_finite() || !rate.max_delay_secs.is_finite() {
        anyhow::bail!("rate_limit delays must be finite");
    }
    if rate.min_delay_secs < 0.0 {
        anyhow::bail!("rate_limit.min_delay_secs must be >= 0");
    }
    if rate.min_delay_secs > rate.max_delay_secs {
        anyhow::bail!("rate_limit.min_delay_secs must be <= rate_limit.max_delay_secs");
    }

    Ok(())
}
