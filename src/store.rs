//! Harvest state: every listing reference discovered so far.

use crate::models::ListingReference;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::info;

/// Deduplicated, discovery-ordered collection of listing references,
/// backed by a JSON array on disk.
pub struct ListingStore {
    path: PathBuf,
    listings: Vec<ListingReference>,
    seen: HashSet<ListingReference>,
}

impl ListingStore {
    /// Open the state file at `path`; a missing file is an empty store
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut store = Self {
            path,
            listings: Vec::new(),
            seen: HashSet::new(),
        };

        if !tokio::fs::try_exists(&store.path).await.unwrap_or(false) {
            return Ok(store);
        }

        info!("Found existing {}, loading...", store.path.display());
        let raw = tokio::fs::read_to_string(&store.path)
            .await
            .with_context(|| format!("Failed to read {}", store.path.display()))?;
        let listings: Vec<ListingReference> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", store.path.display()))?;
        store.extend(listings);
        info!("Loaded {} listings from file", store.len());

        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// References in first-seen order
    pub fn listings(&self) -> &[ListingReference] {
        &self.listings
    }

    /// Append references not already present, keeping first-seen order.
    /// Returns how many were new.
    pub fn extend(&mut self, references: impl IntoIterator<Item = ListingReference>) -> usize {
        let before = self.listings.len();
        for reference in references {
            if self.seen.insert(reference.clone()) {
                self.listings.push(reference);
            }
        }
        self.listings.len() - before
    }

    /// Rewrite the state file with the full collection
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&self.listings)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        info!("💾 Saved {} listings to {}", self.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn reference(id: u128) -> ListingReference {
        ListingReference::with_id(format!("https://cars.test/{id}"), "img", format!("Car {id}"), id)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = ListingStore::load(tmp.path().join("listings.json")).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_identical_references_stored_once() {
        let tmp = TempDir::new().unwrap();
        let mut store = ListingStore::load(tmp.path().join("listings.json")).await.unwrap();

        assert_eq!(store.extend(vec![reference(1), reference(2)]), 2);
        assert_eq!(store.extend(vec![reference(2), reference(1), reference(3)]), 1);

        let ids: Vec<u128> = store.listings().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_same_listing_with_new_id_is_kept() {
        let tmp = TempDir::new().unwrap();
        let mut store = ListingStore::load(tmp.path().join("listings.json")).await.unwrap();
        let mut rediscovered = reference(1);
        rediscovered.id = 99;

        store.extend(vec![reference(1), rediscovered]);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_save_and_reload_keeps_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state").join("listings.json");
        let big_id = u128::MAX - 7;

        let mut store = ListingStore::load(&path).await.unwrap();
        store.extend(vec![reference(5), reference(big_id), reference(2)]);
        store.save().await.unwrap();

        let reloaded = ListingStore::load(&path).await.unwrap();
        assert_eq!(reloaded.listings(), store.listings());
        assert!(!path.with_extension("json.tmp").exists());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"img_url\""));
    }

    #[tokio::test]
    async fn test_corrupt_state_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("listings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(ListingStore::load(&path).await.is_err());
    }
}
