//! Origin registry: a derived view over the persistent store that answers
//! "is this origin allowed, and why".
//!
//! The registry re-reads the store on every query. The allowed set may grow
//! or shrink while a session is active, and enforcement must see those
//! changes on its next poll.

use std::sync::Arc;

use log::debug;
use serde_json::Value;

use crate::error::StoreError;
use crate::origin::{Origin, RawSavedOrigin, SavedOrigin};
use crate::storage::{get_typed, keys, set_typed, KvStore};

#[derive(Clone)]
pub struct OriginRegistry {
    store: Arc<dyn KvStore>,
}

impl OriginRegistry {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Load the saved set, deriving origins from legacy full-URL entries at
    /// read time. Entries that fail to parse are skipped, never fatal.
    pub async fn load(&self) -> Result<Vec<SavedOrigin>, StoreError> {
        let raw: Vec<Value> = get_typed(&*self.store, keys::SAVED_ORIGINS)
            .await?
            .unwrap_or_default();
        let mut out = Vec::with_capacity(raw.len());
        for entry in raw {
            match serde_json::from_value::<RawSavedOrigin>(entry) {
                Ok(parsed) => {
                    if let Some(saved) = parsed.into_saved() {
                        out.push(saved);
                    }
                }
                Err(err) => debug!("skipping malformed saved-origin entry: {err}"),
            }
        }
        Ok(out)
    }

    /// True when `origin` is anywhere in the saved set, reason or not.
    /// Within-session switching is permitted to any saved origin.
    pub async fn is_allowed(&self, origin: &Origin) -> Result<bool, StoreError> {
        Ok(self.load().await?.iter().any(|s| &s.origin == origin))
    }

    /// The justification note for `origin`, when one is saved.
    pub async fn reason_for(&self, origin: &Origin) -> Result<Option<String>, StoreError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|s| &s.origin == origin)
            .map(|s| s.reason))
    }

    /// The entry for `origin` only if it can anchor a focus session: saved
    /// origins without a reason are deliberately not start-eligible.
    pub async fn find_eligible_for_start(
        &self,
        origin: &Origin,
    ) -> Result<Option<SavedOrigin>, StoreError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|s| &s.origin == origin && s.has_reason()))
    }

    /// Persist the full list, replacing whatever was stored.
    pub async fn save(&self, list: &[SavedOrigin]) -> Result<(), StoreError> {
        set_typed(&*self.store, keys::SAVED_ORIGINS, &list).await
    }

    /// Rewrite legacy full-URL entries to origin form in place. Returns the
    /// migrated list. No-op when nothing is in legacy form.
    pub async fn migrate(&self) -> Result<Vec<SavedOrigin>, StoreError> {
        let raw: Vec<Value> = get_typed(&*self.store, keys::SAVED_ORIGINS)
            .await?
            .unwrap_or_default();
        let mut needs_rewrite = false;
        let mut migrated = Vec::with_capacity(raw.len());
        for entry in raw {
            match serde_json::from_value::<RawSavedOrigin>(entry) {
                Ok(parsed) => {
                    if parsed.is_legacy() {
                        needs_rewrite = true;
                    }
                    if let Some(saved) = parsed.into_saved() {
                        migrated.push(saved);
                    } else {
                        needs_rewrite = true;
                    }
                }
                Err(err) => {
                    debug!("dropping malformed saved-origin entry during migration: {err}");
                    needs_rewrite = true;
                }
            }
        }
        if needs_rewrite {
            self.save(&migrated).await?;
        }
        Ok(migrated)
    }

    // ── Presentation-layer CRUD ──────────────────────────────────────
    // Simple writes through the kv interface; the core itself only reads.

    /// Save the origin of `url`. Returns `false` when already saved.
    pub async fn add(&self, url: &str, reason: &str) -> Result<bool, StoreError> {
        let mut list = self.load().await?;
        let entry = SavedOrigin::new(url, reason);
        if list.iter().any(|s| s.origin == entry.origin) {
            return Ok(false);
        }
        list.push(entry);
        self.save(&list).await?;
        Ok(true)
    }

    /// Remove a saved origin. Returns `false` when it was not saved.
    pub async fn remove(&self, origin: &Origin) -> Result<bool, StoreError> {
        let mut list = self.load().await?;
        let before = list.len();
        list.retain(|s| &s.origin != origin);
        if list.len() == before {
            return Ok(false);
        }
        self.save(&list).await?;
        Ok(true)
    }

    /// Replace the reason on a saved origin. Returns `false` when it was
    /// not saved.
    pub async fn update_reason(&self, origin: &Origin, reason: &str) -> Result<bool, StoreError> {
        let mut list = self.load().await?;
        let Some(entry) = list.iter_mut().find(|s| &s.origin == origin) else {
            return Ok(false);
        };
        entry.reason = reason.trim().to_string();
        entry.updated_at = chrono::Utc::now();
        self.save(&list).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn registry() -> (OriginRegistry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (OriginRegistry::new(store.clone()), store)
    }

    #[tokio::test]
    async fn empty_store_allows_nothing() {
        let (registry, _) = registry();
        let origin = Origin::normalize("https://example.com");
        assert!(!registry.is_allowed(&origin).await.unwrap());
        assert!(registry.find_eligible_for_start(&origin).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saved_origin_with_reason_is_start_eligible() {
        let (registry, _) = registry();
        assert!(registry.add("https://example.com/page", "write report").await.unwrap());

        let origin = Origin::normalize("https://example.com/other");
        assert!(registry.is_allowed(&origin).await.unwrap());
        let eligible = registry.find_eligible_for_start(&origin).await.unwrap().unwrap();
        assert_eq!(eligible.reason, "write report");
    }

    #[tokio::test]
    async fn empty_reason_blocks_start_but_not_switching() {
        let (registry, _) = registry();
        registry.add("https://example.com", "").await.unwrap();

        let origin = Origin::normalize("https://example.com");
        assert!(registry.is_allowed(&origin).await.unwrap());
        assert!(registry.find_eligible_for_start(&origin).await.unwrap().is_none());
        assert_eq!(registry.reason_for(&origin).await.unwrap(), Some(String::new()));
    }

    #[tokio::test]
    async fn duplicate_origins_are_rejected() {
        let (registry, _) = registry();
        assert!(registry.add("https://example.com/a", "first").await.unwrap());
        assert!(!registry.add("https://example.com/b", "second").await.unwrap());
        assert_eq!(registry.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn legacy_url_entries_resolve_at_read_time() {
        let (registry, store) = registry();
        store
            .set(
                keys::SAVED_ORIGINS,
                json!([{"url": "https://old.example.com/deep/link", "reason": "legacy"}]),
            )
            .await
            .unwrap();

        let origin = Origin::normalize("https://old.example.com");
        assert!(registry.is_allowed(&origin).await.unwrap());
        let eligible = registry.find_eligible_for_start(&origin).await.unwrap().unwrap();
        assert_eq!(eligible.origin.as_str(), "https://old.example.com");
    }

    #[tokio::test]
    async fn migrate_rewrites_legacy_entries_once() {
        let (registry, store) = registry();
        store
            .set(
                keys::SAVED_ORIGINS,
                json!([
                    {"url": "https://old.example.com/deep", "reason": "legacy"},
                    {"origin": "https://new.example.com", "reason": "current",
                     "timestamp": 1700000000000u64, "updated": 1700000000000u64},
                ]),
            )
            .await
            .unwrap();

        let migrated = registry.migrate().await.unwrap();
        assert_eq!(migrated.len(), 2);

        let stored = store.get(keys::SAVED_ORIGINS).await.unwrap().unwrap();
        assert_eq!(stored[0]["origin"], "https://old.example.com");
        assert!(stored[0].get("url").is_none());
    }

    #[tokio::test]
    async fn malformed_entries_are_skipped() {
        let (registry, store) = registry();
        store
            .set(
                keys::SAVED_ORIGINS,
                json!([42, {"origin": "https://kept.example.com", "reason": "ok",
                            "timestamp": 0, "updated": 0}]),
            )
            .await
            .unwrap();

        let list = registry.load().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].origin.as_str(), "https://kept.example.com");
    }

    #[tokio::test]
    async fn update_and_remove_roundtrip() {
        let (registry, _) = registry();
        registry.add("https://example.com", "old").await.unwrap();
        let origin = Origin::normalize("https://example.com");

        assert!(registry.update_reason(&origin, "new").await.unwrap());
        assert_eq!(registry.reason_for(&origin).await.unwrap(), Some("new".to_string()));

        assert!(registry.remove(&origin).await.unwrap());
        assert!(!registry.remove(&origin).await.unwrap());
        assert!(!registry.is_allowed(&origin).await.unwrap());
    }
}
