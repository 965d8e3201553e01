use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::FeatureFlag;
use crate::store::FlagStore;

/// In-memory `FlagStore` backed by a `HashMap` keyed on `flag_key`.
///
/// Not persisted across restarts; writes are serialized by the lock.
#[derive(Default)]
pub struct InMemoryFlagStore {
    inner: RwLock<HashMap<String, FeatureFlag>>,
}

impl InMemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlagStore for InMemoryFlagStore {
    async fn get(&self, flag_key: &str) -> Result<Option<FeatureFlag>> {
        Ok(self.inner.read().await.get(flag_key).cloned())
    }

    async fn list(&self) -> Result<Vec<FeatureFlag>> {
        let mut flags: Vec<FeatureFlag> = self.inner.read().await.values().cloned().collect();
        // newest first, key as the tie-break
        flags.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.flag_key.cmp(&b.flag_key))
        });
        Ok(flags)
    }

    async fn create(&self, mut flag: FeatureFlag) -> Result<FeatureFlag> {
        let mut guard = self.inner.write().await;
        if guard.contains_key(&flag.flag_key) {
            return Err(Error::DuplicateKey(flag.flag_key));
        }

        let now = Utc::now();
        flag.id = Some(Uuid::new_v4());
        flag.created_at = now;
        flag.updated_at = now;

        guard.insert(flag.flag_key.clone(), flag.clone());
        Ok(flag)
    }

    async fn update_enabled(&self, id: Uuid, enabled: bool) -> Result<FeatureFlag> {
        let mut guard = self.inner.write().await;
        let flag = guard
            .values_mut()
            .find(|f| f.id == Some(id))
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        flag.enabled = enabled;
        flag.updated_at = Utc::now();
        Ok(flag.clone())
    }

    async fn delete(&self, flag_key: &str) -> Result<()> {
        self.inner
            .write()
            .await
            .remove(flag_key)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(flag_key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let store = InMemoryFlagStore::new();
        let created = store
            .create(FeatureFlag::new("checkout_v2", true))
            .await
            .unwrap();

        assert!(created.id.is_some());
        assert_eq!(created.created_at, created.updated_at);

        let fetched = store.get("checkout_v2").await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert!(fetched.enabled);
    }

    #[tokio::test]
    async fn test_create_duplicate_key_fails() {
        let store = InMemoryFlagStore::new();
        store.create(FeatureFlag::new("x", true)).await.unwrap();

        let err = store
            .create(FeatureFlag::new("x", false))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(_)));
    }

    #[tokio::test]
    async fn test_get_unknown_key_is_none() {
        let store = InMemoryFlagStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_returns_all_flags() {
        let store = InMemoryFlagStore::new();
        store.create(FeatureFlag::new("alpha", true)).await.unwrap();
        store.create(FeatureFlag::new("beta", false)).await.unwrap();

        let flags = store.list().await.unwrap();
        assert_eq!(flags.len(), 2);
        assert!(flags.iter().any(|f| f.flag_key == "alpha"));
        assert!(flags.iter().any(|f| f.flag_key == "beta"));
    }

    #[tokio::test]
    async fn test_update_enabled_toggles_and_bumps_updated_at() {
        let store = InMemoryFlagStore::new();
        let created = store.create(FeatureFlag::new("dark_mode", false)).await.unwrap();

        let updated = store
            .update_enabled(created.id.unwrap(), true)
            .await
            .unwrap();
        assert!(updated.enabled);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_enabled_unknown_id_fails() {
        let store = InMemoryFlagStore::new();
        let err = store
            .update_enabled(Uuid::new_v4(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_flag() {
        let store = InMemoryFlagStore::new();
        store.create(FeatureFlag::new("temp", true)).await.unwrap();

        store.delete("temp").await.unwrap();
        assert!(store.get("temp").await.unwrap().is_none());

        let err = store.delete("temp").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
