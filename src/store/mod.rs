pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::model::FeatureFlag;

pub use memory::InMemoryFlagStore;

/// Keyed storage for flag definitions. The evaluator only needs `get`; the
/// admin surface drives the rest. Implementations must be safe for
/// concurrent reads and serialize their own writes.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Look up a flag by its key.
    async fn get(&self, flag_key: &str) -> Result<Option<FeatureFlag>>;

    /// All flags, newest first.
    async fn list(&self) -> Result<Vec<FeatureFlag>>;

    /// Persist a new flag, assigning its id and timestamps. Fails with
    /// `DuplicateKey` when the key is already taken.
    async fn create(&self, flag: FeatureFlag) -> Result<FeatureFlag>;

    /// Flip or set the master switch on the flag with the given id. Fails
    /// with `NotFound` when the id is unknown.
    async fn update_enabled(&self, id: Uuid, enabled: bool) -> Result<FeatureFlag>;

    /// Remove a flag by key. Fails with `NotFound` when the key is unknown.
    async fn delete(&self, flag_key: &str) -> Result<()>;
}
