//! Remote snapshot stores.
//!
//! Every backend stores one shared document per friend group and exposes the
//! same two operations: partial save and full load. The orchestrator is
//! written against [`RemoteStore`] only, so backends are swappable through
//! [`RemoteConfig`] without touching the sync logic.

pub mod file;
pub mod jsonbin;
pub mod memory;

pub use file::FileRemote;
pub use jsonbin::{JsonBinConfig, JsonBinRemote};
pub use memory::MemoryRemote;

use crate::error::SyncResult;
use async_trait::async_trait;
use friendverse_types::{DeviceId, Snapshot, SnapshotPatch};
use std::path::PathBuf;
use std::sync::Arc;

/// A remote store holding the shared snapshot document.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Applies a partial update to the remote document.
    ///
    /// Reads the latest remote state immediately before writing, replaces
    /// exactly the top-level fields present in the patch, stamps
    /// `last_updated` and `origin_device_id`, and writes the document back.
    /// Fields absent from the patch keep whatever a concurrent writer last
    /// put there.
    async fn save(&self, patch: SnapshotPatch) -> SyncResult<()>;

    /// Fetches the current remote document.
    ///
    /// Returns `None` when the store has never been initialized; `Err` is
    /// reserved for transport failure.
    async fn load(&self) -> SyncResult<Option<Snapshot>>;

    /// Human-readable backend name, for logs and status surfaces.
    fn provider_name(&self) -> &'static str;
}

/// Selects which backend the orchestrator syncs against.
#[derive(Debug, Clone)]
pub enum RemoteConfig {
    /// In-process document, shared between orchestrators on one machine.
    Memory,
    /// One JSON document in a shared directory (cloud-drive folder or
    /// network mount).
    File { dir: PathBuf },
    /// Hosted JSON document store.
    JsonBin(JsonBinConfig),
}

/// Builds the adapter named by `config`, stamping writes as `device_id`.
pub fn create_remote(device_id: DeviceId, config: RemoteConfig) -> Arc<dyn RemoteStore> {
    match config {
        RemoteConfig::Memory => Arc::new(MemoryRemote::new(device_id)),
        RemoteConfig::File { dir } => Arc::new(FileRemote::new(device_id, dir)),
        RemoteConfig::JsonBin(cfg) => Arc::new(JsonBinRemote::new(device_id, cfg)),
    }
}
