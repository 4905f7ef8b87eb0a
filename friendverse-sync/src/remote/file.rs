//! Shared-folder remote store.
//!
//! One JSON document in a directory that some external mechanism keeps in
//! sync between machines (a cloud-drive folder or a network mount). The
//! adapter only does local file IO; the folder provider moves the bytes.

use super::RemoteStore;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use friendverse_types::{DeviceId, Snapshot, SnapshotPatch};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// File name of the shared document inside the sync directory.
const DOCUMENT_NAME: &str = "friendverse-sync.json";

/// Remote store backed by one JSON file in a shared directory.
pub struct FileRemote {
    device_id: DeviceId,
    path: PathBuf,
    /// Serializes read-modify-write within this process; writers in other
    /// processes are not excluded.
    write_lock: Mutex<()>,
}

impl FileRemote {
    /// Creates an adapter over `dir`, which need not exist yet.
    pub fn new(device_id: DeviceId, dir: impl Into<PathBuf>) -> Self {
        Self {
            device_id,
            path: dir.into().join(DOCUMENT_NAME),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the shared document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> SyncResult<Option<Snapshot>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SyncError::Storage(format!(
                    "failed to read shared document: {e}"
                )));
            }
        };
        let snapshot = serde_json::from_str(&raw)?;
        Ok(Some(snapshot))
    }
}

#[async_trait]
impl RemoteStore for FileRemote {
    async fn save(&self, patch: SnapshotPatch) -> SyncResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self
            .read_document()
            .await?
            .unwrap_or_else(|| Snapshot::empty(self.device_id));
        doc.apply_patch(patch);
        doc.stamp(self.device_id);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::Storage(format!("failed to create sync directory: {e}")))?;
        }
        let raw = serde_json::to_string_pretty(&doc)?;
        fs::write(&self.path, raw)
            .await
            .map_err(|e| SyncError::Storage(format!("failed to write shared document: {e}")))?;
        debug!("Saved shared document: {:?}", self.path);
        Ok(())
    }

    async fn load(&self) -> SyncResult<Option<Snapshot>> {
        self.read_document().await
    }

    fn provider_name(&self) -> &'static str {
        "shared folder"
    }
}
