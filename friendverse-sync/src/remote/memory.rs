//! In-process remote store.
//!
//! Models the "same machine, several app instances" setup: every handle
//! shares one document and stamps writes with its own device id. Latency
//! and failure injection make it the workhorse of the orchestrator tests.

use super::RemoteStore;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use friendverse_types::{DeviceId, Snapshot, SnapshotPatch};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared in-memory snapshot document.
pub struct MemoryRemote {
    device_id: DeviceId,
    doc: Arc<Mutex<Option<Snapshot>>>,
    latency: Option<Duration>,
    fail_saves: AtomicBool,
    fail_loads: AtomicBool,
    save_calls: AtomicU64,
    load_calls: AtomicU64,
}

impl MemoryRemote {
    /// Creates an uninitialized document store.
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            doc: Arc::new(Mutex::new(None)),
            latency: None,
            fail_saves: AtomicBool::new(false),
            fail_loads: AtomicBool::new(false),
            save_calls: AtomicU64::new(0),
            load_calls: AtomicU64::new(0),
        }
    }

    /// Creates a second adapter over the same document, stamping its writes
    /// with a different device id.
    pub fn handle(&self, device_id: DeviceId) -> Self {
        Self {
            device_id,
            doc: Arc::clone(&self.doc),
            latency: self.latency,
            fail_saves: AtomicBool::new(false),
            fail_loads: AtomicBool::new(false),
            save_calls: AtomicU64::new(0),
            load_calls: AtomicU64::new(0),
        }
    }

    /// Delays every save and load, so tests can overlap cycles.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes subsequent saves fail with a network error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent loads fail with a network error.
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Number of save calls this handle has received.
    pub fn save_calls(&self) -> u64 {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Number of load calls this handle has received.
    pub fn load_calls(&self) -> u64 {
        self.load_calls.load(Ordering::SeqCst)
    }

    /// The document currently held, if any.
    pub fn document(&self) -> Option<Snapshot> {
        self.doc.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn save(&self, patch: SnapshotPatch) -> SyncResult<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(SyncError::Network("injected save failure".to_string()));
        }
        let mut doc = self.doc.lock().unwrap();
        let mut snapshot = doc.take().unwrap_or_else(|| Snapshot::empty(self.device_id));
        snapshot.apply_patch(patch);
        snapshot.stamp(self.device_id);
        *doc = Some(snapshot);
        Ok(())
    }

    async fn load(&self) -> SyncResult<Option<Snapshot>> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(SyncError::Network("injected load failure".to_string()));
        }
        Ok(self.doc.lock().unwrap().clone())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
