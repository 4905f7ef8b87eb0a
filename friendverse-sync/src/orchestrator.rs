//! Sync orchestrator.
//!
//! Owns the periodic sync loop: push dirty collections, pull the remote
//! document, merge, persist, notify. One explicit instance per session,
//! wired by the caller.

use crate::bus::{ChangeBus, ChangeEvent, ChangeOrigin};
use crate::error::{SyncError, SyncResult};
use crate::remote::RemoteStore;
use chrono::{DateTime, Utc};
use friendverse_merge::merge_snapshots;
use friendverse_store::LocalStore;
use friendverse_types::{Collection, DeviceId, Snapshot, SnapshotPatch};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Sync orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between automatic sync cycles.
    pub sync_interval_secs: u64,
    /// Timeout applied to each remote call, in seconds.
    pub remote_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sync_interval_secs: 30,
            remote_timeout_secs: 20,
        }
    }
}

/// Lifecycle phase of the last or current sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// No cycle has run yet.
    #[default]
    Idle,
    /// A cycle is in flight.
    Syncing,
    /// The last cycle completed.
    Success,
    /// The last cycle failed and will be retried on the next tick.
    Error,
}

/// Snapshot of the orchestrator's sync state.
#[derive(Debug, Clone, Default)]
pub struct SyncStatus {
    pub phase: SyncPhase,
    /// Completion time of the last successful cycle.
    pub last_sync: Option<DateTime<Utc>>,
    /// Message of the last failure, cleared by the next success.
    pub last_error: Option<String>,
}

/// Drives push/pull/merge cycles between one local store and one remote.
pub struct SyncOrchestrator {
    device_id: DeviceId,
    local: Arc<LocalStore>,
    remote: Arc<dyn RemoteStore>,
    bus: Arc<ChangeBus>,
    config: SyncConfig,
    /// Collections with local changes awaiting push.
    dirty: Mutex<BTreeSet<Collection>>,
    /// Held for the duration of one cycle; `try_lock` makes a second
    /// concurrent `sync_now` a no-op.
    in_flight: tokio::sync::Mutex<()>,
    /// `last_updated` of the last remote document merged in.
    last_applied: Mutex<Option<DateTime<Utc>>>,
    status: Mutex<SyncStatus>,
    running: AtomicBool,
    ticker_epoch: AtomicU64,
}

impl SyncOrchestrator {
    /// Creates an orchestrator over the given store, remote and bus.
    pub fn new(
        local: Arc<LocalStore>,
        remote: Arc<dyn RemoteStore>,
        bus: Arc<ChangeBus>,
        config: SyncConfig,
    ) -> Self {
        let device_id = local.device_id();
        Self {
            device_id,
            local,
            remote,
            bus,
            config,
            dirty: Mutex::new(BTreeSet::new()),
            in_flight: tokio::sync::Mutex::new(()),
            last_applied: Mutex::new(None),
            status: Mutex::new(SyncStatus::default()),
            running: AtomicBool::new(false),
            ticker_epoch: AtomicU64::new(0),
        }
    }

    /// This device's identity, as stamped on outgoing documents.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    /// Current sync state.
    pub fn status(&self) -> SyncStatus {
        self.status.lock().unwrap().clone()
    }

    /// Queues a collection for push on the next cycle.
    ///
    /// Feature contexts call this after any local mutation.
    pub fn mark_dirty(&self, collection: Collection) {
        self.dirty.lock().unwrap().insert(collection);
    }

    /// Runs one push/pull/merge/notify cycle.
    ///
    /// At most one cycle is in flight at a time; a concurrent call returns
    /// immediately without touching the remote store. Remote failures do
    /// not surface here: the cycle is skipped, the error lands in
    /// [`status`](Self::status), and the next tick retries.
    pub async fn sync_now(&self) -> SyncResult<()> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("sync already in flight, skipping");
            return Ok(());
        };

        self.status.lock().unwrap().phase = SyncPhase::Syncing;
        match self.run_cycle().await {
            Ok(()) => {
                let mut status = self.status.lock().unwrap();
                status.phase = SyncPhase::Success;
                status.last_sync = Some(Utc::now());
                status.last_error = None;
            }
            Err(e) => {
                warn!("sync cycle failed: {e}");
                let mut status = self.status.lock().unwrap();
                status.phase = SyncPhase::Error;
                status.last_error = Some(e.to_string());
            }
        }
        Ok(())
    }

    async fn run_cycle(&self) -> SyncResult<()> {
        // Push dirty collections first so the pull below sees them.
        let dirty: Vec<Collection> = {
            let mut dirty = self.dirty.lock().unwrap();
            let collections: Vec<Collection> = dirty.iter().copied().collect();
            dirty.clear();
            collections
        };
        if !dirty.is_empty() {
            let patch = self.local.collect(&dirty);
            if let Err(e) = self.remote_call(self.remote.save(patch)).await {
                // Push them again next cycle.
                self.dirty.lock().unwrap().extend(dirty.iter().copied());
                return Err(e);
            }
            debug!("pushed {} dirty collections", dirty.len());
        }

        let Some(remote_doc) = self.remote_call(self.remote.load()).await? else {
            debug!("remote store uninitialized, nothing to pull");
            return Ok(());
        };

        // A document we wrote ourselves is already applied.
        if remote_doc.origin_device_id == self.device_id {
            debug!("remote document originated here, skipping");
            return Ok(());
        }
        if *self.last_applied.lock().unwrap() == Some(remote_doc.last_updated) {
            debug!("remote document unchanged since last cycle, skipping");
            return Ok(());
        }

        let local_doc = self.local.snapshot();
        let merged = merge_snapshots(&local_doc, &remote_doc)?;
        if !merged.changed.is_empty() {
            self.local.apply(&merged.snapshot, &merged.changed);
            // A partial save replaces whole fields, so a peer's push may
            // have dropped entities only we hold. Re-mark the merged
            // collections dirty and the next cycle pushes the union back.
            self.dirty
                .lock()
                .unwrap()
                .extend(merged.changed.iter().copied());
            for collection in &merged.changed {
                self.bus
                    .publish(ChangeEvent::new(*collection, ChangeOrigin::Remote));
            }
            info!(
                "applied remote changes to {} collections",
                merged.changed.len()
            );
        }
        *self.last_applied.lock().unwrap() = Some(remote_doc.last_updated);
        self.local.set_last_synced_at(Utc::now());
        Ok(())
    }

    /// Applies the configured timeout to one remote call.
    async fn remote_call<T>(&self, call: impl Future<Output = SyncResult<T>>) -> SyncResult<T> {
        let timeout = Duration::from_secs(self.config.remote_timeout_secs);
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout),
        }
    }

    /// Starts the periodic trigger.
    ///
    /// The first cycle runs immediately, then one per `sync_interval_secs`.
    /// Calling `start` while running is a no-op. The tick loop holds only a
    /// weak reference, so dropping the orchestrator also stops it.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let epoch = self.ticker_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let weak = Arc::downgrade(self);
        let period = Duration::from_secs(self.config.sync_interval_secs.max(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let Some(orchestrator) = weak.upgrade() else { break };
                if !orchestrator.running.load(Ordering::SeqCst)
                    || orchestrator.ticker_epoch.load(Ordering::SeqCst) != epoch
                {
                    break;
                }
                if let Err(e) = orchestrator.sync_now().await {
                    warn!("periodic sync failed: {e}");
                }
            }
        });
        info!("periodic sync started");
    }

    /// Stops the periodic trigger. Safe to call repeatedly; an in-flight
    /// cycle finishes and its results are applied.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("periodic sync stopped");
        }
    }

    /// Whether the periodic trigger is active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Clears local data and reinitializes the remote document.
    ///
    /// Device identity survives. Waits for any in-flight cycle to finish
    /// before clearing.
    pub async fn reset_all(&self) -> SyncResult<()> {
        let _guard = self.in_flight.lock().await;

        self.local.reset();
        self.dirty.lock().unwrap().clear();
        *self.last_applied.lock().unwrap() = None;

        let empty = Snapshot::empty(self.device_id);
        self.remote_call(self.remote.save(SnapshotPatch::from(empty)))
            .await?;

        for collection in Collection::ALL {
            self.bus
                .publish(ChangeEvent::new(collection, ChangeOrigin::Local));
        }
        info!("local and remote data reset");
        Ok(())
    }
}
