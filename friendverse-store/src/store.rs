//! Typed access to the locally persisted snapshot.

use crate::StorageBackend;
use chrono::{DateTime, Utc};
use friendverse_types::{Collection, DeviceId, Snapshot, SnapshotPatch, UserId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{info, warn};

// Meta records stored next to the collections.
const DEVICE_ID_KEY: &str = "deviceId";
const LAST_SYNCED_AT_KEY: &str = "lastSyncedAt";

/// The canonical local copy of the shared data.
///
/// Every component reads and writes durable state through this type.
/// Reads never fail: an absent, unreadable or corrupt record is `None`.
/// Writes never fail the caller: a storage error is logged and the write
/// is dropped, so durability is best-effort by contract.
pub struct LocalStore {
    backend: Box<dyn StorageBackend>,
    device_id: OnceLock<DeviceId>,
}

impl LocalStore {
    /// Creates a store over the given backend.
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            device_id: OnceLock::new(),
        }
    }

    // ── Device identity ──────────────────────────────────────────

    /// The stable identity of this installation.
    ///
    /// Created and persisted on first access; later calls, and later
    /// sessions over the same backing store, return the same value. A
    /// missing or unreadable record is replaced with a fresh identity.
    pub fn device_id(&self) -> DeviceId {
        *self
            .device_id
            .get_or_init(|| self.load_or_create_device_id())
    }

    fn load_or_create_device_id(&self) -> DeviceId {
        match self.backend.get(DEVICE_ID_KEY) {
            Ok(Some(raw)) => match DeviceId::parse(raw.trim()) {
                Ok(id) => return id,
                Err(e) => {
                    warn!(error = %e, "unreadable device id, generating a new one");
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "failed to read device id, generating a new one");
            }
        }

        let id = DeviceId::new();
        if let Err(e) = self.backend.set(DEVICE_ID_KEY, &id.to_string()) {
            warn!(error = %e, "failed to persist device id");
        }
        info!(device_id = %id, "created device identity");
        id
    }

    // ── Collections ──────────────────────────────────────────────

    /// Reads one entity collection, `None` if absent or unreadable.
    pub fn read_collection<T: DeserializeOwned>(&self, collection: Collection) -> Option<Vec<T>> {
        self.read_key(collection.as_str())
    }

    /// Writes one entity collection.
    pub fn write_collection<T: Serialize>(&self, collection: Collection, items: &[T]) {
        self.write_key(collection.as_str(), items);
    }

    /// Reads one keyed map collection (credentials, avatars).
    pub fn read_map(&self, collection: Collection) -> Option<BTreeMap<UserId, String>> {
        self.read_key(collection.as_str())
    }

    /// Writes one keyed map collection.
    pub fn write_map(&self, collection: Collection, map: &BTreeMap<UserId, String>) {
        self.write_key(collection.as_str(), map);
    }

    fn read_key<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "failed to read local record, treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "corrupt local record, treating as absent");
                None
            }
        }
    }

    fn write_key<V: Serialize + ?Sized>(&self, key: &str, value: &V) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize local record, dropping write");
                return;
            }
        };
        if let Err(e) = self.backend.set(key, &raw) {
            warn!(key, error = %e, "failed to persist local record, dropping write");
        }
    }

    // ── Documents ────────────────────────────────────────────────

    /// Assembles the full local document, stamped with this device.
    /// Missing collections come back empty.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::empty(self.device_id());
        snapshot.users = self.read_collection(Collection::Users).unwrap_or_default();
        snapshot.passwords = self.read_map(Collection::Passwords).unwrap_or_default();
        snapshot.events = self.read_collection(Collection::Events).unwrap_or_default();
        snapshot.posts = self.read_collection(Collection::Posts).unwrap_or_default();
        snapshot.user_avatars = self.read_map(Collection::UserAvatars).unwrap_or_default();
        snapshot
    }

    /// Collects the named collections into a partial document for a push.
    #[must_use]
    pub fn collect(&self, collections: &[Collection]) -> SnapshotPatch {
        let mut patch = SnapshotPatch::default();
        for collection in collections {
            match collection {
                Collection::Users => {
                    patch.users = Some(self.read_collection(Collection::Users).unwrap_or_default());
                }
                Collection::Passwords => {
                    patch.passwords =
                        Some(self.read_map(Collection::Passwords).unwrap_or_default());
                }
                Collection::Events => {
                    patch.events =
                        Some(self.read_collection(Collection::Events).unwrap_or_default());
                }
                Collection::Posts => {
                    patch.posts = Some(self.read_collection(Collection::Posts).unwrap_or_default());
                }
                Collection::UserAvatars => {
                    patch.user_avatars =
                        Some(self.read_map(Collection::UserAvatars).unwrap_or_default());
                }
            }
        }
        patch
    }

    /// Writes the named collections of a merged document back to storage.
    pub fn apply(&self, snapshot: &Snapshot, collections: &[Collection]) {
        for collection in collections {
            match collection {
                Collection::Users => self.write_collection(Collection::Users, &snapshot.users),
                Collection::Passwords => {
                    self.write_map(Collection::Passwords, &snapshot.passwords);
                }
                Collection::Events => self.write_collection(Collection::Events, &snapshot.events),
                Collection::Posts => self.write_collection(Collection::Posts, &snapshot.posts),
                Collection::UserAvatars => {
                    self.write_map(Collection::UserAvatars, &snapshot.user_avatars);
                }
            }
        }
    }

    // ── Avatars ──────────────────────────────────────────────────

    /// Records one member's avatar without rewriting the user list.
    pub fn set_avatar(&self, user_id: &UserId, url: impl Into<String>) {
        let mut avatars = self.read_map(Collection::UserAvatars).unwrap_or_default();
        avatars.insert(user_id.clone(), url.into());
        self.write_map(Collection::UserAvatars, &avatars);
    }

    /// Looks up one member's avatar.
    #[must_use]
    pub fn avatar(&self, user_id: &UserId) -> Option<String> {
        self.read_map(Collection::UserAvatars)?.remove(user_id)
    }

    // ── Sync marker ──────────────────────────────────────────────

    /// When the last successful sync finished, if ever.
    #[must_use]
    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.backend.get(LAST_SYNCED_AT_KEY).ok()??;
        match raw.trim().parse::<DateTime<Utc>>() {
            Ok(at) => Some(at),
            Err(e) => {
                warn!(error = %e, "unreadable sync marker, treating as absent");
                None
            }
        }
    }

    /// Records when a sync cycle finished applying.
    pub fn set_last_synced_at(&self, at: DateTime<Utc>) {
        if let Err(e) = self.backend.set(LAST_SYNCED_AT_KEY, &at.to_rfc3339()) {
            warn!(error = %e, "failed to persist sync marker");
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Clears every stored record except the device identity.
    pub fn reset(&self) {
        match self.backend.keys() {
            Ok(keys) => {
                for key in keys {
                    if key == DEVICE_ID_KEY {
                        continue;
                    }
                    if let Err(e) = self.backend.remove(&key) {
                        warn!(key, error = %e, "failed to clear local record");
                    }
                }
            }
            Err(e) => warn!(error = %e, "failed to list local records for reset"),
        }
        info!("local data reset, device identity retained");
    }
}
