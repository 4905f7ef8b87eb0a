//! Multi-device sync engine for FriendVerse.
//!
//! Keeps a friend group's shared data (users, events, posts, avatars)
//! consistent across devices through one remote snapshot document.
//!
//! # Architecture
//!
//! - **Remote stores**: interchangeable backends holding the shared
//!   document (in-memory, shared folder, JSONBin)
//! - **Orchestrator**: the periodic push/pull/merge/notify loop
//! - **Change bus**: per-collection notifications feature contexts
//!   subscribe to
//!
//! # Sync Cycle
//!
//! 1. **Push**: collections marked dirty since the last cycle are written
//!    to the remote document as a partial update
//! 2. **Pull**: the latest remote document is fetched
//! 3. **Merge**: each collection is merged entity-by-entity, newest stamp
//!    wins, local order preserved
//! 4. **Apply**: changed collections are written to the local store
//! 5. **Notify**: one change event per updated collection
//!
//! Documents that originated on this device are skipped, so a write never
//! merges with itself after round-tripping through the remote store.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use friendverse_store::{LocalStore, MemoryBackend};
//! use friendverse_sync::{ChangeBus, MemoryRemote, SyncConfig, SyncOrchestrator};
//!
//! let local = Arc::new(LocalStore::new(MemoryBackend::new()));
//! let remote = Arc::new(MemoryRemote::new(local.device_id()));
//! let bus = Arc::new(ChangeBus::new());
//!
//! let orchestrator = SyncOrchestrator::new(local, remote, bus, SyncConfig::default());
//! assert!(!orchestrator.is_running());
//! ```

pub mod bus;
mod error;
mod orchestrator;
pub mod remote;

pub use bus::{ChangeBus, ChangeEvent, ChangeOrigin, Subscription};
pub use error::{SyncError, SyncResult};
pub use orchestrator::{SyncConfig, SyncOrchestrator, SyncPhase, SyncStatus};
pub use remote::{
    FileRemote, JsonBinConfig, JsonBinRemote, MemoryRemote, RemoteConfig, RemoteStore,
    create_remote,
};
