//! JSONBin remote store.
//!
//! Stores the shared snapshot as one hosted JSON document ("bin"). Every
//! request authenticates with the group's master key; the bin id doubles as
//! the invite token a friend group shares to join the same document.

use super::RemoteStore;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use friendverse_types::{DeviceId, Snapshot, SnapshotPatch};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// JSONBin specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonBinConfig {
    /// Master key sent with every request.
    pub api_key: String,
    /// Id of the shared document. `None` until the first operation
    /// provisions one or an invite id is set.
    #[serde(default)]
    pub document_id: Option<String>,
    /// Base URL of the JSONBin API. Can be overridden for testing.
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for JsonBinConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            document_id: None,
            api_base_url: "https://api.jsonbin.io".to_string(),
            timeout_secs: 30,
        }
    }
}

// ── API response shapes ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct BinMetadata {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreatedBin {
    metadata: BinMetadata,
}

#[derive(Debug, Deserialize)]
struct FetchedBin {
    record: Snapshot,
}

/// Remote store backed by the JSONBin document API.
pub struct JsonBinRemote {
    device_id: DeviceId,
    config: JsonBinConfig,
    client: Client,
    /// Cached bin id, provisioned on first use.
    document_id: Arc<RwLock<Option<String>>>,
}

impl JsonBinRemote {
    /// Creates a new JSONBin adapter.
    pub fn new(device_id: DeviceId, config: JsonBinConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create HTTP client");
        let document_id = Arc::new(RwLock::new(config.document_id.clone()));

        Self {
            device_id,
            config,
            client,
            document_id,
        }
    }

    /// The shared document id, once configured or provisioned.
    pub async fn document_id(&self) -> Option<String> {
        self.document_id.read().await.clone()
    }

    /// Joins an existing shared document.
    pub async fn set_document_id(&self, id: impl Into<String>) {
        *self.document_id.write().await = Some(id.into());
    }

    /// Returns the document id, provisioning a fresh bin when none is
    /// configured yet.
    async fn ensure_document(&self) -> SyncResult<String> {
        if let Some(id) = self.document_id.read().await.clone() {
            return Ok(id);
        }

        let url = format!("{}/v3/b", self.config.api_base_url);
        let initial = Snapshot::empty(self.device_id);
        let response = self
            .client
            .post(&url)
            .header("X-Master-Key", &self.config.api_key)
            .header("X-Bin-Private", "true")
            .json(&initial)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("failed to create document: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SyncError::Auth(format!("document create rejected: {status}")));
        }
        if !status.is_success() {
            return Err(SyncError::Network(format!(
                "document create failed: {status}"
            )));
        }

        let created: CreatedBin = response
            .json()
            .await
            .map_err(|e| SyncError::Network(format!("invalid create response: {e}")))?;
        let id = created.metadata.id;
        info!("Provisioned sync document: {id}");

        *self.document_id.write().await = Some(id.clone());
        Ok(id)
    }

    async fn fetch_document(&self, id: &str) -> SyncResult<Option<Snapshot>> {
        let url = format!("{}/v3/b/{id}/latest", self.config.api_base_url);
        let response = self
            .client
            .get(&url)
            .header("X-Master-Key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("failed to fetch document: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SyncError::Auth(format!("document fetch rejected: {status}")));
        }
        if !status.is_success() {
            return Err(SyncError::Network(format!(
                "document fetch failed: {status}"
            )));
        }

        let fetched: FetchedBin = response
            .json()
            .await
            .map_err(|e| SyncError::Network(format!("invalid fetch response: {e}")))?;
        Ok(Some(fetched.record))
    }
}

#[async_trait]
impl RemoteStore for JsonBinRemote {
    async fn save(&self, patch: SnapshotPatch) -> SyncResult<()> {
        let id = self.ensure_document().await?;

        let mut doc = self
            .fetch_document(&id)
            .await?
            .unwrap_or_else(|| Snapshot::empty(self.device_id));
        doc.apply_patch(patch);
        doc.stamp(self.device_id);

        let url = format!("{}/v3/b/{id}", self.config.api_base_url);
        let response = self
            .client
            .put(&url)
            .header("X-Master-Key", &self.config.api_key)
            .json(&doc)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("failed to save document: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SyncError::Auth(format!("document save rejected: {status}")));
        }
        if !status.is_success() {
            return Err(SyncError::Network(format!("document save failed: {status}")));
        }
        debug!("Saved sync document: {id}");
        Ok(())
    }

    async fn load(&self) -> SyncResult<Option<Snapshot>> {
        let id = self.ensure_document().await?;
        self.fetch_document(&id).await
    }

    fn provider_name(&self) -> &'static str {
        "JSONBin"
    }
}
