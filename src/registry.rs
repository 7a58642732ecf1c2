//! Active cache registry
//!
//! A workspace has at most one active remote cache. Its identity, the
//! baseline snapshot it was built from, and its expiry are stored as a
//! single JSON document at `<workspace>/.zani/registry.json`.
//!
//! Writes go to a temporary file in the same directory which is then renamed
//! over the record, so an interrupted save leaves the previous record intact.

use crate::error::{ZaniError, ZaniResult};
use crate::policy::compute_expiry;
use crate::workspace::{filter::STATE_DIR, Snapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

/// Registry file name inside the state directory
pub const REGISTRY_FILE: &str = "registry.json";

/// Persisted description of the active cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRecord {
    /// Identifier issued by the remote cache service
    pub cache_id: String,

    /// Baseline path to hex digest
    #[serde(default)]
    pub file_hashes: BTreeMap<String, String>,

    /// Baseline path to size in bytes
    #[serde(default)]
    pub file_sizes: BTreeMap<String, u64>,

    /// Baseline total size in bytes
    #[serde(default)]
    pub total_project_bytes: u64,

    /// When the remote cache expires; `None` never expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_expiry: Option<DateTime<Utc>>,
}

impl RegistryRecord {
    /// Build a record for a cache created at `now` from `baseline`
    pub fn new(
        cache_id: impl Into<String>,
        baseline: &Snapshot,
        now: DateTime<Utc>,
        ttl_hours: u32,
    ) -> Self {
        Self {
            cache_id: cache_id.into(),
            file_hashes: baseline.files().clone(),
            file_sizes: baseline.sizes().clone(),
            total_project_bytes: baseline.total_bytes(),
            ttl_expiry: Some(compute_expiry(now, ttl_hours)),
        }
    }

    /// Whether `now` is past the expiry
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.ttl_expiry {
            Some(expiry) => now > expiry,
            None => false,
        }
    }
}

/// Owner of the on-disk registry record
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    /// Store at an explicit file path
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the well-known location inside `workspace`
    pub fn for_workspace(workspace: &Path) -> Self {
        Self::with_path(workspace.join(STATE_DIR).join(REGISTRY_FILE))
    }

    /// Get the registry file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the active record, or `None` if there is no active cache
    pub async fn load(&self) -> ZaniResult<Option<RegistryRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            ZaniError::io(format!("reading registry {}", self.path.display()), e)
        })?;

        let record = serde_json::from_str(&content).map_err(|e| ZaniError::RegistryCorrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        Ok(Some(record))
    }

    /// Replace the active record
    pub async fn save(&mut self, record: &RegistryRecord) -> ZaniResult<()> {
        let content = serde_json::to_string_pretty(record)?;

        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ZaniError::io(format!("creating directory {}", dir.display()), e))?;

        let tmp = dir.join(format!("{}.{}.tmp", REGISTRY_FILE, Uuid::new_v4().simple()));
        if let Err(e) = write_synced(&tmp, content.as_bytes()).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(self.persist_error(e));
        }

        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(self.persist_error(e));
        }

        info!("Saved cache registry for {}", record.cache_id);
        Ok(())
    }

    /// Remove the active record; no-op if none exists
    pub async fn clear(&mut self) -> ZaniResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Cleared cache registry {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ZaniError::io(
                format!("removing registry {}", self.path.display()),
                e,
            )),
        }
    }

    /// Whether `record` has expired as of `now`
    pub fn is_expired(&self, record: &RegistryRecord, now: DateTime<Utc>) -> bool {
        record.is_expired_at(now)
    }

    fn persist_error(&self, source: std::io::Error) -> ZaniError {
        ZaniError::RegistryPersist {
            path: self.path.clone(),
            source,
        }
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}
