//! Remote cache lifecycle: create, rebuild, terminate
//!
//! Glues a [`ContextCache`] service to the [`Engine`]. The registry only
//! changes after the service has accepted a request, so a failed creation
//! leaves the previous record (or its absence) untouched.

use crate::audit::AuditLog;
use crate::engine::Engine;
use crate::error::{ZaniError, ZaniResult};
use crate::provider::ContextCache;
use crate::registry::RegistryRecord;
use crate::workspace::{build_context, bytes_to_tokens, Snapshot};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Cache lifecycle operations for one workspace
pub struct Lifecycle<'a> {
    provider: &'a dyn ContextCache,
    audit: &'a AuditLog,
    workspace: &'a Path,
}

impl<'a> Lifecycle<'a> {
    pub fn new(provider: &'a dyn ContextCache, audit: &'a AuditLog, workspace: &'a Path) -> Self {
        Self {
            provider,
            audit,
            workspace,
        }
    }

    /// Create a cache from `files` and register it
    ///
    /// The baseline is scanned before the context is built so the record
    /// never claims content newer than what was uploaded. The expiry is
    /// counted from before the request, never later than the service's own.
    pub async fn create(
        &self,
        engine: &mut Engine<'_>,
        files: &[String],
    ) -> ZaniResult<RegistryRecord> {
        let report = engine.scan(self.workspace, files).await?;
        let requested_at = Utc::now();
        let cache_id = self.upload(engine, files).await?;
        let record = engine.commit(&cache_id, &report.snapshot, requested_at).await?;

        self.audit
            .cache_created(
                self.workspace,
                &cache_id,
                bytes_to_tokens(report.snapshot.total_bytes()),
            )
            .await;
        Ok(record)
    }

    /// Replace `old_id` with a cache built from `fresh`
    ///
    /// Order: create the new cache, save its record, then terminate the old
    /// one. Failing to terminate the old cache only costs storage until its
    /// TTL runs out, so it is logged rather than returned.
    pub async fn rebuild(
        &self,
        engine: &mut Engine<'_>,
        old_id: &str,
        fresh: &Snapshot,
        reason: &str,
    ) -> ZaniResult<RegistryRecord> {
        let files: Vec<String> = fresh.files().keys().cloned().collect();
        let requested_at = Utc::now();
        let cache_id = self.upload(engine, &files).await?;
        let record = engine.commit(&cache_id, fresh, requested_at).await?;

        match self.provider.terminate(old_id).await {
            Ok(_) => info!("Retired cache {}", old_id),
            Err(e) => warn!("Failed to terminate previous cache {}: {}", old_id, e),
        }

        self.audit
            .cache_rebuilt(self.workspace, old_id, &cache_id, reason)
            .await;
        Ok(record)
    }

    /// Terminate `cache_id` and forget it
    ///
    /// The registry is cleared when the service no longer knows the cache;
    /// any other failure keeps the record so the user can retry.
    pub async fn terminate(&self, engine: &mut Engine<'_>, cache_id: &str) -> ZaniResult<bool> {
        let existed = self.provider.terminate(cache_id).await?;
        if !existed {
            warn!("Cache {} was already gone on {}", cache_id, self.provider.service_name());
        }

        engine.release().await?;
        self.audit.cache_terminated(self.workspace, cache_id).await;
        Ok(existed)
    }

    async fn upload(&self, engine: &Engine<'_>, files: &[String]) -> ZaniResult<String> {
        let root: PathBuf = self.workspace.to_path_buf();
        let files = files.to_vec();
        let context = tokio::task::spawn_blocking(move || build_context(&root, &files))
            .await
            .map_err(|e| ZaniError::Internal(format!("context build failed: {}", e)))?;

        self.provider
            .create(&context, engine.thresholds().ttl_hours)
            .await
    }
}
