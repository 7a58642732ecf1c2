//! Workspace evaluation against the active cache registry
//!
//! One evaluation per command turn: load the registry, rescan the workspace,
//! measure drift from the baseline and run the rebuild policy. Evaluation
//! itself never fails; a registry that cannot be read is treated as absent
//! so the caller falls back to offering a fresh cache.

use crate::config::schema::CacheConfig;
use crate::error::{ZaniError, ZaniResult};
use crate::policy::{decide, Decision};
use crate::registry::{RegistryRecord, RegistryStore};
use crate::workspace::{
    diff, estimate_tokens, magnitude, snapshot_with_progress, Diff, Magnitude, ScanReport,
    Snapshot,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Called once per file while a scan is running
pub type ProgressHook = Arc<dyn Fn() + Send + Sync>;

/// Outcome of evaluating a workspace
#[derive(Debug, Clone)]
pub enum Evaluation {
    /// No usable cache is registered
    NoCache {
        /// Estimated size of the whole project
        project_tokens: u64,
        /// Whether the project is large enough to be worth caching
        should_offer_creation: bool,
    },
    /// A cache is registered and was checked against the workspace
    Active(ActiveEvaluation),
}

/// Drift report for a registered cache
#[derive(Debug, Clone, Serialize)]
pub struct ActiveEvaluation {
    pub cache_id: String,
    pub ttl_expiry: Option<DateTime<Utc>>,
    pub expired: bool,
    pub diff: Diff,
    pub magnitude: Magnitude,
    pub decision: Decision,
    /// Snapshot taken during this evaluation; becomes the baseline on rebuild
    #[serde(skip)]
    pub fresh: Snapshot,
    /// Requested paths left out of the snapshot
    pub skipped: usize,
}

/// Staleness engine bound to one registry and one set of thresholds
pub struct Engine<'a> {
    store: &'a mut RegistryStore,
    thresholds: &'a CacheConfig,
    progress: Option<ProgressHook>,
}

impl<'a> Engine<'a> {
    /// Create an engine over `store`
    pub fn new(store: &'a mut RegistryStore, thresholds: &'a CacheConfig) -> Self {
        Self {
            store,
            thresholds,
            progress: None,
        }
    }

    /// Report per-file scan progress to `hook`
    pub fn with_progress(mut self, hook: ProgressHook) -> Self {
        self.progress = Some(hook);
        self
    }

    /// Stop reporting scan progress, e.g. once the bar it fed is finished
    pub fn detach_progress(&mut self) -> Option<ProgressHook> {
        self.progress.take()
    }

    /// Thresholds this engine decides with
    pub fn thresholds(&self) -> &CacheConfig {
        self.thresholds
    }

    /// Evaluate the workspace at the current time
    pub async fn evaluate(&self, root: &Path, files: &[String]) -> Evaluation {
        self.evaluate_at(root, files, Utc::now()).await
    }

    /// Evaluate the workspace as of `now`
    pub async fn evaluate_at(
        &self,
        root: &Path,
        files: &[String],
        now: DateTime<Utc>,
    ) -> Evaluation {
        let record = match self.store.load().await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("No cache registered");
                return self.no_cache(root, files);
            }
            Err(e @ ZaniError::RegistryCorrupt { .. }) => {
                warn!("{}; treating as no active cache", e);
                return self.no_cache(root, files);
            }
            Err(e) => {
                warn!("Could not read cache registry: {}", e);
                return self.no_cache(root, files);
            }
        };

        let report = match self.scan(root, files).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Workspace scan failed: {}", e);
                return self.no_cache(root, files);
            }
        };

        Evaluation::Active(self.assess(record, report, now))
    }

    /// Snapshot `files` under `root` off the async runtime
    pub async fn scan(&self, root: &Path, files: &[String]) -> ZaniResult<ScanReport> {
        scan_workspace(root, files, self.progress.clone()).await
    }

    /// Record a newly created cache with `baseline` as its reference state
    pub async fn commit(
        &mut self,
        cache_id: &str,
        baseline: &Snapshot,
        now: DateTime<Utc>,
    ) -> ZaniResult<RegistryRecord> {
        let record = RegistryRecord::new(cache_id, baseline, now, self.thresholds.ttl_hours);
        self.store.save(&record).await?;
        info!(
            "Registered cache {} ({} files, {} bytes)",
            cache_id,
            baseline.len(),
            baseline.total_bytes()
        );
        Ok(record)
    }

    /// Forget the active cache
    pub async fn release(&mut self) -> ZaniResult<()> {
        self.store.clear().await
    }

    /// Read the active record without evaluating
    pub async fn active_record(&self) -> ZaniResult<Option<RegistryRecord>> {
        self.store.load().await
    }

    fn no_cache(&self, root: &Path, files: &[String]) -> Evaluation {
        let project_tokens = estimate_tokens(root, files);
        Evaluation::NoCache {
            project_tokens,
            should_offer_creation: project_tokens >= self.thresholds.min_tokens,
        }
    }

    fn assess(
        &self,
        record: RegistryRecord,
        report: ScanReport,
        now: DateTime<Utc>,
    ) -> ActiveEvaluation {
        let fresh = report.snapshot;
        let skipped = report.outcomes.len() - fresh.len();

        let changes = diff(&record.file_hashes, fresh.files());
        let drift = magnitude(
            &changes,
            fresh.sizes(),
            &record.file_sizes,
            record.total_project_bytes,
        );
        let expired = self.store.is_expired(&record, now);
        let decision = decide(&drift, &changes, self.thresholds, expired);

        debug!(
            "Cache {}: {} added, {} modified, {} deleted, {:.2}% changed -> {}",
            record.cache_id,
            changes.added.len(),
            changes.modified.len(),
            changes.deleted.len(),
            drift.percent,
            decision.verdict
        );

        ActiveEvaluation {
            cache_id: record.cache_id,
            ttl_expiry: record.ttl_expiry,
            expired,
            diff: changes,
            magnitude: drift,
            decision,
            fresh,
            skipped,
        }
    }
}

/// Snapshot `files` under `root` on the blocking pool
pub async fn scan_workspace(
    root: &Path,
    files: &[String],
    progress: Option<ProgressHook>,
) -> ZaniResult<ScanReport> {
    let root: PathBuf = root.to_path_buf();
    let files = files.to_vec();

    tokio::task::spawn_blocking(move || match progress {
        Some(hook) => snapshot_with_progress(&root, &files, &|| hook()),
        None => snapshot_with_progress(&root, &files, &|| {}),
    })
    .await
    .map_err(|e| ZaniError::Internal(format!("scan task failed: {}", e)))
}
