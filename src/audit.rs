//! Audit trail for remote cache lifecycle events
//!
//! Appends JSON lines to `<state dir>/zani/audit.log`. Every cache created,
//! rebuilt or terminated is billed by the remote service, so the trail is on
//! by default and disabled with `general.audit_log = false`.

use crate::config::{schema::Config, ConfigManager};
use chrono::Utc;
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// A new cache was created for a workspace that had none
pub const CACHE_CREATED: &str = "cache.created";
/// A stale cache was replaced
pub const CACHE_REBUILT: &str = "cache.rebuilt";
/// A cache was terminated without replacement
pub const CACHE_TERMINATED: &str = "cache.terminated";

/// File-based audit logger that appends JSON lines
pub struct AuditLog {
    enabled: bool,
    path: PathBuf,
}

impl AuditLog {
    /// Create a new audit logger from config
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.audit_log,
            path: ConfigManager::audit_log_path(),
        }
    }

    /// Logger writing to an explicit file
    pub fn with_path(path: PathBuf, enabled: bool) -> Self {
        Self { enabled, path }
    }

    /// Log file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a cache creation
    pub async fn cache_created(&self, workspace: &Path, cache_id: &str, tokens: u64) {
        self.log(
            CACHE_CREATED,
            &json!({
                "workspace": workspace.display().to_string(),
                "cache_id": cache_id,
                "tokens": tokens,
            }),
        )
        .await;
    }

    /// Record a rebuild from `old_id` to `new_id`
    pub async fn cache_rebuilt(&self, workspace: &Path, old_id: &str, new_id: &str, reason: &str) {
        self.log(
            CACHE_REBUILT,
            &json!({
                "workspace": workspace.display().to_string(),
                "old_cache_id": old_id,
                "cache_id": new_id,
                "reason": reason,
            }),
        )
        .await;
    }

    /// Record a termination
    pub async fn cache_terminated(&self, workspace: &Path, cache_id: &str) {
        self.log(
            CACHE_TERMINATED,
            &json!({
                "workspace": workspace.display().to_string(),
                "cache_id": cache_id,
            }),
        )
        .await;
    }

    /// Log an audit event as a JSON line
    ///
    /// IO failures are logged and dropped; the cache operation they describe
    /// has already happened.
    pub async fn log(&self, event: &str, data: &serde_json::Value) {
        if !self.enabled {
            return;
        }

        let entry = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event,
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize audit event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write audit log: {}", e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_audit_log(dir: &TempDir, enabled: bool) -> AuditLog {
        AuditLog::with_path(dir.path().join("audit.log"), enabled)
    }

    async fn read_lines(audit: &AuditLog) -> Vec<serde_json::Value> {
        let content = tokio::fs::read_to_string(audit.path()).await.unwrap();
        content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn writes_json_line() {
        let dir = TempDir::new().unwrap();
        let audit = test_audit_log(&dir, true);

        audit
            .cache_created(Path::new("/work/app"), "cachedContents/abc", 5000)
            .await;

        let lines = read_lines(&audit).await;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["event"], CACHE_CREATED);
        assert_eq!(lines[0]["data"]["cache_id"], "cachedContents/abc");
        assert_eq!(lines[0]["data"]["tokens"], 5000);
        assert!(lines[0]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn appends_lifecycle_in_order() {
        let dir = TempDir::new().unwrap();
        let audit = test_audit_log(&dir, true);
        let ws = Path::new("/work/app");

        audit.cache_created(ws, "c1", 10).await;
        audit.cache_rebuilt(ws, "c1", "c2", "cache expired").await;
        audit.cache_terminated(ws, "c2").await;

        let events: Vec<String> = read_lines(&audit)
            .await
            .iter()
            .map(|v| v["event"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(events, vec![CACHE_CREATED, CACHE_REBUILT, CACHE_TERMINATED]);
    }

    #[tokio::test]
    async fn skips_when_disabled() {
        let dir = TempDir::new().unwrap();
        let audit = test_audit_log(&dir, false);

        audit.cache_terminated(Path::new("/w"), "gone").await;

        assert!(!audit.path().exists());
    }

    #[tokio::test]
    async fn creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::with_path(dir.path().join("nested/state/audit.log"), true);

        audit.log("custom.event", &json!({})).await;

        assert!(audit.path().exists());
    }
}
