//! Helpers shared by the workspace commands

use crate::config::Config;
use crate::error::{ZaniError, ZaniResult};
use crate::workspace::WorkspaceFilter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve the workspace root from `--path` or the current directory
pub fn workspace_root(path: Option<PathBuf>) -> ZaniResult<PathBuf> {
    let root = match path {
        Some(path) => path,
        None => std::env::current_dir()
            .map_err(|e| ZaniError::io("getting current directory", e))?,
    };

    if !root.is_dir() {
        return Err(ZaniError::User(format!(
            "Workspace {} is not a directory",
            root.display()
        )));
    }

    root.canonicalize()
        .map_err(|e| ZaniError::io(format!("resolving {}", root.display()), e))
}

/// Eligible files under `root`, walked on the blocking pool
pub async fn eligible_files(root: &Path, config: &Config) -> ZaniResult<Vec<String>> {
    let filter = WorkspaceFilter::new(&config.workspace);
    let root = root.to_path_buf();

    let files = tokio::task::spawn_blocking(move || filter.scan(&root))
        .await
        .map_err(|e| ZaniError::Internal(format!("workspace walk failed: {}", e)))?;

    debug!("{} eligible files", files.len());
    Ok(files)
}

/// Human-readable token count
pub fn format_tokens(tokens: u64) -> String {
    match tokens {
        t if t >= 1_000_000 => format!("{:.1}M", t as f64 / 1_000_000.0),
        t if t >= 10_000 => format!("{}k", t / 1000),
        t => t.to_string(),
    }
}

/// Dollar amount with enough precision for sub-cent costs
pub fn format_usd(amount: f64) -> String {
    if amount < 0.01 {
        format!("${:.4}", amount)
    } else {
        format!("${:.2}", amount)
    }
}
