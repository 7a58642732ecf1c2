//! Workspace eligibility filter
//!
//! Decides which files under a project root count as human-readable source
//! worth sending to the model. The rest of the crate only sees the resulting
//! list of relative paths.

use crate::config::schema::WorkspaceConfig;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Zani's own state directory, never part of the workspace
pub const STATE_DIR: &str = ".zani";

/// Extensions of machine-generated or binary files
const MACHINE_EXTENSIONS: &[&str] = &[
    "pyc", "exe", "dll", "so", "o", "bin", "png", "jpg", "pdf", "zip",
];

/// Hidden files that are still worth including
const ALLOWED_DOTFILES: &[&str] = &[".env", ".gitignore"];

/// Filters a workspace down to eligible source files
#[derive(Debug, Clone)]
pub struct WorkspaceFilter {
    ignored_dirs: HashSet<String>,
    max_size_bytes: u64,
}

impl WorkspaceFilter {
    /// Create a filter from workspace settings
    pub fn new(config: &WorkspaceConfig) -> Self {
        let mut ignored_dirs: HashSet<String> = config.static_ignore.iter().cloned().collect();
        ignored_dirs.insert(STATE_DIR.to_string());

        Self {
            ignored_dirs,
            max_size_bytes: config.max_file_size_kb.saturating_mul(1024),
        }
    }

    /// Check a single file name and size
    pub fn is_eligible(&self, file_name: &str, size: u64) -> bool {
        if size > self.max_size_bytes {
            return false;
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        if let Some(ext) = extension {
            if MACHINE_EXTENSIONS.contains(&ext.as_str()) {
                return false;
            }
        }

        if file_name.starts_with('.') && !ALLOWED_DOTFILES.contains(&file_name) {
            return false;
        }

        true
    }

    /// List eligible files under `root` as sorted, `/`-separated relative paths
    pub fn scan(&self, root: &Path) -> Vec<String> {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !self.is_ignored_dir(entry));

        let mut files: Vec<String> = walker
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unwalkable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                let size = entry.metadata().map(|m| m.len()).unwrap_or(u64::MAX);
                self.is_eligible(&entry.file_name().to_string_lossy(), size)
            })
            .filter_map(|entry| relative_path(root, entry.path()))
            .collect();

        files.sort();
        files.dedup();
        debug!("Workspace filter selected {} files", files.len());
        files
    }

    fn is_ignored_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self
                .ignored_dirs
                .contains(entry.file_name().to_string_lossy().as_ref())
    }
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn filter() -> WorkspaceFilter {
        WorkspaceFilter::new(&WorkspaceConfig::default())
    }

    #[test]
    fn rejects_binaries_and_hidden_files() {
        let f = filter();
        assert!(f.is_eligible("main.rs", 10));
        assert!(f.is_eligible(".gitignore", 10));
        assert!(f.is_eligible(".env", 10));
        assert!(!f.is_eligible(".DS_Store", 10));
        assert!(!f.is_eligible("logo.PNG", 10));
        assert!(!f.is_eligible("module.pyc", 10));
    }

    #[test]
    fn rejects_oversized_files() {
        let f = filter();
        assert!(f.is_eligible("big.txt", 500 * 1024));
        assert!(!f.is_eligible("big.txt", 500 * 1024 + 1));
    }

    #[test]
    fn scan_prunes_ignored_dirs_and_state_dir() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join(".zani")).unwrap();
        fs::write(root.join("README.md"), "# hi").unwrap();
        fs::write(root.join("src/nested/lib.rs"), "").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "").unwrap();
        fs::write(root.join(".zani/registry.json"), "{}").unwrap();
        fs::write(root.join("image.png"), [0u8; 4]).unwrap();

        let files = filter().scan(root);

        assert_eq!(files, vec!["README.md", "src/nested/lib.rs"]);
    }
}
