//! Project context text and size estimates

use crate::workspace::magnitude::bytes_to_tokens;
use std::fs;
use std::path::Path;
use tracing::debug;

/// First line of every project context; marks the genesis block
pub const GENESIS_MARKER: &str = "--- INITIAL CODEBASE SNAPSHOT ---";

/// Concatenate the workspace into the text uploaded as cached context
///
/// Files that are missing or not valid UTF-8 are left out.
pub fn build_context(root: &Path, files: &[String]) -> String {
    let mut context = format!("{}\n", GENESIS_MARKER);

    for rel in files {
        match fs::read_to_string(root.join(rel)) {
            Ok(content) => {
                context.push_str(&format!("\nFile: {}\n```\n{}\n```\n", rel, content));
            }
            Err(e) => debug!("Leaving {} out of context: {}", rel, e),
        }
    }

    context
}

/// Sum of the sizes of the files that exist
pub fn project_bytes(root: &Path, files: &[String]) -> u64 {
    files
        .iter()
        .filter_map(|rel| fs::metadata(root.join(rel)).ok())
        .filter(|meta| meta.is_file())
        .map(|meta| meta.len())
        .sum()
}

/// Approximate token count of the whole project
pub fn estimate_tokens(root: &Path, files: &[String]) -> u64 {
    bytes_to_tokens(project_bytes(root, files))
}
