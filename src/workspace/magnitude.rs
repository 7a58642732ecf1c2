//! Change magnitude between a baseline and the current workspace

use crate::workspace::diff::Diff;
use serde::Serialize;
use std::collections::BTreeMap;

/// Bytes per token heuristic shared by drift and project-size estimates
pub const BYTES_PER_TOKEN: u64 = 4;

/// How far the workspace has drifted from its baseline
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Magnitude {
    /// Bytes that would need to be re-ingested
    pub changed_bytes: u64,
    /// `changed_bytes` as a percentage of the baseline total (0 for an empty baseline)
    pub percent: f64,
    /// Approximate token count of `changed_bytes`
    pub changed_tokens: u64,
}

/// Convert a byte count to an approximate token count
pub fn bytes_to_tokens(bytes: u64) -> u64 {
    bytes / BYTES_PER_TOKEN
}

/// Quantify `diff`
///
/// Added and modified paths count their full new size; deleted paths count
/// their old size. Missing size entries count as zero.
pub fn magnitude(
    diff: &Diff,
    new_sizes: &BTreeMap<String, u64>,
    old_sizes: &BTreeMap<String, u64>,
    total_old_bytes: u64,
) -> Magnitude {
    let size_of = |sizes: &BTreeMap<String, u64>, path: &String| -> u64 {
        sizes.get(path).copied().unwrap_or(0)
    };

    let changed_bytes: u64 = diff
        .added
        .iter()
        .chain(diff.modified.iter())
        .map(|path| size_of(new_sizes, path))
        .chain(diff.deleted.iter().map(|path| size_of(old_sizes, path)))
        .sum();

    let percent = if total_old_bytes > 0 {
        changed_bytes as f64 / total_old_bytes as f64 * 100.0
    } else {
        0.0
    };

    Magnitude {
        changed_bytes,
        percent,
        changed_tokens: bytes_to_tokens(changed_bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::diff::diff;

    fn sizes(entries: &[(&str, u64)]) -> BTreeMap<String, u64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn digests(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn modified_file_counts_full_new_size() {
        // "hello" -> "hellox"
        let d = diff(&digests(&[("a.txt", "h1")]), &digests(&[("a.txt", "h2")]));
        let m = magnitude(&d, &sizes(&[("a.txt", 6)]), &sizes(&[("a.txt", 5)]), 5);

        assert_eq!(m.changed_bytes, 6);
        assert!((m.percent - 120.0).abs() < 1e-9);
        assert_eq!(m.changed_tokens, 1);
    }

    #[test]
    fn empty_baseline_is_zero_percent() {
        let d = diff(&BTreeMap::new(), &digests(&[("a.txt", "h")]));
        let m = magnitude(&d, &sizes(&[("a.txt", 1)]), &BTreeMap::new(), 0);

        assert_eq!(m.changed_bytes, 1);
        assert_eq!(m.percent, 0.0);
    }

    #[test]
    fn deleted_file_counts_old_size() {
        let d = diff(&digests(&[("a", "1"), ("b", "2")]), &digests(&[("a", "1")]));
        let m = magnitude(
            &d,
            &sizes(&[("a", 100)]),
            &sizes(&[("a", 100), ("b", 300)]),
            400,
        );

        assert_eq!(m.changed_bytes, 300);
        assert!((m.percent - 75.0).abs() < 1e-9);
        assert_eq!(m.changed_tokens, 75);
    }

    #[test]
    fn no_changes_is_zero() {
        let files = digests(&[("a", "1")]);
        let m = magnitude(&diff(&files, &files), &sizes(&[("a", 8)]), &sizes(&[("a", 8)]), 8);
        assert_eq!(m, Magnitude::default());
    }

    #[test]
    fn tokens_round_down() {
        assert_eq!(bytes_to_tokens(3), 0);
        assert_eq!(bytes_to_tokens(4), 1);
        assert_eq!(bytes_to_tokens(4099), 1024);
    }
}
