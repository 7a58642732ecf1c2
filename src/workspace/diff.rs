//! Snapshot comparison

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Paths that changed between two snapshots
///
/// The three sets are pairwise disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diff {
    /// In the new snapshot only
    pub added: BTreeSet<String>,
    /// In both, with different digests
    pub modified: BTreeSet<String>,
    /// In the old snapshot only
    pub deleted: BTreeSet<String>,
}

impl Diff {
    /// Check if there are any changes
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Total number of changed paths
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }

    /// Iterate over every changed path
    pub fn changed_paths(&self) -> impl Iterator<Item = &String> {
        self.added
            .iter()
            .chain(self.modified.iter())
            .chain(self.deleted.iter())
    }

    /// Whether `path` was added, modified or deleted
    pub fn touches(&self, path: &str) -> bool {
        self.added.contains(path) || self.modified.contains(path) || self.deleted.contains(path)
    }
}

/// Classify every path in `old` and `new` (path to digest maps)
pub fn diff(old: &BTreeMap<String, String>, new: &BTreeMap<String, String>) -> Diff {
    let mut result = Diff::default();

    for (path, digest) in new {
        match old.get(path) {
            None => {
                result.added.insert(path.clone());
            }
            Some(previous) if previous != digest => {
                result.modified.insert(path.clone());
            }
            Some(_) => {}
        }
    }

    for path in old.keys() {
        if !new.contains_key(path) {
            result.deleted.insert(path.clone());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn identical_maps_have_no_changes() {
        let files = map(&[("a", "1"), ("b", "2")]);
        let d = diff(&files, &files);
        assert!(d.is_empty());
        assert_eq!(d.len(), 0);
    }

    #[test]
    fn classifies_each_kind() {
        let old = map(&[("same", "1"), ("edited", "2"), ("removed", "3")]);
        let new = map(&[("same", "1"), ("edited", "9"), ("created", "4")]);

        let d = diff(&old, &new);

        assert_eq!(d.added, BTreeSet::from(["created".to_string()]));
        assert_eq!(d.modified, BTreeSet::from(["edited".to_string()]));
        assert_eq!(d.deleted, BTreeSet::from(["removed".to_string()]));
        assert!(!d.touches("same"));
    }

    #[test]
    fn empty_old_means_everything_added() {
        let new = map(&[("a", "1"), ("b", "2")]);
        let d = diff(&BTreeMap::new(), &new);

        assert_eq!(d.added.len(), 2);
        assert!(d.modified.is_empty());
        assert!(d.deleted.is_empty());
    }

    #[test]
    fn empty_new_means_everything_deleted() {
        let old = map(&[("a", "1"), ("b", "2")]);
        let d = diff(&old, &BTreeMap::new());

        assert_eq!(d.deleted.len(), 2);
        assert!(d.added.is_empty());
        assert!(d.modified.is_empty());
    }

    #[test]
    fn sets_are_disjoint() {
        let old = map(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")]);
        let new = map(&[("b", "2"), ("c", "x"), ("d", "y"), ("e", "5")]);

        let d = diff(&old, &new);

        assert!(d.added.is_disjoint(&d.modified));
        assert!(d.added.is_disjoint(&d.deleted));
        assert!(d.modified.is_disjoint(&d.deleted));
        assert_eq!(d.changed_paths().count(), d.len());
    }
}
