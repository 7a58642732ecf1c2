//! Workspace scanning and drift measurement
//!
//! A scan turns the eligible file list into an immutable [`Snapshot`]. Two
//! snapshots are compared with [`diff`], and the resulting [`Diff`] is sized
//! with [`magnitude`]. Nothing here touches the registry.

pub mod context;
pub mod diff;
pub mod filter;
pub mod hash;
pub mod magnitude;
pub mod snapshot;

pub use context::{build_context, estimate_tokens, GENESIS_MARKER};
pub use diff::{diff, Diff};
pub use filter::WorkspaceFilter;
pub use hash::{hash_file, FileHash};
pub use magnitude::{bytes_to_tokens, magnitude, Magnitude, BYTES_PER_TOKEN};
pub use snapshot::{snapshot, snapshot_with_progress, ScanOutcome, ScanReport, Snapshot};
