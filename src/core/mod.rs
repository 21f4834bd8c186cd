pub mod diff;
pub mod hash;
pub mod path;
pub mod snapshot;

pub use diff::{diff, ChangeKind, SnapshotDiff};
pub use hash::{compute_content_hash, compute_file_hash, Fingerprint};
pub use path::path_as_key;
pub use snapshot::{
    capture, capture_with, CaptureOptions, FileRecord, SkippedEntry, Snapshot, SnapshotEngine,
    UnreadablePolicy,
};
