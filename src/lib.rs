//! Directory snapshots and change classification.
//!
//! A [`Snapshot`] records the fingerprint and modification time of every
//! regular file under a directory. Comparing two snapshots with [`diff`]
//! sorts each changed path into exactly one of `added`, `removed`,
//! `modified` (content differs) or `touched` (same content, new timestamp).
//!
//! ```no_run
//! use granite::{capture, diff};
//!
//! # fn main() -> granite::Result<()> {
//! let before = capture("target/scratch")?;
//! std::fs::write("target/scratch/hello.txt", "Hello, World!").ok();
//! let after = capture("target/scratch")?;
//!
//! let changes = diff(&before, &after);
//! assert!(changes.added().contains("hello.txt"));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;

pub use config::GraniteConfig;
pub use core::{
    capture, capture_with, diff, CaptureOptions, ChangeKind, FileRecord, Fingerprint,
    Snapshot, SnapshotDiff, SnapshotEngine, UnreadablePolicy,
};
pub use error::{GraniteError, Result};
