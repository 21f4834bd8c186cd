use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::CaptureConfig;
use crate::core::diff::{diff, SnapshotDiff};
use crate::core::hash::{compute_file_hash, Fingerprint};
use crate::core::path::{entry_key, path_as_key};
use crate::error::{ErrorContext, GraniteError, Result};

/// What to do with an entry that cannot be read because of permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnreadablePolicy {
    /// Fail the whole capture
    #[default]
    Abort,
    /// Leave the entry out and list it in [`Snapshot::skipped`]
    Skip,
}

/// Walk settings used when capturing a snapshot.
///
/// The defaults capture every regular file, do not follow symlinks and
/// abort on unreadable entries.
#[derive(Debug, Clone, Default)]
pub struct CaptureOptions {
    follow_symlinks: bool,
    on_unreadable: UnreadablePolicy,
    exclude: Vec<Regex>,
}

impl CaptureOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from the `[capture]` configuration section
    pub fn from_config(config: &CaptureConfig) -> Result<Self> {
        let mut options = Self::new()
            .follow_symlinks(config.follow_symlinks)
            .on_unreadable(config.on_unreadable);
        for pattern in &config.exclude {
            options = options.exclude(pattern)?;
        }
        Ok(options)
    }

    /// Follow symlinks and record the target's content under the link's path
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn on_unreadable(mut self, policy: UnreadablePolicy) -> Self {
        self.on_unreadable = policy;
        self
    }

    /// Exclude keys matching `pattern`. A matching directory prunes its subtree.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| GraniteError::Pattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.exclude.push(regex);
        Ok(self)
    }

    pub fn unreadable_policy(&self) -> UnreadablePolicy {
        self.on_unreadable
    }

    pub fn follows_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    fn is_excluded(&self, key: &str) -> bool {
        self.exclude.iter().any(|regex| regex.is_match(key))
    }
}

/// One regular file as seen at capture time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Forward-slash path relative to the snapshot root
    pub path: String,
    pub fingerprint: Fingerprint,
    pub modified: DateTime<Utc>,
    pub size: u64,
}

/// An entry left out of a snapshot under [`UnreadablePolicy::Skip`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

/// Immutable record of every regular file under a directory at one instant.
///
/// Snapshots hold no file handles and stay usable after the directory they
/// describe has been removed.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    root: PathBuf,
    captured_at: DateTime<Utc>,
    files: BTreeMap<String, FileRecord>,
    skipped: Vec<SkippedEntry>,
}

impl Snapshot {
    /// The directory this snapshot was taken of (absolute)
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Key under which `path` would be recorded in this snapshot.
    ///
    /// Accepts keys, relative paths (`./a/../b.txt`) and absolute paths under
    /// the root.
    pub fn key_for<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        path_as_key(path.as_ref(), &self.root)
    }

    pub fn contains<P: AsRef<Path>>(&self, path: P) -> bool {
        self.get(path).is_some()
    }

    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<&FileRecord> {
        let key = self.key_for(path)?;
        self.files.get(&key)
    }

    /// Records in key order
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }

    /// Keys in order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Entries left out under [`UnreadablePolicy::Skip`]
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    /// False when unreadable entries were skipped during the walk
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Changes from `self` (earlier) to `later`
    pub fn diff_to(&self, later: &Snapshot) -> SnapshotDiff {
        diff(self, later)
    }

    pub(crate) fn record(&self, key: &str) -> Option<&FileRecord> {
        self.files.get(key)
    }

    #[cfg(test)]
    pub(crate) fn from_records<I>(root: &Path, records: I) -> Self
    where
        I: IntoIterator<Item = FileRecord>,
    {
        Self {
            root: root.to_path_buf(),
            captured_at: Utc::now(),
            files: records.into_iter().map(|r| (r.path.clone(), r)).collect(),
            skipped: Vec::new(),
        }
    }
}

/// Captures snapshots with a fixed set of [`CaptureOptions`] and compares them.
#[derive(Debug, Clone, Default)]
pub struct SnapshotEngine {
    options: CaptureOptions,
}

impl SnapshotEngine {
    pub fn new(options: CaptureOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    pub fn capture<P: AsRef<Path>>(&self, root: P) -> Result<Snapshot> {
        capture_with(root.as_ref(), &self.options)
    }

    pub fn diff(&self, start: &Snapshot, end: &Snapshot) -> SnapshotDiff {
        diff(start, end)
    }
}

/// Capture `root` with default options
pub fn capture<P: AsRef<Path>>(root: P) -> Result<Snapshot> {
    capture_with(root.as_ref(), &CaptureOptions::default())
}

/// Walk `root` recursively and record every regular file below it.
///
/// Fails with [`GraniteError::PathNotFound`] when `root` is missing or not a
/// directory. Symlinks are recorded only when following is enabled; sockets,
/// fifos and devices never are.
pub fn capture_with(root: &Path, options: &CaptureOptions) -> Result<Snapshot> {
    let is_dir = fs::metadata(root).map(|m| m.is_dir()).unwrap_or(false);
    if !is_dir {
        return Err(GraniteError::PathNotFound {
            path: root.to_path_buf(),
        });
    }

    let root = if root.is_absolute() {
        root.to_path_buf()
    } else {
        env::current_dir()
            .with_io_context(|| "resolving the current directory".to_string())?
            .join(root)
    };

    debug!(root = %root.display(), "capturing snapshot");
    let captured_at = Utc::now();
    let mut files = BTreeMap::new();
    let mut skipped = Vec::new();

    let walker = WalkDir::new(&root)
        .follow_links(options.follow_symlinks)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || entry_key(entry.path(), &root).map_or(true, |key| !options.is_excluded(&key))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let location = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.clone());
                let error = GraniteError::from_walk(err, format!("walking {}", location.display()));
                skip_or_abort(options, &root, &location, error, &mut skipped)?;
                continue;
            }
        };

        if entry.depth() == 0 || !entry.file_type().is_file() {
            continue;
        }
        let Some(key) = entry_key(entry.path(), &root) else {
            continue;
        };

        let record = entry
            .metadata()
            .map_err(|e| GraniteError::from_walk(e, format!("reading metadata of {}", key)))
            .and_then(|metadata| {
                let fingerprint = compute_file_hash(entry.path())?;
                let modified = metadata
                    .modified()
                    .with_io_context(|| format!("reading modification time of {}", key))?;
                Ok(FileRecord {
                    path: key.clone(),
                    fingerprint,
                    modified: DateTime::<Utc>::from(modified),
                    size: metadata.len(),
                })
            });

        match record {
            Ok(record) => {
                files.insert(key, record);
            }
            Err(error) => skip_or_abort(options, &root, entry.path(), error, &mut skipped)?,
        }
    }

    debug!(
        root = %root.display(),
        files = files.len(),
        skipped = skipped.len(),
        "snapshot captured"
    );

    Ok(Snapshot {
        root,
        captured_at,
        files,
        skipped,
    })
}

fn skip_or_abort(
    options: &CaptureOptions,
    root: &Path,
    location: &Path,
    error: GraniteError,
    skipped: &mut Vec<SkippedEntry>,
) -> Result<()> {
    if options.on_unreadable != UnreadablePolicy::Skip || !error.is_permission_denied() {
        return Err(error);
    }

    let path = entry_key(location, root).unwrap_or_else(|| location.display().to_string());
    warn!(path = %path, error = %error, "skipping unreadable entry");
    skipped.push(SkippedEntry {
        path,
        reason: error.to_string(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_directory_gives_empty_snapshot() {
        let dir = tempdir().unwrap();
        let snapshot = capture(dir.path()).unwrap();

        assert!(snapshot.is_empty());
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.root(), dir.path());
    }

    #[test]
    fn test_nested_files_use_forward_slash_keys() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("path").join("to")).unwrap();
        fs::write(dir.path().join("path").join("to").join("file.txt"), "x").unwrap();
        fs::write(dir.path().join("top.txt"), "hello").unwrap();
        fs::create_dir_all(dir.path().join("empty_dir")).unwrap();

        let snapshot = capture(dir.path()).unwrap();
        let paths: Vec<&str> = snapshot.paths().collect();

        assert_eq!(paths, vec!["path/to/file.txt", "top.txt"]);
        let top = snapshot.get("top.txt").unwrap();
        assert_eq!(top.size, 5);
        assert_eq!(top.fingerprint, crate::core::hash::compute_content_hash(b"hello"));
    }

    #[test]
    fn test_lookup_accepts_relative_and_absolute_paths() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a").join("b.txt"), "b").unwrap();

        let snapshot = capture(dir.path()).unwrap();

        assert!(snapshot.contains("a/b.txt"));
        assert!(snapshot.contains("./a/../a/b.txt"));
        assert!(snapshot.contains(dir.path().join("a").join("b.txt")));
        assert!(!snapshot.contains("a"));
        assert!(!snapshot.contains("../a/b.txt"));
        assert!(!snapshot.contains("/definitely/elsewhere/a/b.txt"));
    }

    #[test]
    fn test_missing_root_is_path_not_found() {
        let dir = tempdir().unwrap();
        let err = capture(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, GraniteError::PathNotFound { .. }));
    }

    #[test]
    fn test_file_root_is_path_not_found() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let err = capture(&file).unwrap_err();
        assert!(matches!(err, GraniteError::PathNotFound { .. }));
    }

    #[test]
    fn test_exclude_prunes_directories_and_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git").join("objects")).unwrap();
        fs::write(dir.path().join(".git").join("objects").join("abc"), "obj").unwrap();
        fs::write(dir.path().join("keep.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("scratch.tmp"), "junk").unwrap();

        let options = CaptureOptions::new()
            .exclude(r"^\.git$")
            .unwrap()
            .exclude(r"\.tmp$")
            .unwrap();
        let snapshot = SnapshotEngine::new(options).capture(dir.path()).unwrap();

        assert_eq!(snapshot.paths().collect::<Vec<_>>(), vec!["keep.rs"]);
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let err = CaptureOptions::new().exclude("(unclosed").unwrap_err();
        assert!(matches!(err, GraniteError::Pattern { .. }));
    }

    #[test]
    fn test_options_from_config() {
        let config = CaptureConfig {
            follow_symlinks: true,
            on_unreadable: UnreadablePolicy::Skip,
            exclude: vec!["^target/".to_string()],
        };
        let options = CaptureOptions::from_config(&config).unwrap();

        assert!(options.follows_symlinks());
        assert_eq!(options.unreadable_policy(), UnreadablePolicy::Skip);
        assert!(options.is_excluded("target/debug/app"));
        assert!(!options.is_excluded("src/target.rs"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_recorded_only_when_followed() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("real.txt"), "content").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .unwrap();

        let plain = capture(dir.path()).unwrap();
        assert_eq!(plain.paths().collect::<Vec<_>>(), vec!["real.txt"]);

        let following = SnapshotEngine::new(CaptureOptions::new().follow_symlinks(true))
            .capture(dir.path())
            .unwrap();
        assert_eq!(following.paths().collect::<Vec<_>>(), vec!["link.txt", "real.txt"]);
        assert_eq!(
            following.get("link.txt").unwrap().fingerprint,
            following.get("real.txt").unwrap().fingerprint
        );
    }

    fn denied(context: &str) -> GraniteError {
        GraniteError::Io {
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            context: context.to_string(),
        }
    }

    #[test]
    fn test_abort_policy_propagates_permission_errors() {
        let root = Path::new("/data");
        let mut skipped = Vec::new();

        let err = skip_or_abort(
            &CaptureOptions::new(),
            root,
            &root.join("secret.txt"),
            denied("reading secret.txt"),
            &mut skipped,
        )
        .unwrap_err();

        assert!(err.is_permission_denied());
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_skip_policy_records_permission_errors() {
        let root = Path::new("/data");
        let options = CaptureOptions::new().on_unreadable(UnreadablePolicy::Skip);
        let mut skipped = Vec::new();

        skip_or_abort(
            &options,
            root,
            &root.join("locked").join("secret.txt"),
            denied("reading locked/secret.txt"),
            &mut skipped,
        )
        .unwrap();

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].path, "locked/secret.txt");
        assert!(skipped[0].reason.contains("denied"));
    }

    #[test]
    fn test_skip_policy_still_fails_on_other_errors() {
        let root = Path::new("/data");
        let options = CaptureOptions::new().on_unreadable(UnreadablePolicy::Skip);
        let mut skipped = Vec::new();
        let error = GraniteError::Io {
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"),
            context: "reading a.txt".to_string(),
        };

        assert!(skip_or_abort(&options, root, &root.join("a.txt"), error, &mut skipped).is_err());
        assert!(skipped.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_sockets_are_never_recorded() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("plain.txt"), "x").unwrap();
        let _listener =
            std::os::unix::net::UnixListener::bind(dir.path().join("daemon.sock")).unwrap();

        let snapshot = capture(dir.path()).unwrap();
        assert_eq!(snapshot.paths().collect::<Vec<_>>(), vec!["plain.txt"]);

        let following = SnapshotEngine::new(CaptureOptions::new().follow_symlinks(true))
            .capture(dir.path())
            .unwrap();
        assert!(!following.contains("daemon.sock"));
    }

    #[cfg(unix)]
    #[test]
    fn test_link_cycle_fails_only_when_followed() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a").join("f.txt"), "f").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("a").join("up")).unwrap();

        let plain = capture(dir.path()).unwrap();
        assert_eq!(plain.paths().collect::<Vec<_>>(), vec!["a/f.txt"]);

        for policy in [UnreadablePolicy::Abort, UnreadablePolicy::Skip] {
            let options = CaptureOptions::new()
                .follow_symlinks(true)
                .on_unreadable(policy);
            let err = SnapshotEngine::new(options).capture(dir.path()).unwrap_err();
            assert!(!err.is_permission_denied());
        }
    }

    #[test]
    fn test_snapshot_outlives_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("gone.txt"), "bye").unwrap();
        let snapshot = capture(dir.path()).unwrap();
        drop(dir);

        assert!(snapshot.contains("gone.txt"));
        assert_eq!(snapshot.len(), 1);
    }
}
