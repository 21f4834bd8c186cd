use std::path::{Component, Path};

/// Convert a path to the forward-slash key it has inside a snapshot of `root`.
///
/// Relative paths are taken relative to `root`; absolute paths must lie
/// under it. `.` and `..` components are resolved lexically, so
/// `./a/../b.txt` and `b.txt` map to the same key. Returns `None` for paths
/// outside `root` and for the root itself.
///
/// ```
/// use std::path::Path;
/// use granite::core::path_as_key;
///
/// let root = Path::new("/tmp/project");
/// assert_eq!(path_as_key(Path::new("./src/../lib.rs"), root).as_deref(), Some("lib.rs"));
/// assert_eq!(path_as_key(Path::new("/tmp/project/a/b.txt"), root).as_deref(), Some("a/b.txt"));
/// assert_eq!(path_as_key(Path::new("../escape.txt"), root), None);
/// ```
pub fn path_as_key(path: &Path, root: &Path) -> Option<String> {
    let relative = if path.is_absolute() {
        let root = normalize_components(root)?;
        let path = normalize_components(path)?;
        if path.len() <= root.len() || path[..root.len()] != root[..] {
            return None;
        }
        path[root.len()..].to_vec()
    } else {
        normalize_components(path)?
    };

    if relative.is_empty() {
        return None;
    }
    Some(relative.join("/"))
}

/// Key for a path already known to be a descendant of `root` (walk entries).
pub(crate) fn entry_key(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

// Lexical normalization; `None` when `..` climbs above the start.
fn normalize_components(path: &Path) -> Option<Vec<String>> {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => {
                parts.push(prefix.as_os_str().to_string_lossy().into_owned())
            }
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }
    Some(parts)
}
