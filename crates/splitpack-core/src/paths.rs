use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` segments and trailing separators,
/// fold `..` into a preceding normal segment. The filesystem is not touched,
/// so symlinks are not resolved.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// True when `path` lies strictly below `dir`. Comparison is per component,
/// so `/foo` never contains `/foobar`.
pub fn is_strictly_within(path: &Path, dir: &Path) -> bool {
    let path = normalize(path);
    let dir = normalize(dir);
    if path == dir {
        return false;
    }
    if dir == Path::new(".") {
        return path.is_relative() && !path.starts_with("..");
    }
    path.starts_with(&dir)
}
