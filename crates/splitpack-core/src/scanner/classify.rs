use glob::Pattern;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What a single path turned out to be. Symlinks and special files land in
/// `Other` and are never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    File { size: u64 },
    Directory,
    Other,
}

pub fn classify(path: &Path) -> io::Result<PathClass> {
    let metadata = fs::symlink_metadata(path)?;
    let file_type = metadata.file_type();

    if file_type.is_dir() {
        Ok(PathClass::Directory)
    } else if file_type.is_file() {
        Ok(PathClass::File {
            size: metadata.len(),
        })
    } else {
        Ok(PathClass::Other)
    }
}

/// Aggregate size of everything below a directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirSize {
    pub bytes: u64,
    pub files: u64,
    /// False when some entry could not be read or the walk was cut off by
    /// its depth ceiling; `bytes` is then a lower bound.
    pub complete: bool,
}

pub(crate) fn is_ignored(path: &Path, ignore_patterns: &[Pattern]) -> bool {
    ignore_patterns
        .iter()
        .any(|pattern| pattern.matches_path(path))
}

/// Size-only breadth-first walk. Uses an explicit worklist so arbitrarily
/// deep trees never grow the call stack.
pub fn directory_size(dir: &Path, max_depth: usize, ignore_patterns: &[Pattern]) -> DirSize {
    let mut total = DirSize {
        complete: true,
        ..DirSize::default()
    };
    let mut worklist: VecDeque<(PathBuf, usize)> = VecDeque::new();
    worklist.push_back((dir.to_path_buf(), 0));

    while let Some((current, depth)) = worklist.pop_front() {
        if depth > max_depth {
            warn!(
                "Size walk of {} stopped at depth {} ({})",
                dir.display(),
                max_depth,
                current.display()
            );
            total.complete = false;
            continue;
        }

        let entries = match fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Cannot list {}: {}", current.display(), err);
                total.complete = false;
                continue;
            }
        };

        for entry_result in entries {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Error reading entry in {}: {}", current.display(), err);
                    total.complete = false;
                    continue;
                }
            };

            let path = entry.path();
            if is_ignored(&path, ignore_patterns) {
                continue;
            }

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    warn!("Cannot stat {}: {}", path.display(), err);
                    total.complete = false;
                    continue;
                }
            };

            if file_type.is_dir() {
                worklist.push_back((path, depth + 1));
            } else if file_type.is_file() {
                match entry.metadata() {
                    Ok(metadata) => {
                        total.bytes += metadata.len();
                        total.files += 1;
                    }
                    Err(err) => {
                        warn!("Cannot stat {}: {}", path.display(), err);
                        total.complete = false;
                    }
                }
            } else {
                debug!("Not following {}", path.display());
            }
        }
    }

    total
}
