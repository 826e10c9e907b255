use super::classify::{classify, directory_size, is_ignored, DirSize, PathClass};
use crate::config::{self, AppConfig};
use crate::model::{Item, SizeState, SkippedFile};
use crate::progress::ProgressReporter;
use ahash::AHashSet;
use glob::Pattern;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Everything discovered under a set of roots.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub items: Vec<Item>,
    /// Bytes of every file seen, counted once whether it ended up as an item,
    /// inside an accepted directory, or skipped as oversized.
    pub scanned_size: u64,
    pub skipped: Vec<SkippedFile>,
    /// Directories left unexpanded because they sat below the depth ceiling.
    pub pruned: Vec<PathBuf>,
    /// Entries that could not be listed, stat'ed or named.
    pub errors: usize,
    /// Set when the item ceiling stopped the walk early.
    pub truncated: bool,
}

impl Collection {
    pub fn item_size(&self) -> u64 {
        self.items.iter().map(|item| item.size).sum()
    }

    pub fn skipped_size(&self) -> u64 {
        self.skipped.iter().map(|skipped| skipped.size).sum()
    }
}

/// Walks the roots and decides, per directory, whether to take it whole or
/// descend into it.
pub struct Collector {
    capacity: u64,
    max_file_size: u64,
    max_depth: usize,
    size_walk_max_depth: usize,
    max_items: usize,
    ignore_patterns: Vec<Pattern>,
}

struct CollectState {
    collection: Collection,
    seen: AHashSet<PathBuf>,
}

impl CollectState {
    fn is_full(&self, max_items: usize) -> bool {
        self.collection.items.len() >= max_items
    }
}

impl Collector {
    pub fn new(config: &AppConfig) -> Self {
        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();

        Self {
            capacity: config.capacity,
            max_file_size: config.max_file_size,
            max_depth: config.max_depth,
            size_walk_max_depth: config.size_walk_max_depth,
            max_items: config.max_items,
            ignore_patterns,
        }
    }

    /// Collect items from every root. Access and naming errors are logged and
    /// skipped; hitting the item ceiling returns what was gathered so far with
    /// `truncated` set.
    pub fn collect(&self, roots: &[PathBuf], reporter: &dyn ProgressReporter) -> Collection {
        let start = Instant::now();
        let mut state = CollectState {
            collection: Collection::default(),
            seen: AHashSet::new(),
        };

        for root in config::non_overlapping_roots(roots) {
            if state.is_full(self.max_items) {
                state.collection.truncated = true;
                break;
            }
            self.collect_root(&root, &mut state, reporter);
        }

        let collection = state.collection;
        if collection.truncated {
            warn!(
                "Item ceiling of {} reached; results are partial",
                self.max_items
            );
        }
        info!(
            "Collected {} items ({} bytes scanned), {} oversized files skipped, {} errors",
            collection.items.len(),
            collection.scanned_size,
            collection.skipped.len(),
            collection.errors,
        );
        reporter.on_collect_complete(
            collection.items.len(),
            collection.skipped.len(),
            start.elapsed().as_secs_f64(),
        );

        collection
    }

    fn collect_root(&self, root: &Path, state: &mut CollectState, reporter: &dyn ProgressReporter) {
        if is_ignored(root, &self.ignore_patterns) {
            debug!("Ignoring root {}", root.display());
            return;
        }

        match classify(root) {
            Ok(PathClass::File { size }) => self.record_file(root.to_path_buf(), size, state),
            Ok(PathClass::Directory) => {
                let measured = self.measure(root);
                info!("Scanning {} ({} bytes)", root.display(), measured.bytes);
                if measured.bytes <= self.capacity {
                    self.record_directory(root.to_path_buf(), measured, state);
                } else {
                    debug!("{} exceeds capacity, expanding", root.display());
                    self.expand(root, state, reporter);
                }
            }
            Ok(PathClass::Other) => debug!("Not following {}", root.display()),
            Err(err) => {
                warn!("Cannot access {}: {}", root.display(), err);
                state.collection.errors += 1;
            }
        }
    }

    /// Breadth-first expansion of a directory that is too large to take whole.
    fn expand(&self, root: &Path, state: &mut CollectState, reporter: &dyn ProgressReporter) {
        let mut worklist: VecDeque<(PathBuf, usize)> = VecDeque::new();
        worklist.push_back((root.to_path_buf(), 0));

        while let Some((dir, depth)) = worklist.pop_front() {
            if state.is_full(self.max_items) {
                state.collection.truncated = true;
                return;
            }

            if depth > self.max_depth {
                warn!(
                    "Depth ceiling {} reached, not expanding {}",
                    self.max_depth,
                    dir.display()
                );
                state.collection.pruned.push(dir);
                continue;
            }

            reporter.on_collect_progress(state.collection.items.len(), &dir);

            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("Cannot list {}: {}", dir.display(), err);
                    state.collection.errors += 1;
                    continue;
                }
            };

            for entry_result in entries {
                if state.is_full(self.max_items) {
                    state.collection.truncated = true;
                    return;
                }

                let entry = match entry_result {
                    Ok(entry) => entry,
                    Err(err) => {
                        warn!("Error reading entry in {}: {}", dir.display(), err);
                        state.collection.errors += 1;
                        continue;
                    }
                };

                let path = entry.path();
                if entry.file_name().to_str().is_none() {
                    warn!("Skipping entry with non UTF-8 name: {}", path.display());
                    state.collection.errors += 1;
                    continue;
                }
                if is_ignored(&path, &self.ignore_patterns) {
                    debug!("Ignoring {}", path.display());
                    continue;
                }

                let file_type = match entry.file_type() {
                    Ok(file_type) => file_type,
                    Err(err) => {
                        warn!("Cannot stat {}: {}", path.display(), err);
                        state.collection.errors += 1;
                        continue;
                    }
                };

                if file_type.is_dir() {
                    let measured = self.measure(&path);
                    if measured.bytes <= self.capacity {
                        self.record_directory(path, measured, state);
                    } else {
                        debug!(
                            "{} is {} bytes, expanding",
                            path.display(),
                            measured.bytes
                        );
                        worklist.push_back((path, depth + 1));
                    }
                } else if file_type.is_file() {
                    match entry.metadata() {
                        Ok(metadata) => self.record_file(path, metadata.len(), state),
                        Err(err) => {
                            warn!("Cannot stat {}: {}", path.display(), err);
                            state.collection.errors += 1;
                        }
                    }
                } else {
                    debug!("Not following {}", path.display());
                }
            }
        }
    }

    fn measure(&self, dir: &Path) -> DirSize {
        directory_size(dir, self.size_walk_max_depth, &self.ignore_patterns)
    }

    fn record_directory(&self, path: PathBuf, measured: DirSize, state: &mut CollectState) {
        if !state.seen.insert(path.clone()) {
            return;
        }

        let size_state = if measured.complete {
            SizeState::Exact
        } else {
            warn!(
                "Size of {} is incomplete ({} bytes readable), flagging for review",
                path.display(),
                measured.bytes
            );
            SizeState::Incomplete
        };

        state.collection.scanned_size += measured.bytes;
        state
            .collection
            .items
            .push(Item::directory(path, measured.bytes, size_state));
    }

    fn record_file(&self, path: PathBuf, size: u64, state: &mut CollectState) {
        if !state.seen.insert(path.clone()) {
            return;
        }

        state.collection.scanned_size += size;
        if size > self.max_file_size {
            warn!(
                "Skipping oversized file {} ({} bytes > {})",
                path.display(),
                size,
                self.max_file_size
            );
            state.collection.skipped.push(SkippedFile { path, size });
        } else {
            state.collection.items.push(Item::file(path, size));
        }
    }
}
