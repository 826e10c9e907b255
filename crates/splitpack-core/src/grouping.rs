//! Best-fit-decreasing packing of items into capacity-bounded groups.
//!
//! Items are sorted directories first, then by size descending, then by path,
//! so the result depends only on the item set and not on enumeration order.
//! Directories are placed in a first pass; files follow, and any file lying
//! inside an already placed directory is dropped instead of being counted a
//! second time.

use crate::model::{Group, Item};
use crate::paths;
use ahash::AHashSet;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct GroupingEngine {
    capacity: u64,
}

/// Output of one packing run.
#[derive(Debug, Clone, Default)]
pub struct Packing {
    pub groups: Vec<Group>,
    /// Items left out because a placed directory already covers their bytes.
    pub contained: Vec<Item>,
    pub capacity: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackingStats {
    pub group_count: usize,
    pub file_count: usize,
    pub directory_count: usize,
    pub total_size: u64,
    pub average_group_size: u64,
    pub review_groups: usize,
}

impl Packing {
    pub fn grouped_size(&self) -> u64 {
        self.groups.iter().map(Group::total_size).sum()
    }

    pub fn contained_size(&self) -> u64 {
        self.contained.iter().map(|item| item.size).sum()
    }

    pub fn stats(&self) -> PackingStats {
        let total_size = self.grouped_size();
        let group_count = self.groups.len();
        PackingStats {
            group_count,
            file_count: self.groups.iter().map(Group::file_count).sum(),
            directory_count: self.groups.iter().map(Group::directory_count).sum(),
            total_size,
            average_group_size: if group_count == 0 {
                0
            } else {
                total_size / group_count as u64
            },
            review_groups: self.groups.iter().filter(|g| g.needs_review()).count(),
        }
    }

    /// Index of the group holding `path`, if any.
    pub fn group_of(&self, path: &Path) -> Option<usize> {
        self.groups.iter().position(|group| group.contains_path(path))
    }
}

fn packing_order(a: &Item, b: &Item) -> Ordering {
    a.kind
        .cmp(&b.kind)
        .then_with(|| b.size.cmp(&a.size))
        .then_with(|| a.path.cmp(&b.path))
}

impl GroupingEngine {
    pub fn new(capacity: u64) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn pack(&self, mut items: Vec<Item>) -> Packing {
        items.sort_by(packing_order);
        info!("Packing {} items into groups of {} bytes", items.len(), self.capacity);

        let mut groups: Vec<Group> = Vec::new();
        let mut contained: Vec<Item> = Vec::new();
        let mut placed_dirs: AHashSet<PathBuf> = AHashSet::new();

        // Sorted order puts every directory ahead of every file, so a single
        // sweep is the directory pass followed by the file pass.
        for item in items {
            if let Some(dir) = covering_directory(&placed_dirs, &item.path) {
                debug!(
                    "{} is already inside placed directory {}",
                    item.path.display(),
                    dir.display()
                );
                contained.push(item);
                continue;
            }

            if item.is_directory() {
                placed_dirs.insert(paths::normalize(&item.path));
            }
            self.place(&mut groups, item);
        }

        info!(
            "Packed into {} groups ({} items dropped by containment)",
            groups.len(),
            contained.len()
        );

        Packing {
            groups,
            contained,
            capacity: self.capacity,
        }
    }

    /// Tightest group that still fits `size`; ties go to the earliest group.
    pub fn best_fit(&self, groups: &[Group], size: u64) -> Option<usize> {
        groups
            .iter()
            .enumerate()
            .filter(|(_, group)| group.remaining(self.capacity) >= size)
            .min_by_key(|(index, group)| (group.remaining(self.capacity), *index))
            .map(|(index, _)| index)
    }

    fn place(&self, groups: &mut Vec<Group>, item: Item) {
        if item.needs_review() {
            warn!(
                "Placing {} with incomplete size {}; its group needs review",
                item.path.display(),
                item.size
            );
        }

        match self.best_fit(groups, item.size) {
            Some(index) => groups[index].push(item),
            None => {
                if item.size > self.capacity {
                    warn!(
                        "{} ({} bytes) exceeds group capacity {}, placing alone",
                        item.path.display(),
                        item.size,
                        self.capacity
                    );
                }
                groups.push(Group::with_item(item));
            }
        }
    }
}

/// The placed directory that strictly contains `path`, if any.
fn covering_directory<'a>(
    placed_dirs: &'a AHashSet<PathBuf>,
    path: &Path,
) -> Option<&'a PathBuf> {
    if placed_dirs.is_empty() {
        return None;
    }
    let normalized = paths::normalize(path);
    // Relative ancestors bottom out at "", never at ".".
    let current_dir = Path::new(".");
    if placed_dirs.contains(current_dir) && paths::is_strictly_within(&normalized, current_dir) {
        return placed_dirs.get(current_dir);
    }
    normalized
        .ancestors()
        .skip(1)
        .find_map(|ancestor| placed_dirs.get(ancestor))
}
