use std::path::{Path, PathBuf};

/// Directories order before files so they are packed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemKind {
    Directory,
    File,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Directory => "directory",
            ItemKind::File => "file",
        }
    }
}

/// Whether an item's size was fully measured. An `Incomplete` directory had
/// unreadable entries (or was deeper than the size walk allows); its size is
/// the lower bound that could be read and it still gets placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeState {
    Exact,
    Incomplete,
}

/// One unit eligible for grouping: a file, or a directory taken whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub path: PathBuf,
    pub size: u64,
    pub kind: ItemKind,
    pub size_state: SizeState,
}

impl Item {
    pub fn file(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            kind: ItemKind::File,
            size_state: SizeState::Exact,
        }
    }

    pub fn directory(path: impl Into<PathBuf>, size: u64, size_state: SizeState) -> Self {
        Self {
            path: path.into(),
            size,
            kind: ItemKind::Directory,
            size_state,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == ItemKind::Directory
    }

    pub fn needs_review(&self) -> bool {
        self.size_state == SizeState::Incomplete
    }
}

/// A file above the per-file ceiling, kept out of grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub size: u64,
}

/// A batch of items whose sizes sum to `total_size`.
#[derive(Debug, Clone, Default)]
pub struct Group {
    items: Vec<Item>,
    total_size: u64,
}

impl Group {
    pub(crate) fn with_item(item: Item) -> Self {
        let mut group = Group::default();
        group.push(item);
        group
    }

    pub(crate) fn push(&mut self, item: Item) {
        self.total_size += item.size;
        self.items.push(item);
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Space left under `capacity`; zero for an over-full group.
    pub fn remaining(&self, capacity: u64) -> u64 {
        capacity.saturating_sub(self.total_size)
    }

    pub fn utilization(&self, capacity: u64) -> f64 {
        if capacity == 0 {
            return 0.0;
        }
        self.total_size as f64 / capacity as f64
    }

    pub fn file_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_directory()).count()
    }

    pub fn directory_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_directory()).count()
    }

    /// True when any member's size is only a lower bound.
    pub fn needs_review(&self) -> bool {
        self.items.iter().any(Item::needs_review)
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.items.iter().any(|item| item.path == path)
    }
}
