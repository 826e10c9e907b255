use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

use splitpack_core::config::MIB;
use splitpack_core::{AppConfig, Collector, GroupingEngine, ItemKind, SilentReporter};

/// Sparse file of `len` bytes; costs no disk space.
fn sparse(path: &Path, len: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().set_len(len).unwrap();
}

fn small_config(capacity: u64) -> AppConfig {
    AppConfig {
        capacity,
        max_file_size: capacity,
        part_size: capacity,
        ignore_patterns: vec![],
        ..AppConfig::default()
    }
}

#[test]
fn test_directory_under_capacity_is_taken_whole() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("photos");
    sparse(&root.join("a.raw"), 10 * MIB);
    sparse(&root.join("b.raw"), 15 * MIB);
    sparse(&root.join("nested").join("c.raw"), 15 * MIB);

    let collection = Collector::new(&AppConfig::default()).collect(&[root.clone()], &SilentReporter);

    assert_eq!(collection.items.len(), 1, "root should not be expanded");
    let item = &collection.items[0];
    assert_eq!(item.kind, ItemKind::Directory);
    assert_eq!(item.path, root);
    assert_eq!(item.size, 40 * MIB);
    assert!(!item.needs_review());

    let packing = GroupingEngine::new(100 * MIB).pack(collection.items);
    assert_eq!(packing.groups.len(), 1);
    assert_eq!(packing.groups[0].total_size(), 40 * MIB);
}

#[test]
fn test_directory_over_capacity_is_expanded() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("media");
    let first = root.join("first");
    let second = root.join("second");
    sparse(&first.join("x.bin"), 40 * MIB);
    sparse(&first.join("y.bin"), 40 * MIB);
    sparse(&second.join("x.bin"), 35 * MIB);
    sparse(&second.join("y.bin"), 35 * MIB);

    let collection = Collector::new(&AppConfig::default()).collect(&[root.clone()], &SilentReporter);

    let mut dirs: Vec<(PathBuf, u64)> = collection
        .items
        .iter()
        .map(|item| (item.path.clone(), item.size))
        .collect();
    dirs.sort();
    assert_eq!(dirs, vec![(first.clone(), 80 * MIB), (second.clone(), 70 * MIB)]);
    assert_eq!(collection.scanned_size, 150 * MIB);

    let packing = GroupingEngine::new(100 * MIB).pack(collection.items);
    assert_eq!(packing.groups.len(), 2);
    assert_eq!(packing.groups[0].items()[0].path, first);
    assert_eq!(packing.groups[0].remaining(100 * MIB), 20 * MIB);
    assert_eq!(packing.groups[1].items()[0].path, second);
}

fn mixed_tree(root: &Path) {
    sparse(&root.join("small.txt"), 2 * MIB);
    sparse(&root.join("huge.iso"), 70 * MIB);
    sparse(&root.join("docs").join("a.pdf"), 5 * MIB);
    sparse(&root.join("docs").join("b.pdf"), 6 * MIB);
    sparse(&root.join("video").join("one.mp4"), 45 * MIB);
    sparse(&root.join("video").join("two.mp4"), 45 * MIB);
    sparse(&root.join("video").join("three.mp4"), 30 * MIB);
    sparse(&root.join("video").join("raw").join("take.mov"), 120 * MIB);
}

#[test]
fn test_size_conservation() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("tree");
    mixed_tree(&root);

    let collection = Collector::new(&AppConfig::default()).collect(&[root], &SilentReporter);

    let total = (2 + 70 + 5 + 6 + 45 + 45 + 30 + 120) * MIB;
    assert_eq!(collection.scanned_size, total);
    assert_eq!(
        collection.item_size() + collection.skipped_size(),
        collection.scanned_size,
        "every scanned byte is an item or skipped, exactly once"
    );

    let skipped: HashSet<&str> = collection
        .skipped
        .iter()
        .map(|s| s.path.file_name().unwrap().to_str().unwrap())
        .collect();
    assert_eq!(skipped, HashSet::from(["huge.iso", "take.mov"]));
}

#[test]
fn test_no_double_placement() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("tree");
    mixed_tree(&root);

    let config = AppConfig::default();
    let collection = Collector::new(&config).collect(&[root], &SilentReporter);
    let discovered: HashSet<PathBuf> = collection
        .items
        .iter()
        .map(|item| item.path.clone())
        .chain(collection.skipped.iter().map(|s| s.path.clone()))
        .collect();
    assert_eq!(
        discovered.len(),
        collection.items.len() + collection.skipped.len(),
        "no path is discovered twice"
    );

    let packing = GroupingEngine::new(config.capacity).pack(collection.items.clone());
    let mut placed: Vec<PathBuf> = packing
        .groups
        .iter()
        .flat_map(|group| group.items().iter().map(|item| item.path.clone()))
        .collect();
    placed.extend(packing.contained.iter().map(|item| item.path.clone()));
    placed.extend(collection.skipped.iter().map(|s| s.path.clone()));

    let placed_set: HashSet<PathBuf> = placed.iter().cloned().collect();
    assert_eq!(placed.len(), placed_set.len(), "no path is placed twice");
    assert_eq!(placed_set, discovered);

    for group in &packing.groups {
        assert!(group.total_size() <= config.capacity);
    }
}

#[test]
fn test_overlapping_roots_are_counted_once() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("tree");
    mixed_tree(&root);

    let collector = Collector::new(&AppConfig::default());
    let once = collector.collect(&[root.clone()], &SilentReporter);
    let twice = collector.collect(&[root.join("video"), root.clone()], &SilentReporter);

    assert_eq!(once.scanned_size, twice.scanned_size);
    assert_eq!(once.items.len(), twice.items.len());
}

#[test]
fn test_file_root_is_recorded() {
    let tmp = tempdir().unwrap();
    let small = tmp.path().join("small.bin");
    let big = tmp.path().join("big.bin");
    sparse(&small, MIB);
    sparse(&big, 60 * MIB);

    let collection =
        Collector::new(&AppConfig::default()).collect(&[small.clone(), big.clone()], &SilentReporter);

    assert_eq!(collection.items.len(), 1);
    assert_eq!(collection.items[0].path, small);
    assert_eq!(collection.skipped.len(), 1);
    assert_eq!(collection.skipped[0].path, big);
}

#[test]
fn test_depth_ceiling_prunes_branch() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("deep");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("top.txt"), b"12345").unwrap();
    fs::create_dir_all(root.join("d1")).unwrap();
    fs::write(root.join("d1").join("f1"), b"12345678").unwrap();
    fs::write(root.join("d1").join("f2"), b"12345678").unwrap();

    let config = AppConfig {
        max_depth: 0,
        ..small_config(10)
    };
    let collection = Collector::new(&config).collect(&[root.clone()], &SilentReporter);

    assert_eq!(collection.pruned, vec![root.join("d1")]);
    assert_eq!(collection.items.len(), 1);
    assert_eq!(collection.items[0].path, root.join("top.txt"));
    assert!(!collection.truncated);
}

#[test]
fn test_item_ceiling_truncates() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("many");
    fs::create_dir_all(&root).unwrap();
    for i in 0..10 {
        fs::write(root.join(format!("f{}", i)), b"1234").unwrap();
    }

    let config = AppConfig {
        max_items: 3,
        ..small_config(10)
    };
    let collection = Collector::new(&config).collect(&[root], &SilentReporter);

    assert!(collection.truncated);
    assert_eq!(collection.items.len(), 3);
    assert_eq!(collection.scanned_size, 12);
}

#[test]
fn test_ignore_patterns_skip_entries() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("repo");
    sparse(&root.join(".git").join("objects").join("pack"), 80 * MIB);
    sparse(&root.join("src").join("main.rs"), MIB);

    let collection = Collector::new(&AppConfig::default()).collect(&[root.clone()], &SilentReporter);

    assert_eq!(collection.scanned_size, MIB);
    assert_eq!(collection.items.len(), 1);
    assert_eq!(collection.items[0].path, root);
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("links");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("real.txt"), b"0123456789").unwrap();
    let outside = tmp.path().join("outside.bin");
    fs::write(&outside, vec![0u8; 64]).unwrap();
    std::os::unix::fs::symlink(&outside, root.join("link.bin")).unwrap();

    let collection = Collector::new(&small_config(5)).collect(&[root.clone()], &SilentReporter);

    let paths: Vec<PathBuf> = collection.items.iter().map(|i| i.path.clone()).collect();
    assert!(!paths.contains(&root.join("link.bin")));
    assert!(collection.skipped.iter().any(|s| s.path == root.join("real.txt")));
    assert_eq!(collection.scanned_size, 10);
}

#[test]
fn test_missing_root_counts_error() {
    let tmp = tempdir().unwrap();
    let collection = Collector::new(&AppConfig::default())
        .collect(&[tmp.path().join("nope")], &SilentReporter);

    assert!(collection.items.is_empty());
    assert_eq!(collection.errors, 1);
}
