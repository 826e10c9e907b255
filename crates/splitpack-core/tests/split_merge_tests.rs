use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

use splitpack_core::config::MIB;
use splitpack_core::split::{
    discover_parts, find_split_directories, is_split_complete, merged_path_for, split_dir_for,
};
use splitpack_core::{MergeError, Merger, SilentReporter, SplitError, Splitter};
use std::io::Write;

/// Deterministic, non-repeating-looking content so reordered parts are caught.
fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + i / 251) % 256) as u8).collect()
}

fn part_sizes(split_dir: &Path) -> Vec<u64> {
    discover_parts(split_dir)
        .unwrap()
        .iter()
        .map(|part| part.size)
        .collect()
}

#[test]
fn test_split_into_fixed_parts() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("movie.mp4");
    fs::write(&file, patterned(120 * 1024)).unwrap();
    let target = split_dir_for(&file);

    let parts = Splitter::new(50 * 1024).split(&file, &target).unwrap();

    assert_eq!(parts, 3);
    assert_eq!(part_sizes(&target), vec![50 * 1024, 50 * 1024, 20 * 1024]);
    assert!(target.join("movie-part0001.mp4").is_file());
    assert!(target.join("movie-part0003.mp4").is_file());
    assert!(is_split_complete(&target, &file, 120 * 1024, 50 * 1024));
}

#[test]
fn test_completeness_check_at_full_scale() {
    let tmp = tempdir().unwrap();
    let split_dir = tmp.path().join("big.bin-split");
    let original = Path::new("big.bin");
    fs::create_dir_all(&split_dir).unwrap();

    let sizes = [50 * MIB, 50 * MIB, 20 * MIB];
    for (i, size) in sizes.iter().enumerate() {
        File::create(split_dir.join(format!("big-part{:04}.bin", i + 1)))
            .unwrap()
            .set_len(*size)
            .unwrap();
    }
    assert!(is_split_complete(&split_dir, original, 120 * MIB, 50 * MIB));
    assert!(!is_split_complete(&split_dir, original, 121 * MIB, 50 * MIB));

    fs::remove_file(split_dir.join("big-part0002.bin")).unwrap();
    assert!(!is_split_complete(&split_dir, original, 120 * MIB, 50 * MIB));

    File::create(split_dir.join("big-part0002.bin"))
        .unwrap()
        .set_len(49 * MIB)
        .unwrap();
    assert!(!is_split_complete(&split_dir, original, 120 * MIB, 50 * MIB));

    File::create(split_dir.join("big-part0002.bin"))
        .unwrap()
        .set_len(50 * MIB)
        .unwrap();
    File::create(split_dir.join("big-part0004.bin"))
        .unwrap()
        .set_len(0)
        .unwrap();
    assert!(
        !is_split_complete(&split_dir, original, 120 * MIB, 50 * MIB),
        "an extra part makes the split incomplete"
    );
}

#[test]
fn test_split_merge_round_trip() {
    let tmp = tempdir().unwrap();
    for (name, len, part_size) in [
        ("exact.bin", 4096usize, 1024u64),
        ("ragged.dat", 5000, 1024),
        ("single", 10, 1024),
        ("empty.txt", 0, 1024),
        ("one-byte-parts.log", 7, 1),
    ] {
        let file = tmp.path().join(name);
        let content = patterned(len);
        fs::write(&file, &content).unwrap();

        let split_dir = split_dir_for(&file);
        Splitter::new(part_size).split(&file, &split_dir).unwrap();

        let output = merged_path_for(&split_dir).unwrap();
        let written = Merger::new().merge(&split_dir, &output).unwrap();

        assert_eq!(written, len as u64, "{} size", name);
        assert_eq!(fs::read(&output).unwrap(), content, "{} content", name);
    }
}

#[test]
fn test_split_is_idempotent() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("data.bin");
    fs::write(&file, patterned(3000)).unwrap();
    let target = split_dir_for(&file);
    let splitter = Splitter::new(1000);

    assert_eq!(splitter.split(&file, &target).unwrap(), 3);
    let first_modified = fs::metadata(target.join("data-part0001.bin"))
        .unwrap()
        .modified()
        .unwrap();
    assert!(is_split_complete(&target, &file, 3000, 1000));

    assert_eq!(splitter.split(&file, &target).unwrap(), 3);
    let second_modified = fs::metadata(target.join("data-part0001.bin"))
        .unwrap()
        .modified()
        .unwrap();
    assert!(is_split_complete(&target, &file, 3000, 1000));
    assert_eq!(first_modified, second_modified, "complete split is left alone");
}

#[test]
fn test_stale_split_is_replaced() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("data.bin");
    let content = patterned(2500);
    fs::write(&file, &content).unwrap();
    let target = split_dir_for(&file);

    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("data-part0001.bin"), b"stale").unwrap();
    fs::write(target.join("leftover.tmp"), b"junk").unwrap();

    assert_eq!(Splitter::new(1000).split(&file, &target).unwrap(), 3);
    assert!(!target.join("leftover.tmp").exists());
    assert_eq!(part_sizes(&target), vec![1000, 1000, 500]);
}

#[test]
fn test_split_rejects_bad_input() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("x.bin");
    fs::write(&file, b"abc").unwrap();

    assert!(matches!(
        Splitter::new(0).split(&file, &tmp.path().join("x-split")),
        Err(SplitError::InvalidPartSize)
    ));
    assert!(matches!(
        Splitter::new(10).split(tmp.path(), &tmp.path().join("dir-split")),
        Err(SplitError::NotAFile(_))
    ));
    assert!(matches!(
        Splitter::new(10).split(&tmp.path().join("missing"), &tmp.path().join("m-split")),
        Err(SplitError::Io { .. })
    ));
}

#[test]
fn test_split_refuses_target_holding_the_source() {
    let tmp = tempdir().unwrap();
    let data = tmp.path().join("data");
    fs::create_dir_all(data.join("inner")).unwrap();
    let file = data.join("inner").join("big.bin");
    let content = patterned(300);
    fs::write(&file, &content).unwrap();
    let splitter = Splitter::new(100);

    for target in [data.join("inner"), data.clone(), data.join(".").join("inner"), file.clone()] {
        let result = splitter.split(&file, &target);
        assert!(
            matches!(result, Err(SplitError::TargetContainsSource { .. })),
            "target {} should be refused, got {:?}",
            target.display(),
            result
        );
        assert_eq!(fs::read(&file).unwrap(), content, "source must survive");
    }
}

#[test]
fn test_split_does_not_reuse_parts_of_another_file() {
    let tmp = tempdir().unwrap();
    let first = tmp.path().join("a.bin");
    let second = tmp.path().join("b.bin");
    fs::write(&first, vec![b'a'; 300]).unwrap();
    fs::write(&second, vec![b'b'; 300]).unwrap();
    let shared = tmp.path().join("shared");
    let splitter = Splitter::new(100);

    assert_eq!(splitter.split(&first, &shared).unwrap(), 3);
    assert!(is_split_complete(&shared, &first, 300, 100));
    assert!(!is_split_complete(&shared, &second, 300, 100));

    assert_eq!(splitter.split(&second, &shared).unwrap(), 3);
    let mut names: Vec<String> = discover_parts(&shared)
        .unwrap()
        .iter()
        .map(|part| part.path.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["b-part0001.bin", "b-part0002.bin", "b-part0003.bin"]);

    let output = tmp.path().join("b-merged.bin");
    Merger::new().merge(&shared, &output).unwrap();
    assert_eq!(fs::read(&output).unwrap(), vec![b'b'; 300]);
}

#[test]
fn test_merge_rejects_parts_of_different_files() {
    let tmp = tempdir().unwrap();
    let split_dir = tmp.path().join("mixed.bin-split");
    fs::create_dir_all(&split_dir).unwrap();
    fs::File::create(split_dir.join("x-part0001.bin"))
        .unwrap()
        .write_all(b"xxxx")
        .unwrap();
    fs::File::create(split_dir.join("y-part0002.bin"))
        .unwrap()
        .write_all(b"yyyy")
        .unwrap();
    let output = tmp.path().join("mixed-merged.bin");

    let result = Merger::new().merge(&split_dir, &output);

    assert!(matches!(result, Err(MergeError::MixedParts { .. })));
    assert!(!output.exists());
}

#[test]
fn test_merge_orders_parts_numerically() {
    let tmp = tempdir().unwrap();
    let split_dir = tmp.path().join("log.txt-split");
    fs::create_dir_all(&split_dir).unwrap();
    for index in 1..=12u32 {
        fs::write(
            split_dir.join(format!("log-part{:04}.txt", index)),
            format!("{},", index),
        )
        .unwrap();
    }
    fs::write(split_dir.join("README"), b"not a part").unwrap();

    let (output, written) = Merger::new()
        .merge_split_dir(&split_dir, &SilentReporter)
        .unwrap();

    assert_eq!(output, tmp.path().join("log-merged.txt"));
    let merged = fs::read_to_string(&output).unwrap();
    assert_eq!(merged, "1,2,3,4,5,6,7,8,9,10,11,12,");
    assert_eq!(written, merged.len() as u64);
}

#[test]
fn test_merge_without_parts_fails() {
    let tmp = tempdir().unwrap();
    let split_dir = tmp.path().join("nothing-split");
    fs::create_dir_all(&split_dir).unwrap();
    fs::write(split_dir.join("notes.txt"), b"hello").unwrap();
    let output = tmp.path().join("nothing-merged");

    let result = Merger::new().merge(&split_dir, &output);

    assert!(matches!(result, Err(MergeError::NoParts(_))));
    assert!(!output.exists());
}

#[test]
fn test_merge_with_missing_part_leaves_no_output() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("gap.bin");
    fs::write(&file, patterned(3000)).unwrap();
    let split_dir = split_dir_for(&file);
    Splitter::new(1000).split(&file, &split_dir).unwrap();
    fs::remove_file(split_dir.join("gap-part0002.bin")).unwrap();

    let output = merged_path_for(&split_dir).unwrap();
    let result = Merger::new().merge(&split_dir, &output);

    assert!(matches!(result, Err(MergeError::MissingPart { index: 2 })));
    assert!(!output.exists());
}

#[test]
fn test_merge_refuses_existing_output_unless_forced() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("keep.bin");
    let content = patterned(1500);
    fs::write(&file, &content).unwrap();
    let split_dir = split_dir_for(&file);
    Splitter::new(1000).split(&file, &split_dir).unwrap();

    let output = merged_path_for(&split_dir).unwrap();
    fs::write(&output, b"precious").unwrap();

    assert!(matches!(
        Merger::new().merge(&split_dir, &output),
        Err(MergeError::OutputExists(_))
    ));
    assert_eq!(fs::read(&output).unwrap(), b"precious");

    Merger::new().overwrite(true).merge(&split_dir, &output).unwrap();
    assert_eq!(fs::read(&output).unwrap(), content);
}

#[test]
fn test_merge_creates_output_parent() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("a.bin");
    fs::write(&file, patterned(10)).unwrap();
    let split_dir = split_dir_for(&file);
    Splitter::new(4).split(&file, &split_dir).unwrap();

    let output = tmp.path().join("out").join("nested").join("a.bin");
    assert_eq!(Merger::new().merge(&split_dir, &output).unwrap(), 10);
    assert!(output.is_file());
}

#[test]
fn test_merge_rejects_non_split_directory_name() {
    let tmp = tempdir().unwrap();
    let plain = tmp.path().join("plain");
    fs::create_dir_all(&plain).unwrap();

    assert!(matches!(
        Merger::new().merge_split_dir(&plain, &SilentReporter),
        Err(MergeError::NotASplitDirectory(_))
    ));
    assert!(matches!(
        Merger::new().merge(&tmp.path().join("missing-split"), &tmp.path().join("o")),
        Err(MergeError::NotADirectory(_))
    ));
}

#[test]
fn test_find_split_directories() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    for dir in [
        "a.bin-split",
        "b.iso-split",
        "not-a-split-dir",
        "-split",
        "nested/c.mov-split",
        "nested/deeper/d.tar-split",
        "a.bin-split/inner-split",
    ] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    fs::write(root.join("file-split"), b"a file, not a directory").unwrap();

    let top = find_split_directories(root, false).unwrap();
    assert_eq!(
        top,
        vec![root.join("a.bin-split"), root.join("b.iso-split")]
    );

    let all: Vec<PathBuf> = find_split_directories(root, true).unwrap();
    assert_eq!(
        all,
        vec![
            root.join("a.bin-split"),
            root.join("b.iso-split"),
            root.join("nested/c.mov-split"),
            root.join("nested/deeper/d.tar-split"),
        ]
    );
}
