use super::naming::{name_parts, parse_part_file_name, PartName};
use crate::error::MergeError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A part file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartFile {
    pub path: PathBuf,
    pub name: PartName,
    pub size: u64,
}

impl PartFile {
    pub fn index(&self) -> u32 {
        self.name.index
    }
}

/// Number of parts a file of `size` bytes is cut into. An empty file still
/// gets one (empty) part so it survives a round trip.
pub fn part_count(size: u64, part_size: u64) -> u32 {
    if size == 0 {
        return 1;
    }
    size.div_ceil(part_size) as u32
}

/// Expected length of the 1-based part `index`.
pub fn expected_part_len(size: u64, part_size: u64, index: u32) -> u64 {
    let offset = (index as u64 - 1) * part_size;
    size.saturating_sub(offset).min(part_size)
}

/// List the part files of a split directory, ordered by numeric index.
/// Entries that do not look like parts are ignored.
pub fn discover_parts(split_dir: &Path) -> io::Result<Vec<PartFile>> {
    let mut parts = Vec::new();

    for entry in fs::read_dir(split_dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let Some(name) = file_name.to_str().and_then(parse_part_file_name) else {
            debug!("Ignoring non-part entry {}", entry.path().display());
            continue;
        };

        parts.push(PartFile {
            path: entry.path(),
            name,
            size: metadata.len(),
        });
    }

    parts.sort_by(|a, b| a.index().cmp(&b.index()).then_with(|| a.path.cmp(&b.path)));
    Ok(parts)
}

/// Check that sorted parts carry exactly the indices `1..=N`.
pub fn check_sequence(parts: &[PartFile]) -> Result<(), MergeError> {
    for (position, part) in parts.iter().enumerate() {
        let expected = position as u32 + 1;
        match part.index().cmp(&expected) {
            std::cmp::Ordering::Equal => {}
            std::cmp::Ordering::Less => {
                return Err(MergeError::DuplicatePart {
                    index: part.index(),
                })
            }
            std::cmp::Ordering::Greater => return Err(MergeError::MissingPart { index: expected }),
        }
    }
    Ok(())
}

/// Check that every part carries the same base name and extension as the
/// first one.
pub fn check_same_name(parts: &[PartFile]) -> Result<(), MergeError> {
    let Some(first) = parts.first() else {
        return Ok(());
    };
    match parts
        .iter()
        .find(|part| part.name.base != first.name.base || part.name.ext != first.name.ext)
    {
        Some(other) => Err(MergeError::MixedParts {
            expected: display_name(&first.name),
            found: display_name(&other.name),
        }),
        None => Ok(()),
    }
}

fn display_name(name: &PartName) -> String {
    format!("{}{}", name.base, name.ext)
}

/// True when `split_dir` holds exactly the parts a split of `original`
/// (`original_size` bytes, cut at `part_size`) produces: indices `1..=N`
/// with no gaps or extras, every part named after `original`, each of its
/// expected length, summing to the original size. `original` is only used
/// for its name and need not exist.
pub fn is_split_complete(
    split_dir: &Path,
    original: &Path,
    original_size: u64,
    part_size: u64,
) -> bool {
    if part_size == 0 || !split_dir.is_dir() {
        return false;
    }
    let Some((base, ext)) = name_parts(original) else {
        return false;
    };

    let parts = match discover_parts(split_dir) {
        Ok(parts) => parts,
        Err(err) => {
            warn!("Cannot inspect {}: {}", split_dir.display(), err);
            return false;
        }
    };

    let expected_count = part_count(original_size, part_size);
    if parts.len() != expected_count as usize || check_sequence(&parts).is_err() {
        return false;
    }

    if parts
        .iter()
        .any(|part| part.name.base != base || part.name.ext != ext)
    {
        debug!(
            "{} holds parts of another file than {}",
            split_dir.display(),
            original.display()
        );
        return false;
    }

    let lengths_match = parts
        .iter()
        .all(|part| part.size == expected_part_len(original_size, part_size, part.index()));
    let total: u64 = parts.iter().map(|part| part.size).sum();

    lengths_match && total == original_size
}
