use super::naming::{name_parts, part_file_name};
use super::parts::{discover_parts, expected_part_len, is_split_complete, part_count};
use super::COPY_BUFFER_SIZE;
use crate::error::SplitError;
use crate::paths;
use crate::progress::{ProgressReporter, SilentReporter};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Cuts a file into fixed-size parts.
pub struct Splitter {
    part_size: u64,
}

impl Splitter {
    pub fn new(part_size: u64) -> Self {
        Self { part_size }
    }

    pub fn part_size(&self) -> u64 {
        self.part_size
    }

    pub fn split(&self, file: &Path, target_dir: &Path) -> Result<u32, SplitError> {
        self.split_with_progress(file, target_dir, &SilentReporter)
    }

    /// Split `file` into `target_dir` and return the number of parts.
    ///
    /// A target that already holds a complete, size-matching split is left
    /// alone. Anything else found there is removed first, so a half-written
    /// earlier attempt is never reused. On `Err` the split must not be
    /// treated as a replacement for the original.
    pub fn split_with_progress(
        &self,
        file: &Path,
        target_dir: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<u32, SplitError> {
        if self.part_size == 0 {
            return Err(SplitError::InvalidPartSize);
        }

        let metadata = fs::metadata(file).map_err(SplitError::io(file))?;
        if !metadata.is_file() {
            return Err(SplitError::NotAFile(file.to_path_buf()));
        }
        let size = metadata.len();
        let (base, ext) =
            name_parts(file).ok_or_else(|| SplitError::UnrepresentableName(file.to_path_buf()))?;
        let total_parts = part_count(size, self.part_size);
        check_target(file, target_dir)?;

        if is_split_complete(target_dir, file, size, self.part_size) {
            info!(
                "{} already holds a complete split of {} ({} parts)",
                target_dir.display(),
                file.display(),
                total_parts
            );
            return Ok(total_parts);
        }
        clear_target(target_dir)?;
        fs::create_dir_all(target_dir).map_err(SplitError::io(target_dir))?;

        info!(
            "Splitting {} ({} bytes) into {} parts of {} bytes",
            file.display(),
            size,
            total_parts,
            self.part_size
        );
        reporter.on_split_start(file, total_parts as usize);

        let mut source = File::open(file).map_err(SplitError::io(file))?;
        let mut buffer = vec![0u8; COPY_BUFFER_SIZE.min(self.part_size as usize)];
        let mut written_total = 0u64;

        for index in 1..=total_parts {
            let expected = expected_part_len(size, self.part_size, index);
            let part_path = target_dir.join(part_file_name(&base, &ext, index));

            let mut part = File::create(&part_path).map_err(SplitError::io(&part_path))?;
            let copied = copy_bytes(&mut source, &mut part, expected, &mut buffer)
                .map_err(SplitError::io(&part_path))?;
            part.sync_all().map_err(SplitError::io(&part_path))?;
            written_total += copied;

            if copied != expected {
                error!(
                    "{} ended early while writing part {}: {} of {} bytes",
                    file.display(),
                    index,
                    copied,
                    expected
                );
                return Err(SplitError::SizeMismatch {
                    path: file.to_path_buf(),
                    expected: size,
                    actual: written_total,
                });
            }

            debug!("Wrote {} ({} bytes)", part_path.display(), copied);
            reporter.on_split_progress(index as usize, total_parts as usize);
        }

        let on_disk: u64 = discover_parts(target_dir)
            .map_err(SplitError::io(target_dir))?
            .iter()
            .map(|part| part.size)
            .sum();
        if on_disk != size || !is_split_complete(target_dir, file, size, self.part_size) {
            error!(
                "Split of {} failed verification: expected {} bytes, parts hold {}",
                file.display(),
                size,
                on_disk
            );
            return Err(SplitError::SizeMismatch {
                path: file.to_path_buf(),
                expected: size,
                actual: on_disk,
            });
        }

        reporter.on_split_complete(file, total_parts as usize);
        Ok(total_parts)
    }
}

/// Refuse a target that is the source file or a directory above it.
fn check_target(file: &Path, target_dir: &Path) -> Result<(), SplitError> {
    let source = fs::canonicalize(file).map_err(SplitError::io(file))?;
    let target = match fs::canonicalize(target_dir) {
        Ok(target) => target,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(SplitError::Io {
                path: target_dir.to_path_buf(),
                source: err,
            })
        }
    };

    if source == target || paths::is_strictly_within(&source, &target) {
        error!(
            "Refusing to split {} into {}: the target holds the source",
            file.display(),
            target_dir.display()
        );
        return Err(SplitError::TargetContainsSource {
            file: file.to_path_buf(),
            target: target_dir.to_path_buf(),
        });
    }
    Ok(())
}

fn clear_target(target_dir: &Path) -> Result<(), SplitError> {
    match fs::symlink_metadata(target_dir) {
        Ok(metadata) if metadata.is_dir() => {
            warn!("Discarding stale split in {}", target_dir.display());
            fs::remove_dir_all(target_dir).map_err(SplitError::io(target_dir))
        }
        Ok(_) => {
            warn!("Replacing non-directory {}", target_dir.display());
            fs::remove_file(target_dir).map_err(SplitError::io(target_dir))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(SplitError::Io {
            path: target_dir.to_path_buf(),
            source: err,
        }),
    }
}

/// Copy up to `limit` bytes through `buffer`, stopping early only at EOF.
fn copy_bytes(
    source: &mut impl Read,
    sink: &mut impl Write,
    limit: u64,
    buffer: &mut [u8],
) -> io::Result<u64> {
    let mut copied = 0u64;

    while copied < limit {
        let want = buffer.len().min((limit - copied) as usize);
        let read = match source.read(&mut buffer[..want]) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        sink.write_all(&buffer[..read])?;
        copied += read as u64;
    }

    sink.flush()?;
    Ok(copied)
}
