use super::naming::{is_split_dir_name, merged_path_for};
use super::parts::{check_same_name, check_sequence, discover_parts, PartFile};
use super::COPY_BUFFER_SIZE;
use crate::error::MergeError;
use crate::progress::{ProgressReporter, SilentReporter};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Reassembles the parts of a split directory into one file.
#[derive(Debug, Default)]
pub struct Merger {
    overwrite: bool,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace an existing output instead of failing with `OutputExists`.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn merge(&self, split_dir: &Path, output: &Path) -> Result<u64, MergeError> {
        self.merge_with_progress(split_dir, output, &SilentReporter)
    }

    /// Merge a `*-split` directory into the `-merged` file beside it.
    pub fn merge_split_dir(
        &self,
        split_dir: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<(PathBuf, u64), MergeError> {
        let output = merged_path_for(split_dir)
            .ok_or_else(|| MergeError::NotASplitDirectory(split_dir.to_path_buf()))?;
        let written = self.merge_with_progress(split_dir, &output, reporter)?;
        Ok((output, written))
    }

    /// Concatenate the parts of `split_dir`, in index order, into `output`
    /// and return the bytes written. On any failure the partial output is
    /// deleted before the error is returned.
    pub fn merge_with_progress(
        &self,
        split_dir: &Path,
        output: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<u64, MergeError> {
        if !split_dir.is_dir() {
            return Err(MergeError::NotADirectory(split_dir.to_path_buf()));
        }

        let parts = discover_parts(split_dir).map_err(MergeError::io(split_dir))?;
        if parts.is_empty() {
            return Err(MergeError::NoParts(split_dir.to_path_buf()));
        }
        check_sequence(&parts)?;
        check_same_name(&parts)?;
        info!(
            "Merging {} parts from {} into {}",
            parts.len(),
            split_dir.display(),
            output.display()
        );

        if output.exists() {
            if !self.overwrite {
                return Err(MergeError::OutputExists(output.to_path_buf()));
            }
            warn!("Replacing existing {}", output.display());
            fs::remove_file(output).map_err(MergeError::io(output))?;
        }
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(MergeError::io(parent))?;
        }

        reporter.on_merge_start(split_dir, parts.len());
        let written = write_output(output, |sink| concatenate(&parts, sink, reporter))?;
        info!("Merged {} bytes into {}", written, output.display());
        reporter.on_merge_complete(output, written);
        Ok(written)
    }
}

/// Create `output` fresh, fill it with `fill`, sync and verify its length.
/// On any failure the partial output is removed before the error returns.
fn write_output<F>(output: &Path, fill: F) -> Result<u64, MergeError>
where
    F: FnOnce(&mut File) -> Result<u64, MergeError>,
{
    let mut sink = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(output)
        .map_err(MergeError::io(output))?;

    let result = fill(&mut sink)
        .and_then(|written| {
            sink.sync_all().map_err(MergeError::io(output))?;
            Ok(written)
        })
        .and_then(|written| {
            drop(sink);
            verify_output(output, written)
        });

    if let Err(err) = &result {
        error!("Merge into {} failed: {}", output.display(), err);
        if let Err(remove_err) = fs::remove_file(output) {
            if remove_err.kind() != io::ErrorKind::NotFound {
                warn!(
                    "Could not remove partial output {}: {}",
                    output.display(),
                    remove_err
                );
            }
        }
    }
    result
}

fn concatenate(
    parts: &[PartFile],
    sink: &mut impl Write,
    reporter: &dyn ProgressReporter,
) -> Result<u64, MergeError> {
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;

    for (position, part) in parts.iter().enumerate() {
        let mut source = File::open(&part.path).map_err(MergeError::io(&part.path))?;
        written += append(&mut source, sink, &mut buffer).map_err(MergeError::io(&part.path))?;
        debug!("Merged part {} ({})", part.index(), part.path.display());
        reporter.on_merge_progress(position + 1, parts.len());
    }

    Ok(written)
}

/// Stream all of `source` into `sink` through `buffer`.
fn append(source: &mut impl Read, sink: &mut impl Write, buffer: &mut [u8]) -> io::Result<u64> {
    let mut copied = 0u64;
    loop {
        let read = match source.read(buffer) {
            Ok(0) => return Ok(copied),
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        sink.write_all(&buffer[..read])?;
        copied += read as u64;
    }
}

fn verify_output(output: &Path, written: u64) -> Result<u64, MergeError> {
    let actual = fs::metadata(output).map_err(MergeError::io(output))?.len();
    if actual != written {
        return Err(MergeError::SizeMismatch {
            expected: written,
            actual,
        });
    }
    Ok(written)
}

/// Find `*-split` directories under `root`. Non-recursive mode looks only at
/// the immediate children; recursive mode never descends into a split
/// directory itself. Results are sorted by path.
pub fn find_split_directories(root: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    if recursive {
        let mut walker = WalkDir::new(root).min_depth(1).into_iter();
        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Error walking {}: {}", root.display(), err);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            if entry.file_name().to_str().is_some_and(is_split_dir_name) {
                found.push(entry.into_path());
                walker.skip_current_dir();
            }
        }
    } else {
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if entry.file_name().to_str().is_some_and(is_split_dir_name) {
                found.push(entry.path());
            }
        }
    }

    found.sort();
    Ok(found)
}
