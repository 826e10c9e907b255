use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Split error: {0}")]
    Split(#[from] SplitError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("Export error: {0}")]
    Export(#[from] csv::Error),
}

/// Failures while cutting one file into parts. A split that returns any of
/// these must not be treated as a usable replacement for the original.
#[derive(Error, Debug)]
pub enum SplitError {
    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),

    #[error("{} has a name that cannot be used for part files", .0.display())]
    UnrepresentableName(PathBuf),

    #[error("part size must be greater than zero")]
    InvalidPartSize,

    /// The target is the file itself or one of its ancestors; clearing it
    /// would delete the file being split.
    #[error("target {} would overwrite the source {}", target.display(), file.display())]
    TargetContainsSource { file: PathBuf, target: PathBuf },

    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("split of {} is incomplete: expected {expected} bytes, parts hold {actual}", path.display())]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
}

impl SplitError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| SplitError::Io { path, source }
    }
}

/// Failures while reassembling a split directory. The partially written
/// output is removed before any of these is returned.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("{} does not end with '-split'", .0.display())]
    NotASplitDirectory(PathBuf),

    #[error("no part files found in {}", .0.display())]
    NoParts(PathBuf),

    #[error("part {index} is missing")]
    MissingPart { index: u32 },

    #[error("part {index} appears more than once")]
    DuplicatePart { index: u32 },

    #[error("parts of {found} mixed in with parts of {expected}")]
    MixedParts { expected: String, found: String },

    #[error("output {} already exists", .0.display())]
    OutputExists(PathBuf),

    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("merged output holds {actual} bytes but {expected} were written")]
    SizeMismatch { expected: u64, actual: u64 },
}

impl MergeError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| MergeError::Io { path, source }
    }
}
