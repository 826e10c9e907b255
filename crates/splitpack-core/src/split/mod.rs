//! Chunked split of oversized files and the inverse merge.
//!
//! A file `name.ext` is cut into `name.ext-split/name-part0001.ext`,
//! `name-part0002.ext`, ... next to the original. Every part holds exactly
//! the part size except the last, which holds the remainder.

pub mod merger;
pub mod naming;
pub mod parts;
pub mod splitter;

pub use merger::{find_split_directories, Merger};
pub use naming::{merged_path_for, part_file_name, split_dir_for};
pub use parts::{discover_parts, is_split_complete, part_count, PartFile};
pub use splitter::Splitter;

/// Size of the intermediate buffer used to stream bytes between files.
pub const COPY_BUFFER_SIZE: usize = 1024 * 1024;
