//! Filesystem discovery: classify paths, measure directories and collect
//! the flat item list that the grouping engine packs.

pub mod classify;
pub mod walk;

pub use classify::{classify, directory_size, DirSize, PathClass};
pub use walk::{Collection, Collector};
