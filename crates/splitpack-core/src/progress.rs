use std::path::Path;

/// Trait for reporting progress of the collect/split/pack/merge phases.
///
/// The CLI implements it with indicatif bars; library callers that do not care
/// pass `SilentReporter`. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_collect_start(&self, _pass: usize) {}
    fn on_collect_progress(&self, _items_found: usize, _current_dir: &Path) {}
    fn on_collect_complete(&self, _items: usize, _skipped: usize, _duration_secs: f64) {}
    fn on_split_start(&self, _file: &Path, _parts: usize) {}
    fn on_split_progress(&self, _parts_written: usize, _total_parts: usize) {}
    fn on_split_complete(&self, _file: &Path, _parts: usize) {}
    fn on_pack_start(&self, _items: usize) {}
    fn on_pack_complete(&self, _groups: usize, _duration_secs: f64) {}
    fn on_merge_start(&self, _split_dir: &Path, _parts: usize) {}
    fn on_merge_progress(&self, _parts_merged: usize, _total_parts: usize) {}
    fn on_merge_complete(&self, _output: &Path, _bytes: u64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
