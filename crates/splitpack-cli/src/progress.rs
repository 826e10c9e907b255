use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use splitpack_core::ProgressReporter;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Collect and pack phases: spinner (totals unknown upfront)
/// - Split and merge: bar over the part count of the current file
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }

    fn with_bar(&self, update: impl FnOnce(&ProgressBar)) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            update(pb);
        }
    }

    fn start_spinner(&self, message: String) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars(TICK_CHARS),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn start_parts_bar(&self, verb: &str, parts: usize) {
        let pb = ProgressBar::new(parts as u64);
        pb.set_style(
            ProgressStyle::with_template(&format!(
                "  {{spinner:.cyan}} {} [{{bar:30.cyan/dim}}] {{pos}}/{{len}} parts {{msg}}",
                verb
            ))
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars(TICK_CHARS),
        );
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }
}

impl ProgressReporter for CliReporter {
    fn on_collect_start(&self, pass: usize) {
        self.start_spinner(format!("Collecting items (pass {})...", pass));
    }

    fn on_collect_progress(&self, items_found: usize, current_dir: &Path) {
        self.with_bar(|pb| {
            pb.set_message(format!(
                "Collecting... {} items, in {}",
                items_found,
                current_dir.display()
            ))
        });
    }

    fn on_collect_complete(&self, items: usize, skipped: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Collect complete: {} items, {} oversized files in {:.2}s",
            items, skipped, duration_secs
        );
    }

    fn on_split_start(&self, file: &Path, parts: usize) {
        self.start_parts_bar("Splitting", parts);
        self.with_bar(|pb| pb.set_message(file.display().to_string()));
    }

    fn on_split_progress(&self, parts_written: usize, total_parts: usize) {
        self.with_bar(|pb| {
            if pb.length() != Some(total_parts as u64) {
                pb.set_length(total_parts as u64);
            }
            pb.set_position(parts_written as u64);
        });
    }

    fn on_split_complete(&self, file: &Path, parts: usize) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Split {} into {} parts",
            file.display(),
            parts
        );
    }

    fn on_pack_start(&self, items: usize) {
        self.start_spinner(format!("Packing {} items...", items));
    }

    fn on_pack_complete(&self, groups: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Pack complete: {} groups in {:.2}s",
            groups, duration_secs
        );
    }

    fn on_merge_start(&self, split_dir: &Path, parts: usize) {
        self.start_parts_bar("Merging", parts);
        self.with_bar(|pb| pb.set_message(split_dir.display().to_string()));
    }

    fn on_merge_progress(&self, parts_merged: usize, total_parts: usize) {
        self.with_bar(|pb| {
            if pb.length() != Some(total_parts as u64) {
                pb.set_length(total_parts as u64);
            }
            pb.set_position(parts_merged as u64);
        });
    }

    fn on_merge_complete(&self, output: &Path, bytes: u64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Merged {} ({})",
            output.display(),
            HumanBytes(bytes)
        );
    }
}
