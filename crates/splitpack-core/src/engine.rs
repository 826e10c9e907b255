use crate::config::AppConfig;
use crate::error::Error;
use crate::grouping::{GroupingEngine, Packing};
use crate::model::SkippedFile;
use crate::progress::ProgressReporter;
use crate::scanner::{Collection, Collector};
use crate::split::{is_split_complete, part_count, split_dir_for, Splitter};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Collect, optionally split oversized files, then pack.
pub struct PlanEngine {
    config: AppConfig,
    split_oversized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitStatus {
    /// Freshly written with this many parts.
    Split(u32),
    /// The split directory already held a complete set of parts.
    AlreadyComplete(u32),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub source: PathBuf,
    pub target: PathBuf,
    pub status: SplitStatus,
}

#[derive(Debug)]
pub struct Plan {
    /// The final collection pass. Its `items` are moved into `packing`, so
    /// the list is empty here; `collected_items` keeps the count.
    pub collection: Collection,
    pub collected_items: usize,
    pub packing: Packing,
    pub splits: Vec<SplitOutcome>,
    /// Collection passes run, at least one.
    pub passes: usize,
    pub collect_duration: Duration,
    pub split_duration: Duration,
    pub pack_duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balance {
    Exact,
    /// Scanned bytes that ended up neither grouped nor skipped.
    Missing(u64),
    /// Grouped and skipped bytes beyond what was scanned.
    Excess(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accounting {
    pub scanned: u64,
    pub grouped: u64,
    pub skipped: u64,
    /// Bytes of items dropped because a placed directory already covers them.
    pub contained: u64,
    pub balance: Balance,
}

impl Plan {
    /// Every scanned byte must be grouped or skipped exactly once.
    pub fn accounting(&self) -> Accounting {
        let scanned = self.collection.scanned_size;
        let grouped = self.packing.grouped_size();
        let skipped = self.collection.skipped_size();
        let accounted = grouped + skipped;

        let balance = match accounted.cmp(&scanned) {
            std::cmp::Ordering::Equal => Balance::Exact,
            std::cmp::Ordering::Less => Balance::Missing(scanned - accounted),
            std::cmp::Ordering::Greater => Balance::Excess(accounted - scanned),
        };

        Accounting {
            scanned,
            grouped,
            skipped,
            contained: self.packing.contained_size(),
            balance,
        }
    }

    pub fn failed_splits(&self) -> impl Iterator<Item = &SplitOutcome> {
        self.splits
            .iter()
            .filter(|outcome| matches!(outcome.status, SplitStatus::Failed(_)))
    }
}

impl PlanEngine {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            split_oversized: false,
        }
    }

    /// Split oversized files into `<name>-split` directories and re-collect.
    pub fn with_splitting(mut self, split_oversized: bool) -> Self {
        self.split_oversized = split_oversized;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the planning pipeline:
    /// 1. Collect items under `roots`
    /// 2. When splitting is on, split each oversized file whose split
    ///    directory is not already complete, then collect again; repeat until
    ///    nothing new was split or `split_retries` passes have run
    /// 3. Pack the final collection into groups
    pub fn run(&self, roots: &[PathBuf], reporter: &dyn ProgressReporter) -> Result<Plan, Error> {
        self.config.validate()?;
        info!("Planning roots: {:?}", roots);

        let collector = Collector::new(&self.config);
        let splitter = Splitter::new(self.config.part_size);
        let max_passes = self.config.split_retries.max(1);

        let mut splits: Vec<SplitOutcome> = Vec::new();
        let mut collect_duration = Duration::ZERO;
        let mut split_duration = Duration::ZERO;
        let mut passes = 0;

        let mut collection = loop {
            passes += 1;
            reporter.on_collect_start(passes);
            let collect_start = Instant::now();
            let collection = collector.collect(roots, reporter);
            collect_duration += collect_start.elapsed();
            debug!(
                "Pass {} collected {} items, {} skipped",
                passes,
                collection.items.len(),
                collection.skipped.len()
            );

            if !self.split_oversized || collection.skipped.is_empty() {
                break collection;
            }

            let split_start = Instant::now();
            let newly_split = self.split_skipped(&splitter, &collection.skipped, &mut splits, reporter);
            split_duration += split_start.elapsed();

            if newly_split == 0 {
                break collection;
            }
            if passes >= max_passes {
                warn!(
                    "Stopping after {} passes; the last split changed the tree",
                    passes
                );
                break collection;
            }
            info!("Split {} files, collecting again", newly_split);
        };

        let items = std::mem::take(&mut collection.items);
        let collected_items = items.len();
        reporter.on_pack_start(collected_items);
        let pack_start = Instant::now();
        let packing = GroupingEngine::new(self.config.capacity).pack(items);
        let pack_duration = pack_start.elapsed();
        reporter.on_pack_complete(packing.groups.len(), pack_duration.as_secs_f64());

        let plan = Plan {
            collection,
            collected_items,
            packing,
            splits,
            passes,
            collect_duration,
            split_duration,
            pack_duration,
        };

        match plan.accounting().balance {
            Balance::Exact => debug!("Accounting balanced"),
            Balance::Missing(bytes) => error!("{} scanned bytes are unaccounted for", bytes),
            Balance::Excess(bytes) => error!("{} bytes accounted beyond the scan", bytes),
        }

        Ok(plan)
    }

    /// Split each skipped file that lacks a complete split. Returns how many
    /// were newly written.
    fn split_skipped(
        &self,
        splitter: &Splitter,
        skipped: &[SkippedFile],
        splits: &mut Vec<SplitOutcome>,
        reporter: &dyn ProgressReporter,
    ) -> usize {
        let mut newly_split = 0;

        for file in skipped {
            let target = split_dir_for(&file.path);
            if splits.iter().any(|done| done.source == file.path) {
                continue;
            }

            if is_split_complete(&target, &file.path, file.size, self.config.part_size) {
                debug!("{} is already split", file.path.display());
                splits.push(SplitOutcome {
                    source: file.path.clone(),
                    target,
                    status: SplitStatus::AlreadyComplete(part_count(
                        file.size,
                        self.config.part_size,
                    )),
                });
                continue;
            }

            let status = match splitter.split_with_progress(&file.path, &target, reporter) {
                Ok(parts) => {
                    newly_split += 1;
                    SplitStatus::Split(parts)
                }
                Err(err) => {
                    error!("Failed to split {}: {}", file.path.display(), err);
                    SplitStatus::Failed(err.to_string())
                }
            };
            splits.push(SplitOutcome {
                source: file.path.clone(),
                target,
                status,
            });
        }

        newly_split
    }
}
