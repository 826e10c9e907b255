pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod grouping;
pub mod model;
pub mod paths;
pub mod progress;
pub mod scanner;
pub mod split;

pub use config::AppConfig;
pub use engine::{Accounting, Balance, Plan, PlanEngine, SplitOutcome, SplitStatus};
pub use error::{Error, MergeError, SplitError};
pub use grouping::{GroupingEngine, Packing, PackingStats};
pub use model::{Group, Item, ItemKind, SizeState, SkippedFile};
pub use progress::{ProgressReporter, SilentReporter};
pub use scanner::{Collection, Collector};
pub use split::{Merger, Splitter};
