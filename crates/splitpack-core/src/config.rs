use crate::error::Error;
use crate::paths;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;

pub const MIB: u64 = 1024 * 1024;

pub const DEFAULT_CAPACITY: u64 = 100 * MIB;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * MIB;
pub const DEFAULT_PART_SIZE: u64 = 50 * MIB;
pub const DEFAULT_MAX_DEPTH: usize = 50;
pub const DEFAULT_SIZE_WALK_MAX_DEPTH: usize = 100;
pub const DEFAULT_MAX_ITEMS: usize = 100_000;
pub const DEFAULT_SPLIT_RETRIES: usize = 3;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub root_paths: Vec<String>,
    pub ignore_patterns: Vec<String>,
    /// Ceiling on the total size of one group.
    pub capacity: u64,
    /// Files above this size are left out of grouping and routed to splitting.
    pub max_file_size: u64,
    pub part_size: u64,
    pub max_depth: usize,
    pub size_walk_max_depth: usize,
    pub max_items: usize,
    pub split_retries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_paths: Vec::new(),
            ignore_patterns: vec!["**/.git".to_string()],
            capacity: DEFAULT_CAPACITY,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            part_size: DEFAULT_PART_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            size_walk_max_depth: DEFAULT_SIZE_WALK_MAX_DEPTH,
            max_items: DEFAULT_MAX_ITEMS,
            split_retries: DEFAULT_SPLIT_RETRIES,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be greater than zero".into()));
        }
        if self.part_size == 0 {
            return Err(Error::InvalidConfig("part_size must be greater than zero".into()));
        }
        if self.max_file_size > self.capacity {
            return Err(Error::InvalidConfig(format!(
                "max_file_size ({}) exceeds capacity ({})",
                self.max_file_size, self.capacity
            )));
        }
        if self.part_size > self.max_file_size {
            return Err(Error::InvalidConfig(format!(
                "part_size ({}) exceeds max_file_size ({})",
                self.part_size, self.max_file_size
            )));
        }
        Ok(())
    }
}

fn read_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("SPLITPACK")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("root_paths")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Load `Config.*` from the working directory plus `SPLITPACK_*` overrides,
/// falling back to the compiled-in defaults for anything unset.
pub fn load_configuration() -> Result<AppConfig, Error> {
    let config = read_configuration()?;
    config.validate()?;
    Ok(config)
}

/// Drop roots that lie inside another root so nothing is traversed twice.
/// The first spelling of a root wins; later duplicates are discarded.
pub fn non_overlapping_roots(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for root in roots {
        let root = paths::normalize(root);

        if result
            .iter()
            .any(|kept| *kept == root || paths::is_strictly_within(&root, kept))
        {
            continue;
        }
        result.retain(|kept| !paths::is_strictly_within(kept, &root));
        result.push(root);
    }

    result
}
