mod commands;
mod logging;
mod progress;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use splitpack_core::export::write_plan_csv_file;
use splitpack_core::split::{find_split_directories, split_dir_for};
use splitpack_core::{AppConfig, Balance, Merger, PlanEngine, Splitter};
use tracing::{error, info};

fn main() -> ExitCode {
    dotenv().ok();

    let args = Cli::parse();

    let _guard = logging::init_logger(args.verbose);

    let config = match splitpack_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Some(Commands::Plan { paths, split, csv }) => run_plan(&config, paths, split, csv),
        Some(Commands::Split { files, target }) => run_split(&config, &files, target),
        Some(Commands::Merge {
            split_dirs,
            recursive,
            force,
        }) => run_merge(split_dirs, recursive, force),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(ExitCode::SUCCESS)
        }
        None => Cli::command()
            .print_long_help()
            .map(|()| ExitCode::SUCCESS)
            .context("printing help"),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            error!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn resolve_roots(config: &AppConfig, paths: Vec<PathBuf>) -> Vec<PathBuf> {
    if !paths.is_empty() {
        return paths;
    }
    if !config.root_paths.is_empty() {
        return config.root_paths.iter().map(PathBuf::from).collect();
    }
    vec![PathBuf::from(".")]
}

fn run_plan(
    config: &AppConfig,
    paths: Vec<PathBuf>,
    split: bool,
    csv: Option<PathBuf>,
) -> Result<ExitCode> {
    let roots = resolve_roots(config, paths);
    let engine = PlanEngine::new(config.clone()).with_splitting(split);
    let reporter = CliReporter::new();
    let plan = engine.run(&roots, &reporter).context("planning failed")?;

    render::print_plan(&plan);

    if let Some(csv_path) = csv {
        write_plan_csv_file(&plan.packing.groups, &csv_path)
            .with_context(|| format!("writing {}", csv_path.display()))?;
        println!("Plan written to {}", csv_path.display().to_string().cyan());
    }

    info!(
        "Collect: {}, Split: {}, Pack: {}",
        format!("{:.2}s", plan.collect_duration.as_secs_f64()).green(),
        format!("{:.2}s", plan.split_duration.as_secs_f64()).green(),
        format!("{:.2}s", plan.pack_duration.as_secs_f64()).green(),
    );

    let balanced = plan.accounting().balance == Balance::Exact;
    if balanced && plan.failed_splits().next().is_none() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn run_split(config: &AppConfig, files: &[PathBuf], target: Option<PathBuf>) -> Result<ExitCode> {
    if target.is_some() && files.len() > 1 {
        bail!("--target can only be used with a single file");
    }

    let splitter = Splitter::new(config.part_size);
    let reporter = CliReporter::new();
    let mut failed = 0;

    for file in files {
        let target_dir = target.clone().unwrap_or_else(|| split_dir_for(file));
        match splitter.split_with_progress(file, &target_dir, &reporter) {
            Ok(parts) => println!(
                "{} -> {} ({} parts)",
                file.display(),
                target_dir.display().to_string().cyan(),
                parts
            ),
            Err(err) => {
                error!("Failed to split {}: {}", file.display(), err);
                failed += 1;
            }
        }
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_merge(split_dirs: Vec<PathBuf>, recursive: bool, force: bool) -> Result<ExitCode> {
    let split_dirs = if split_dirs.is_empty() {
        let found = find_split_directories(Path::new("."), recursive)
            .context("searching for split directories")?;
        if found.is_empty() {
            println!("{}", "No *-split directories found".yellow());
        }
        found
    } else {
        split_dirs
    };

    let merger = Merger::new().overwrite(force);
    let reporter = CliReporter::new();
    let mut succeeded = 0;
    let mut failed = 0;

    for split_dir in &split_dirs {
        match merger.merge_split_dir(split_dir, &reporter) {
            Ok((output, bytes)) => {
                info!(
                    "Merged {} into {} ({} bytes)",
                    split_dir.display(),
                    output.display(),
                    bytes
                );
                succeeded += 1;
            }
            Err(err) => {
                error!("Failed to merge {}: {}", split_dir.display(), err);
                failed += 1;
            }
        }
    }

    render::print_merge_summary(split_dirs.len(), succeeded, failed);

    Ok(if failed == 0 && succeeded > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
