use std::env;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/splitpack.log";

/// Filter used when `TRACING_LEVEL` is unset. Dependencies stay at `warn`;
/// each `-v` raises the level of this crate and the core library.
fn default_filter(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("warn,splitpack={level},splitpack_core={level}")
}

/// Install stdout and file logging. Keep the returned guard alive for the
/// life of the process or buffered file output is lost.
pub fn init_logger(verbose: u8) -> WorkerGuard {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| default_filter(verbose));
    let filter_layer = EnvFilter::new(&filter);

    let log_file_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());

    let file_appender = tracing_appender::rolling::never("./", &log_file_path);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .pretty()
                .with_file(false)
                .with_target(verbose > 0)
                .without_time()
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter_layer)
        .init();

    debug!("Log filter: {}", filter);
    info!("Logging to {}", log_file_path);

    guard
}
