// ============================================================================
// loopcast-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and run-log dispatch through fern
//
// Every message goes through the `log` facade. The console receives bare
// messages (warnings and errors prefixed) on stderr so that stdout stays free
// for machine-readable output; the run log, when a directory is given, gets
// every message with a timestamp, level and target.
//
// KEY COMPONENTS:
// - init_logging: installs the global logger
// - get_timestamp: log file name timestamps
//
// USAGE:
// - default: info and above on the console
// - --verbose: debug on the console
// - RUST_LOG=trace: overrides the console level (the run log always records
//   debug and above)
//
// AI-ASSISTANT-INFO: fern-based console + file logging for the CLI

// ---- External crate imports ----
use log::LevelFilter;

// ---- Standard library imports ----
use std::fs;
use std::path::{Path, PathBuf};

// ---- Internal crate imports ----
use loopcast_core::{CoreError, CoreResult};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Console level from `--verbose`, overridden by a parseable `RUST_LOG`.
pub fn console_level(verbose: bool) -> LevelFilter {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|value| value.trim().parse::<LevelFilter>().ok())
        .unwrap_or(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
}

/// Installs the global logger.
///
/// With `log_dir`, a `loopcast_run_<timestamp>.log` file is created there and
/// its path returned.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> CoreResult<Option<PathBuf>> {
    let console_level = console_level(verbose);

    let console = fern::Dispatch::new()
        .level(console_level)
        .format(|out, message, record| match record.level() {
            log::Level::Error => out.finish(format_args!("Error: {message}")),
            log::Level::Warn => out.finish(format_args!("Warning: {message}")),
            _ => out.finish(format_args!("{message}")),
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new()
        // The file may record more than the console shows.
        .level(console_level.max(LevelFilter::Debug))
        .chain(console);

    let mut log_path = None;
    if let Some(dir) = log_dir {
        fs::create_dir_all(dir).map_err(|e| {
            CoreError::PathError(format!(
                "Failed to create log directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
        let path = dir.join(format!("loopcast_run_{}.log", get_timestamp()));
        let file = fern::log_file(&path)?;
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "[{} {:<5} {}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                        record.level(),
                        record.target(),
                        message
                    ))
                })
                .chain(file),
        );
        log_path = Some(path);
    }

    dispatch
        .apply()
        .map_err(|e| CoreError::Config(format!("logger already initialised: {e}")))?;
    Ok(log_path)
}
