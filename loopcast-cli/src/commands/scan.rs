//! Implementation of the 'scan' subcommand.
//!
//! Probes every clip or track in a directory, prints what was found and can
//! save a track pool as a songlist so later runs skip the probing.

use crate::cli::ScanArgs;
use crate::commands::tool_paths;
use crate::error::CliResult;
use crate::terminal;

use loopcast_core::events::EventDispatcher;
use loopcast_core::external::{CommandBuilder, ProcessRunner};
use loopcast_core::media::{scan_assets, write_songlist, ScanReport};
use loopcast_core::utils::{format_duration, format_minutes};
use loopcast_core::{AssetKind, CoreError, Songlist};

use log::info;
use std::env;
use std::time::Duration;

/// Probes `args.dir` and reports the usable assets.
pub fn run_scan(args: ScanArgs) -> CliResult<ScanReport> {
    let kind = AssetKind::from(args.kind);
    if args.write_songlist.is_some() && kind != AssetKind::Track {
        return Err(CoreError::Config(
            "--write-songlist requires --kind tracks".to_string(),
        ));
    }

    let tools = tool_paths(&args.tools);
    let builder = CommandBuilder::new(tools, env::temp_dir());
    let probe_timeout = Duration::from_secs(loopcast_core::config::DEFAULT_PROBE_TIMEOUT_SECS);
    let events = EventDispatcher::new();

    terminal::print_section(&format!("Scanning {kind}s"));
    terminal::print_status("Directory", &args.dir.display().to_string(), false);

    let runner = ProcessRunner::new();
    let report = scan_assets(&args.dir, kind, &runner, &builder, probe_timeout, &events)?;

    for asset in &report.assets {
        info!(
            "    {}  {}",
            format_minutes(asset.duration),
            asset.display_title()
        );
    }
    for (path, reason) in &report.skipped {
        terminal::print_warning(&format!("{}: {reason}", path.display()));
    }

    terminal::print_status("Usable", &report.assets.len().to_string(), true);
    terminal::print_status("Skipped", &report.skipped.len().to_string(), false);
    terminal::print_status("Total", &format_duration(report.total_duration()), true);

    if let Some(path) = &args.write_songlist {
        let songlist = Songlist::from_tracks(report.assets.clone());
        write_songlist(&songlist, path)?;
        terminal::print_success(&format!(
            "Saved songlist with {} tracks to {}",
            songlist.songs.len(),
            path.display()
        ));
    }

    Ok(report)
}
