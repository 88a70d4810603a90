//! Implementation of the 'check' subcommand.

use crate::cli::ToolArgs;
use crate::commands::tool_paths;
use crate::error::CliResult;
use crate::terminal;

use loopcast_core::check_tools;

/// Runs both tools and prints their versions.
pub fn run_check(args: &ToolArgs) -> CliResult<()> {
    let tools = tool_paths(args);
    terminal::print_section("Dependencies");
    terminal::print_status("ffmpeg path", &tools.ffmpeg.display().to_string(), false);
    terminal::print_status("ffprobe path", &tools.ffprobe.display().to_string(), false);

    let versions = check_tools(&tools)?;
    terminal::print_status("ffmpeg", &versions.ffmpeg, true);
    terminal::print_status("ffprobe", &versions.ffprobe, true);
    terminal::print_success("External dependency check passed");
    Ok(())
}
