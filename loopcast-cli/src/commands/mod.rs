//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Dependency check for ffmpeg and ffprobe.
pub mod check;

/// The full assembly run.
pub mod generate;

/// Probing a media directory, optionally saving a songlist.
pub mod scan;

use crate::cli::ToolArgs;
use loopcast_core::ToolPaths;

/// Tool paths from the flags, falling back to the default lookup per tool.
pub fn tool_paths(args: &ToolArgs) -> ToolPaths {
    let defaults = ToolPaths::default();
    ToolPaths {
        ffmpeg: args.ffmpeg.clone().unwrap_or(defaults.ffmpeg),
        ffprobe: args.ffprobe.clone().unwrap_or(defaults.ffprobe),
    }
}
