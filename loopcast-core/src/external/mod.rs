// ============================================================================
// loopcast-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with the ffmpeg and ffprobe executables
//
// This module is the only place that knows how the wrapped media tools are
// invoked. Commands are built as plain values, executed behind the
// CommandExecutor trait (so tests can substitute a fake), and probe reports
// are parsed into typed values.
//
// KEY COMPONENTS:
// - ffmpeg_builder: Operation kinds and CommandSpec construction
// - ffmpeg_executor: ProcessRunner with timeout and failure classification
// - ffprobe_executor: Probe helpers and report parsing
// - Dependency checking functions
//
// AI-ASSISTANT-INFO: External tool interactions and abstractions for ffmpeg/ffprobe

// ---- Internal crate imports ----
use crate::error::{command_failed_error, command_start_error, CoreResult, FailureCategory};

// ---- Standard library imports ----
use std::path::Path;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Argument building for every supported operation
pub mod ffmpeg_builder;

/// Subprocess execution with timeout and progress reporting
pub mod ffmpeg_executor;

/// Probe helpers built on the executor
pub mod ffprobe_executor;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_builder::{
    CommandBuilder, CommandOptions, CommandSpec, EncodeDefaults, Operation, ToolPaths,
};
pub use ffmpeg_executor::{
    classify_failure, CommandExecutor, ProcessResult, ProcessRunner, RunOptions,
};
pub use ffprobe_executor::{probe_dimensions, probe_media, Dimensions, MediaInfo};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Versions reported by the configured tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVersions {
    pub ffmpeg: String,
    pub ffprobe: String,
}

/// Checks that an executable exists and answers `-version`.
///
/// Returns the first line of its version banner. A missing executable is
/// `ToolNotFound`; one that runs but fails is a `ToolFailure`.
pub fn check_dependency(program: &Path) -> CoreResult<String> {
    let name = program.display().to_string();
    let output = Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            log::warn!("Dependency '{name}' could not be started: {e}");
            command_start_error(name.clone(), e)
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        return Err(command_failed_error(
            name,
            output.status.code(),
            FailureCategory::Unknown,
            stderr,
        ));
    }

    let banner = String::from_utf8_lossy(&output.stdout);
    let first_line = banner.lines().next().unwrap_or_default().trim().to_string();
    log::debug!("Found dependency {name}: {first_line}");
    Ok(first_line)
}

/// Checks both tools. ffmpeg's version is read with `ffmpeg-sidecar`'s
/// parser once the executable is known to start.
pub fn check_tools(tools: &ffmpeg_builder::ToolPaths) -> CoreResult<ToolVersions> {
    let banner = check_dependency(&tools.ffmpeg)?;
    let ffmpeg = ffmpeg_sidecar::version::ffmpeg_version_with_path(&tools.ffmpeg)
        .unwrap_or_else(|e| {
            log::debug!("Could not parse ffmpeg version ({e}), using banner");
            banner
        });
    let ffprobe = check_dependency(&tools.ffprobe)?;
    Ok(ToolVersions { ffmpeg, ffprobe })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_missing_dependency_is_tool_not_found() {
        let err = check_dependency(Path::new("/nonexistent/bin/ffmpeg-loopcast")).unwrap_err();
        assert!(matches!(err, CoreError::ToolNotFound(_)));
    }
}
