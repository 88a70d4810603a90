// ============================================================================
// loopcast-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types and Constructors for loopcast-core
//
// This module defines the error taxonomy shared by every component of the
// core library, from command building through the assembly pipeline.
//
// KEY COMPONENTS:
// - CoreError: The single error enum surfaced by all public operations
// - FailureCategory: Coarse, advisory classification of tool failures
// - Helper constructors for process start/failure errors
//
// AI-ASSISTANT-INFO: Error types for the loopcast core library

// ---- External crate imports ----
use thiserror::Error;

// ---- Standard library imports ----
use std::fmt;
use std::io;
use std::time::Duration;

use crate::media::AssetKind;

/// Coarse category attached to a failed external tool invocation.
///
/// Derived from the tool's diagnostic output by signature matching. The
/// category is a hint for humans and logs; callers must branch on the exit
/// status (i.e. on the error variant) first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    Timeout,
    OutOfMemory,
    MalformedInput,
    MissingCodec,
    PermissionDenied,
    IoError,
    Unknown,
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureCategory::Timeout => "timeout",
            FailureCategory::OutOfMemory => "out of memory",
            FailureCategory::MalformedInput => "malformed input",
            FailureCategory::MissingCodec => "missing codec",
            FailureCategory::PermissionDenied => "permission denied",
            FailureCategory::IoError => "I/O error",
            FailureCategory::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Errors produced by the loopcast core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Required tool '{0}' was not found; check the configured path")]
    ToolNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, io::Error),

    #[error("Failed while waiting for command '{0}': {1}")]
    CommandWait(String, io::Error),

    #[error("Command '{command}' timed out after {:.1}s", .elapsed.as_secs_f64())]
    Timeout { command: String, elapsed: Duration },

    /// `stderr` holds the last non-progress diagnostic lines; it is kept out
    /// of the message so logs and events stay one line long.
    #[error(
        "Command '{command}' failed (exit code {}, {category})",
        display_exit_code(.exit_code)
    )]
    ToolFailure {
        command: String,
        exit_code: Option<i32>,
        category: FailureCategory,
        stderr: String,
    },

    #[error("No usable {0} assets to plan a sequence from")]
    EmptyPool(AssetKind),

    #[error("Invalid target duration: {0}")]
    InvalidTarget(f64),

    #[error("Failed to parse ffprobe output: {0}")]
    ProbeParse(String),

    #[error("JSON error: {0}")]
    JsonParseError(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("No processable media files found")]
    NoFilesFound,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Stage {index} ({stage}) failed: {source}")]
    StageFailed {
        index: usize,
        stage: &'static str,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Returns the advisory failure category for errors that carry one.
    #[must_use]
    pub fn category(&self) -> Option<FailureCategory> {
        match self {
            CoreError::ToolFailure { category, .. } => Some(*category),
            CoreError::Timeout { .. } => Some(FailureCategory::Timeout),
            CoreError::Io(_) => Some(FailureCategory::IoError),
            CoreError::StageFailed { source, .. } => source.category(),
            _ => None,
        }
    }

    /// Whether retrying the same invocation can never succeed.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            CoreError::ToolNotFound(_) | CoreError::EmptyPool(_) | CoreError::InvalidTarget(_) => {
                true
            }
            CoreError::StageFailed { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::JsonParseError(err.to_string())
    }
}

fn display_exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Result type for loopcast-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds the error for a process that could not be spawned.
///
/// A missing executable becomes `ToolNotFound`; anything else keeps the
/// underlying I/O error.
pub fn command_start_error(cmd_name: impl Into<String>, err: io::Error) -> CoreError {
    let cmd_name = cmd_name.into();
    if err.kind() == io::ErrorKind::NotFound {
        CoreError::ToolNotFound(cmd_name)
    } else {
        CoreError::CommandStart(cmd_name, err)
    }
}

/// Builds the error for a process that exited unsuccessfully.
pub fn command_failed_error(
    cmd_name: impl Into<String>,
    exit_code: Option<i32>,
    category: FailureCategory,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::ToolFailure {
        command: cmd_name.into(),
        exit_code,
        category,
        stderr: stderr.into(),
    }
}

/// Builds the error for a failure while waiting on a running process.
pub fn command_wait_error(cmd_name: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd_name.into(), err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_tool_not_found() {
        let err = command_start_error("ffmpeg", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, CoreError::ToolNotFound(ref name) if name == "ffmpeg"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_other_start_errors_are_kept() {
        let err = command_start_error(
            "ffmpeg",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, CoreError::CommandStart(_, _)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_stage_failure_exposes_inner_category() {
        let inner = command_failed_error("ffmpeg", Some(1), FailureCategory::MissingCodec, "x");
        let err = CoreError::StageFailed {
            index: 4,
            stage: "prepare clips",
            source: Box::new(inner),
        };
        assert_eq!(err.category(), Some(FailureCategory::MissingCodec));
        assert!(err.to_string().starts_with("Stage 4 (prepare clips) failed"));
    }

    #[test]
    fn test_tool_failure_display_omits_diagnostics() {
        let err = command_failed_error(
            "ffmpeg (concat)",
            Some(1),
            FailureCategory::IoError,
            "a.mp4: No such file or directory\nConversion failed!",
        );
        assert_eq!(
            err.to_string(),
            "Command 'ffmpeg (concat)' failed (exit code 1, I/O error)"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = CoreError::Timeout {
            command: "ffmpeg (encode)".to_string(),
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "Command 'ffmpeg (encode)' timed out after 1.5s");
        assert_eq!(err.category(), Some(FailureCategory::Timeout));
    }
}
