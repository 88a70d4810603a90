// ============================================================================
// loopcast-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Result alias, exit codes and failure reporting
//
// The CLI does not define its own error type; commands return CoreError and
// main turns it into a report on the console plus a process exit code.
//
// KEY COMPONENTS:
// - CliResult: Type alias for CLI operations
// - exit_code: exit status per error kind
// - failure_details: the lines printed for a failed run
//
// AI-ASSISTANT-INFO: CLI error handling utilities

// ---- Internal crate imports ----
use loopcast_core::{CoreError, CoreResult};

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Exit status for a failed command.
///
/// * 2 - bad configuration or input paths
/// * 3 - ffmpeg or ffprobe could not be started
/// * 4 - a command timed out
/// * 1 - anything else
pub fn exit_code(error: &CoreError) -> i32 {
    match error {
        CoreError::Config(_) | CoreError::PathError(_) | CoreError::NoFilesFound => 2,
        CoreError::ToolNotFound(_) => 3,
        CoreError::Timeout { .. } => 4,
        CoreError::StageFailed { source, .. } => exit_code(source),
        _ => 1,
    }
}

/// Label/value lines describing a failure, innermost cause last.
pub fn failure_details(error: &CoreError) -> Vec<(&'static str, String)> {
    let mut details = Vec::new();
    let mut current = error;
    if let CoreError::StageFailed { index, stage, source } = error {
        details.push(("Stage", format!("{index} ({stage})")));
        current = source;
    }
    if let Some(category) = current.category() {
        details.push(("Category", category.to_string()));
    }
    match current {
        CoreError::ToolFailure {
            command,
            exit_code,
            stderr,
            ..
        } => {
            details.push(("Command", command.clone()));
            details.push((
                "Exit code",
                exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
            ));
            if let Some(line) = stderr.lines().rev().find(|l| !l.trim().is_empty()) {
                details.push(("Last output", line.trim().to_string()));
            }
        }
        other => details.push(("Message", other.to_string())),
    }
    details
}

/// A hint for errors the user can fix directly.
pub fn suggestion(error: &CoreError) -> Option<&'static str> {
    match error {
        CoreError::StageFailed { source, .. } => suggestion(source),
        CoreError::ToolNotFound(_) => {
            Some(
                "Install ffmpeg or point --ffmpeg/--ffprobe \
                 (LOOPCAST_FFMPEG/LOOPCAST_FFPROBE) at it",
            )
        }
        CoreError::NoFilesFound => Some("Check the clip and music directories for supported files"),
        CoreError::Timeout { .. } => Some("Raise --timeout for very long outputs"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loopcast_core::error::command_failed_error;
    use loopcast_core::FailureCategory;

    #[test]
    fn test_stage_failure_details() {
        let err = CoreError::StageFailed {
            index: 6,
            stage: "mux",
            source: Box::new(command_failed_error(
                "ffmpeg (add_audio)",
                Some(1),
                FailureCategory::IoError,
                "frame=1\nout.mp4: No space left on device\n",
            )),
        };
        let details = failure_details(&err);
        assert_eq!(details[0], ("Stage", "6 (mux)".to_string()));
        assert_eq!(details[1], ("Category", "I/O error".to_string()));
        assert!(details.contains(&("Last output", "out.mp4: No space left on device".to_string())));
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&CoreError::ToolNotFound("ffmpeg".into())), 3);
        assert_eq!(exit_code(&CoreError::Config("bad".into())), 2);
        let wrapped = CoreError::StageFailed {
            index: 0,
            stage: "scan inputs",
            source: Box::new(CoreError::NoFilesFound),
        };
        assert_eq!(exit_code(&wrapped), 2);
        assert!(suggestion(&wrapped).is_some());
    }
}
