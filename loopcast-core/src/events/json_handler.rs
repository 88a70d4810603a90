//! JSON progress handler for structured progress output
//!
//! Writes one JSON object per line for every event, so a supervising process
//! can follow a long assembly run without scraping log text.

use super::{Event, EventHandler};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Event handler that outputs events as structured JSON lines
pub struct JsonProgressHandler {
    output: Mutex<Box<dyn Write + Send>>,
    last_percent: Mutex<Option<(String, u32)>>,
}

impl JsonProgressHandler {
    /// Create a new JSON progress handler that writes to stdout
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    /// Create a new JSON progress handler with a custom writer
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(writer),
            last_percent: Mutex::new(None),
        }
    }

    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_json(&self, value: serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            if let Ok(json_str) = serde_json::to_string(&value) {
                let _ = writeln!(output, "{}", json_str);
                let _ = output.flush();
            }
        }
    }

    /// Progress is written at most once per whole percent per command.
    fn should_write_progress(&self, command: &str, percent: Option<f64>) -> bool {
        let Some(percent) = percent else {
            return true;
        };
        let whole = percent.max(0.0) as u32;
        let Ok(mut last) = self.last_percent.lock() else {
            return true;
        };
        match last.as_ref() {
            Some((cmd, p)) if cmd == command && *p == whole => false,
            _ => {
                *last = Some((command.to_string(), whole));
                true
            }
        }
    }
}

impl Default for JsonProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for JsonProgressHandler {
    fn handle(&self, event: &Event) {
        let timestamp = Self::get_timestamp();

        let value = match event {
            Event::PipelineStarted {
                stage_count,
                target_duration,
            } => json!({
                "type": "pipeline_started",
                "stage_count": stage_count,
                "target_duration": target_duration,
                "timestamp": timestamp
            }),

            Event::StageStarted { index, stage } => json!({
                "type": "stage_started",
                "index": index,
                "stage": stage,
                "timestamp": timestamp
            }),

            Event::StageCompleted {
                index,
                stage,
                elapsed,
            } => json!({
                "type": "stage_completed",
                "index": index,
                "stage": stage,
                "elapsed_seconds": elapsed.as_secs_f64(),
                "timestamp": timestamp
            }),

            Event::StageFailed {
                index,
                stage,
                message,
                category,
            } => json!({
                "type": "stage_failed",
                "index": index,
                "stage": stage,
                "message": message,
                "category": category,
                "timestamp": timestamp
            }),

            Event::PipelineComplete {
                output_path,
                tracklist_path,
                duration,
                elapsed,
            } => json!({
                "type": "pipeline_complete",
                "output_path": output_path,
                "tracklist_path": tracklist_path,
                "duration": duration,
                "elapsed_seconds": elapsed.as_secs_f64(),
                "timestamp": timestamp
            }),

            Event::CommandStarted {
                command,
                command_line,
            } => json!({
                "type": "command_started",
                "command": command,
                "command_line": command_line,
                "timestamp": timestamp
            }),

            Event::CommandFinished {
                command,
                exit_code,
                elapsed,
            } => json!({
                "type": "command_finished",
                "command": command,
                "exit_code": exit_code,
                "elapsed_seconds": elapsed.as_secs_f64(),
                "timestamp": timestamp
            }),

            Event::Progress {
                command,
                percent,
                snapshot,
            } => {
                if !self.should_write_progress(command, *percent) {
                    return;
                }
                json!({
                    "type": "progress",
                    "command": command,
                    "percent": percent,
                    "elapsed_seconds": snapshot.elapsed_secs,
                    "frame": snapshot.frame,
                    "fps": snapshot.fps,
                    "size_kb": snapshot.size_kb,
                    "bitrate_kbps": snapshot.bitrate_kbps,
                    "eta_seconds": snapshot.eta.map(|d| d.as_secs()),
                    "timestamp": timestamp
                })
            }

            Event::AssetsScanned {
                kind,
                found,
                skipped,
                total_duration,
            } => json!({
                "type": "assets_scanned",
                "kind": kind,
                "found": found,
                "skipped": skipped,
                "total_duration": total_duration,
                "timestamp": timestamp
            }),

            Event::SequencePlanned {
                kind,
                entries,
                total_duration,
                target_duration,
            } => json!({
                "type": "sequence_planned",
                "kind": kind,
                "entries": entries,
                "total_duration": total_duration,
                "target_duration": target_duration,
                "timestamp": timestamp
            }),

            Event::ClipPrepared {
                current,
                total,
                scaled,
            } => json!({
                "type": "clip_prepared",
                "current": current,
                "total": total,
                "scaled": scaled,
                "timestamp": timestamp
            }),

            Event::Warning { message } => json!({
                "type": "warning",
                "message": message,
                "timestamp": timestamp
            }),
        };

        self.write_json(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressSnapshot;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn lines(buffer: &SharedBuffer) -> Vec<serde_json::Value> {
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_stage_events_are_json_lines() {
        let buffer = SharedBuffer::default();
        let handler = JsonProgressHandler::with_writer(Box::new(buffer.clone()));

        handler.handle(&Event::StageStarted {
            index: 2,
            stage: "concat audio".to_string(),
        });
        handler.handle(&Event::StageFailed {
            index: 2,
            stage: "concat audio".to_string(),
            message: "boom".to_string(),
            category: Some(crate::error::FailureCategory::MissingCodec),
        });

        let values = lines(&buffer);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["type"], "stage_started");
        assert_eq!(values[0]["index"], 2);
        assert_eq!(values[1]["category"], "missing_codec");
    }

    #[test]
    fn test_progress_is_throttled_per_percent() {
        let buffer = SharedBuffer::default();
        let handler = JsonProgressHandler::with_writer(Box::new(buffer.clone()));
        let progress = |percent: f64| Event::Progress {
            command: "ffmpeg (encode)".to_string(),
            percent: Some(percent),
            snapshot: ProgressSnapshot::default(),
        };

        handler.handle(&progress(10.2));
        handler.handle(&progress(10.7));
        handler.handle(&progress(11.0));

        let values = lines(&buffer);
        assert_eq!(values.len(), 2);
        assert_eq!(values[1]["percent"], 11.0);
    }
}
