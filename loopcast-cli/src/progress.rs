// ============================================================================
// loopcast-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Terminal rendering of core events
//
// TerminalProgressHandler turns the core's events into stage headers,
// warnings and an indicatif progress bar for the command currently running.
// Bars are drawn only when stderr is a terminal; otherwise the handler still
// prints stage headers through the logger.
//
// KEY COMPONENTS:
// - TerminalProgressHandler: EventHandler for interactive runs
// - progress_style: bar template chosen by terminal width
//
// AI-ASSISTANT-INFO: indicatif progress bars fed from core events

// ---- External crate imports ----
use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::debug;

// ---- Standard library imports ----
use std::sync::Mutex;
use std::time::Duration;

// ---- Internal crate imports ----
use crate::terminal;
use loopcast_core::events::{Event, EventHandler};
use loopcast_core::utils::format_duration;

/// Bar resolution: positions are tenths of a percent.
const BAR_LENGTH: u64 = 1000;

fn progress_style(term_width: usize) -> ProgressStyle {
    let template = if term_width >= 100 {
        "    ⧖ {msg:<24} {percent:>3}% [{bar:30}] ({elapsed_precise} / {eta_precise})"
    } else if term_width >= 60 {
        "    ⧖ {msg:<16} {percent:>3}% [{bar:20}]"
    } else {
        "    ⧖ {percent:>3}% [{bar:10}]"
    };
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##.")
}

struct State {
    stage_count: usize,
    bar: Option<ProgressBar>,
}

/// Renders events for a person watching the terminal.
pub struct TerminalProgressHandler {
    interactive: bool,
    state: Mutex<State>,
}

impl TerminalProgressHandler {
    pub fn new() -> Self {
        Self {
            interactive: Term::stderr().is_term(),
            state: Mutex::new(State {
                stage_count: 0,
                bar: None,
            }),
        }
    }

    fn new_bar(&self, label: &str) -> ProgressBar {
        let bar = ProgressBar::new(BAR_LENGTH);
        let width = Term::stderr().size().1 as usize;
        bar.set_style(progress_style(width));
        bar.set_message(label.to_string());
        if !self.interactive {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.enable_steady_tick(Duration::from_millis(200));
        bar
    }
}

impl Default for TerminalProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn clear(bar: &mut Option<ProgressBar>) {
    if let Some(bar) = bar.take() {
        bar.finish_and_clear();
    }
}

impl EventHandler for TerminalProgressHandler {
    fn handle(&self, event: &Event) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        match event {
            Event::PipelineStarted {
                stage_count,
                target_duration,
            } => {
                state.stage_count = *stage_count;
                terminal::print_section("Assembly");
                terminal::print_status("Target", &format_duration(*target_duration), true);
            }
            Event::StageStarted { index, stage } => {
                clear(&mut state.bar);
                terminal::print_stage(*index, state.stage_count.max(index + 1), stage);
            }
            Event::StageFailed { .. } | Event::PipelineComplete { .. } => clear(&mut state.bar),
            Event::AssetsScanned {
                kind,
                found,
                skipped,
                total_duration,
            } => {
                let mut line = format!("{found} {kind}(s), {}", format_duration(*total_duration));
                if *skipped > 0 {
                    line.push_str(&format!(", {skipped} skipped"));
                }
                terminal::print_status("Scanned", &line, false);
            }
            Event::SequencePlanned {
                kind,
                entries,
                total_duration,
                ..
            } => {
                terminal::print_status(
                    "Planned",
                    &format!("{entries} {kind}(s), {}", format_duration(*total_duration)),
                    false,
                );
            }
            Event::Progress {
                command,
                percent: Some(percent),
                ..
            } if self.interactive => {
                if state.bar.is_none() {
                    state.bar = Some(self.new_bar(command));
                }
                if let Some(bar) = &state.bar {
                    bar.set_position((percent.clamp(0.0, 100.0) * 10.0) as u64);
                }
            }
            Event::CommandFinished { .. } => clear(&mut state.bar),
            Event::ClipPrepared { current, total, scaled } => {
                debug!("Prepared clip {current}/{total}{}", if *scaled { " (scaled)" } else { "" });
            }
            Event::Warning { message } => {
                if let Some(bar) = &state.bar {
                    bar.suspend(|| terminal::print_warning(message));
                } else {
                    terminal::print_warning(message);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_for_every_width() {
        for width in [40, 80, 120] {
            let bar = ProgressBar::hidden();
            bar.set_style(progress_style(width));
            bar.set_position(10);
        }
    }

    #[test]
    fn test_handler_survives_event_stream_without_terminal() {
        let handler = TerminalProgressHandler {
            interactive: false,
            state: Mutex::new(State {
                stage_count: 0,
                bar: None,
            }),
        };
        handler.handle(&Event::PipelineStarted {
            stage_count: 9,
            target_duration: 60.0,
        });
        handler.handle(&Event::StageStarted {
            index: 2,
            stage: "concat audio".to_string(),
        });
        handler.handle(&Event::Progress {
            command: "ffmpeg (concat)".to_string(),
            percent: Some(50.0),
            snapshot: Default::default(),
        });
        assert!(handler.state.lock().unwrap().bar.is_none());
        assert_eq!(handler.state.lock().unwrap().stage_count, 9);
    }
}
