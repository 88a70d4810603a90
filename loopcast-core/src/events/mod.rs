//! Event-based observation of core operations
//!
//! Components never write to the terminal themselves. They emit [`Event`]s
//! through an [`EventDispatcher`] that the caller passes in explicitly, and
//! the caller decides what handlers to attach (progress bars, JSON lines,
//! a recorder in tests).

use std::sync::Arc;
use std::time::Duration;

use crate::error::FailureCategory;
use crate::media::AssetKind;
use crate::progress::ProgressSnapshot;

pub mod json_handler;

#[derive(Debug, Clone)]
pub enum Event {
    // Pipeline lifecycle
    PipelineStarted {
        stage_count: usize,
        target_duration: f64,
    },
    StageStarted {
        index: usize,
        stage: String,
    },
    StageCompleted {
        index: usize,
        stage: String,
        elapsed: Duration,
    },
    StageFailed {
        index: usize,
        stage: String,
        message: String,
        category: Option<FailureCategory>,
    },
    PipelineComplete {
        output_path: String,
        tracklist_path: String,
        duration: f64,
        elapsed: Duration,
    },

    // External commands
    CommandStarted {
        command: String,
        command_line: String,
    },
    CommandFinished {
        command: String,
        exit_code: Option<i32>,
        elapsed: Duration,
    },
    Progress {
        command: String,
        percent: Option<f64>,
        snapshot: ProgressSnapshot,
    },

    // Media
    AssetsScanned {
        kind: AssetKind,
        found: usize,
        skipped: usize,
        total_duration: f64,
    },
    SequencePlanned {
        kind: AssetKind,
        entries: usize,
        total_duration: f64,
        target_duration: f64,
    },
    ClipPrepared {
        current: usize,
        total: usize,
        scaled: bool,
    },

    Warning {
        message: String,
    },
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event);
}

pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn emit(&self, event: Event) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }

    pub fn has_handlers(&self) -> bool {
        !self.handlers.is_empty()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps every event it sees. Useful for asserting on emitted events.
#[derive(Default)]
pub struct EventRecorder {
    events: std::sync::Mutex<Vec<Event>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the events received so far, in emission order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl EventHandler for EventRecorder {
    fn handle(&self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatcher_fans_out_in_order() {
        let first = Arc::new(EventRecorder::new());
        let second = Arc::new(EventRecorder::new());
        let mut dispatcher = EventDispatcher::new();
        assert!(!dispatcher.has_handlers());
        dispatcher.add_handler(first.clone());
        dispatcher.add_handler(second.clone());

        dispatcher.emit(Event::Warning {
            message: "one".to_string(),
        });
        dispatcher.emit(Event::StageStarted {
            index: 0,
            stage: "scan".to_string(),
        });

        for recorder in [&first, &second] {
            let events = recorder.events();
            assert_eq!(events.len(), 2);
            assert!(matches!(&events[0], Event::Warning { message } if message == "one"));
            assert!(matches!(&events[1], Event::StageStarted { index: 0, .. }));
        }
    }
}
