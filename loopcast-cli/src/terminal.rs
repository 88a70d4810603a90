//! Terminal output styling for loopcast.
//!
//! Human-facing lines are emitted through the `log` facade so they reach the
//! console and the run log alike. Color is applied only when stderr is a
//! terminal, `NO_COLOR` is unset and `--no-color` was not given.

use console::{style, Term};
use log::info;
use owo_colors::OwoColorize;
use std::sync::atomic::{AtomicBool, Ordering};

static COLOR_DISABLED: AtomicBool = AtomicBool::new(false);

/// Turns color off for the rest of the process.
pub fn disable_color() {
    COLOR_DISABLED.store(true, Ordering::Relaxed);
}

pub fn should_use_color() -> bool {
    !COLOR_DISABLED.load(Ordering::Relaxed)
        && std::env::var_os("NO_COLOR").is_none()
        && Term::stderr().is_term()
}

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
    info!("");
}

/// Print a pipeline stage header, e.g. `» [3/9] concat audio`
pub fn print_stage(index: usize, count: usize, name: &str) {
    let position = format!("[{}/{}]", index + 1, count);
    if should_use_color() {
        info!("  » {} {}", position.dimmed(), style(name).bold());
    } else {
        info!("  » {position} {name}");
    }
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let label_width: usize = 15;
    let padding = label_width.saturating_sub(label.chars().count()).max(1);
    if should_use_color() && highlight {
        info!("      {}:{} {}", label, " ".repeat(padding), value.bold());
    } else {
        info!("      {}:{} {}", label, " ".repeat(padding), value);
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    info!("");
    if should_use_color() {
        info!("  ✓ {}", message.green());
    } else {
        info!("  ✓ {message}");
    }
}

/// Print a warning message
pub fn print_warning(message: &str) {
    if should_use_color() {
        info!("  ⚠ {}", message.yellow());
    } else {
        info!("  ⚠ {message}");
    }
}

/// Print an error message with optional details and suggestion
pub fn print_error(title: &str, details: &[(&str, String)], suggestion: Option<&str>) {
    info!("");
    if should_use_color() {
        info!("✗ {}", title.red().bold());
    } else {
        info!("✗ {title}");
    }
    for (label, value) in details {
        print_status(label, value, false);
    }
    if let Some(suggestion) = suggestion {
        info!("");
        info!("  Suggestion: {suggestion}");
    }
    info!("");
}
