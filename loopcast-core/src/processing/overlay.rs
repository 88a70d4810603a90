//! "Now playing" text overlay.
//!
//! Each track gets one `drawtext` filter, enabled for a short window from the
//! moment the track starts, with its opacity following a fade-in, hold,
//! fade-out envelope. All of them are chained into a single filter so the
//! video is re-encoded once.

use crate::config::OverlayConfig;
use crate::utils::format_seconds_arg;

/// Text to show and when its track starts, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayCue {
    pub text: String,
    pub start: f64,
}

/// Escapes a value for one `key=value` filter option.
fn escape_option_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes an already option-escaped value for the filtergraph parser.
fn escape_filtergraph(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | '[' | ']' | ',' | ';') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes arbitrary text so it survives both filter parsing levels.
#[must_use]
pub fn escape_filter_text(text: &str) -> String {
    escape_filtergraph(&escape_option_value(text))
}

/// Opacity envelope relative to `start`; hold at 1, linear ramps at both
/// ends. A zero-length ramp is skipped.
fn alpha_expression(start: f64, config: &OverlayConfig) -> String {
    let fade_in_end = start + config.fade_in;
    let hold_end = fade_in_end + config.hold;
    let end = hold_end + config.fade_out;

    let tail = if config.fade_out > 0.0 {
        format!(
            "if(lt(t,{}),1,({}-t)/{})",
            format_seconds_arg(hold_end),
            format_seconds_arg(end),
            format_seconds_arg(config.fade_out)
        )
    } else {
        "1".to_string()
    };

    if config.fade_in > 0.0 {
        format!(
            "if(lt(t,{}),(t-{})/{},{})",
            format_seconds_arg(fade_in_end),
            format_seconds_arg(start),
            format_seconds_arg(config.fade_in),
            tail
        )
    } else {
        tail
    }
}

/// One `drawtext` filter for `cue`.
#[must_use]
pub fn drawtext_filter(cue: &OverlayCue, config: &OverlayConfig) -> String {
    let end = cue.start + config.display_duration();
    let mut filter = format!(
        "drawtext=text={}:expansion=none:fontsize={}:fontcolor={}:x=(w-text_w)/2:y=h-th-10",
        escape_filter_text(cue.text.trim()),
        config.font_size,
        escape_filter_text(&config.font_color),
    );
    if let Some(font) = &config.font_file {
        filter.push_str(":fontfile=");
        filter.push_str(&escape_filter_text(&font.to_string_lossy()));
    }
    filter.push_str(&format!(
        ":enable='between(t,{},{})':alpha='{}'",
        format_seconds_arg(cue.start),
        format_seconds_arg(end),
        alpha_expression(cue.start, config)
    ));
    filter
}

/// The chained overlay filter for every cue starting before `limit`.
///
/// Returns `None` when overlays are disabled or no cue falls inside the video.
#[must_use]
pub fn overlay_filter(cues: &[OverlayCue], config: &OverlayConfig, limit: f64) -> Option<String> {
    if !config.enabled {
        return None;
    }
    let filters: Vec<String> = cues
        .iter()
        .filter(|cue| cue.start < limit && !cue.text.trim().is_empty())
        .map(|cue| drawtext_filter(cue, config))
        .collect();
    (!filters.is_empty()).then(|| filters.join(","))
}
