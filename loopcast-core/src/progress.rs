// ============================================================================
// loopcast-core/src/progress.rs
// ============================================================================
//
// PROGRESS PARSING: Structured progress from FFmpeg's stats output
//
// FFmpeg reports progress on stderr as lines such as
//   frame=  150 fps= 25 q=28.0 size=    1024kB time=00:01:30.00 bitrate= 93.2kbits/s speed=1.0x
// This module extracts the individual fields with independent patterns so a
// line may update any subset of them, and derives an ETA against a known
// total duration.
//
// KEY COMPONENTS:
// - ProgressUpdate: fields found on a single line
// - ProgressSnapshot: most recent value of every field plus the ETA
// - ProgressParser: incremental parser fed one line at a time
//
// AI-ASSISTANT-INFO: Pure text parsing, no I/O; the runner feeds it lines

// ---- External crate imports ----
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// ---- Standard library imports ----
use std::time::{Duration, Instant};

// ---- Internal crate imports ----
use crate::utils::parse_ffmpeg_time;

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"time=(\d{2,}:\d{2}:\d{2}(?:\.\d+)?)").expect("valid time regex"));
static FRAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"frame=\s*(\d+)").expect("valid frame regex"));
static FPS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"fps=\s*(\d+(?:\.\d+)?)").expect("valid fps regex"));
static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"size=\s*(\d+)\s*(?:kB|KiB)").expect("valid size regex"));
static BITRATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"bitrate=\s*(\d+(?:\.\d+)?)\s*kbits/s").expect("valid bitrate regex")
});

/// Fields recognised on one line of tool output. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressUpdate {
    /// Media time processed so far, in seconds.
    pub elapsed_secs: Option<f64>,
    pub frame: Option<u64>,
    pub fps: Option<f64>,
    /// Output size in kilobytes.
    pub size_kb: Option<u64>,
    /// Bitrate in kbit/s.
    pub bitrate_kbps: Option<f64>,
}

impl ProgressUpdate {
    /// Extracts every recognised field from `line`.
    #[must_use]
    pub fn from_line(line: &str) -> Self {
        Self {
            elapsed_secs: TIME_RE
                .captures(line)
                .and_then(|c| parse_ffmpeg_time(&c[1])),
            frame: FRAME_RE.captures(line).and_then(|c| c[1].parse().ok()),
            fps: FPS_RE.captures(line).and_then(|c| c[1].parse().ok()),
            size_kb: SIZE_RE.captures(line).and_then(|c| c[1].parse().ok()),
            bitrate_kbps: BITRATE_RE.captures(line).and_then(|c| c[1].parse().ok()),
        }
    }

    /// True when the line matched none of the patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elapsed_secs.is_none()
            && self.frame.is_none()
            && self.fps.is_none()
            && self.size_kb.is_none()
            && self.bitrate_kbps.is_none()
    }
}

/// The latest known value of each progress field.
///
/// Superseded by the next snapshot; no history is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub elapsed_secs: Option<f64>,
    pub frame: Option<u64>,
    pub fps: Option<f64>,
    pub size_kb: Option<u64>,
    pub bitrate_kbps: Option<f64>,
    /// Estimated wall-clock time remaining.
    #[serde(serialize_with = "serialize_eta")]
    pub eta: Option<Duration>,
}

fn serialize_eta<S: serde::Serializer>(eta: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match eta {
        Some(d) => s.serialize_some(&d.as_secs_f64()),
        None => s.serialize_none(),
    }
}

/// Incremental progress parser for one command invocation.
#[derive(Debug, Clone)]
pub struct ProgressParser {
    total_secs: Option<f64>,
    started: Instant,
    snapshot: ProgressSnapshot,
}

impl ProgressParser {
    /// `total_secs` is the expected media duration of the output, if known.
    /// The wall clock used for the ETA starts now.
    #[must_use]
    pub fn new(total_secs: Option<f64>) -> Self {
        Self {
            total_secs,
            started: Instant::now(),
            snapshot: ProgressSnapshot::default(),
        }
    }

    /// Parses one line using the wall time elapsed since construction.
    pub fn parse_line(&mut self, line: &str) -> ProgressUpdate {
        let wall = self.started.elapsed();
        self.parse_line_at(line, wall)
    }

    /// Parses one line as if `wall_elapsed` had passed since the start.
    ///
    /// Fields present on the line replace the snapshot's values; absent fields
    /// keep their previous values. The ETA is recomputed only when a time
    /// field was found.
    pub fn parse_line_at(&mut self, line: &str, wall_elapsed: Duration) -> ProgressUpdate {
        let update = ProgressUpdate::from_line(line);
        if update.is_empty() {
            return update;
        }

        let snap = &mut self.snapshot;
        if let Some(elapsed) = update.elapsed_secs {
            snap.elapsed_secs = Some(elapsed);
            snap.eta = self
                .total_secs
                .and_then(|total| estimate_remaining(wall_elapsed, total, elapsed));
        }
        if update.frame.is_some() {
            snap.frame = update.frame;
        }
        if update.fps.is_some() {
            snap.fps = update.fps;
        }
        if update.size_kb.is_some() {
            snap.size_kb = update.size_kb;
        }
        if update.bitrate_kbps.is_some() {
            snap.bitrate_kbps = update.bitrate_kbps;
        }
        update
    }

    #[must_use]
    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn total_secs(&self) -> Option<f64> {
        self.total_secs
    }

    /// Parsed elapsed time as a percentage of the total.
    ///
    /// Not clamped: output longer than the expected total reports more than
    /// 100. Returns 0 when the total is unset or zero.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        match self.total_secs {
            Some(total) if total > 0.0 => {
                self.snapshot.elapsed_secs.unwrap_or(0.0) / total * 100.0
            }
            _ => 0.0,
        }
    }
}

/// `wall * total / parsed - wall`, or `None` before any media time has been
/// processed. Negative estimates (output longer than expected) become zero.
#[must_use]
pub fn estimate_remaining(
    wall_elapsed: Duration,
    total_secs: f64,
    parsed_secs: f64,
) -> Option<Duration> {
    if parsed_secs <= 0.0 || total_secs <= 0.0 {
        return None;
    }
    let wall = wall_elapsed.as_secs_f64();
    let remaining = wall * total_secs / parsed_secs - wall;
    if !remaining.is_finite() {
        return None;
    }
    Some(Duration::from_secs_f64(remaining.max(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS_LINE: &str = concat!(
        "frame=  150 fps= 25.0 q=28.0 size=    1024kB ",
        "time=00:01:30.00 bitrate=  93.2kbits/s speed=1.0x"
    );

    #[test]
    fn test_parse_full_stats_line() {
        let update = ProgressUpdate::from_line(STATS_LINE);
        assert_eq!(update.elapsed_secs, Some(90.0));
        assert_eq!(update.frame, Some(150));
        assert_eq!(update.fps, Some(25.0));
        assert_eq!(update.size_kb, Some(1024));
        assert_eq!(update.bitrate_kbps, Some(93.2));
    }

    #[test]
    fn test_newer_kib_units() {
        let update =
            ProgressUpdate::from_line("size=    2048KiB time=00:00:10.50 bitrate=1598.0kbits/s");
        assert_eq!(update.size_kb, Some(2048));
        assert_eq!(update.elapsed_secs, Some(10.5));
        assert!(update.frame.is_none());
    }

    #[test]
    fn test_unrecognised_line_updates_nothing() {
        let mut parser = ProgressParser::new(Some(180.0));
        parser.parse_line_at(STATS_LINE, Duration::from_secs(45));
        let before = parser.snapshot().clone();

        let update = parser.parse_line_at(
            "Input #0, mov,mp4,m4a,3gp, from 'a.mp4':",
            Duration::from_secs(50),
        );
        assert!(update.is_empty());
        assert_eq!(parser.snapshot(), &before);
    }

    #[test]
    fn test_not_available_fields_are_ignored() {
        let update = ProgressUpdate::from_line("size=N/A time=N/A bitrate=N/A speed=N/A");
        assert!(update.is_empty());
    }

    #[test]
    fn test_eta_and_percent() {
        let mut parser = ProgressParser::new(Some(180.0));
        parser.parse_line_at("time=00:01:30.00", Duration::from_secs(45));
        // Half the media in 45 s of wall time leaves 45 s.
        assert_eq!(parser.snapshot().eta, Some(Duration::from_secs(45)));
        assert!((parser.progress_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_line_keeps_other_fields() {
        let mut parser = ProgressParser::new(None);
        parser.parse_line_at(STATS_LINE, Duration::from_secs(1));
        parser.parse_line_at("frame=  200", Duration::from_secs(2));
        let snap = parser.snapshot();
        assert_eq!(snap.frame, Some(200));
        assert_eq!(snap.elapsed_secs, Some(90.0));
        assert_eq!(snap.eta, None);
    }

    #[test]
    fn test_zero_elapsed_has_no_estimate() {
        let mut parser = ProgressParser::new(Some(60.0));
        parser.parse_line_at("time=00:00:00.00", Duration::from_secs(3));
        assert_eq!(parser.snapshot().elapsed_secs, Some(0.0));
        assert_eq!(parser.snapshot().eta, None);
    }

    #[test]
    fn test_percent_is_unclamped_and_zero_without_total() {
        let mut over = ProgressParser::new(Some(60.0));
        over.parse_line_at("time=00:01:30.00", Duration::from_secs(1));
        assert!((over.progress_percent() - 150.0).abs() < 1e-9);

        let mut zero = ProgressParser::new(Some(0.0));
        zero.parse_line_at("time=00:01:30.00", Duration::from_secs(1));
        assert_eq!(zero.progress_percent(), 0.0);

        assert_eq!(ProgressParser::new(None).progress_percent(), 0.0);
    }

    #[test]
    fn test_estimate_remaining_guards() {
        assert_eq!(estimate_remaining(Duration::from_secs(10), 100.0, 0.0), None);
        assert_eq!(estimate_remaining(Duration::from_secs(10), 0.0, 5.0), None);
        assert_eq!(
            estimate_remaining(Duration::from_secs(10), 100.0, 200.0),
            Some(Duration::ZERO)
        );
    }
}
