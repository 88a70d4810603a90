//! Utility functions for formatting and path handling.
//!
//! These helpers are shared by the tracklist writer, the overlay builder,
//! progress parsing and the CLI.

use std::path::Path;

/// Tracklist timestamp for a position in seconds, truncated to whole
/// seconds: `3725.0` is `01:02:05`. Hours are not wrapped. Negative or
/// non-finite input gives `??:??:??`.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return String::from("??:??:??");
    }
    let whole = seconds.trunc() as u64;
    let (minutes, secs) = (whole / 60, whole % 60);
    format!("{:02}:{:02}:{secs:02}", minutes / 60, minutes % 60)
}

/// Formats seconds as MM:SS, letting minutes grow past 59 (e.g., 3725.0 -> "62:05").
#[must_use]
pub fn format_minutes(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??".to_string();
    }
    let total_seconds = seconds.round() as u64;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Seconds in an ffmpeg `time=` value (`HH:MM:SS[.frac]`), or `None` when it
/// is not one.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let mut fields = time.splitn(3, ':');
    let hours: u64 = fields.next()?.parse().ok()?;
    let minutes: u64 = fields.next()?.parse().ok()?;
    let seconds: f64 = fields.next()?.parse().ok()?;
    if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return None;
    }
    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// Formats a duration in seconds the way FFmpeg option values expect,
/// with millisecond precision and no trailing zeros ("2", "4.5", "0.125").
#[must_use]
pub fn format_seconds_arg(seconds: f64) -> String {
    let formatted = format!("{:.3}", seconds.max(0.0));
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Case-insensitive extension check against a list of lowercase extensions.
#[must_use]
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_for_tracklist_positions() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(185.7), "00:03:05");
        assert_eq!(format_duration(3785.0), "01:03:05");
        assert_eq!(format_duration(36_000.0), "10:00:00");
        assert_eq!(format_duration(-0.5), "??:??:??");
        assert_eq!(format_duration(f64::INFINITY), "??:??:??");
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0.0), "00:00");
        assert_eq!(format_minutes(185.4), "03:05");
        assert_eq!(format_minutes(3725.0), "62:05");
        assert_eq!(format_minutes(f64::INFINITY), "??:??");
    }

    #[test]
    fn test_parse_ffmpeg_time() {
        assert_eq!(parse_ffmpeg_time("00:01:30"), Some(90.0));
        assert_eq!(parse_ffmpeg_time("00:00:07.50"), Some(7.5));
        assert_eq!(parse_ffmpeg_time("100:00:00"), Some(360000.0));

        assert_eq!(parse_ffmpeg_time("01:30"), None);
        assert_eq!(parse_ffmpeg_time("N/A"), None);
        assert_eq!(parse_ffmpeg_time("00:61:00"), None);
        assert_eq!(parse_ffmpeg_time("-00:00:01"), None);
    }

    #[test]
    fn test_format_seconds_arg() {
        assert_eq!(format_seconds_arg(2.0), "2");
        assert_eq!(format_seconds_arg(4.5), "4.5");
        assert_eq!(format_seconds_arg(0.125), "0.125");
        assert_eq!(format_seconds_arg(1.0 / 3.0), "0.333");
        assert_eq!(format_seconds_arg(-3.0), "0");
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("a.MP4"), &["mp4", "mov"]));
        assert!(has_extension(Path::new("dir/b.mov"), &["mp4", "mov"]));
        assert!(!has_extension(Path::new("c.txt"), &["mp4"]));
        assert!(!has_extension(Path::new("mp4"), &["mp4"]));
    }
}
