//! Tracklist output for publishing alongside the final video.

use crate::error::CoreResult;
use crate::planning::Sequence;
use crate::processing::overlay::OverlayCue;
use crate::utils::{format_duration, format_minutes};

use chrono::Local;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// One track in playback order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TracklistEntry {
    pub title: String,
    /// Start position in the final video, in seconds.
    pub start: f64,
    /// Audible length in the final video, in seconds.
    pub duration: f64,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tracklist {
    pub entries: Vec<TracklistEntry>,
    pub total_duration: f64,
}

/// Where a tracklist was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracklistFiles {
    pub text: PathBuf,
    pub json: PathBuf,
}

impl Tracklist {
    /// Builds the tracklist for an audio sequence, cut at `limit` seconds
    /// (the length of the final video). Tracks starting at or after the limit
    /// are dropped; the last one is shortened to end at it.
    #[must_use]
    pub fn from_sequence(sequence: &Sequence, limit: Option<f64>) -> Self {
        let limit = limit.unwrap_or(f64::INFINITY);
        let entries: Vec<TracklistEntry> = sequence
            .iter()
            .filter(|e| e.start < limit)
            .map(|e| TracklistEntry {
                title: e.asset.display_title(),
                start: e.start,
                duration: e.duration.min(limit - e.start),
                path: e.asset.path.clone(),
            })
            .collect();
        let total_duration = entries.iter().map(|e| e.duration).sum();
        Self {
            entries,
            total_duration,
        }
    }

    /// Overlay cues for the same tracks.
    #[must_use]
    pub fn cues(&self) -> Vec<OverlayCue> {
        self.entries
            .iter()
            .map(|e| OverlayCue {
                text: e.title.clone(),
                start: e.start,
            })
            .collect()
    }

    /// `HH:MM:SS  Artist - Title  (MM:SS)`, one line per track.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(
                out,
                "{}  {}  ({})",
                format_duration(entry.start),
                entry.title,
                format_minutes(entry.duration)
            );
        }
        out
    }

    /// Writes `<stem>_tracklist.txt` and `<stem>_tracklist.json` into `dir`.
    pub fn write(&self, dir: &Path, stem: &str) -> CoreResult<TracklistFiles> {
        fs::create_dir_all(dir)?;
        let files = TracklistFiles {
            text: dir.join(format!("{stem}_tracklist.txt")),
            json: dir.join(format!("{stem}_tracklist.json")),
        };

        fs::write(&files.text, self.to_text())?;

        let document = serde_json::json!({
            "generated_at": Local::now().to_rfc3339(),
            "total_duration": self.total_duration,
            "tracks": self.entries.iter().map(|e| serde_json::json!({
                "title": e.title,
                "start": format_duration(e.start),
                "start_seconds": e.start,
                "duration_seconds": e.duration,
                "path": e.path.display().to_string(),
            })).collect::<Vec<_>>(),
        });
        fs::write(&files.json, serde_json::to_string_pretty(&document)?)?;

        log::info!(
            "Wrote tracklist with {} tracks to {}",
            self.entries.len(),
            files.text.display()
        );
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{AssetKind, MediaAsset};
    use tempfile::tempdir;

    fn sequence() -> Sequence {
        let mut seq = Sequence::empty(AssetKind::Track);
        seq.push(
            MediaAsset::new("/m/one.mp3", AssetKind::Track, 185.0)
                .with_title("Opening")
                .with_artist("The Band"),
            0.0,
            185.0,
        );
        seq.push(MediaAsset::new("/m/02 Second.flac", AssetKind::Track, 3600.0), 0.0, 3600.0);
        seq.push(MediaAsset::new("/m/three.mp3", AssetKind::Track, 60.0), 0.0, 60.0);
        seq
    }

    #[test]
    fn test_text_format() {
        let list = Tracklist::from_sequence(&sequence(), None);
        assert_eq!(
            list.to_text(),
            "00:00:00  The Band - Opening  (03:05)\n\
             00:03:05  02 Second  (60:00)\n\
             01:03:05  three  (01:00)\n"
        );
        assert_eq!(list.total_duration, 3845.0);
    }

    #[test]
    fn test_limit_drops_and_shortens() {
        let list = Tracklist::from_sequence(&sequence(), Some(3785.0));
        assert_eq!(list.entries.len(), 2);
        assert_eq!(list.entries[1].duration, 3600.0);

        let list = Tracklist::from_sequence(&sequence(), Some(1000.0));
        assert_eq!(list.entries.len(), 2);
        assert_eq!(list.entries[1].duration, 815.0);
        assert_eq!(list.total_duration, 1000.0);
    }

    #[test]
    fn test_write_both_formats() {
        let dir = tempdir().unwrap();
        let list = Tracklist::from_sequence(&sequence(), None);
        let files = list.write(dir.path(), "mix").unwrap();

        assert!(files.text.ends_with("mix_tracklist.txt"));
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&files.json).unwrap()).unwrap();
        assert_eq!(json["tracks"].as_array().unwrap().len(), 3);
        assert_eq!(json["tracks"][1]["start"], "00:03:05");
        assert!(json["generated_at"].is_string());
        assert_eq!(list.cues()[2].start, 3785.0);
    }
}
