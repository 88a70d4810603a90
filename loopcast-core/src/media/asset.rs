//! Media asset records shared by discovery, planning and the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The two kinds of source media the system assembles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// A short video clip.
    Clip,
    /// A music track.
    Track,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Clip => f.write_str("clip"),
            AssetKind::Track => f.write_str("track"),
        }
    }
}

/// A scanned source file with a known duration.
///
/// Assets are immutable once scanned. Identity for the no-repeat rule is the
/// file path: two records with the same path are the same asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub path: PathBuf,
    pub kind: AssetKind,
    /// Duration in seconds.
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
}

impl MediaAsset {
    pub fn new(path: impl Into<PathBuf>, kind: AssetKind, duration: f64) -> Self {
        Self {
            path: path.into(),
            kind,
            duration,
            title: None,
            artist: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Whether two records refer to the same source file.
    #[must_use]
    pub fn same_source(&self, other: &MediaAsset) -> bool {
        self.path == other.path
    }

    /// Human readable name used for overlays and tracklists.
    ///
    /// "Artist - Title" when both tags exist, otherwise the title, otherwise
    /// the file stem.
    #[must_use]
    pub fn display_title(&self) -> String {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| file_stem(&self.path));

        match self.artist.as_deref().map(str::trim) {
            Some(artist) if !artist.is_empty() => format!("{artist} - {title}"),
            _ => title,
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_fallbacks() {
        let bare = MediaAsset::new("/music/01 Intro.mp3", AssetKind::Track, 60.0);
        assert_eq!(bare.display_title(), "01 Intro");

        let titled = bare.clone().with_title("Opening");
        assert_eq!(titled.display_title(), "Opening");

        let full = titled.with_artist("The Band");
        assert_eq!(full.display_title(), "The Band - Opening");

        let blank = MediaAsset::new("/music/x.mp3", AssetKind::Track, 1.0)
            .with_title("  ")
            .with_artist("");
        assert_eq!(blank.display_title(), "x");
    }

    #[test]
    fn test_same_source_uses_path() {
        let a = MediaAsset::new("/clips/a.mp4", AssetKind::Clip, 5.0);
        let a2 = MediaAsset::new("/clips/a.mp4", AssetKind::Clip, 7.0);
        let b = MediaAsset::new("/clips/b.mp4", AssetKind::Clip, 5.0);
        assert!(a.same_source(&a2));
        assert!(!a.same_source(&b));
    }
}
