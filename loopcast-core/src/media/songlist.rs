//! JSON songlists: a saved track pool that can be reused across runs
//! without re-probing the music directory.

use crate::error::{CoreError, CoreResult};
use crate::media::{AssetKind, MediaAsset};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A saved pool of music tracks with their total duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Songlist {
    pub songs: Vec<MediaAsset>,
    pub total_duration: f64,
}

impl Songlist {
    /// Builds a songlist from scanned tracks, computing the total duration.
    pub fn from_tracks(songs: Vec<MediaAsset>) -> Self {
        let total_duration = songs.iter().map(|s| s.duration).sum();
        Self {
            songs,
            total_duration,
        }
    }
}

/// Writes a songlist as pretty-printed JSON, creating parent directories.
pub fn write_songlist(songlist: &Songlist, path: &Path) -> CoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(songlist)?;
    fs::write(path, json)?;
    log::debug!(
        "Wrote songlist with {} tracks to {}",
        songlist.songs.len(),
        path.display()
    );
    Ok(())
}

/// Reads a songlist written by [`write_songlist`].
///
/// Every entry must be a track; clips in a songlist are rejected.
pub fn read_songlist(path: &Path) -> CoreResult<Songlist> {
    let content = fs::read_to_string(path)?;
    let songlist: Songlist = serde_json::from_str(&content).map_err(|e| {
        CoreError::JsonParseError(format!("songlist {}: {}", path.display(), e))
    })?;

    if let Some(bad) = songlist.songs.iter().find(|s| s.kind != AssetKind::Track) {
        return Err(CoreError::JsonParseError(format!(
            "songlist {} contains a non-track entry: {}",
            path.display(),
            bad.path.display()
        )));
    }

    Ok(songlist)
}
