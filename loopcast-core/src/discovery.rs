//! File discovery module for finding clips and tracks.
//!
//! Only the top level of each directory is searched. Extensions are matched
//! case-insensitively and results are sorted by path so that planning with a
//! fixed seed is reproducible.

use crate::error::{CoreError, CoreResult};
use crate::media::AssetKind;
use crate::utils::has_extension;

use std::path::{Path, PathBuf};

/// Video clip extensions accepted by discovery.
pub const CLIP_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];

/// Music track extensions accepted by discovery.
pub const TRACK_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "m4a", "aac", "ogg"];

/// Extensions recognised for `kind`.
#[must_use]
pub fn extensions_for(kind: AssetKind) -> &'static [&'static str] {
    match kind {
        AssetKind::Clip => CLIP_EXTENSIONS,
        AssetKind::Track => TRACK_EXTENSIONS,
    }
}

/// Finds files of `kind` in the top level of `dir`.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Matching files, sorted by path
/// * `Err(CoreError::Io)` - If the directory cannot be read
/// * `Err(CoreError::NoFilesFound)` - If nothing matches
///
/// # Examples
///
/// ```rust,no_run
/// use loopcast_core::discovery::find_media_files;
/// use loopcast_core::media::AssetKind;
/// use std::path::Path;
///
/// let clips = find_media_files(Path::new("/media/clips"), AssetKind::Clip)?;
/// println!("Found {} clips", clips.len());
/// # Ok::<(), loopcast_core::CoreError>(())
/// ```
pub fn find_media_files(dir: &Path, kind: AssetKind) -> CoreResult<Vec<PathBuf>> {
    let extensions = extensions_for(kind);
    let read_dir = std::fs::read_dir(dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            (path.is_file() && has_extension(&path, extensions)).then_some(path)
        })
        .collect();

    if files.is_empty() {
        log::warn!("No {kind} files found in {}", dir.display());
        return Err(CoreError::NoFilesFound);
    }

    files.sort();
    log::debug!("Found {} {kind} files in {}", files.len(), dir.display());
    Ok(files)
}
