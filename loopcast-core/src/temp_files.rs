//! Temporary file management utilities.
//!
//! The concat edit-list is the only temporary file the core creates. It is a
//! `NamedTempFile`, so it is removed when dropped, including on error paths.

use crate::error::CoreResult;

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, NamedTempFile};

/// Writes a concat-demuxer edit-list into `dir`. Auto-deleted when dropped.
///
/// Each input becomes one `file '<path>'` line, in order. Relative paths are
/// made absolute first because the demuxer resolves them against the list
/// file's own directory.
pub fn write_concat_list(dir: &Path, inputs: &[&Path]) -> CoreResult<NamedTempFile> {
    std::fs::create_dir_all(dir)?;
    let mut list = TempFileBuilder::new()
        .prefix("concat_")
        .suffix(".txt")
        .tempfile_in(dir)?;

    for input in inputs {
        let absolute = std::path::absolute(input)?;
        writeln!(list, "file '{}'", escape_concat_path(&absolute))?;
    }
    list.flush()?;

    log::debug!(
        "Wrote concat list with {} entries to {}",
        inputs.len(),
        list.path().display()
    );
    Ok(list)
}

/// Quotes a path for a single-quoted edit-list entry (`'` becomes `'\''`).
#[must_use]
pub fn escape_concat_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', "'\\''")
}

/// Returns `<dir>/<stem>.<extension>` for a numbered intermediate artifact,
/// e.g. `clip_0003.mp4`. Does not create the file.
#[must_use]
pub fn numbered_artifact_path(dir: &Path, stem: &str, index: usize, extension: &str) -> PathBuf {
    dir.join(format!("{stem}_{index:04}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_concat_list_lines_and_cleanup() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.mp4");
        let b = dir.path().join("it's b.mp4");

        let list = write_concat_list(dir.path(), &[a.as_path(), b.as_path()]).unwrap();
        let list_path = list.path().to_path_buf();
        let name = list_path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("concat_") && name.ends_with(".txt"));

        let content = fs::read_to_string(&list_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("file '{}'", a.display()));
        assert!(lines[1].ends_with("it'\\''s b.mp4'"));

        drop(list);
        assert!(!list_path.exists());
    }

    #[test]
    fn test_relative_paths_become_absolute() {
        let dir = tempdir().unwrap();
        let list = write_concat_list(dir.path(), &[Path::new("clips/x.mp4")]).unwrap();
        let content = fs::read_to_string(list.path()).unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            content.trim_end(),
            format!("file '{}'", cwd.join("clips/x.mp4").display())
        );
    }

    #[test]
    fn test_numbered_artifact_path() {
        let path = numbered_artifact_path(Path::new("/work"), "clip", 7, "mp4");
        assert_eq!(path, PathBuf::from("/work/clip_0007.mp4"));
    }
}
