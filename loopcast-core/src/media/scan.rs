//! Turns discovered files into [`MediaAsset`]s by probing each one.
//!
//! A file that cannot be probed, or that reports no positive duration, is
//! skipped with a warning rather than failing the scan. A missing ffprobe
//! executable is the exception: it would fail every file, so it aborts.

use crate::discovery::find_media_files;
use crate::error::{CoreError, CoreResult};
use crate::events::{Event, EventDispatcher};
use crate::external::{probe_media, CommandBuilder, CommandExecutor, RunOptions};
use crate::media::{AssetKind, MediaAsset};

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Result of scanning one directory.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Usable assets, in discovery order.
    pub assets: Vec<MediaAsset>,
    /// Files left out, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

impl ScanReport {
    #[must_use]
    pub fn total_duration(&self) -> f64 {
        self.assets.iter().map(|a| a.duration).sum()
    }
}

/// Discovers and probes every file of `kind` in `dir`.
pub fn scan_assets(
    dir: &Path,
    kind: AssetKind,
    executor: &dyn CommandExecutor,
    builder: &CommandBuilder,
    probe_timeout: Duration,
    events: &EventDispatcher,
) -> CoreResult<ScanReport> {
    let files = find_media_files(dir, kind)?;
    let options = RunOptions::with_timeout(probe_timeout);
    let mut report = ScanReport::default();

    for path in files {
        match probe_media(executor, builder, &path, &options, events) {
            Ok(info) => match info.duration.filter(|d| *d > 0.0) {
                Some(duration) => {
                    let mut asset = MediaAsset::new(path, kind, duration);
                    asset.title = info.title;
                    asset.artist = info.artist;
                    report.assets.push(asset);
                }
                None => skip(&mut report, path, kind, "missing duration metadata", events),
            },
            Err(err @ CoreError::ToolNotFound(_)) => return Err(err),
            Err(err) => skip(&mut report, path, kind, &err.to_string(), events),
        }
    }

    log::info!(
        "Scanned {} {kind}(s) from {} ({} skipped)",
        report.assets.len(),
        dir.display(),
        report.skipped.len()
    );
    events.emit(Event::AssetsScanned {
        kind,
        found: report.assets.len(),
        skipped: report.skipped.len(),
        total_duration: report.total_duration(),
    });
    Ok(report)
}

fn skip(
    report: &mut ScanReport,
    path: PathBuf,
    kind: AssetKind,
    reason: &str,
    events: &EventDispatcher,
) {
    let message = format!("Skipping {kind} {} due to {reason}", path.display());
    log::warn!("{message}");
    events.emit(Event::Warning { message });
    report.skipped.push((path, reason.to_string()));
}
