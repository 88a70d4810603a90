//! FFprobe integration for media analysis
//!
//! Probes are ordinary read-only commands built by the `CommandBuilder` and
//! run through a `CommandExecutor`; this module turns their JSON reports
//! into typed values.

use crate::error::{CoreError, CoreResult};
use crate::events::EventDispatcher;
use crate::external::ffmpeg_builder::CommandBuilder;
use crate::external::ffmpeg_executor::{CommandExecutor, RunOptions};

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Width and height of the first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Container-level facts used when scanning assets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    /// Duration of the media in seconds
    pub duration: Option<f64>,
    pub title: Option<String>,
    pub artist: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeReport {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<i64>,
    height: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

fn parse_report(json: &str) -> CoreResult<ProbeReport> {
    serde_json::from_str(json).map_err(|e| CoreError::ProbeParse(e.to_string()))
}

/// Parses a `probe_dimensions` report.
pub fn parse_dimensions(json: &str) -> CoreResult<Dimensions> {
    let report = parse_report(json)?;
    let stream = report
        .streams
        .first()
        .ok_or_else(|| CoreError::ProbeParse("no video stream in report".to_string()))?;

    let dimension = |value: Option<i64>, name: &str| -> CoreResult<u32> {
        value
            .filter(|v| *v > 0)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| CoreError::ProbeParse(format!("missing or invalid {name}")))
    };

    Ok(Dimensions {
        width: dimension(stream.width, "width")?,
        height: dimension(stream.height, "height")?,
    })
}

/// Parses a `probe_media` report. Tag lookup is case-insensitive since
/// containers disagree on `title` versus `TITLE`.
pub fn parse_media_info(json: &str) -> CoreResult<MediaInfo> {
    let report = parse_report(json)?;
    let Some(format) = report.format else {
        return Ok(MediaInfo::default());
    };

    let tag = |name: &str| {
        format
            .tags
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    Ok(MediaInfo {
        duration: format
            .duration
            .as_deref()
            .and_then(|d| d.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite()),
        title: tag("title"),
        artist: tag("artist"),
    })
}

/// Probes the width/height of the first video stream of `input`.
pub fn probe_dimensions(
    executor: &dyn CommandExecutor,
    builder: &CommandBuilder,
    input: &Path,
    options: &RunOptions,
    events: &EventDispatcher,
) -> CoreResult<Dimensions> {
    log::debug!("Probing dimensions of {}", input.display());
    let spec = builder.probe_dimensions(input)?;
    let result = executor.execute(spec, options, events)?;
    parse_dimensions(&result.stdout)
}

/// Probes the duration and title/artist tags of `input`.
pub fn probe_media(
    executor: &dyn CommandExecutor,
    builder: &CommandBuilder,
    input: &Path,
    options: &RunOptions,
    events: &EventDispatcher,
) -> CoreResult<MediaInfo> {
    log::debug!("Probing media info of {}", input.display());
    let spec = builder.probe_media(input)?;
    let result = executor.execute(spec, options, events)?;
    parse_media_info(&result.stdout)
}
