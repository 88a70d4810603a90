//! Configuration structures and constants for the loopcast-core library.
//!
//! This module provides the configuration for an assembly run: where media
//! comes from and goes to, output format, planning bounds, transitions, the
//! track overlay and command timeouts.

mod builder;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::external::ToolPaths;
use crate::processing::transition::TransitionKind;

pub use builder::CoreConfigBuilder;

// Default constants

/// Output frame size. Clips with other dimensions are scaled and padded.
pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Output frame rate every prepared clip is normalised to.
pub const DEFAULT_FPS: u32 = 30;

/// x264 constant rate factor (0-51, lower is better quality).
pub const DEFAULT_CRF: u8 = 23;
pub const DEFAULT_PRESET: &str = "medium";
pub const DEFAULT_TUNE: &str = "film";

/// Requested length of the final video, in seconds.
pub const DEFAULT_TARGET_DURATION: f64 = 3600.0;

/// Bounds of the sub-clip window taken from long clips, in seconds.
pub const DEFAULT_CLIP_WINDOW_MIN: f64 = 5.0;
pub const DEFAULT_CLIP_WINDOW_MAX: f64 = 10.0;

pub const DEFAULT_TRANSITION_DURATION: f64 = 1.0;

/// Fade applied to the start and end of the audio mix.
pub const DEFAULT_AUDIO_FADE_DURATION: f64 = 2.0;

/// Audio codec settings for the concatenated music track.
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
pub const DEFAULT_AUDIO_BITRATE: &str = "192k";

pub const DEFAULT_OVERLAY_FONT_SIZE: u32 = 24;
pub const DEFAULT_OVERLAY_FONT_COLOR: &str = "white";
pub const DEFAULT_OVERLAY_FADE_IN: f64 = 1.0;
pub const DEFAULT_OVERLAY_HOLD: f64 = 3.0;
pub const DEFAULT_OVERLAY_FADE_OUT: f64 = 1.0;

/// Timeout for encoding, concat and mux commands.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 3600;
/// Timeout for ffprobe queries.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_OUTPUT_NAME: &str = "loopcast_output.mp4";

/// Settings for the "now playing" text shown when each track starts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayConfig {
    pub enabled: bool,
    pub font_size: u32,
    pub font_color: String,
    /// Font file for drawtext; ffmpeg's default font when unset.
    pub font_file: Option<PathBuf>,
    pub fade_in: f64,
    pub hold: f64,
    pub fade_out: f64,
}

impl OverlayConfig {
    /// Total time the text is visible for one track.
    #[must_use]
    pub fn display_duration(&self) -> f64 {
        self.fade_in + self.hold + self.fade_out
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            font_size: DEFAULT_OVERLAY_FONT_SIZE,
            font_color: DEFAULT_OVERLAY_FONT_COLOR.to_string(),
            font_file: None,
            fade_in: DEFAULT_OVERLAY_FADE_IN,
            hold: DEFAULT_OVERLAY_HOLD,
            fade_out: DEFAULT_OVERLAY_FADE_OUT,
        }
    }
}

/// Main configuration structure for the loopcast-core library.
///
/// Created by the consumer of the library (e.g. loopcast-cli), usually via
/// [`CoreConfigBuilder`], checked with [`CoreConfig::validate`] and then
/// passed to the pipeline. Every field except the directories has a default
/// taken from the constants above.
///
/// # Examples
///
/// ```rust,no_run
/// use loopcast_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .clips_dir(PathBuf::from("/media/clips"))
///     .music_dir(PathBuf::from("/media/music"))
///     .output_dir(PathBuf::from("/media/out"))
///     .target_duration(1800.0)
///     .crf(20)
///     .build();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreConfig {
    /// Directory containing the video clips (read only)
    pub clips_dir: PathBuf,

    /// Directory containing the music tracks (read only)
    pub music_dir: PathBuf,

    /// Directory where the final video and tracklists are written
    pub output_dir: PathBuf,

    /// Directory for intermediate artifacts (defaults to `<output_dir>/work`)
    pub work_dir: Option<PathBuf>,

    /// File name of the final video inside `output_dir`
    pub output_name: String,

    pub tools: ToolPaths,

    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub crf: u8,
    pub preset: String,
    pub tune: String,
    pub audio_codec: String,
    pub audio_bitrate: String,

    /// Requested final duration in seconds
    pub target_duration: f64,
    pub clip_window_min: f64,
    pub clip_window_max: f64,

    pub transition: TransitionKind,
    pub transition_duration: f64,
    pub audio_fade_duration: f64,

    pub overlay: OverlayConfig,

    pub command_timeout_secs: u64,
    pub probe_timeout_secs: u64,

    /// Seed for the planners; a random seed is used when unset
    pub seed: Option<u64>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            clips_dir: PathBuf::from("clips"),
            music_dir: PathBuf::from("music"),
            output_dir: PathBuf::from("output"),
            work_dir: None,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            tools: ToolPaths::default(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fps: DEFAULT_FPS,
            crf: DEFAULT_CRF,
            preset: DEFAULT_PRESET.to_string(),
            tune: DEFAULT_TUNE.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            target_duration: DEFAULT_TARGET_DURATION,
            clip_window_min: DEFAULT_CLIP_WINDOW_MIN,
            clip_window_max: DEFAULT_CLIP_WINDOW_MAX,
            transition: TransitionKind::Fade,
            transition_duration: DEFAULT_TRANSITION_DURATION,
            audio_fade_duration: DEFAULT_AUDIO_FADE_DURATION,
            overlay: OverlayConfig::default(),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            seed: None,
        }
    }
}

impl CoreConfig {
    /// The effective directory for intermediate artifacts.
    #[must_use]
    pub fn work_dir(&self) -> PathBuf {
        self.work_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join("work"))
    }

    /// Full path of the final video.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }

    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Checks every numeric and path setting, reporting the first problem.
    pub fn validate(&self) -> CoreResult<()> {
        require_dir(&self.clips_dir, "clips")?;
        require_dir(&self.music_dir, "music")?;

        if self.width == 0 || self.height == 0 {
            return invalid(format!(
                "output dimensions must be positive, got {}x{}",
                self.width, self.height
            ));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return invalid(format!(
                "output dimensions must be even for yuv420p, got {}x{}",
                self.width, self.height
            ));
        }
        if self.fps == 0 {
            return invalid("frame rate must be positive".to_string());
        }
        if self.crf > 51 {
            return invalid(format!("CRF must be between 0 and 51, got {}", self.crf));
        }
        if !(self.target_duration.is_finite() && self.target_duration > 0.0) {
            return invalid(format!(
                "target duration must be positive, got {}",
                self.target_duration
            ));
        }
        if !(self.clip_window_min > 0.0 && self.clip_window_min.is_finite()) {
            return invalid(format!(
                "clip window minimum must be positive, got {}",
                self.clip_window_min
            ));
        }
        if self.clip_window_min > self.clip_window_max || !self.clip_window_max.is_finite() {
            return invalid(format!(
                "clip window minimum {} exceeds maximum {}",
                self.clip_window_min, self.clip_window_max
            ));
        }
        if !(0.0..=self.clip_window_min).contains(&self.transition_duration) {
            return invalid(format!(
                "transition duration {} must be between 0 and the clip window minimum {}",
                self.transition_duration, self.clip_window_min
            ));
        }
        if !(self.audio_fade_duration.is_finite() && self.audio_fade_duration >= 0.0) {
            return invalid(format!(
                "audio fade duration must be zero or more, got {}",
                self.audio_fade_duration
            ));
        }
        let overlay = &self.overlay;
        if overlay.enabled {
            if overlay.font_size == 0 {
                return invalid("overlay font size must be positive".to_string());
            }
            let timings = [overlay.fade_in, overlay.hold, overlay.fade_out];
            if !timings.iter().all(|t| t.is_finite() && *t >= 0.0) {
                return invalid("overlay timings must be finite and not negative".to_string());
            }
            if let Some(font) = &overlay.font_file {
                if !font.is_file() {
                    return invalid(format!("overlay font file not found: {}", font.display()));
                }
            }
        }
        if self.command_timeout_secs == 0 || self.probe_timeout_secs == 0 {
            return invalid("timeouts must be positive".to_string());
        }
        if self.output_name.trim().is_empty() || self.output_name.contains(['/', '\\']) {
            return invalid(format!("invalid output file name '{}'", self.output_name));
        }
        Ok(())
    }

    /// Creates the output and work directories. Input directories are never
    /// created or modified.
    pub fn prepare_directories(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        std::fs::create_dir_all(self.work_dir())?;
        log::debug!(
            "Prepared output directory {} and work directory {}",
            self.output_dir.display(),
            self.work_dir().display()
        );
        Ok(())
    }
}

fn require_dir(path: &Path, what: &str) -> CoreResult<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(CoreError::Config(format!(
            "{what} directory does not exist: {}",
            path.display()
        )))
    }
}

fn invalid(message: String) -> CoreResult<()> {
    Err(CoreError::Config(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn valid_config(root: &Path) -> CoreConfig {
        let clips = root.join("clips");
        let music = root.join("music");
        std::fs::create_dir_all(&clips).unwrap();
        std::fs::create_dir_all(&music).unwrap();
        CoreConfigBuilder::new()
            .clips_dir(clips)
            .music_dir(music)
            .output_dir(root.join("out"))
            .build()
    }

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!((config.width, config.height), (1920, 1080));
        assert_eq!(config.crf, 23);
        assert_eq!(config.preset, "medium");
        assert_eq!(config.tune, "film");
        assert_eq!(config.target_duration, 3600.0);
        assert_eq!(config.overlay.display_duration(), 5.0);
        assert_eq!(config.command_timeout(), Duration::from_secs(3600));
        assert_eq!(config.work_dir(), PathBuf::from("output/work"));
    }

    #[test]
    fn test_validate_accepts_defaults_with_dirs() {
        let dir = tempdir().unwrap();
        valid_config(dir.path()).validate().unwrap();
    }

    #[test]
    fn test_validate_rejections() {
        let dir = tempdir().unwrap();
        let base = valid_config(dir.path());

        let cases: Vec<(&str, CoreConfig)> = vec![
            ("missing clips", CoreConfig { clips_dir: dir.path().join("nope"), ..base.clone() }),
            ("zero width", CoreConfig { width: 0, ..base.clone() }),
            ("odd height", CoreConfig { height: 1081, ..base.clone() }),
            ("crf", CoreConfig { crf: 52, ..base.clone() }),
            ("target", CoreConfig { target_duration: 0.0, ..base.clone() }),
            ("nan target", CoreConfig { target_duration: f64::NAN, ..base.clone() }),
            ("window order", CoreConfig { clip_window_min: 11.0, ..base.clone() }),
            ("window min", CoreConfig { clip_window_min: 0.0, ..base.clone() }),
            ("transition", CoreConfig { transition_duration: 6.0, ..base.clone() }),
            ("nan transition", CoreConfig { transition_duration: f64::NAN, ..base.clone() }),
            ("nan audio fade", CoreConfig { audio_fade_duration: f64::NAN, ..base.clone() }),
            ("negative audio fade", CoreConfig { audio_fade_duration: -1.0, ..base.clone() }),
            (
                "nan overlay hold",
                CoreConfig {
                    overlay: OverlayConfig { hold: f64::NAN, ..base.overlay.clone() },
                    ..base.clone()
                },
            ),
            (
                "infinite overlay fade",
                CoreConfig {
                    overlay: OverlayConfig { fade_out: f64::INFINITY, ..base.overlay.clone() },
                    ..base.clone()
                },
            ),
            ("timeout", CoreConfig { probe_timeout_secs: 0, ..base.clone() }),
            ("name", CoreConfig { output_name: "a/b.mp4".to_string(), ..base.clone() }),
        ];

        for (name, config) in cases {
            assert!(
                matches!(config.validate(), Err(CoreError::Config(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_prepare_directories_creates_output_and_work() {
        let dir = tempdir().unwrap();
        let config = valid_config(dir.path());
        config.prepare_directories().unwrap();
        assert!(dir.path().join("out").is_dir());
        assert!(dir.path().join("out/work").is_dir());
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(CoreConfig::default()).unwrap();
        assert_eq!(json["crf"], 23);
        assert_eq!(json["transition"], "fade");
        assert_eq!(json["overlay"]["font_color"], "white");
    }
}
