// ============================================================================
// loopcast-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig starting from the defaults. The builder
// does not validate; call CoreConfig::validate on the result.
//
// AI-ASSISTANT-INFO: Builder pattern implementation for CoreConfig

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::{CoreConfig, OverlayConfig};
use crate::external::ToolPaths;
use crate::processing::transition::TransitionKind;

/// Builder for creating CoreConfig instances.
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clips_dir(mut self, dir: PathBuf) -> Self {
        self.config.clips_dir = dir;
        self
    }

    pub fn music_dir(mut self, dir: PathBuf) -> Self {
        self.config.music_dir = dir;
        self
    }

    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output_dir = dir;
        self
    }

    pub fn work_dir(mut self, dir: PathBuf) -> Self {
        self.config.work_dir = Some(dir);
        self
    }

    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.config.output_name = name.into();
        self
    }

    pub fn tools(mut self, tools: ToolPaths) -> Self {
        self.config.tools = tools;
        self
    }

    pub fn ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.config.tools.ffmpeg = path;
        self
    }

    pub fn ffprobe_path(mut self, path: PathBuf) -> Self {
        self.config.tools.ffprobe = path;
        self
    }

    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.config.fps = fps;
        self
    }

    pub fn crf(mut self, crf: u8) -> Self {
        self.config.crf = crf;
        self
    }

    pub fn preset(mut self, preset: impl Into<String>) -> Self {
        self.config.preset = preset.into();
        self
    }

    pub fn tune(mut self, tune: impl Into<String>) -> Self {
        self.config.tune = tune.into();
        self
    }

    pub fn target_duration(mut self, seconds: f64) -> Self {
        self.config.target_duration = seconds;
        self
    }

    pub fn clip_window(mut self, min: f64, max: f64) -> Self {
        self.config.clip_window_min = min;
        self.config.clip_window_max = max;
        self
    }

    pub fn transition(mut self, kind: TransitionKind) -> Self {
        self.config.transition = kind;
        self
    }

    pub fn transition_duration(mut self, seconds: f64) -> Self {
        self.config.transition_duration = seconds;
        self
    }

    pub fn audio_fade_duration(mut self, seconds: f64) -> Self {
        self.config.audio_fade_duration = seconds;
        self
    }

    pub fn overlay(mut self, overlay: OverlayConfig) -> Self {
        self.config.overlay = overlay;
        self
    }

    pub fn overlay_enabled(mut self, enabled: bool) -> Self {
        self.config.overlay.enabled = enabled;
        self
    }

    pub fn font_file(mut self, path: PathBuf) -> Self {
        self.config.overlay.font_file = Some(path);
        self
    }

    pub fn command_timeout_secs(mut self, secs: u64) -> Self {
        self.config.command_timeout_secs = secs;
        self
    }

    pub fn probe_timeout_secs(mut self, secs: u64) -> Self {
        self.config.probe_timeout_secs = secs;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(self) -> CoreConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = CoreConfigBuilder::new()
            .clips_dir(PathBuf::from("/c"))
            .music_dir(PathBuf::from("/m"))
            .output_dir(PathBuf::from("/o"))
            .resolution(1280, 720)
            .crf(18)
            .clip_window(3.0, 6.0)
            .transition(TransitionKind::Cut)
            .overlay_enabled(false)
            .ffmpeg_path(PathBuf::from("/opt/ffmpeg"))
            .seed(7)
            .build();

        assert_eq!(config.clips_dir, PathBuf::from("/c"));
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.crf, 18);
        assert_eq!((config.clip_window_min, config.clip_window_max), (3.0, 6.0));
        assert_eq!(config.transition, TransitionKind::Cut);
        assert!(!config.overlay.enabled);
        assert_eq!(config.tools.ffmpeg, PathBuf::from("/opt/ffmpeg"));
        assert_eq!(config.seed, Some(7));
        // Untouched fields keep their defaults.
        assert_eq!(config.preset, "medium");
        assert_eq!(config.fps, 30);
    }
}
