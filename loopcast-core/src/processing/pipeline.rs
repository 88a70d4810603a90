// ============================================================================
// loopcast-core/src/processing/pipeline.rs
// ============================================================================
//
// ASSEMBLY PIPELINE: From two media directories to a finished video
//
// The pipeline runs a fixed list of stages strictly in order. Each stage
// consumes what the previous ones produced (mostly file paths in the work
// directory) and the first failure stops the run. Intermediate artifacts are
// left on disk for inspection; only concat edit-lists are always removed.
//
// KEY COMPONENTS:
// - Stage: the ordered stage list
// - PipelineState: Ready -> Running(stage) -> Complete | Failed(stage)
// - Pipeline: drives the stages through a CommandExecutor
// - PipelineOutput: summary of a successful run
//
// AI-ASSISTANT-INFO: Stop-on-first-failure orchestration of the assembly stages

// ---- External crate imports ----
use log::{error, info};
use rand::Rng;

// ---- Standard library imports ----
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// ---- Internal crate imports ----
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, FailureCategory};
use crate::events::{Event, EventDispatcher};
use crate::external::{
    probe_dimensions, CommandBuilder, CommandExecutor, CommandOptions, CommandSpec, Dimensions,
    EncodeDefaults, ProcessResult, RunOptions,
};
use crate::media::{scan_assets, AssetKind, MediaAsset, Songlist};
use crate::planning::{plan_audio, plan_video, ClipWindow, Sequence};
use crate::processing::overlay::overlay_filter;
use crate::processing::tracklist::{Tracklist, TracklistFiles};
use crate::processing::transition::{clip_filter, needs_scaling, transition_fades, ClipTreatment};
use crate::temp_files::numbered_artifact_path;

/// The pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Scan,
    PlanAudio,
    ConcatAudio,
    PlanVideo,
    PrepareClips,
    ConcatVideo,
    Mux,
    Overlay,
    Tracklist,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::Scan,
        Stage::PlanAudio,
        Stage::ConcatAudio,
        Stage::PlanVideo,
        Stage::PrepareClips,
        Stage::ConcatVideo,
        Stage::Mux,
        Stage::Overlay,
        Stage::Tracklist,
    ];

    /// Zero-based position in [`Stage::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Stage::Scan => "scan inputs",
            Stage::PlanAudio => "plan audio",
            Stage::ConcatAudio => "concat audio",
            Stage::PlanVideo => "plan video",
            Stage::PrepareClips => "prepare clips",
            Stage::ConcatVideo => "concat video",
            Stage::Mux => "mux",
            Stage::Overlay => "overlay",
            Stage::Tracklist => "tracklist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a pipeline is in its life. There is no way back from `Complete`
/// or `Failed`; a new run needs a new [`Pipeline`].
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    Ready,
    Running {
        stage: Stage,
    },
    Complete,
    Failed {
        stage: Stage,
        message: String,
        category: Option<FailureCategory>,
    },
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub video_path: PathBuf,
    pub tracklist: TracklistFiles,
    pub audio_duration: f64,
    pub video_duration: f64,
    /// Length of the muxed output: the shorter of audio and video.
    pub final_duration: f64,
    pub track_count: usize,
    pub clip_count: usize,
    pub elapsed: Duration,
}

struct Pools {
    tracks: Vec<MediaAsset>,
    clips: Vec<MediaAsset>,
}

/// Drives one assembly run.
pub struct Pipeline<'a> {
    config: &'a CoreConfig,
    executor: &'a dyn CommandExecutor,
    events: &'a EventDispatcher,
    builder: CommandBuilder,
    songlist: Option<Songlist>,
    state: PipelineState,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a CoreConfig,
        executor: &'a dyn CommandExecutor,
        events: &'a EventDispatcher,
    ) -> Self {
        let builder = CommandBuilder::new(config.tools.clone(), config.work_dir())
            .with_encode_defaults(EncodeDefaults {
                preset: config.preset.clone(),
                crf: config.crf,
                tune: config.tune.clone(),
                ..EncodeDefaults::default()
            });
        Self {
            config,
            executor,
            events,
            builder,
            songlist: None,
            state: PipelineState::Ready,
        }
    }

    /// Uses a saved track pool instead of probing the music directory.
    #[must_use]
    pub fn with_songlist(mut self, songlist: Songlist) -> Self {
        self.songlist = Some(songlist);
        self
    }

    #[must_use]
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Runs every stage in order, stopping at the first failure.
    ///
    /// A failure is returned as `StageFailed` carrying the stage index and
    /// the underlying error, and leaves the pipeline in `Failed`.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> CoreResult<PipelineOutput> {
        if self.state != PipelineState::Ready {
            return Err(CoreError::Config(
                "pipeline has already run; create a new one to run again".to_string(),
            ));
        }
        let started = Instant::now();
        self.events.emit(Event::PipelineStarted {
            stage_count: Stage::ALL.len(),
            target_duration: self.config.target_duration,
        });

        let pools = self.stage(Stage::Scan, |p| p.scan_inputs())?;
        let audio = self.stage(Stage::PlanAudio, |p| p.plan_tracks(&pools.tracks, rng))?;
        let audio_path = self.stage(Stage::ConcatAudio, |p| p.concat_audio(&audio))?;
        let video = self.stage(Stage::PlanVideo, |p| {
            p.plan_clips(&pools.clips, audio.total_duration(), rng)
        })?;
        let prepared = self.stage(Stage::PrepareClips, |p| p.prepare_clips(&video))?;
        let video_path = self.stage(Stage::ConcatVideo, |p| {
            p.concat_video(&prepared, video.total_duration())
        })?;

        let final_duration = audio.total_duration().min(video.total_duration());
        let muxed_path = self.stage(Stage::Mux, |p| {
            p.mux(&video_path, &audio_path, final_duration)
        })?;

        let tracklist = Tracklist::from_sequence(&audio, Some(final_duration));
        let output_path = self.stage(Stage::Overlay, |p| {
            p.overlay(&muxed_path, &tracklist, final_duration)
        })?;
        let tracklist_files = self.stage(Stage::Tracklist, |p| p.write_tracklist(&tracklist))?;

        self.state = PipelineState::Complete;
        let elapsed = started.elapsed();
        info!(
            "Assembly complete: {} ({:.1}s of media in {:.1}s)",
            output_path.display(),
            final_duration,
            elapsed.as_secs_f64()
        );
        self.events.emit(Event::PipelineComplete {
            output_path: output_path.display().to_string(),
            tracklist_path: tracklist_files.text.display().to_string(),
            duration: final_duration,
            elapsed,
        });

        Ok(PipelineOutput {
            video_path: output_path,
            tracklist: tracklist_files,
            audio_duration: audio.total_duration(),
            video_duration: video.total_duration(),
            final_duration,
            track_count: tracklist.entries.len(),
            clip_count: video.len(),
            elapsed,
        })
    }

    fn stage<T>(&mut self, stage: Stage, f: impl FnOnce(&Self) -> CoreResult<T>) -> CoreResult<T> {
        let index = stage.index();
        info!("Stage {}/{}: {}", index + 1, Stage::ALL.len(), stage);
        self.state = PipelineState::Running { stage };
        self.events.emit(Event::StageStarted {
            index,
            stage: stage.name().to_string(),
        });

        let started = Instant::now();
        match f(self) {
            Ok(value) => {
                self.events.emit(Event::StageCompleted {
                    index,
                    stage: stage.name().to_string(),
                    elapsed: started.elapsed(),
                });
                Ok(value)
            }
            Err(err) => {
                error!("Stage {index} ({stage}) failed: {err}");
                let category = err.category();
                self.events.emit(Event::StageFailed {
                    index,
                    stage: stage.name().to_string(),
                    message: err.to_string(),
                    category,
                });
                self.state = PipelineState::Failed {
                    stage,
                    message: err.to_string(),
                    category,
                };
                Err(CoreError::StageFailed {
                    index,
                    stage: stage.name(),
                    source: Box::new(err),
                })
            }
        }
    }

    fn execute(&self, spec: CommandSpec, progress_total: Option<f64>) -> CoreResult<ProcessResult> {
        let options = RunOptions {
            timeout: Some(self.config.command_timeout()),
            progress_total_secs: progress_total,
        };
        self.executor.execute(spec, &options, self.events)
    }

    fn work_dir(&self) -> PathBuf {
        self.config.work_dir()
    }

    // ---- Stages ----

    fn scan_inputs(&self) -> CoreResult<Pools> {
        self.config.prepare_directories()?;
        let probe_timeout = self.config.probe_timeout();

        let tracks = match &self.songlist {
            Some(songlist) => {
                info!("Using songlist with {} tracks", songlist.songs.len());
                self.events.emit(Event::AssetsScanned {
                    kind: AssetKind::Track,
                    found: songlist.songs.len(),
                    skipped: 0,
                    total_duration: songlist.total_duration,
                });
                songlist.songs.clone()
            }
            None => {
                scan_assets(
                    &self.config.music_dir,
                    AssetKind::Track,
                    self.executor,
                    &self.builder,
                    probe_timeout,
                    self.events,
                )?
                .assets
            }
        };

        let clips = scan_assets(
            &self.config.clips_dir,
            AssetKind::Clip,
            self.executor,
            &self.builder,
            probe_timeout,
            self.events,
        )?
        .assets;

        Ok(Pools { tracks, clips })
    }

    fn plan_tracks<R: Rng + ?Sized>(
        &self,
        tracks: &[MediaAsset],
        rng: &mut R,
    ) -> CoreResult<Sequence> {
        let target = self.config.target_duration;
        let sequence = plan_audio(tracks, target, rng)?;
        self.planned(&sequence, target);
        Ok(sequence)
    }

    fn plan_clips<R: Rng + ?Sized>(
        &self,
        clips: &[MediaAsset],
        target: f64,
        rng: &mut R,
    ) -> CoreResult<Sequence> {
        let window = ClipWindow::new(self.config.clip_window_min, self.config.clip_window_max)?;
        let sequence = plan_video(clips, target, window, rng)?;
        self.planned(&sequence, target);
        Ok(sequence)
    }

    fn planned(&self, sequence: &Sequence, target: f64) {
        info!(
            "Planned {} {} entries ({:.1}s for a {:.1}s target)",
            sequence.len(),
            sequence.kind,
            sequence.total_duration(),
            target
        );
        self.events.emit(Event::SequencePlanned {
            kind: sequence.kind,
            entries: sequence.len(),
            total_duration: sequence.total_duration(),
            target_duration: target,
        });
    }

    fn concat_audio(&self, audio: &Sequence) -> CoreResult<PathBuf> {
        let output = self.work_dir().join("audio_mix.mka");
        let total = audio.total_duration();

        let mut options = CommandOptions::new()
            .with_flag("vn")
            .with("c:a", &self.config.audio_codec)
            .with("b:a", &self.config.audio_bitrate);
        let fade = self.config.audio_fade_duration;
        if fade > 0.0 && total > 2.0 * fade {
            options.set(
                "af",
                format!(
                    "afade=t=in:st=0:d={fade},afade=t=out:st={}:d={fade}",
                    crate::utils::format_seconds_arg(total - fade)
                ),
            );
        }

        let inputs: Vec<&Path> = audio.iter().map(|e| e.asset.path.as_path()).collect();
        let spec = self.builder.concat(&inputs, &output, &options)?;
        self.execute(spec, Some(total))?;
        Ok(output)
    }

    fn prepare_clips(&self, video: &Sequence) -> CoreResult<Vec<PathBuf>> {
        let target = Dimensions {
            width: self.config.width,
            height: self.config.height,
        };
        let probe_options = RunOptions::with_timeout(self.config.probe_timeout());
        let encode_options = self.builder.encode_defaults().to_options().with_flag("an");
        let work_dir = self.work_dir();
        let count = video.len();
        let mut prepared = Vec::with_capacity(count);

        for (index, entry) in video.iter().enumerate() {
            let source = &entry.asset.path;
            let dimensions = probe_dimensions(
                self.executor,
                &self.builder,
                source,
                &probe_options,
                self.events,
            )?;
            let scale_to = needs_scaling(dimensions, target).then_some(target);
            if scale_to.is_some() {
                log::debug!("Scaling {} from {dimensions} to {target}", source.display());
            }

            let (fade_in, fade_out) = transition_fades(
                self.config.transition,
                self.config.transition_duration,
                entry.duration,
                index,
                count,
            );
            let treatment = ClipTreatment {
                trim: entry
                    .is_windowed()
                    .then_some((entry.offset, entry.duration)),
                scale_to,
                fps: self.config.fps,
                length: entry.duration,
                fade_in,
                fade_out,
            };

            let output = numbered_artifact_path(&work_dir, "clip", index, "mp4");
            let spec = self.builder.apply_filter(
                source,
                &output,
                clip_filter(&treatment),
                &encode_options,
            )?;
            self.execute(spec, Some(entry.duration))?;

            self.events.emit(Event::ClipPrepared {
                current: index + 1,
                total: count,
                scaled: scale_to.is_some(),
            });
            prepared.push(output);
        }

        Ok(prepared)
    }

    fn concat_video(&self, prepared: &[PathBuf], total: f64) -> CoreResult<PathBuf> {
        let output = self.work_dir().join("video_concat.mp4");
        let spec = self
            .builder
            .concat(prepared, &output, &CommandOptions::new())?;
        self.execute(spec, Some(total))?;
        Ok(output)
    }

    fn mux(&self, video: &Path, audio: &Path, total: f64) -> CoreResult<PathBuf> {
        let output = self.work_dir().join("muxed.mp4");
        let spec = self
            .builder
            .add_audio(video, audio, &output, &CommandOptions::new())?;
        self.execute(spec, Some(total))?;
        Ok(output)
    }

    fn overlay(&self, muxed: &Path, tracklist: &Tracklist, total: f64) -> CoreResult<PathBuf> {
        let output = self.config.output_path();
        match overlay_filter(&tracklist.cues(), &self.config.overlay, total) {
            Some(filter) => {
                let options = self.builder.encode_defaults().to_options().with("c:a", "copy");
                let spec = self.builder.apply_filter(muxed, &output, filter, &options)?;
                self.execute(spec, Some(total))?;
            }
            None => {
                info!("No overlay to draw, copying muxed video to {}", output.display());
                std::fs::copy(muxed, &output)?;
            }
        }
        Ok(output)
    }

    fn write_tracklist(&self, tracklist: &Tracklist) -> CoreResult<TracklistFiles> {
        let output = self.config.output_path();
        let stem = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "loopcast".to_string());
        tracklist.write(&self.config.output_dir, &stem)
    }
}
