//! Core library for assembling long-form videos from short clips and music
//! tracks using ffmpeg and ffprobe.
//!
//! The crate discovers and probes media, plans clip and track sequences that
//! fill a target duration without immediate repeats, builds and runs the
//! ffmpeg commands that concatenate, transition, mux and caption them, and
//! writes a tracklist for the result.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use loopcast_core::config::CoreConfigBuilder;
//! use loopcast_core::events::EventDispatcher;
//! use loopcast_core::external::ProcessRunner;
//! use loopcast_core::processing::Pipeline;
//! use rand::SeedableRng;
//! use std::path::PathBuf;
//!
//! let config = CoreConfigBuilder::new()
//!     .clips_dir(PathBuf::from("/media/clips"))
//!     .music_dir(PathBuf::from("/media/music"))
//!     .output_dir(PathBuf::from("/media/out"))
//!     .target_duration(1800.0)
//!     .build();
//! config.validate().unwrap();
//!
//! let runner = ProcessRunner::new();
//! let events = EventDispatcher::new();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let output = Pipeline::new(&config, &runner, &events).run(&mut rng).unwrap();
//! println!("Wrote {}", output.video_path.display());
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod external;
pub mod media;
pub mod planning;
pub mod processing;
pub mod progress;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use discovery::find_media_files;
pub use error::{CoreError, CoreResult, FailureCategory};
pub use events::{Event, EventDispatcher, EventHandler};
pub use external::{
    check_tools, CommandBuilder, CommandExecutor, CommandOptions, CommandSpec, Operation,
    ProcessResult, ProcessRunner, RunOptions, ToolPaths,
};
pub use media::{AssetKind, MediaAsset, Songlist};
pub use planning::{plan_audio, plan_video, ClipWindow, Sequence, SequenceEntry};
pub use processing::{Pipeline, PipelineOutput, PipelineState, Stage, TransitionKind};
pub use progress::{ProgressParser, ProgressSnapshot, ProgressUpdate};
pub use utils::{format_duration, parse_ffmpeg_time};
