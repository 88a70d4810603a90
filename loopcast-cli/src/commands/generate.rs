//! Implementation of the 'generate' subcommand.
//!
//! Maps the arguments onto a `CoreConfig`, chooses how events are shown and
//! drives the core assembly pipeline, then prints a summary of the run.

use crate::cli::GenerateArgs;
use crate::commands::tool_paths;
use crate::error::CliResult;
use crate::progress::TerminalProgressHandler;
use crate::terminal;

use loopcast_core::events::json_handler::JsonProgressHandler;
use loopcast_core::events::EventDispatcher;
use loopcast_core::external::ProcessRunner;
use loopcast_core::media::read_songlist;
use loopcast_core::utils::format_duration;
use loopcast_core::{CoreConfig, CoreConfigBuilder, CoreError, Pipeline, PipelineOutput};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Builds the core configuration from the command-line arguments.
///
/// Without `--music`, the songlist's directory stands in as the music
/// directory; it is never scanned in that case.
pub fn create_core_config(args: &GenerateArgs) -> CliResult<CoreConfig> {
    let music_dir = match (&args.music_dir, &args.songlist) {
        (Some(dir), _) => dir.clone(),
        (None, Some(songlist)) => songlist
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        (None, None) => {
            return Err(CoreError::Config(
                "either --music or --songlist is required".to_string(),
            ));
        }
    };

    let mut builder = CoreConfigBuilder::new()
        .clips_dir(args.clips_dir.clone())
        .music_dir(music_dir)
        .output_dir(args.output_dir.clone())
        .output_name(args.name.clone())
        .tools(tool_paths(&args.tools))
        .resolution(args.width, args.height)
        .fps(args.fps)
        .crf(args.crf)
        .preset(args.preset.clone())
        .target_duration(args.duration)
        .clip_window(args.clip_min, args.clip_max)
        .transition(args.transition)
        .transition_duration(args.transition_duration)
        .overlay_enabled(!args.no_overlay)
        .command_timeout_secs(args.timeout);

    if let Some(dir) = &args.work_dir {
        builder = builder.work_dir(dir.clone());
    }
    if let Some(font) = &args.font {
        builder = builder.font_file(font.clone());
    }
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }

    Ok(builder.build())
}

/// Prints the effective configuration as pretty JSON on stdout.
pub fn dump_config(config: &CoreConfig) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn print_summary(output: &PipelineOutput) {
    terminal::print_success("Assembly complete");
    terminal::print_status("Video", &output.video_path.display().to_string(), true);
    terminal::print_status("Tracklist", &output.tracklist.text.display().to_string(), false);
    terminal::print_status("Length", &format_duration(output.final_duration), true);
    terminal::print_status("Audio plan", &format_duration(output.audio_duration), false);
    terminal::print_status("Video plan", &format_duration(output.video_duration), false);
    terminal::print_status("Tracks", &output.track_count.to_string(), false);
    terminal::print_status("Clips", &output.clip_count.to_string(), false);
    terminal::print_status("Total time", &format_duration(output.elapsed.as_secs_f64()), true);
}

/// Runs the assembly pipeline with an already built configuration.
pub fn run_generate(args: &GenerateArgs, config: &CoreConfig) -> CliResult<PipelineOutput> {
    config.validate()?;

    let mut events = EventDispatcher::new();
    if args.json_progress {
        events.add_handler(Arc::new(JsonProgressHandler::new()));
    } else {
        events.add_handler(Arc::new(TerminalProgressHandler::new()));
    }

    let mut rng = match config.seed {
        Some(seed) => {
            info!("Using seed {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    terminal::print_section("Loopcast");
    terminal::print_status("Clips", &config.clips_dir.display().to_string(), false);
    match &args.songlist {
        Some(path) => terminal::print_status("Songlist", &path.display().to_string(), false),
        None => terminal::print_status("Music", &config.music_dir.display().to_string(), false),
    }
    terminal::print_status("Output", &config.output_path().display().to_string(), false);
    let resolution = format!("{}x{} @ {} fps", config.width, config.height, config.fps);
    terminal::print_status("Resolution", &resolution, false);
    debug!("Work directory: {}", config.work_dir().display());

    let runner = ProcessRunner::new();
    let mut pipeline = Pipeline::new(config, &runner, &events);
    if let Some(path) = &args.songlist {
        pipeline = pipeline.with_songlist(read_songlist(path)?);
    }

    let output = pipeline.run(&mut rng)?;
    print_summary(&output);
    Ok(output)
}
