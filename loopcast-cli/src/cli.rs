// loopcast-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use loopcast_core::config::{
    DEFAULT_CLIP_WINDOW_MAX, DEFAULT_CLIP_WINDOW_MIN, DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_CRF,
    DEFAULT_FPS, DEFAULT_HEIGHT, DEFAULT_OUTPUT_NAME, DEFAULT_PRESET, DEFAULT_TARGET_DURATION,
    DEFAULT_TRANSITION_DURATION, DEFAULT_WIDTH,
};
use loopcast_core::{AssetKind, TransitionKind};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Loopcast: long-form video assembly",
    long_about = "Builds long videos from a folder of short clips and a folder of music \
                  tracks using ffmpeg, with transitions, a now-playing overlay and a tracklist."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging on the console
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output (also honours NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assembles a video from clips and music
    Generate(GenerateArgs),
    /// Probes a directory of clips or tracks and lists what is usable
    Scan(ScanArgs),
    /// Verifies that ffmpeg and ffprobe can be run
    Check(ToolArgs),
}

/// Locations of the external tools; default to the PATH lookup.
#[derive(Args, Debug, Clone, Default)]
pub struct ToolArgs {
    /// Path to the ffmpeg executable
    #[arg(long, value_name = "PATH", env = "LOOPCAST_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe executable
    #[arg(long, value_name = "PATH", env = "LOOPCAST_FFPROBE")]
    pub ffprobe: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Directory containing the video clips
    #[arg(short = 'c', long = "clips", required = true, value_name = "CLIPS_DIR")]
    pub clips_dir: PathBuf,

    /// Directory containing the music tracks
    #[arg(
        short = 'm',
        long = "music",
        value_name = "MUSIC_DIR",
        required_unless_present = "songlist"
    )]
    pub music_dir: Option<PathBuf>,

    /// Directory where the video, tracklist and logs are written
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// File name of the final video
    #[arg(long, value_name = "FILE", default_value = DEFAULT_OUTPUT_NAME)]
    pub name: String,

    /// Directory for intermediate files (defaults to OUTPUT_DIR/work)
    #[arg(long, value_name = "WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Directory for log files (defaults to OUTPUT_DIR/logs)
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Use a saved songlist instead of probing the music directory
    #[arg(long, value_name = "FILE")]
    pub songlist: Option<PathBuf>,

    // --- Planning ---
    /// Target length of the video in seconds
    #[arg(short = 'd', long, value_name = "SECONDS", default_value_t = DEFAULT_TARGET_DURATION)]
    pub duration: f64,

    /// Shortest excerpt taken from a long clip, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_CLIP_WINDOW_MIN)]
    pub clip_min: f64,

    /// Longest excerpt taken from a long clip, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_CLIP_WINDOW_MAX)]
    pub clip_max: f64,

    /// Seed for reproducible clip and track selection
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    // --- Output format ---
    /// Output width in pixels
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_WIDTH)]
    pub width: u32,

    /// Output height in pixels
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_HEIGHT)]
    pub height: u32,

    /// Output frame rate
    #[arg(long, value_name = "FPS", default_value_t = DEFAULT_FPS)]
    pub fps: u32,

    /// x264 CRF quality (0-51, lower is better)
    #[arg(long, value_name = "CRF", default_value_t = DEFAULT_CRF,
          value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: u8,

    /// x264 preset
    #[arg(long, value_name = "PRESET", default_value = DEFAULT_PRESET)]
    pub preset: String,

    // --- Effects ---
    /// Transition between clips (fade or cut)
    #[arg(long, value_name = "KIND", default_value = "fade")]
    pub transition: TransitionKind,

    /// Transition length in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TRANSITION_DURATION)]
    pub transition_duration: f64,

    /// Do not draw the now-playing overlay
    #[arg(long)]
    pub no_overlay: bool,

    /// Font file for the overlay text
    #[arg(long, value_name = "FONT_FILE")]
    pub font: Option<PathBuf>,

    // --- Execution ---
    /// Timeout for each ffmpeg command, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_COMMAND_TIMEOUT_SECS)]
    pub timeout: u64,

    #[command(flatten)]
    pub tools: ToolArgs,

    /// Write events as JSON lines on stdout instead of progress bars
    #[arg(long)]
    pub json_progress: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub dump_config: bool,
}

/// Which kind of media `scan` looks for.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    Clips,
    Tracks,
}

impl From<ScanKind> for AssetKind {
    fn from(kind: ScanKind) -> Self {
        match kind {
            ScanKind::Clips => AssetKind::Clip,
            ScanKind::Tracks => AssetKind::Track,
        }
    }
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(required = true, value_name = "DIR")]
    pub dir: PathBuf,

    /// Kind of media to look for
    #[arg(short, long, value_enum, default_value_t = ScanKind::Tracks)]
    pub kind: ScanKind,

    /// Save the scanned tracks as a songlist for `generate --songlist`
    #[arg(long, value_name = "FILE")]
    pub write_songlist: Option<PathBuf>,

    #[command(flatten)]
    pub tools: ToolArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_basic_args() {
        let cli = Cli::parse_from([
            "loopcast", "generate", "-c", "clips", "-m", "music", "-o", "out",
        ]);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.clips_dir, PathBuf::from("clips"));
                assert_eq!(args.music_dir, Some(PathBuf::from("music")));
                assert_eq!(args.output_dir, PathBuf::from("out"));
                assert_eq!(args.duration, DEFAULT_TARGET_DURATION);
                assert_eq!(args.transition, TransitionKind::Fade);
                assert!(!args.no_overlay);
                assert!(args.seed.is_none());
            }
            other => panic!("expected generate, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_generate_overrides() {
        let cli = Cli::parse_from([
            "loopcast",
            "--verbose",
            "generate",
            "--clips", "c",
            "--songlist", "songs.json",
            "--output", "o",
            "--duration", "1800",
            "--transition", "cut",
            "--crf", "20",
            "--seed", "7",
            "--ffmpeg", "/opt/ffmpeg",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Generate(args) => {
                assert!(args.music_dir.is_none());
                assert_eq!(args.songlist, Some(PathBuf::from("songs.json")));
                assert_eq!(args.duration, 1800.0);
                assert_eq!(args.transition, TransitionKind::Cut);
                assert_eq!(args.crf, 20);
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.tools.ffmpeg, Some(PathBuf::from("/opt/ffmpeg")));
            }
            other => panic!("expected generate, got {other:?}"),
        }
    }

    #[test]
    fn test_generate_requires_music_or_songlist() {
        let result = Cli::try_parse_from(["loopcast", "generate", "-c", "c", "-o", "o"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::parse_from([
            "loopcast", "scan", "music", "--kind", "tracks", "--write-songlist", "s.json",
        ]);
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.dir, PathBuf::from("music"));
                assert_eq!(AssetKind::from(args.kind), AssetKind::Track);
                assert_eq!(args.write_songlist, Some(PathBuf::from("s.json")));
            }
            other => panic!("expected scan, got {other:?}"),
        }
    }
}
