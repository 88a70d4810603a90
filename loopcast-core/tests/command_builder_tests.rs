// loopcast-core/tests/command_builder_tests.rs
//
// Argument construction and concat edit-list lifetime.

use loopcast_core::error::CoreError;
use loopcast_core::events::EventDispatcher;
use loopcast_core::external::{
    CommandBuilder, CommandExecutor, CommandOptions, Operation, ProcessRunner, RunOptions,
    ToolPaths,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn tools(ffmpeg: &str) -> ToolPaths {
    ToolPaths {
        ffmpeg: PathBuf::from(ffmpeg),
        ffprobe: PathBuf::from("ffprobe"),
    }
}

#[test]
fn test_concat_list_lists_inputs_in_order() {
    let dir = tempdir().unwrap();
    let builder = CommandBuilder::new(tools("ffmpeg"), dir.path());
    let inputs = [Path::new("/clips/b.mp4"), Path::new("/clips/it's a.mp4")];

    let spec = builder
        .concat(&inputs, Path::new("/out/joined.mp4"), &CommandOptions::new())
        .unwrap();
    let list_path = spec.edit_list_path().unwrap().to_path_buf();
    assert!(list_path.starts_with(dir.path()));

    let contents = fs::read_to_string(&list_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines,
        vec!["file '/clips/b.mp4'", "file '/clips/it'\\''s a.mp4'"]
    );

    assert_eq!(spec.option_value("f"), Some("concat"));
    assert_eq!(spec.option_value("i"), Some(list_path.to_str().unwrap()));
    assert_eq!(spec.option_value("c"), Some("copy"));
    assert_eq!(spec.args().last().map(String::as_str), Some("/out/joined.mp4"));

    drop(spec);
    assert!(!list_path.exists());
}

#[cfg(unix)]
#[test]
fn test_concat_list_removed_after_successful_run() {
    let dir = tempdir().unwrap();
    let builder = CommandBuilder::new(tools("true"), dir.path());
    let spec = builder
        .concat(&["/a.mp4", "/b.mp4"], Path::new("/tmp/never.mp4"), &CommandOptions::new())
        .unwrap();
    let list_path = spec.edit_list_path().unwrap().to_path_buf();
    assert!(list_path.exists());

    ProcessRunner::new()
        .execute(spec, &RunOptions::default(), &EventDispatcher::new())
        .unwrap();
    assert!(!list_path.exists());
}

#[cfg(unix)]
#[test]
fn test_concat_list_removed_after_failed_run() {
    let dir = tempdir().unwrap();
    let builder = CommandBuilder::new(tools("false"), dir.path());
    let spec = builder
        .concat(&["/a.mp4", "/b.mp4"], Path::new("/tmp/never.mp4"), &CommandOptions::new())
        .unwrap();
    let list_path = spec.edit_list_path().unwrap().to_path_buf();

    let err = ProcessRunner::new()
        .execute(spec, &RunOptions::default(), &EventDispatcher::new())
        .unwrap_err();
    assert!(matches!(err, CoreError::ToolFailure { exit_code: Some(1), .. }));
    assert!(!list_path.exists());
}

#[test]
fn test_concat_list_removed_when_tool_is_missing() {
    let dir = tempdir().unwrap();
    let builder = CommandBuilder::new(tools("/nonexistent/ffmpeg"), dir.path());
    let spec = builder
        .concat(&["/a.mp4"], Path::new("/tmp/never.mp4"), &CommandOptions::new())
        .unwrap();
    let list_path = spec.edit_list_path().unwrap().to_path_buf();

    let err = ProcessRunner::new()
        .execute(spec, &RunOptions::default(), &EventDispatcher::new())
        .unwrap_err();
    assert!(matches!(err, CoreError::ToolNotFound(_)));
    assert!(!list_path.exists());
}

#[test]
fn test_encode_options_round_trip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.mp4");
    fs::write(&input, b"").unwrap();
    let builder = CommandBuilder::new(tools("ffmpeg"), dir.path());

    let spec = builder
        .encode(&input, Path::new("/out/x.mp4"), &CommandOptions::new().with("preset", "medium"))
        .unwrap();
    assert_eq!(spec.option_value("preset"), Some("medium"));
    assert_eq!(spec.option_value("-preset"), Some("medium"));
    assert_eq!(spec.option_value("i"), Some(input.to_str().unwrap()));

    let spec = builder
        .encode(&input, Path::new("/out/x.mp4"), &CommandOptions::new().with("crf", 30))
        .unwrap();
    assert_eq!(spec.option_value("crf"), Some("30"));
    assert_eq!(spec.args().iter().filter(|a| *a == "-crf").count(), 1);
}

#[test]
fn test_encode_uses_generator_for_non_file_input() {
    let dir = tempdir().unwrap();
    let builder = CommandBuilder::new(tools("ffmpeg"), dir.path());
    let spec = builder
        .encode(
            Path::new("color=c=black:s=1920x1080:d=5"),
            Path::new("/out/black.mp4"),
            &CommandOptions::new(),
        )
        .unwrap();
    assert_eq!(spec.option_value("f"), Some("lavfi"));
}

#[test]
fn test_probe_uses_ffprobe_with_json() {
    let dir = tempdir().unwrap();
    let builder = CommandBuilder::new(tools("ffmpeg"), dir.path());
    let spec = builder.probe_media(Path::new("/music/a.mp3")).unwrap();
    assert_eq!(spec.program(), Path::new("ffprobe"));
    assert_eq!(spec.option_value("of"), Some("json"));
    assert_eq!(spec.args().last().map(String::as_str), Some("/music/a.mp3"));
}

#[test]
fn test_arity_is_checked() {
    let dir = tempdir().unwrap();
    let builder = CommandBuilder::new(tools("ffmpeg"), dir.path());
    let none: [&Path; 0] = [];

    assert!(builder
        .build(Operation::Concat, &none, Some(Path::new("/o.mp4")), &CommandOptions::new())
        .is_err());
    assert!(builder
        .build(
            Operation::AddAudio,
            &[Path::new("/v.mp4")],
            Some(Path::new("/o.mp4")),
            &CommandOptions::new(),
        )
        .is_err());
    assert!(builder
        .build(Operation::Encode, &[Path::new("/v.mp4")], None, &CommandOptions::new())
        .is_err());
}

#[test]
fn test_add_audio_maps_both_inputs() {
    let dir = tempdir().unwrap();
    let builder = CommandBuilder::new(tools("ffmpeg"), dir.path());
    let spec = builder
        .add_audio(
            Path::new("/w/video.mp4"),
            Path::new("/w/audio.mka"),
            Path::new("/w/muxed.mp4"),
            &CommandOptions::new(),
        )
        .unwrap();
    let args = spec.args().join(" ");
    assert!(args.contains("-map 0:v:0 -map 1:a:0 -c copy -shortest"));
    assert_eq!(spec.label(), "ffmpeg (add_audio)");
}
