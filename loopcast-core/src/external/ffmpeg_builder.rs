//! FFmpeg/FFprobe command building
//!
//! This module translates a high-level intent ("concatenate these files",
//! "probe this clip's dimensions") into the exact argument list handed to
//! the external tool. Building is pure and deterministic, with one
//! exception: a concat operation writes its edit-list file, which then lives
//! exactly as long as the returned [`CommandSpec`].

use crate::error::{CoreError, CoreResult};
use crate::temp_files;

use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Default H.264 encoder settings, tuned for film-like content and broad
/// player compatibility.
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
pub const DEFAULT_PRESET: &str = "medium";
pub const DEFAULT_CRF: u8 = 23;
pub const DEFAULT_TUNE: &str = "film";
pub const DEFAULT_PROFILE: &str = "high";
pub const DEFAULT_LEVEL: &str = "4.1";
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";

/// Locations of the wrapped executables.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolPaths {
    /// Resolves the binaries the same way `ffmpeg-sidecar` does: next to the
    /// current executable when present, otherwise from `PATH`.
    fn default() -> Self {
        Self {
            ffmpeg: ffmpeg_sidecar::paths::ffmpeg_path(),
            ffprobe: ffmpeg_sidecar::ffprobe::ffprobe_path(),
        }
    }
}

/// The closed set of operations the builder knows how to express.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Re-encode one input (a file or a lavfi generator expression).
    Encode,
    /// Join inputs through the concat demuxer with stream copy.
    Concat,
    /// Video from the first input, audio from the second, shortest wins.
    AddAudio,
    /// One input through one caller-supplied filter string.
    ApplyFilter { filter: String },
    /// Decode the audio track of one input to PCM WAV.
    ExtractAudio,
    /// Read-only query for width/height of the first video stream.
    ProbeDimensions,
    /// Read-only query for container duration and title/artist tags.
    ProbeMedia,
}

impl Operation {
    /// Stable short name used in logs, events and error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Encode => "encode",
            Operation::Concat => "concat",
            Operation::AddAudio => "add_audio",
            Operation::ApplyFilter { .. } => "apply_filter",
            Operation::ExtractAudio => "extract_audio",
            Operation::ProbeDimensions => "probe_dimensions",
            Operation::ProbeMedia => "probe_media",
        }
    }

    /// Whether the operation only reads its input.
    #[must_use]
    pub fn is_probe(&self) -> bool {
        matches!(self, Operation::ProbeDimensions | Operation::ProbeMedia)
    }

    fn expected_inputs(&self) -> Option<usize> {
        match self {
            Operation::Concat => None,
            Operation::AddAudio => Some(2),
            _ => Some(1),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered option map. Each entry becomes `-key value`; an empty value
/// emits the bare flag (`-an`). Keys are not validated against the tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    entries: Vec<(String, String)>,
}

impl CommandOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an earlier value while keeping its position.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Adds a value-less flag such as `an`.
    #[must_use]
    pub fn with_flag(mut self, key: &str) -> Self {
        self.set(key, "");
        self
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        let key = key.trim_start_matches('-').to_string();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.trim_start_matches('-');
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlays `other` on top of `self`: shared keys take `other`'s value,
    /// new keys are appended in `other`'s order.
    #[must_use]
    pub fn merged(mut self, other: &CommandOptions) -> Self {
        for (key, value) in &other.entries {
            self.set(key, value);
        }
        self
    }

    fn push_args(&self, args: &mut Vec<String>) {
        for (key, value) in &self.entries {
            args.push(format!("-{key}"));
            if !value.is_empty() {
                args.push(value.clone());
            }
        }
    }
}

impl<K: AsRef<str>, V: ToString> FromIterator<(K, V)> for CommandOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = CommandOptions::new();
        for (key, value) in iter {
            options.set(key.as_ref(), value);
        }
        options
    }
}

/// A fully built invocation of an external tool.
///
/// Consumed by value when executed. For concat operations the spec owns the
/// temporary edit-list file, which is deleted when the spec is dropped,
/// whether the run succeeded, failed or timed out.
#[derive(Debug)]
pub struct CommandSpec {
    name: String,
    operation: Option<Operation>,
    program: PathBuf,
    args: Vec<String>,
    edit_list: Option<NamedTempFile>,
}

impl CommandSpec {
    /// Wraps an arbitrary program invocation, e.g. for dependency checks.
    pub fn custom(name: impl Into<String>, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            operation: None,
            program: program.into(),
            args,
            edit_list: None,
        }
    }

    /// Short name of the operation ("concat", "probe_media", ...).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn operation(&self) -> Option<&Operation> {
        self.operation.as_ref()
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Path of the concat edit-list, while the spec is alive.
    #[must_use]
    pub fn edit_list_path(&self) -> Option<&Path> {
        self.edit_list.as_ref().map(NamedTempFile::path)
    }

    /// Label for logs and errors, e.g. `ffmpeg (concat)`.
    #[must_use]
    pub fn label(&self) -> String {
        let program = self
            .program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string());
        format!("{program} ({})", self.name)
    }

    /// The value following the first occurrence of `-flag`, if any.
    #[must_use]
    pub fn option_value(&self, flag: &str) -> Option<&str> {
        let flag = format!("-{}", flag.trim_start_matches('-'));
        self.args
            .iter()
            .position(|a| *a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// Shell-like rendering for debug logs.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().map(|a| {
                if a.is_empty() || a.contains([' ', '\'', '"', ';', '|']) {
                    format!("'{}'", a.replace('\'', "'\\''"))
                } else {
                    a.clone()
                }
            }))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Encoder defaults applied to `encode` before caller options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeDefaults {
    pub codec: String,
    pub preset: String,
    pub crf: u8,
    pub tune: String,
}

impl Default for EncodeDefaults {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            crf: DEFAULT_CRF,
            tune: DEFAULT_TUNE.to_string(),
        }
    }
}

impl EncodeDefaults {
    /// The video encoding flags shared by every re-encoding operation.
    #[must_use]
    pub fn to_options(&self) -> CommandOptions {
        CommandOptions::new()
            .with("c:v", &self.codec)
            .with("preset", &self.preset)
            .with("crf", self.crf)
            .with("tune", &self.tune)
            .with("profile:v", DEFAULT_PROFILE)
            .with("level", DEFAULT_LEVEL)
            .with("pix_fmt", DEFAULT_PIXEL_FORMAT)
            .with("movflags", "+faststart")
    }
}

/// Builds [`CommandSpec`]s for every supported [`Operation`].
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    tools: ToolPaths,
    temp_dir: PathBuf,
    encode_defaults: EncodeDefaults,
}

impl CommandBuilder {
    /// `temp_dir` is where concat edit-lists are written.
    pub fn new(tools: ToolPaths, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            tools,
            temp_dir: temp_dir.into(),
            encode_defaults: EncodeDefaults::default(),
        }
    }

    #[must_use]
    pub fn with_encode_defaults(mut self, defaults: EncodeDefaults) -> Self {
        self.encode_defaults = defaults;
        self
    }

    #[must_use]
    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    #[must_use]
    pub fn encode_defaults(&self) -> &EncodeDefaults {
        &self.encode_defaults
    }

    /// Builds the argument list for `operation`.
    ///
    /// Input existence is not checked here, except that `encode` uses it to
    /// decide between file input and a lavfi generator. Fails when the input
    /// count or output presence does not fit the operation, or when a concat
    /// edit-list cannot be written.
    pub fn build<P: AsRef<Path>>(
        &self,
        operation: Operation,
        inputs: &[P],
        output: Option<&Path>,
        options: &CommandOptions,
    ) -> CoreResult<CommandSpec> {
        let inputs: Vec<&Path> = inputs.iter().map(AsRef::as_ref).collect();
        check_arity(&operation, &inputs, output)?;

        if operation.is_probe() {
            let args = probe_args(&operation, inputs[0], options);
            return Ok(self.spec(operation, self.tools.ffprobe.clone(), args, None));
        }

        let mut args = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-y".to_string(),
        ];
        let mut edit_list = None;

        match &operation {
            Operation::Encode => {
                push_encode_input(&mut args, inputs[0]);
                self.encode_defaults
                    .to_options()
                    .merged(options)
                    .push_args(&mut args);
            }
            Operation::Concat => {
                let list = temp_files::write_concat_list(&self.temp_dir, &inputs)?;
                args.extend(["-f", "concat", "-safe", "0", "-i"].map(String::from));
                args.push(list.path().to_string_lossy().into_owned());
                args.extend(["-c", "copy"].map(String::from));
                options.push_args(&mut args);
                edit_list = Some(list);
            }
            Operation::AddAudio => {
                push_input(&mut args, inputs[0]);
                push_input(&mut args, inputs[1]);
                args.extend(
                    ["-map", "0:v:0", "-map", "1:a:0", "-c", "copy", "-shortest"].map(String::from),
                );
                options.push_args(&mut args);
            }
            Operation::ApplyFilter { filter } => {
                push_input(&mut args, inputs[0]);
                args.push("-vf".to_string());
                args.push(filter.clone());
                options.push_args(&mut args);
            }
            Operation::ExtractAudio => {
                push_input(&mut args, inputs[0]);
                args.extend(["-vn", "-acodec", "pcm_s16le", "-f", "wav"].map(String::from));
                options.push_args(&mut args);
            }
            Operation::ProbeDimensions | Operation::ProbeMedia => unreachable!("handled above"),
        }

        if let Some(output) = output {
            args.push(output.to_string_lossy().into_owned());
        }

        Ok(self.spec(operation, self.tools.ffmpeg.clone(), args, edit_list))
    }

    pub fn encode(
        &self,
        input: &Path,
        output: &Path,
        options: &CommandOptions,
    ) -> CoreResult<CommandSpec> {
        self.build(Operation::Encode, &[input], Some(output), options)
    }

    pub fn concat<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        output: &Path,
        options: &CommandOptions,
    ) -> CoreResult<CommandSpec> {
        self.build(Operation::Concat, inputs, Some(output), options)
    }

    pub fn add_audio(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
        options: &CommandOptions,
    ) -> CoreResult<CommandSpec> {
        self.build(Operation::AddAudio, &[video, audio], Some(output), options)
    }

    pub fn apply_filter(
        &self,
        input: &Path,
        output: &Path,
        filter: impl Into<String>,
        options: &CommandOptions,
    ) -> CoreResult<CommandSpec> {
        let operation = Operation::ApplyFilter {
            filter: filter.into(),
        };
        self.build(operation, &[input], Some(output), options)
    }

    pub fn extract_audio(
        &self,
        input: &Path,
        output: &Path,
        options: &CommandOptions,
    ) -> CoreResult<CommandSpec> {
        self.build(Operation::ExtractAudio, &[input], Some(output), options)
    }

    pub fn probe_dimensions(&self, input: &Path) -> CoreResult<CommandSpec> {
        self.build(Operation::ProbeDimensions, &[input], None, &CommandOptions::new())
    }

    pub fn probe_media(&self, input: &Path) -> CoreResult<CommandSpec> {
        self.build(Operation::ProbeMedia, &[input], None, &CommandOptions::new())
    }

    fn spec(
        &self,
        operation: Operation,
        program: PathBuf,
        args: Vec<String>,
        edit_list: Option<NamedTempFile>,
    ) -> CommandSpec {
        CommandSpec {
            name: operation.name().to_string(),
            operation: Some(operation),
            program,
            args,
            edit_list,
        }
    }
}

fn check_arity(operation: &Operation, inputs: &[&Path], output: Option<&Path>) -> CoreResult<()> {
    let count_ok = match operation.expected_inputs() {
        Some(n) => inputs.len() == n,
        None => !inputs.is_empty(),
    };
    if !count_ok {
        return Err(CoreError::PathError(format!(
            "{operation} cannot be built from {} input(s)",
            inputs.len()
        )));
    }
    if output.is_none() && !operation.is_probe() {
        return Err(CoreError::PathError(format!(
            "{operation} requires an output path"
        )));
    }
    Ok(())
}

fn push_input(args: &mut Vec<String>, input: &Path) {
    args.push("-i".to_string());
    args.push(input.to_string_lossy().into_owned());
}

/// Files are read directly; anything else is handed to lavfi as a
/// generator expression such as `testsrc=duration=1:size=640x480:rate=30`.
fn push_encode_input(args: &mut Vec<String>, input: &Path) {
    if !input.is_file() {
        args.push("-f".to_string());
        args.push("lavfi".to_string());
    }
    push_input(args, input);
}

fn probe_args(operation: &Operation, input: &Path, options: &CommandOptions) -> Vec<String> {
    let mut args = vec!["-v".to_string(), "error".to_string()];
    match operation {
        Operation::ProbeDimensions => {
            args.extend(
                ["-select_streams", "v:0", "-show_entries", "stream=width,height"]
                    .map(String::from),
            );
        }
        _ => {
            args.extend(
                ["-show_entries", "format=duration:format_tags=title,artist"].map(String::from),
            );
        }
    }
    args.extend(["-of", "json"].map(String::from));
    options.push_args(&mut args);
    args.push(input.to_string_lossy().into_owned());
    args
}
