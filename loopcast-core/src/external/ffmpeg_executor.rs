// ============================================================================
// loopcast-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// COMMAND EXECUTION: Runs built commands as subprocesses with a timeout
//
// Each CommandSpec is consumed by exactly one execution. The child runs in
// its own process group with stdout and stderr piped to reader threads; the
// calling thread polls for exit, feeds stderr to the progress parser and
// enforces the timeout. On timeout the whole process group is killed so
// that helpers spawned by the tool do not outlive it.
//
// KEY COMPONENTS:
// - CommandExecutor: the seam used by scanning and the pipeline
// - ProcessRunner: the std::process based implementation
// - RunOptions / ProcessResult: per-invocation inputs and outputs
// - classify_failure: advisory signature matching of diagnostic output
//
// AI-ASSISTANT-INFO: Single-shot subprocess runner with timeout and process-group kill

// ---- External crate imports ----
use log::{debug, error, trace, warn};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

// ---- Standard library imports ----
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

// ---- Internal crate imports ----
use crate::error::{
    command_failed_error, command_start_error, command_wait_error, CoreError, CoreResult,
    FailureCategory,
};
use crate::events::{Event, EventDispatcher};
use crate::external::ffmpeg_builder::CommandSpec;
use crate::progress::ProgressParser;

/// How often the child is polled for exit while no output arrives.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long to keep collecting output after the child exits. Bounds the
/// wait when a detached descendant still holds the pipes open.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Chunks the reader threads may queue before they block on the pipe.
const CHANNEL_CAPACITY: usize = 1024;

/// Non-progress stderr lines kept for error reporting.
const STDERR_TAIL_LINES: usize = 50;

/// Per-invocation execution options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Kill the process and fail with `Timeout` once this much time passes.
    pub timeout: Option<Duration>,
    /// Expected media duration of the output, enabling percent and ETA.
    pub progress_total_secs: Option<f64>,
}

impl RunOptions {
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            progress_total_secs: None,
        }
    }

    #[must_use]
    pub fn progress_total(mut self, secs: f64) -> Self {
        self.progress_total_secs = Some(secs);
        self
    }
}

/// Outcome of a command that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessResult {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl ProcessResult {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes a built command.
///
/// Implementations must return `Ok` only for a zero exit status, and must
/// drop `spec` before returning in every outcome.
pub trait CommandExecutor {
    fn execute(
        &self,
        spec: CommandSpec,
        options: &RunOptions,
        events: &EventDispatcher,
    ) -> CoreResult<ProcessResult>;
}

/// Runs commands as real subprocesses, one at a time, without retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for ProcessRunner {
    fn execute(
        &self,
        spec: CommandSpec,
        options: &RunOptions,
        events: &EventDispatcher,
    ) -> CoreResult<ProcessResult> {
        let label = spec.label();
        let command_line = spec.command_line();
        debug!("Running: {command_line}");
        events.emit(Event::CommandStarted {
            command: label.clone(),
            command_line,
        });

        let mut cmd = Command::new(spec.program());
        cmd.args(spec.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|e| {
            error!("Failed to start {label}: {e}");
            command_start_error(label.clone(), e)
        })?;

        let (tx, rx) = mpsc::sync_channel(CHANNEL_CAPACITY);
        spawn_reader(child.stdout.take(), Stream::Stdout, tx.clone());
        spawn_reader(child.stderr.take(), Stream::Stderr, tx);

        let mut output = OutputCollector::new(&label, options.progress_total_secs);
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    terminate(&mut child);
                    return Err(command_wait_error(label, e));
                }
            }

            let elapsed = start.elapsed();
            if let Some(timeout) = options.timeout {
                if elapsed >= timeout {
                    warn!(
                        "{label} exceeded its {:.1}s timeout, killing it",
                        timeout.as_secs_f64()
                    );
                    terminate(&mut child);
                    events.emit(Event::CommandFinished {
                        command: label.clone(),
                        exit_code: None,
                        elapsed,
                    });
                    return Err(CoreError::Timeout {
                        command: label,
                        elapsed,
                    });
                }
            }

            let wait = options
                .timeout
                .map_or(POLL_INTERVAL, |t| POLL_INTERVAL.min(t.saturating_sub(elapsed)));
            match rx.recv_timeout(wait) {
                Ok(chunk) => {
                    output.push(chunk, events);
                    // Drain what is queued, but never for longer than one poll
                    // interval so a chatty process cannot starve the checks above.
                    let pass_end = Instant::now() + POLL_INTERVAL;
                    while Instant::now() < pass_end {
                        match rx.try_recv() {
                            Ok(chunk) => output.push(chunk, events),
                            Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                // Both pipes closed; keep polling for the exit status.
                Err(RecvTimeoutError::Disconnected) => thread::sleep(wait),
            }
        };

        output.drain(&rx, events);
        let elapsed = start.elapsed();
        let exit_code = status.code();
        drop(spec);

        events.emit(Event::CommandFinished {
            command: label.clone(),
            exit_code,
            elapsed,
        });

        let stderr = output.stderr_tail();
        let result = ProcessResult {
            exit_code,
            stdout: output.stdout,
            stderr,
            elapsed,
        };

        if result.success() {
            debug!("{label} finished in {:.2}s", elapsed.as_secs_f64());
            Ok(result)
        } else {
            let category = classify_failure(&result.stderr);
            error!(
                "{label} failed with exit code {:?} ({category})",
                exit_code
            );
            Err(command_failed_error(label, exit_code, category, result.stderr))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

#[derive(Debug)]
enum Chunk {
    /// Raw stdout text, line terminators included.
    Stdout(String),
    /// One stderr line, split on `\r` as well as `\n`.
    Stderr(String),
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>, stream: Stream, tx: SyncSender<Chunk>) {
    if let Some(pipe) = pipe {
        thread::spawn(move || pump(pipe, stream, &tx));
    }
}

/// Forwards a pipe to the channel until EOF or until the receiver is gone.
fn pump<R: Read>(pipe: R, stream: Stream, tx: &SyncSender<Chunk>) {
    let mut reader = BufReader::new(pipe);
    let mut pending: Vec<u8> = Vec::new();

    let send = |pending: &mut Vec<u8>| -> bool {
        let text = String::from_utf8_lossy(pending).into_owned();
        pending.clear();
        let chunk = match stream {
            Stream::Stdout => Chunk::Stdout(text),
            Stream::Stderr if text.trim().is_empty() => return true,
            Stream::Stderr => Chunk::Stderr(text),
        };
        tx.send(chunk).is_ok()
    };

    loop {
        let available = match reader.fill_buf() {
            Ok([]) => break,
            Ok(buf) => buf,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        };
        let len = available.len();
        for &byte in available {
            match (stream, byte) {
                (Stream::Stdout, b'\n') => {
                    pending.push(byte);
                    if !send(&mut pending) {
                        return;
                    }
                }
                (Stream::Stderr, b'\n' | b'\r') => {
                    if !send(&mut pending) {
                        return;
                    }
                }
                _ => pending.push(byte),
            }
        }
        reader.consume(len);
    }

    if !pending.is_empty() {
        send(&mut pending);
    }
}

/// Accumulates output and turns stderr lines into progress events.
///
/// Progress lines are consumed by the parser and not kept; of the rest only
/// the last `STDERR_TAIL_LINES` survive.
struct OutputCollector {
    label: String,
    stdout: String,
    stderr_lines: VecDeque<String>,
    progress: ProgressParser,
}

impl OutputCollector {
    fn new(label: &str, total_secs: Option<f64>) -> Self {
        Self {
            label: label.to_string(),
            stdout: String::new(),
            stderr_lines: VecDeque::new(),
            progress: ProgressParser::new(total_secs),
        }
    }

    fn push(&mut self, chunk: Chunk, events: &EventDispatcher) {
        match chunk {
            Chunk::Stdout(text) => self.stdout.push_str(&text),
            Chunk::Stderr(line) => {
                trace!("{}: {}", self.label, line);
                let update = self.progress.parse_line(&line);
                if update.elapsed_secs.is_some() {
                    if events.has_handlers() {
                        events.emit(Event::Progress {
                            command: self.label.clone(),
                            percent: self
                                .progress
                                .total_secs()
                                .map(|_| self.progress.progress_percent()),
                            snapshot: self.progress.snapshot().clone(),
                        });
                    }
                    return;
                }
                if self.stderr_lines.len() == STDERR_TAIL_LINES {
                    self.stderr_lines.pop_front();
                }
                self.stderr_lines.push_back(line);
            }
        }
    }

    fn stderr_tail(&self) -> String {
        self.stderr_lines
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Collects output still in flight after exit, bounded by `DRAIN_GRACE`.
    fn drain(&mut self, rx: &Receiver<Chunk>, events: &EventDispatcher) {
        let deadline = Instant::now() + DRAIN_GRACE;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!("{}: output pipes still open after exit, ignoring the rest", self.label);
                break;
            }
            match rx.recv_timeout(remaining) {
                Ok(chunk) => self.push(chunk, events),
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    warn!("{}: output pipes still open after exit, ignoring the rest", self.label);
                    break;
                }
            }
        }
    }
}

/// Kills the child's whole process group (where supported) and reaps it.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: killpg only sends a signal; the group was created for this child.
            unsafe {
                libc::killpg(pgid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

struct Signature {
    category: FailureCategory,
    pattern: Regex,
}

static SIGNATURES: Lazy<Vec<Signature>> = Lazy::new(|| {
    let table: [(FailureCategory, &str); 6] = [
        (
            FailureCategory::OutOfMemory,
            r"out of memory|cannot allocate memory|memory allocation failed|bad_alloc",
        ),
        (
            FailureCategory::PermissionDenied,
            r"permission denied|operation not permitted",
        ),
        (
            FailureCategory::MissingCodec,
            r"unknown encoder|unknown decoder|(?:en|de)coder .* not found|codec not currently supported|unsupported codec",
        ),
        (
            FailureCategory::MalformedInput,
            r"invalid data found when processing input|moov atom not found|could not find codec parameters|invalid argument|error parsing|no such filter|impossible to open",
        ),
        (
            FailureCategory::IoError,
            r"no such file or directory|input/output error|i/o error|no space left on device|broken pipe|read-only file system",
        ),
        (FailureCategory::Timeout, r"timed out|timeout|connection reset"),
    ];
    table
        .into_iter()
        .map(|(category, pattern)| Signature {
            category,
            pattern: RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .unwrap(),
        })
        .collect()
});

/// Advisory category for a tool failure, from its diagnostic text.
///
/// Signatures are checked in a fixed order and the first match wins;
/// `Unknown` when nothing matches.
#[must_use]
pub fn classify_failure(stderr: &str) -> FailureCategory {
    SIGNATURES
        .iter()
        .find(|s| s.pattern.is_match(stderr))
        .map_or(FailureCategory::Unknown, |s| s.category)
}
