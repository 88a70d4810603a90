//! Per-clip normalisation and transitions.
//!
//! Every clip is prepared into an intermediate file with identical format
//! (frame size, sample aspect ratio, frame rate, codec) so the final concat
//! can stream-copy. Transitions are applied inside that same pass: a fade
//! transition is a fade-out at the end of the earlier clip followed by a
//! fade-in at the start of the later one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::external::Dimensions;
use crate::utils::format_seconds_arg;

/// How one clip hands over to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Hard cut, no effect.
    Cut,
    /// Fade through black: the outgoing clip fades out, then the incoming
    /// one fades in. The two clips never overlap, so this is not a crossfade
    /// and every clip can be prepared on its own before a stream-copy concat.
    #[default]
    Fade,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionKind::Cut => f.write_str("cut"),
            TransitionKind::Fade => f.write_str("fade"),
        }
    }
}

impl FromStr for TransitionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cut" | "none" => Ok(TransitionKind::Cut),
            "fade" => Ok(TransitionKind::Fade),
            other => Err(CoreError::Config(format!("unknown transition '{other}'"))),
        }
    }
}

/// Fade-in and fade-out lengths for clip `index` of `count`.
///
/// The first clip never fades in and the last never fades out. Lengths are
/// clamped to half the clip so the two fades cannot overlap.
#[must_use]
pub fn transition_fades(
    kind: TransitionKind,
    duration: f64,
    clip_length: f64,
    index: usize,
    count: usize,
) -> (Option<f64>, Option<f64>) {
    if kind == TransitionKind::Cut || duration <= 0.0 || clip_length <= 0.0 {
        return (None, None);
    }
    let length = duration.min(clip_length / 2.0);
    let fade_in = (index > 0).then_some(length);
    let fade_out = (index + 1 < count).then_some(length);
    (fade_in, fade_out)
}

/// Everything that is done to one clip while preparing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipTreatment {
    /// Excerpt `(offset, duration)` inside the source; `None` keeps the whole clip.
    pub trim: Option<(f64, f64)>,
    /// Letterbox into this frame size when the source differs.
    pub scale_to: Option<Dimensions>,
    pub fps: u32,
    /// Output length of the clip, used to place the fade-out.
    pub length: f64,
    pub fade_in: Option<f64>,
    pub fade_out: Option<f64>,
}

/// Whether a clip of `source` dimensions needs scaling to `target`.
#[must_use]
pub fn needs_scaling(source: Dimensions, target: Dimensions) -> bool {
    source != target
}

/// The `-vf` chain for a [`ClipTreatment`].
#[must_use]
pub fn clip_filter(treatment: &ClipTreatment) -> String {
    let mut filters = Vec::new();

    if let Some((offset, duration)) = treatment.trim {
        filters.push(format!(
            "trim=start={}:duration={}",
            format_seconds_arg(offset),
            format_seconds_arg(duration)
        ));
        filters.push("setpts=PTS-STARTPTS".to_string());
    }
    if let Some(Dimensions { width, height }) = treatment.scale_to {
        filters.push(format!(
            "scale={width}:{height}:force_original_aspect_ratio=decrease"
        ));
        filters.push(format!("pad={width}:{height}:(ow-iw)/2:(oh-ih)/2"));
    }
    filters.push("setsar=1".to_string());
    filters.push(format!("fps={}", treatment.fps));

    if let Some(d) = treatment.fade_in {
        filters.push(format!("fade=t=in:st=0:d={}", format_seconds_arg(d)));
    }
    if let Some(d) = treatment.fade_out {
        let start = (treatment.length - d).max(0.0);
        filters.push(format!(
            "fade=t=out:st={}:d={}",
            format_seconds_arg(start),
            format_seconds_arg(d)
        ));
    }

    filters.join(",")
}
