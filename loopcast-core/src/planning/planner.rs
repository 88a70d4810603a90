// ============================================================================
// loopcast-core/src/planning/planner.rs
// ============================================================================
//
// SEQUENCE PLANNING: Filling a target duration without immediate repeats
//
// Picks are drawn from a shuffle bag: a shuffled queue of pool indices that
// is refilled whenever it runs dry, so every asset is used once per round
// before any is used again. When the head of the bag equals the previous
// pick, the first later index with a different source is taken instead.
// Planning stops as soon as the cumulative duration reaches the target; the
// last entry is never trimmed, so a sequence may overshoot by at most one
// entry.
//
// KEY COMPONENTS:
// - plan_sequence: the shared algorithm
// - plan_audio: whole tracks
// - plan_video: clips, cut to a random window when longer than the window
//
// AI-ASSISTANT-INFO: Randomised, terminating sequence planner with no-repeat rule

// ---- External crate imports ----
use rand::seq::SliceRandom;
use rand::Rng;

// ---- Standard library imports ----
use std::collections::{HashSet, VecDeque};

// ---- Internal crate imports ----
use super::Sequence;
use crate::error::{CoreError, CoreResult};
use crate::media::{AssetKind, MediaAsset};

/// Upper bound on the entries one plan may need. A target this many times
/// longer than the shortest pick is treated as invalid rather than planned.
pub const MAX_SEQUENCE_ENTRIES: f64 = 1_000_000.0;

/// Bounds of the excerpt taken from clips longer than `max`, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipWindow {
    pub min: f64,
    pub max: f64,
}

impl ClipWindow {
    pub fn new(min: f64, max: f64) -> CoreResult<Self> {
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(CoreError::Config(format!(
                "invalid clip window {min}..{max}"
            )));
        }
        Ok(Self { min, max })
    }
}

impl Default for ClipWindow {
    fn default() -> Self {
        Self {
            min: crate::config::DEFAULT_CLIP_WINDOW_MIN,
            max: crate::config::DEFAULT_CLIP_WINDOW_MAX,
        }
    }
}

/// How much of each picked asset is used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanMode {
    /// The whole asset, every time.
    Whole,
    /// A random window for assets longer than `window.max`.
    Windowed(ClipWindow),
}

/// Plans whole music tracks up to `target` seconds.
pub fn plan_audio<R: Rng + ?Sized>(
    pool: &[MediaAsset],
    target: f64,
    rng: &mut R,
) -> CoreResult<Sequence> {
    plan_sequence(pool, AssetKind::Track, target, PlanMode::Whole, rng)
}

/// Plans clip excerpts up to `target` seconds.
pub fn plan_video<R: Rng + ?Sized>(
    pool: &[MediaAsset],
    target: f64,
    window: ClipWindow,
    rng: &mut R,
) -> CoreResult<Sequence> {
    plan_sequence(pool, AssetKind::Clip, target, PlanMode::Windowed(window), rng)
}

/// Builds a sequence whose total duration is at least `target`.
///
/// # Errors
///
/// * `InvalidTarget` - `target` is NaN or infinite, or would need more than
///   `MAX_SEQUENCE_ENTRIES` picks of the shortest usable length
/// * `EmptyPool` - no asset with a positive duration and `target > 0`
///
/// A `target` of zero or less yields an empty sequence, whatever the pool.
pub fn plan_sequence<R: Rng + ?Sized>(
    pool: &[MediaAsset],
    kind: AssetKind,
    target: f64,
    mode: PlanMode,
    rng: &mut R,
) -> CoreResult<Sequence> {
    if !target.is_finite() {
        return Err(CoreError::InvalidTarget(target));
    }
    let mut sequence = Sequence::empty(kind);
    if target <= 0.0 {
        return Ok(sequence);
    }

    let usable: Vec<&MediaAsset> = pool
        .iter()
        .filter(|a| a.duration.is_finite() && a.duration > 0.0)
        .collect();
    if usable.len() < pool.len() {
        log::warn!(
            "Ignoring {} {kind}(s) without a positive duration",
            pool.len() - usable.len()
        );
    }
    if usable.is_empty() {
        return Err(CoreError::EmptyPool(kind));
    }

    let shortest_pick = usable
        .iter()
        .map(|a| match mode {
            PlanMode::Windowed(window) if a.duration > window.max => window.min,
            _ => a.duration,
        })
        .fold(f64::INFINITY, f64::min);
    if target / shortest_pick > MAX_SEQUENCE_ENTRIES {
        return Err(CoreError::InvalidTarget(target));
    }

    let distinct = usable.iter().map(|a| &a.path).collect::<HashSet<_>>().len();
    let mut bag = ShuffleBag::new(usable.len());

    while sequence.total_duration() < target {
        let previous = sequence.entries().last().map(|e| &e.asset);
        let index = match previous {
            Some(prev) if distinct > 1 => bag.draw_where(rng, |i| !usable[i].same_source(prev)),
            _ => bag.draw(rng),
        };
        let asset = usable[index];
        let (offset, duration) = excerpt(asset, mode, rng);
        sequence.push(asset.clone(), offset, duration);
    }

    log::debug!(
        "Planned {} {kind} entries totalling {:.1}s for a {:.1}s target",
        sequence.len(),
        sequence.total_duration(),
        target
    );
    Ok(sequence)
}

/// Picks the part of `asset` to play.
fn excerpt<R: Rng + ?Sized>(asset: &MediaAsset, mode: PlanMode, rng: &mut R) -> (f64, f64) {
    match mode {
        PlanMode::Windowed(window) if asset.duration > window.max => {
            let length = rng.gen_range(window.min..=window.max);
            let offset = rng.gen_range(0.0..=asset.duration - length);
            (offset, length)
        }
        _ => (0.0, asset.duration),
    }
}

/// Queue of pool indices, reshuffled each round.
struct ShuffleBag {
    size: usize,
    queue: VecDeque<usize>,
}

impl ShuffleBag {
    fn new(size: usize) -> Self {
        Self {
            size,
            queue: VecDeque::with_capacity(size),
        }
    }

    fn refill<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut round: Vec<usize> = (0..self.size).collect();
        round.shuffle(rng);
        self.queue.extend(round);
    }

    fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        self.draw_where(rng, |_| true)
    }

    /// Removes and returns the first queued index accepted by `accept`,
    /// refilling as needed. The caller guarantees some index is acceptable.
    fn draw_where<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        accept: impl Fn(usize) -> bool,
    ) -> usize {
        loop {
            if let Some(pos) = self.queue.iter().position(|&i| accept(i)) {
                if let Some(index) = self.queue.remove(pos) {
                    return index;
                }
            }
            self.refill(rng);
        }
    }
}
