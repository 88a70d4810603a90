//! Sequence planning: choosing which tracks and clips play, in which order,
//! to fill a target duration.

pub mod planner;

pub use planner::{
    plan_audio, plan_sequence, plan_video, ClipWindow, PlanMode, MAX_SEQUENCE_ENTRIES,
};

use serde::Serialize;

use crate::media::{AssetKind, MediaAsset};

/// One item of a planned sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceEntry {
    pub asset: MediaAsset,
    /// Where playback starts inside the asset, in seconds.
    pub offset: f64,
    /// How much of the asset plays, in seconds.
    pub duration: f64,
    /// Position of this entry in the assembled output, in seconds.
    pub start: f64,
}

impl SequenceEntry {
    /// Position in the output where this entry ends.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Whether only part of the asset is used.
    #[must_use]
    pub fn is_windowed(&self) -> bool {
        self.offset > 0.0 || self.duration < self.asset.duration
    }
}

/// An ordered selection of assets with its cumulative duration.
///
/// No two adjacent entries share a source unless the pool it came from had
/// only one distinct asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sequence {
    pub kind: AssetKind,
    entries: Vec<SequenceEntry>,
    total_duration: f64,
}

impl Sequence {
    #[must_use]
    pub fn empty(kind: AssetKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            total_duration: 0.0,
        }
    }

    /// Appends `duration` seconds of `asset` starting at `offset`.
    pub fn push(&mut self, asset: MediaAsset, offset: f64, duration: f64) {
        self.entries.push(SequenceEntry {
            asset,
            offset,
            duration,
            start: self.total_duration,
        });
        self.total_duration += duration;
    }

    #[must_use]
    pub fn entries(&self) -> &[SequenceEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SequenceEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// True if two neighbouring entries come from the same source file.
    #[must_use]
    pub fn has_adjacent_repeat(&self) -> bool {
        self.entries
            .windows(2)
            .any(|pair| pair[0].asset.same_source(&pair[1].asset))
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a SequenceEntry;
    type IntoIter = std::slice::Iter<'a, SequenceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
