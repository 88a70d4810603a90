//! Assembly processing: clip preparation and transitions, the track overlay,
//! tracklist output and the pipeline that ties them together.

pub mod overlay;
pub mod pipeline;
pub mod tracklist;
pub mod transition;

pub use overlay::{overlay_filter, OverlayCue};
pub use pipeline::{Pipeline, PipelineOutput, PipelineState, Stage};
pub use tracklist::{Tracklist, TracklistEntry, TracklistFiles};
pub use transition::TransitionKind;
