//! Source media: asset records, scanning of input directories and saved
//! songlists.

pub mod asset;
pub mod scan;
pub mod songlist;

pub use asset::{AssetKind, MediaAsset};
pub use scan::{scan_assets, ScanReport};
pub use songlist::{read_songlist, write_songlist, Songlist};
