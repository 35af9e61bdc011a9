//! Keyframe media
//!
//! Keyframes are fetched from the service on demand, downscaled off the
//! update loop and kept in memory as ready-to-draw image handles.

pub mod cache;
pub mod thumbnail;

pub use cache::ThumbnailCache;
