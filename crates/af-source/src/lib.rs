//! Visual source modules for ascii-frame (image files, synthetic patterns).

pub mod image;
pub mod pattern;
