//! Types partagés, palettes, tables et configuration pour ascii-frame.
//!
//! This crate contains all shared types, traits, and configuration logic
//! used across the ascii-frame workspace.

pub mod charset;
pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod traits;

pub use charset::{GlyphLut, Palette};
pub use clock::FrameClock;
pub use color::GammaLut;
pub use config::ConverterConfig;
pub use error::CoreError;
pub use frame::{AsciiCell, AsciiGrid, PixelFrame};
