//! Moteur de conversion pixel → ASCII.
//!
//! Image intégrale, carte de régions en virgule fixe, réduction scalaire
//! ou sur 4 voies, instrumentation de benchmark.

pub mod bench;
pub mod converter;
pub mod integral;
pub mod lanes;
pub mod lut;
pub mod reduce;
pub mod region;

pub use converter::{AsciiConverter, ConvertOutcome, SkipReason};
pub use reduce::AccelMode;
