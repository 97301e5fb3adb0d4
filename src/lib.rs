//! Scrolling pitch display for sung-melody practice.
//!
//! Detector readings are pushed into a [`display::PitchDisplay`], which
//! scrolls them past a reference melody on three layered RGBA surfaces.

pub mod config;
pub mod display;
pub mod error;
pub mod pitch;
pub mod render;
pub mod session;
