//! Keyframe model, easing curves and the preset catalog.

pub mod config;
pub mod ease;
pub mod keyframe;
pub mod preset;
