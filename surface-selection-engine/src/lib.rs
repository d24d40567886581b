//! Screen-space surface selection for Bevy scenes.
//!
//! A lasso or circle gesture over the viewport is turned into a
//! [`RegionSummary`](engine::selection::summary::RegionSummary): the surface
//! under the gesture sampled by ray casting, its dominant faces, a bounded
//! triangle patch and a coarse surface classification.

pub mod engine;
pub mod tools;
