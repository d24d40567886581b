//! Shared constants for the surface selection workspace.

pub mod capture;
pub mod render_settings;
pub mod selection;
