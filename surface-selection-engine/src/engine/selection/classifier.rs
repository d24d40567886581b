use super::hit::SurfaceHit;
use crate::engine::assets::selection_config::ClassifierSettings;
use bevy::prelude::*;
use constants::selection::NORMAL_EPSILON;
use serde::{Deserialize, Serialize};

/// Approximate shape of a selected patch, inferred from normal dispersion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceType {
    Planar,
    /// Singly curved and regular, e.g. cylindrical.
    Curved,
    Freeform,
    #[default]
    Unknown,
}

impl SurfaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planar => "planar",
            Self::Curved => "curved",
            Self::Freeform => "freeform",
            Self::Unknown => "unknown",
        }
    }
}

/// Normalised mean of the unit hit normals; `None` when they cancel out.
pub fn mean_unit_normal(hits: &[SurfaceHit]) -> Option<Vec3> {
    if hits.is_empty() {
        return None;
    }
    let sum: Vec3 = hits.iter().map(|hit| hit.world_normal.normalize_or_zero()).sum();
    let mean = sum / hits.len() as f32;
    (mean.length() > NORMAL_EPSILON).then(|| mean.normalize())
}

/// Smallest agreement between any hit normal and the mean normal.
pub fn min_normal_agreement(hits: &[SurfaceHit], mean: Vec3) -> f32 {
    hits.iter()
        .map(|hit| hit.world_normal.normalize_or_zero().dot(mean))
        .fold(f32::INFINITY, f32::min)
}

pub fn classify_surface(hits: &[SurfaceHit], settings: &ClassifierSettings) -> SurfaceType {
    if hits.len() < settings.min_hits {
        return SurfaceType::Unknown;
    }
    let Some(mean) = mean_unit_normal(hits) else {
        return SurfaceType::Unknown;
    };

    let min_dot = min_normal_agreement(hits, mean);
    if min_dot > settings.planar_min_dot {
        SurfaceType::Planar
    } else if min_dot > settings.curved_min_dot {
        SurfaceType::Curved
    } else {
        SurfaceType::Freeform
    }
}
