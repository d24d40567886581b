use super::aggregator::aggregate_faces;
use super::extractor::extract_patch;
use super::matcher::SelectionMatcher;
use super::sampler::sample_surface;
use super::shape::SelectionShape;
use super::summary::{RegionSummary, build_summary};
use crate::engine::assets::selection_config::SelectionConfig;
use crate::engine::camera::selection_camera::SelectionCamera;
use crate::engine::scene::mesh_scene::SceneQuery;
use bevy::prelude::*;

/// Runs the full selection pipeline for one finalized gesture.
///
/// Degenerate input (no camera, nothing eligible, no hits) produces an empty
/// summary that still carries the shape.
pub fn summarize_selection<S: SceneQuery + ?Sized>(
    shape: SelectionShape,
    camera: Option<&SelectionCamera>,
    scene: &S,
    config: &SelectionConfig,
) -> RegionSummary {
    let Some(camera) = camera else {
        debug!("No active camera, returning empty selection");
        return RegionSummary::empty(shape, None);
    };
    let view_context = camera.view_context();

    let objects = scene.eligible_objects(&config.scene);
    if objects.is_empty() {
        debug!("No eligible scene objects, returning empty selection");
        return RegionSummary::empty(shape, Some(view_context));
    }

    let matcher = SelectionMatcher::new(&shape, config.capture.circle_padding);
    let sampled = sample_surface(&matcher, camera, scene, &objects, &config.sampling);
    debug!(
        "Sampling: step {}px, {} per cell, {} rays, {} hits{}",
        sampled.stats.grid_step,
        sampled.stats.samples_per_cell,
        sampled.stats.rays_cast,
        sampled.hits.len(),
        if sampled.stats.truncated { " (hit budget reached)" } else { "" }
    );
    if sampled.hits.is_empty() {
        return RegionSummary::empty(shape, Some(view_context));
    }

    let aggregation = aggregate_faces(&sampled.hits, &config.aggregation);
    debug!(
        "Faces: {} observed, threshold {} of max {}, {} retained{}",
        aggregation.counts.len(),
        aggregation.threshold,
        aggregation.max_hits,
        aggregation.retained.len(),
        if aggregation.fell_back { " (fallback)" } else { "" }
    );

    let patch = extract_patch(&aggregation.retained, scene, camera, &matcher, &config.extraction);
    debug!(
        "Patch: {} accepted, {} rejected, {} centroid outside, {} vertices{}",
        patch.stats.accepted,
        patch.stats.rejected,
        patch.stats.centroid_outside,
        patch.vertices.len(),
        if patch.stats.truncated { " (capped)" } else { "" }
    );

    build_summary(shape, view_context, &sampled.hits, &aggregation, patch, config)
}
