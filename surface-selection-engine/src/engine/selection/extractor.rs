use super::hit::{FaceHitCount, Triangle};
use super::matcher::SelectionMatcher;
use crate::engine::assets::selection_config::ExtractionSettings;
use crate::engine::camera::selection_camera::SelectionCamera;
use crate::engine::scene::mesh_scene::SceneQuery;
use bevy::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExtractionStats {
    pub considered: usize,
    pub accepted: usize,
    /// Triangles with at least one vertex clipped or outside the selection.
    pub rejected: usize,
    /// Accepted triangles whose projected centroid still falls outside the selection.
    pub centroid_outside: usize,
    /// Retained faces the scene could not resolve to geometry.
    pub missing_geometry: usize,
    pub truncated: bool,
}

/// Triangles lying wholly inside the selection and their unique vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPatch {
    pub triangles: Vec<Triangle>,
    pub vertices: Vec<Vec3>,
    pub stats: ExtractionStats,
}

/// Fixed-precision key so vertices shared by adjacent triangles collapse to one.
pub fn vertex_key(vertex: Vec3, decimals: u32) -> [i64; 3] {
    let scale = 10_f64.powi(decimals as i32);
    [vertex.x, vertex.y, vertex.z].map(|component| (component as f64 * scale).round() as i64)
}

/// Walks retained faces in order and keeps triangles whose three vertices all project,
/// unclipped, inside the selection. Stops as soon as either cap is reached.
pub fn extract_patch<S: SceneQuery + ?Sized>(
    faces: &[FaceHitCount],
    scene: &S,
    camera: &SelectionCamera,
    matcher: &SelectionMatcher,
    settings: &ExtractionSettings,
) -> ExtractedPatch {
    let mut patch = ExtractedPatch::default();
    if settings.max_overlay_triangles == 0 || settings.max_bounded_vertices == 0 {
        patch.stats.truncated = !faces.is_empty();
        return patch;
    }

    let inside = |point: Vec3| {
        camera
            .project(point)
            .is_some_and(|projected| projected.is_unclipped() && matcher.matches(projected.screen))
    };
    let mut seen: HashSet<[i64; 3]> = HashSet::new();

    for count in faces {
        let Some(vertices) = scene.world_triangle(&count.face.mesh_id, count.face.face_index) else {
            patch.stats.missing_geometry += 1;
            continue;
        };
        patch.stats.considered += 1;

        if !vertices.iter().all(|vertex| inside(*vertex)) {
            patch.stats.rejected += 1;
            continue;
        }

        let triangle = Triangle {
            face: count.face.clone(),
            vertices,
        };
        if !inside(triangle.centroid()) {
            patch.stats.centroid_outside += 1;
        }
        patch.triangles.push(triangle);
        patch.stats.accepted += 1;

        for vertex in vertices {
            if patch.vertices.len() >= settings.max_bounded_vertices {
                break;
            }
            if seen.insert(vertex_key(vertex, settings.vertex_key_decimals)) {
                patch.vertices.push(vertex);
            }
        }

        if patch.triangles.len() >= settings.max_overlay_triangles
            || patch.vertices.len() >= settings.max_bounded_vertices
        {
            patch.stats.truncated = true;
            break;
        }
    }

    patch
}
