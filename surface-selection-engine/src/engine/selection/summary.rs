use super::aggregator::FaceAggregation;
use super::classifier::{SurfaceType, classify_surface, mean_unit_normal};
use super::extractor::ExtractedPatch;
use super::hit::{FaceRef, SurfaceHit, Triangle};
use super::shape::SelectionShape;
use crate::engine::assets::selection_config::SelectionConfig;
use crate::engine::camera::selection_camera::ViewContext;
use bevy::prelude::*;
use constants::selection::DIGEST_DECIMALS;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(rest.iter().fold(
            Self { min: *first, max: *first },
            |acc, point| Self {
                min: acc.min.min(*point),
                max: acc.max.max(*point),
            },
        ))
    }
}

/// Everything known about the surface under one finalized gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub centroid: Option<Vec3>,
    /// Mean surface normal, facing the camera.
    pub normal: Option<Vec3>,
    pub support_point_outward: Option<Vec3>,
    pub support_point_inward: Option<Vec3>,
    pub bounding_box: Option<BoundingBox>,
    pub surface_type: SurfaceType,
    pub dominant_face: Option<FaceRef>,
    pub adjacent_faces: Vec<FaceRef>,
    /// Uncapped hit count; the stored point lists may be decimated.
    pub raw_point_count: usize,
    pub sampled_points: Vec<Vec3>,
    pub sampled_surface: Vec<SurfaceHit>,
    pub overlay_triangles: Vec<Triangle>,
    pub bounded_vertices: Vec<Vec3>,
    pub selection_shape: SelectionShape,
    pub view_context: Option<ViewContext>,
}

impl RegionSummary {
    /// Summary with every geometric field empty.
    pub fn empty(selection_shape: SelectionShape, view_context: Option<ViewContext>) -> Self {
        Self {
            centroid: None,
            normal: None,
            support_point_outward: None,
            support_point_inward: None,
            bounding_box: None,
            surface_type: SurfaceType::Unknown,
            dominant_face: None,
            adjacent_faces: Vec::new(),
            raw_point_count: 0,
            sampled_points: Vec::new(),
            sampled_surface: Vec::new(),
            overlay_triangles: Vec::new(),
            bounded_vertices: Vec::new(),
            selection_shape,
            view_context,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw_point_count == 0
    }

    /// Rounded statistics of the stored sample points.
    pub fn digest(&self) -> Option<SelectionDigest> {
        let bounds = BoundingBox::from_points(&self.sampled_points)?;
        let sum: Vec3 = self.sampled_points.iter().copied().sum();
        let centroid = sum / self.sampled_points.len() as f32;
        Some(SelectionDigest {
            point_count: self.sampled_points.len(),
            centroid: round_vec(centroid),
            x_range: [round(bounds.min.x), round(bounds.max.x)],
            y_range: [round(bounds.min.y), round(bounds.max.y)],
            z_range: [round(bounds.min.z), round(bounds.max.z)],
        })
    }

    /// Compact parameters for a downstream reasoning service. Point lists are left out.
    pub fn to_request_params(&self) -> serde_json::Value {
        json!({
            "selection": self.digest(),
            "surface_type": self.surface_type,
            "centroid": self.centroid.map(round_vec),
            "normal": self.normal.map(round_vec),
            "support_points": {
                "outward": self.support_point_outward.map(round_vec),
                "inward": self.support_point_inward.map(round_vec),
            },
            "bounding_box": self.bounding_box.map(|bounds| json!({
                "min": round_vec(bounds.min),
                "max": round_vec(bounds.max),
            })),
            "dominant_face": self.dominant_face,
            "adjacent_faces": self.adjacent_faces,
            "view_context": self.view_context,
            "counts": {
                "raw_points": self.raw_point_count,
                "sampled_points": self.sampled_points.len(),
                "sampled_surface": self.sampled_surface.len(),
                "overlay_triangles": self.overlay_triangles.len(),
                "bounded_vertices": self.bounded_vertices.len(),
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionDigest {
    pub point_count: usize,
    pub centroid: [f64; 3],
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub z_range: [f64; 2],
}

fn round(value: f32) -> f64 {
    let scale = 10_f64.powi(DIGEST_DECIMALS as i32);
    (value as f64 * scale).round() / scale
}

fn round_vec(value: Vec3) -> [f64; 3] {
    [round(value.x), round(value.y), round(value.z)]
}

/// Keeps every `ceil(len / cap)`-th item, starting with the first.
pub fn stride_downsample<T: Clone>(items: &[T], cap: usize) -> Vec<T> {
    if items.len() <= cap {
        return items.to_vec();
    }
    if cap == 0 {
        return Vec::new();
    }
    let stride = items.len().div_ceil(cap);
    items.iter().step_by(stride).cloned().collect()
}

/// Points with the largest and smallest projection onto `normal`.
fn support_points(hits: &[SurfaceHit], normal: Vec3) -> Option<(Vec3, Vec3)> {
    let first = hits.first()?.world_point;
    let (mut outward, mut inward) = (first, first);
    let (mut high, mut low) = (first.dot(normal), first.dot(normal));
    for hit in &hits[1..] {
        let along = hit.world_point.dot(normal);
        if along > high {
            high = along;
            outward = hit.world_point;
        }
        if along < low {
            low = along;
            inward = hit.world_point;
        }
    }
    Some((outward, inward))
}

/// Assembles the bounded summary from the outputs of every pipeline stage.
pub fn build_summary(
    selection_shape: SelectionShape,
    view_context: ViewContext,
    hits: &[SurfaceHit],
    aggregation: &FaceAggregation,
    patch: ExtractedPatch,
    config: &SelectionConfig,
) -> RegionSummary {
    if hits.is_empty() {
        return RegionSummary::empty(selection_shape, Some(view_context));
    }

    let sum: Vec3 = hits.iter().map(|hit| hit.world_point).sum();
    let centroid = sum / hits.len() as f32;

    let normal = mean_unit_normal(hits).map(|mean| {
        if mean.dot(view_context.camera_position - centroid) < 0.0 {
            -mean
        } else {
            mean
        }
    });
    let supports = normal.and_then(|normal| support_points(hits, normal));

    let ranked = aggregation.ranked();
    let dominant_face = ranked.first().map(|count| count.face.clone());
    let adjacent_faces = ranked
        .iter()
        .skip(1)
        .take(config.summary.adjacent_face_count)
        .map(|count| count.face.clone())
        .collect();

    let points: Vec<Vec3> = hits.iter().map(|hit| hit.world_point).collect();

    RegionSummary {
        centroid: Some(centroid),
        normal,
        support_point_outward: supports.map(|(outward, _)| outward),
        support_point_inward: supports.map(|(_, inward)| inward),
        bounding_box: BoundingBox::from_points(&patch.vertices),
        surface_type: classify_surface(hits, &config.classifier),
        dominant_face,
        adjacent_faces,
        raw_point_count: hits.len(),
        sampled_points: stride_downsample(&points, config.summary.max_sampled_points),
        sampled_surface: stride_downsample(hits, config.summary.max_sampled_surface),
        overlay_triangles: patch.triangles,
        bounded_vertices: patch.vertices,
        selection_shape,
        view_context: Some(view_context),
    }
}
