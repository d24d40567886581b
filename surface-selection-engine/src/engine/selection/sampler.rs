use super::hit::SurfaceHit;
use super::matcher::SelectionMatcher;
use super::shape::ScreenRect;
use crate::engine::assets::selection_config::SamplingSettings;
use crate::engine::camera::selection_camera::SelectionCamera;
use crate::engine::scene::mesh_scene::{ObjectHandle, SceneQuery};
use bevy::prelude::*;

/// Grid layout derived from the selection's bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPlan {
    pub area: f32,
    pub target_samples: u32,
    /// Cell edge length in device pixels.
    pub grid_step: u32,
    pub samples_per_cell: u32,
    pub columns: u32,
    pub rows: u32,
}

impl SamplingPlan {
    pub fn for_rect(rect: &ScreenRect, settings: &SamplingSettings) -> Self {
        let area = rect.area().max(1.0);
        let target_samples = ((area * settings.area_factor).round() as u32)
            .clamp(settings.min_target_samples, settings.max_target_samples.max(settings.min_target_samples))
            .max(1);
        let grid_step = ((area / target_samples as f32).sqrt().ceil() as u32).max(1);
        let samples_per_cell = settings
            .samples_per_cell_tiers
            .iter()
            .find(|(threshold, _)| area > *threshold)
            .map_or(1, |(_, samples)| (*samples).max(1));

        let step = grid_step as f32;
        Self {
            area,
            target_samples,
            grid_step,
            samples_per_cell,
            columns: (rect.width() / step).ceil() as u32,
            rows: (rect.height() / step).ceil() as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SamplingStats {
    pub grid_step: u32,
    pub samples_per_cell: u32,
    /// Jittered points that passed the membership test and were ray cast.
    pub rays_cast: usize,
    /// Sampling stopped at the hit budget.
    pub truncated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SampledSurface {
    pub hits: Vec<SurfaceHit>,
    pub stats: SamplingStats,
}

/// Casts jittered grid rays through the selection and keeps the nearest hit of each.
pub fn sample_surface<S: SceneQuery + ?Sized>(
    matcher: &SelectionMatcher,
    camera: &SelectionCamera,
    scene: &S,
    objects: &[ObjectHandle],
    settings: &SamplingSettings,
) -> SampledSurface {
    let rect = matcher.bounds();
    let plan = SamplingPlan::for_rect(&rect, settings);
    let mut sampled = SampledSurface {
        hits: Vec::new(),
        stats: SamplingStats {
            grid_step: plan.grid_step,
            samples_per_cell: plan.samples_per_cell,
            ..default()
        },
    };
    if objects.is_empty() {
        return sampled;
    }

    let step = plan.grid_step as f32;
    'grid: for cell_y in 0..plan.rows {
        for cell_x in 0..plan.columns {
            for sample in 0..plan.samples_per_cell {
                let offset = cell_jitter(cell_x, cell_y, sample, settings.jitter_seed);
                let point = rect.min + (Vec2::new(cell_x as f32, cell_y as f32) + offset) * step;
                if !rect.contains(point) || !matcher.matches(point) {
                    continue;
                }

                let Some(ray) = camera.viewport_ray(point) else {
                    continue;
                };
                sampled.stats.rays_cast += 1;
                if let Some(hit) = scene.cast_ray(&ray, objects) {
                    sampled.hits.push(hit);
                    if sampled.hits.len() >= settings.max_selected_points {
                        sampled.stats.truncated = true;
                        break 'grid;
                    }
                }
            }
        }
    }

    sampled
}

/// Two independent values in `[0, 1)` for one sub-sample of one cell.
pub fn cell_jitter(cell_x: u32, cell_y: u32, sample: u32, seed: u32) -> Vec2 {
    let key = mix(seed ^ mix(cell_x ^ mix(cell_y ^ mix(sample))));
    Vec2::new(unit_interval(mix(key)), unit_interval(mix(key ^ 0x85EB_CA6B)))
}

fn mix(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x7FEB_352D);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846C_A68B);
    h ^= h >> 16;
    h
}

fn unit_interval(h: u32) -> f32 {
    // 24 bits fit an f32 mantissa exactly, so the result stays below 1.
    (h >> 8) as f32 / (1_u32 << 24) as f32
}
