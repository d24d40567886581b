use bevy::prelude::*;
use constants::capture::{
    CIRCLE_MATCH_PADDING, CIRCLE_MIN_RADIUS, LASSO_MIN_POINT_SPACING_SQ, LASSO_MIN_POINTS,
};
use constants::selection::{
    ADJACENT_FACE_COUNT, CLASSIFIER_MIN_HITS, CURVED_MIN_DOT, EXCLUDED_NAME_FRAGMENTS,
    JITTER_SEED, MAX_BOUNDED_VERTICES, MAX_OVERLAY_TRIANGLES, MAX_SAMPLED_POINTS,
    MAX_SAMPLED_SURFACE, MAX_SELECTED_POINTS, MAX_TARGET_SAMPLES, MIN_TARGET_SAMPLES,
    PLANAR_MIN_DOT, RETENTION_FRACTION, RETENTION_MIN_HITS, SAMPLE_AREA_FACTOR,
    SAMPLES_PER_CELL_TIERS, VERTEX_KEY_DECIMALS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable heuristics for the whole selection pipeline.
/// Loadable from `*.selection.json`; any omitted section keeps its default.
#[derive(Resource, Debug, Clone, PartialEq, Default, Serialize, Deserialize, Asset, TypePath)]
#[serde(default)]
pub struct SelectionConfig {
    pub capture: CaptureSettings,
    pub sampling: SamplingSettings,
    pub aggregation: AggregationSettings,
    pub extraction: ExtractionSettings,
    pub classifier: ClassifierSettings,
    pub summary: SummarySettings,
    pub scene: SceneFilter,
}

impl SelectionConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read and parse a config file from disk.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.is_file() {
            return Err(format!("Selection config does not exist: {}", path.display()).into());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&contents)?)
    }
}

/// Gesture acceptance thresholds, all in device pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub min_point_spacing_sq: f32,
    pub min_polygon_points: usize,
    pub min_circle_radius: f32,
    pub circle_padding: f32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            min_point_spacing_sq: LASSO_MIN_POINT_SPACING_SQ,
            min_polygon_points: LASSO_MIN_POINTS,
            min_circle_radius: CIRCLE_MIN_RADIUS,
            circle_padding: CIRCLE_MATCH_PADDING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingSettings {
    pub area_factor: f32,
    pub min_target_samples: u32,
    pub max_target_samples: u32,
    /// `(area threshold px², samples per cell)`, largest threshold first.
    pub samples_per_cell_tiers: Vec<(f32, u32)>,
    pub max_selected_points: usize,
    pub jitter_seed: u32,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            area_factor: SAMPLE_AREA_FACTOR,
            min_target_samples: MIN_TARGET_SAMPLES,
            max_target_samples: MAX_TARGET_SAMPLES,
            samples_per_cell_tiers: SAMPLES_PER_CELL_TIERS.to_vec(),
            max_selected_points: MAX_SELECTED_POINTS,
            jitter_seed: JITTER_SEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationSettings {
    pub retention_fraction: f32,
    pub retention_min_hits: u32,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            retention_fraction: RETENTION_FRACTION,
            retention_min_hits: RETENTION_MIN_HITS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub max_overlay_triangles: usize,
    pub max_bounded_vertices: usize,
    pub vertex_key_decimals: u32,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_overlay_triangles: MAX_OVERLAY_TRIANGLES,
            max_bounded_vertices: MAX_BOUNDED_VERTICES,
            vertex_key_decimals: VERTEX_KEY_DECIMALS,
        }
    }
}

/// Minimum normal agreement (`unit normal · mean normal`) for each surface class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub min_hits: usize,
    pub planar_min_dot: f32,
    pub curved_min_dot: f32,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            min_hits: CLASSIFIER_MIN_HITS,
            planar_min_dot: PLANAR_MIN_DOT,
            curved_min_dot: CURVED_MIN_DOT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    pub max_sampled_points: usize,
    pub max_sampled_surface: usize,
    pub adjacent_face_count: usize,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            max_sampled_points: MAX_SAMPLED_POINTS,
            max_sampled_surface: MAX_SAMPLED_SURFACE,
            adjacent_face_count: ADJACENT_FACE_COUNT,
        }
    }
}

/// Decides which scene objects rays are cast against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFilter {
    pub include_hidden: bool,
    pub excluded_name_fragments: Vec<String>,
}

impl Default for SceneFilter {
    fn default() -> Self {
        Self {
            include_hidden: false,
            excluded_name_fragments: EXCLUDED_NAME_FRAGMENTS
                .iter()
                .map(|fragment| fragment.to_string())
                .collect(),
        }
    }
}

impl SceneFilter {
    /// Helper, grid and axis objects are matched by name, case-insensitively.
    pub fn is_excluded_name(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.excluded_name_fragments
            .iter()
            .any(|fragment| !fragment.is_empty() && lowered.contains(&fragment.to_lowercase()))
    }

    pub fn accepts(&self, name: Option<&str>, visible: bool) -> bool {
        if !visible && !self.include_hidden {
            return false;
        }
        !name.is_some_and(|name| self.is_excluded_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_heuristics() {
        let config = SelectionConfig::default();
        assert_eq!(config.sampling.min_target_samples, 6_000);
        assert_eq!(config.sampling.max_target_samples, 45_000);
        assert_eq!(config.sampling.max_selected_points, 300_000);
        assert_eq!(config.extraction.max_overlay_triangles, 6_000);
        assert_eq!(config.extraction.max_bounded_vertices, 60_000);
        assert_eq!(config.summary.max_sampled_surface, 12_000);
        assert_eq!(config.capture.min_polygon_points, 6);
        assert!((config.classifier.planar_min_dot - 0.96).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let json = r#"{ "classifier": { "planar_min_dot": 0.99 }, "summary": { "adjacent_face_count": 3 } }"#;
        let config = SelectionConfig::from_json_str(json).unwrap();
        assert!((config.classifier.planar_min_dot - 0.99).abs() < f32::EPSILON);
        assert!((config.classifier.curved_min_dot - 0.70).abs() < f32::EPSILON);
        assert_eq!(config.summary.adjacent_face_count, 3);
        assert_eq!(config.sampling, SamplingSettings::default());
    }

    #[test]
    fn test_bundled_config_matches_defaults() {
        let bundled = include_str!("../../../assets/config/default.selection.json");
        let config = SelectionConfig::from_json_str(bundled).unwrap();
        assert_eq!(config, SelectionConfig::default());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(SelectionConfig::from_json_str("{ \"sampling\": 12 }").is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = SelectionConfig::load(Path::new("/nonexistent/surface.selection.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_scene_filter_excludes_helpers_by_name() {
        let filter = SceneFilter::default();
        assert!(!filter.accepts(Some("GroundGrid"), true));
        assert!(!filter.accepts(Some("AxesHelper"), true));
        assert!(!filter.accepts(Some("bracket"), false));
        assert!(filter.accepts(Some("bracket"), true));
        assert!(filter.accepts(None, true));
    }
}
