// Sampling budget.
pub const SAMPLE_AREA_FACTOR: f32 = 0.22;
pub const MIN_TARGET_SAMPLES: u32 = 6_000;
pub const MAX_TARGET_SAMPLES: u32 = 45_000;

/// Selection area thresholds (px²) and the sub-samples taken per grid cell above each.
/// Checked in order, anything smaller takes a single sample.
pub const SAMPLES_PER_CELL_TIERS: &[(f32, u32)] = &[(70_000.0, 4), (30_000.0, 3), (12_000.0, 2)];

/// Sampling stops once this many rays have hit geometry.
pub const MAX_SELECTED_POINTS: usize = 300_000;

/// Fixed seed for the per-cell jitter hash.
pub const JITTER_SEED: u32 = 0x9E37_79B9;

// Face retention.
pub const RETENTION_FRACTION: f32 = 0.06;
pub const RETENTION_MIN_HITS: u32 = 2;

// Patch extraction caps.
pub const MAX_OVERLAY_TRIANGLES: usize = 6_000;
pub const MAX_BOUNDED_VERTICES: usize = 60_000;

/// Decimal places kept when keying vertices for deduplication.
pub const VERTEX_KEY_DECIMALS: u32 = 6;

// Surface classification.
pub const CLASSIFIER_MIN_HITS: usize = 8;
pub const PLANAR_MIN_DOT: f32 = 0.96;
pub const CURVED_MIN_DOT: f32 = 0.70;

// Summary transport budgets.
pub const MAX_SAMPLED_POINTS: usize = 80_000;
pub const MAX_SAMPLED_SURFACE: usize = 12_000;
pub const ADJACENT_FACE_COUNT: usize = 6;

/// Length below which a summed or averaged vector is treated as degenerate.
pub const NORMAL_EPSILON: f32 = 1e-6;

/// Objects whose name contains any of these (case-insensitive) never receive rays.
pub const EXCLUDED_NAME_FRAGMENTS: &[&str] = &["helper", "grid", "axis", "axes"];

/// Decimal places used by the compact selection digest.
pub const DIGEST_DECIMALS: u32 = 3;
