/// Squared screen distance (px²) a pointer must travel before a lasso accepts a new point.
pub const LASSO_MIN_POINT_SPACING_SQ: f32 = 4.0;

/// Lassos with fewer accepted points than this are discarded on release.
pub const LASSO_MIN_POINTS: usize = 6;

/// Circles with a radius at or below this (px) are discarded on release.
pub const CIRCLE_MIN_RADIUS: f32 = 3.0;

/// Inclusive padding (px) added to a circle's radius for membership tests.
pub const CIRCLE_MATCH_PADDING: f32 = 2.0;

/// Guards the even-odd crossing division against horizontal edges.
pub const POLYGON_EDGE_EPSILON: f32 = 1e-9;
