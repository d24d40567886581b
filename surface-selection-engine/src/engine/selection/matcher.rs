use super::shape::{ScreenPoint, ScreenRect, SelectionShape, ShapeOutline};
use bevy::prelude::*;
use constants::capture::POLYGON_EDGE_EPSILON;

/// Screen-space membership test derived from a finalized shape.
#[derive(Debug, Clone)]
pub struct SelectionMatcher {
    region: MatchRegion,
    bounds: ScreenRect,
}

#[derive(Debug, Clone)]
enum MatchRegion {
    Polygon(Vec<ScreenPoint>),
    Circle { center: ScreenPoint, radius_sq: f32 },
}

impl SelectionMatcher {
    /// `circle_padding` widens circle membership so points on the rim do not flicker.
    pub fn new(shape: &SelectionShape, circle_padding: f32) -> Self {
        let (region, raw_bounds) = match &shape.outline {
            ShapeOutline::Polygon { points } => {
                let (min, max) = points.iter().fold(
                    (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
                    |(min, max), p| (min.min(*p), max.max(*p)),
                );
                let bounds = if points.is_empty() {
                    ScreenRect { min: Vec2::ZERO, max: Vec2::ZERO }
                } else {
                    ScreenRect { min, max }
                };
                (MatchRegion::Polygon(points.clone()), bounds)
            }
            ShapeOutline::Circle { center, radius } => {
                let padded = radius + circle_padding;
                (
                    MatchRegion::Circle {
                        center: *center,
                        radius_sq: padded * padded,
                    },
                    ScreenRect {
                        min: *center - Vec2::splat(padded),
                        max: *center + Vec2::splat(padded),
                    },
                )
            }
        };

        Self {
            region,
            bounds: raw_bounds.clamped_to(&shape.viewport),
        }
    }

    pub fn bounds(&self) -> ScreenRect {
        self.bounds
    }

    pub fn matches(&self, point: ScreenPoint) -> bool {
        match &self.region {
            MatchRegion::Polygon(points) => point_in_polygon(point, points),
            MatchRegion::Circle { center, radius_sq } => {
                point.distance_squared(*center) <= *radius_sq
            }
        }
    }
}

/// Even-odd crossing test. Winding direction does not affect the result.
pub fn point_in_polygon(point: ScreenPoint, polygon: &[ScreenPoint]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let mut dy = pj.y - pi.y;
            if dy.abs() < POLYGON_EDGE_EPSILON {
                dy = POLYGON_EDGE_EPSILON.copysign(dy);
            }
            let crossing_x = (pj.x - pi.x) * (point.y - pi.y) / dy + pi.x;
            if point.x < crossing_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::selection::shape::Viewport;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn concave_outline() -> Vec<ScreenPoint> {
        // "U" shape open towards +y.
        vec![
            Vec2::new(100.0, 100.0),
            Vec2::new(300.0, 100.0),
            Vec2::new(300.0, 300.0),
            Vec2::new(250.0, 300.0),
            Vec2::new(250.0, 150.0),
            Vec2::new(150.0, 150.0),
            Vec2::new(150.0, 300.0),
            Vec2::new(100.0, 300.0),
        ]
    }

    #[test]
    fn test_concave_polygon_membership() {
        let shape = SelectionShape::polygon(concave_outline(), viewport()).unwrap();
        let matcher = SelectionMatcher::new(&shape, 2.0);

        assert!(matcher.matches(Vec2::new(120.0, 200.0)));
        assert!(matcher.matches(Vec2::new(200.0, 120.0)));
        assert!(!matcher.matches(Vec2::new(200.0, 250.0)));
        assert!(!matcher.matches(Vec2::new(50.0, 50.0)));
    }

    #[test]
    fn test_reversed_winding_gives_same_classification() {
        let forward = SelectionShape::polygon(concave_outline(), viewport()).unwrap();
        let mut reversed_points = concave_outline();
        reversed_points.reverse();
        let reversed = SelectionShape::polygon(reversed_points, viewport()).unwrap();

        let a = SelectionMatcher::new(&forward, 2.0);
        let b = SelectionMatcher::new(&reversed, 2.0);
        for y in (90..=310).step_by(7) {
            for x in (90..=310).step_by(7) {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                assert_eq!(a.matches(p), b.matches(p), "disagreement at {p:?}");
            }
        }
    }

    #[test]
    fn test_horizontal_edges_do_not_produce_nan_crossings() {
        let square = vec![
            Vec2::new(10.0, 10.0),
            Vec2::new(20.0, 10.0),
            Vec2::new(20.0, 20.0),
            Vec2::new(10.0, 20.0),
        ];
        assert!(point_in_polygon(Vec2::new(15.0, 15.0), &square));
        assert!(!point_in_polygon(Vec2::new(25.0, 10.0), &square));
        assert!(!point_in_polygon(Vec2::new(15.0, 5.0), &square));
    }

    #[test]
    fn test_circle_includes_padding_ring() {
        let shape = SelectionShape::circle(Vec2::new(400.0, 300.0), 50.0, viewport()).unwrap();
        let matcher = SelectionMatcher::new(&shape, 2.0);

        assert!(matcher.matches(Vec2::new(451.5, 300.0)));
        assert!(matcher.matches(Vec2::new(452.0, 300.0)));
        assert!(!matcher.matches(Vec2::new(452.5, 300.0)));
    }

    #[test]
    fn test_bounds_are_clamped_to_viewport() {
        let shape = SelectionShape::circle(Vec2::new(10.0, 590.0), 40.0, viewport()).unwrap();
        let bounds = SelectionMatcher::new(&shape, 2.0).bounds();
        assert_eq!(bounds.min, Vec2::new(0.0, 548.0));
        assert_eq!(bounds.max, Vec2::new(52.0, 600.0));
    }
}
