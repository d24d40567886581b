use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Device-pixel position in the current viewport, origin top-left, y down.
pub type ScreenPoint = Vec2;

/// Viewport size in device pixels at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Zero or negative dimensions cannot be projected into.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShapeOutline {
    /// Closed loop; the first point is repeated as the last.
    Polygon { points: Vec<ScreenPoint> },
    Circle { center: ScreenPoint, radius: f32 },
}

/// A finalized gesture. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionShape {
    pub outline: ShapeOutline,
    pub viewport: Viewport,
}

impl SelectionShape {
    /// Builds a closed polygon. Requires at least three distinct points.
    pub fn polygon(mut points: Vec<ScreenPoint>, viewport: Viewport) -> Option<Self> {
        let mut distinct: Vec<ScreenPoint> = Vec::with_capacity(3);
        for point in &points {
            if !distinct.contains(point) {
                distinct.push(*point);
                if distinct.len() == 3 {
                    break;
                }
            }
        }
        if distinct.len() < 3 {
            return None;
        }

        let first = points[0];
        if points.last() != Some(&first) {
            points.push(first);
        }

        Some(Self {
            outline: ShapeOutline::Polygon { points },
            viewport,
        })
    }

    /// Builds a circle. Requires a finite, strictly positive radius.
    pub fn circle(center: ScreenPoint, radius: f32, viewport: Viewport) -> Option<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return None;
        }
        Some(Self {
            outline: ShapeOutline::Circle { center, radius },
            viewport,
        })
    }
}

/// Axis-aligned screen rectangle, inclusive of both corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub min: ScreenPoint,
    pub max: ScreenPoint,
}

impl ScreenRect {
    pub fn width(&self) -> f32 {
        (self.max.x - self.min.x).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.max.y - self.min.y).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Clamps to `[0, width] x [0, height]`; a rectangle entirely off-screen collapses to zero area.
    pub fn clamped_to(&self, viewport: &Viewport) -> Self {
        let bound = viewport.size().max(Vec2::ZERO);
        let min = self.min.clamp(Vec2::ZERO, bound);
        let max = self.max.clamp(Vec2::ZERO, bound).max(min);
        Self { min, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn test_polygon_is_explicitly_closed() {
        let shape = SelectionShape::polygon(
            vec![Vec2::new(10.0, 10.0), Vec2::new(50.0, 10.0), Vec2::new(30.0, 40.0)],
            viewport(),
        )
        .unwrap();

        let ShapeOutline::Polygon { points } = &shape.outline else {
            panic!("expected polygon");
        };
        assert_eq!(points.len(), 4);
        assert_eq!(points.first(), points.last());
    }

    #[test]
    fn test_already_closed_polygon_is_not_closed_twice() {
        let points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 0.0),
        ];
        let shape = SelectionShape::polygon(points.clone(), viewport()).unwrap();
        assert_eq!(shape.outline, ShapeOutline::Polygon { points });
    }

    #[test]
    fn test_polygon_needs_three_distinct_points() {
        let repeated = vec![Vec2::ONE, Vec2::ONE, Vec2::new(2.0, 2.0), Vec2::ONE];
        assert!(SelectionShape::polygon(repeated, viewport()).is_none());
        assert!(SelectionShape::polygon(Vec::new(), viewport()).is_none());
    }

    #[test]
    fn test_circle_rejects_non_positive_radius() {
        assert!(SelectionShape::circle(Vec2::new(5.0, 5.0), 0.0, viewport()).is_none());
        assert!(SelectionShape::circle(Vec2::new(5.0, 5.0), -1.0, viewport()).is_none());
        assert!(SelectionShape::circle(Vec2::new(5.0, 5.0), f32::NAN, viewport()).is_none());
        assert!(SelectionShape::circle(Vec2::new(5.0, 5.0), 4.0, viewport()).is_some());
    }

    #[test]
    fn test_rect_clamps_to_viewport() {
        let rect = ScreenRect {
            min: Vec2::new(-20.0, 100.0),
            max: Vec2::new(900.0, 700.0),
        };
        let clamped = rect.clamped_to(&viewport());
        assert_eq!(clamped.min, Vec2::new(0.0, 100.0));
        assert_eq!(clamped.max, Vec2::new(800.0, 600.0));

        let off_screen = ScreenRect {
            min: Vec2::new(900.0, 700.0),
            max: Vec2::new(1000.0, 800.0),
        };
        assert_eq!(off_screen.clamped_to(&viewport()).area(), 0.0);
    }
}
