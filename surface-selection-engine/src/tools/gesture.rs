//! Pointer gesture state machine, independent of any windowing or ECS code.
//!
//! `Idle -> Drawing -> (Completed | Cancelled) -> Idle`. The host feeds it
//! [`PointerInput`]s in device pixels and receives a [`GestureOutcome`] for each.

use crate::engine::assets::selection_config::CaptureSettings;
use crate::engine::selection::shape::{ScreenPoint, SelectionShape, Viewport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureMode {
    /// Freehand polygon.
    #[default]
    Lasso,
    /// Drag from the centre outwards.
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    Drawing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down(ScreenPoint),
    Move(ScreenPoint),
    Up(ScreenPoint),
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Nothing to report yet.
    Pending,
    Completed(SelectionShape),
    /// The gesture was abandoned or too small; any selection is discarded.
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct GestureCapture {
    settings: CaptureSettings,
    enabled: bool,
    mode: GestureMode,
    phase: GesturePhase,
    points: Vec<ScreenPoint>,
    center: Option<ScreenPoint>,
    radius: f32,
    last_pointer: Option<ScreenPoint>,
}

impl GestureCapture {
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn set_settings(&mut self, settings: CaptureSettings) {
        self.settings = settings;
    }

    /// Disabling drops any gesture in progress.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_mode(&mut self, mode: GestureMode) {
        if self.mode != mode {
            self.reset();
            self.mode = mode;
        }
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Lasso points accepted so far.
    pub fn points(&self) -> &[ScreenPoint] {
        &self.points
    }

    /// Circle in progress as `(center, radius)`.
    pub fn circle(&self) -> Option<(ScreenPoint, f32)> {
        self.center.map(|center| (center, self.radius))
    }

    /// Most recent pointer position seen while drawing.
    pub fn last_point(&self) -> Option<ScreenPoint> {
        self.last_pointer
    }

    pub fn reset(&mut self) {
        self.phase = GesturePhase::Idle;
        self.points.clear();
        self.center = None;
        self.radius = 0.0;
        self.last_pointer = None;
    }

    pub fn handle(&mut self, input: PointerInput, viewport: Viewport) -> GestureOutcome {
        match input {
            PointerInput::Escape => {
                self.reset();
                GestureOutcome::Cancelled
            }
            PointerInput::Down(point) => {
                if !self.enabled {
                    return GestureOutcome::Pending;
                }
                self.reset();
                self.phase = GesturePhase::Drawing;
                self.last_pointer = Some(point);
                match self.mode {
                    GestureMode::Lasso => self.points.push(point),
                    GestureMode::Circle => self.center = Some(point),
                }
                GestureOutcome::Pending
            }
            PointerInput::Move(point) => {
                if self.phase == GesturePhase::Drawing {
                    self.track(point);
                }
                GestureOutcome::Pending
            }
            PointerInput::Up(point) => {
                if self.phase != GesturePhase::Drawing {
                    return GestureOutcome::Pending;
                }
                self.track(point);
                let outcome = self.finalize(viewport);
                self.reset();
                outcome
            }
        }
    }

    fn track(&mut self, point: ScreenPoint) {
        self.last_pointer = Some(point);
        match self.mode {
            GestureMode::Lasso => {
                let far_enough = self
                    .points
                    .last()
                    .is_none_or(|last| last.distance_squared(point) > self.settings.min_point_spacing_sq);
                if far_enough {
                    self.points.push(point);
                }
            }
            GestureMode::Circle => {
                if let Some(center) = self.center {
                    self.radius = center.distance(point);
                }
            }
        }
    }

    fn finalize(&mut self, viewport: Viewport) -> GestureOutcome {
        let shape = match self.mode {
            GestureMode::Lasso if self.points.len() >= self.settings.min_polygon_points => {
                SelectionShape::polygon(std::mem::take(&mut self.points), viewport)
            }
            GestureMode::Circle if self.radius > self.settings.min_circle_radius => self
                .center
                .and_then(|center| SelectionShape::circle(center, self.radius, viewport)),
            _ => None,
        };
        shape.map_or(GestureOutcome::Cancelled, GestureOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::selection::shape::ShapeOutline;
    use bevy::prelude::*;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn capture(mode: GestureMode) -> GestureCapture {
        let mut capture = GestureCapture::new(CaptureSettings::default());
        capture.set_enabled(true);
        capture.set_mode(mode);
        capture
    }

    fn drag(capture: &mut GestureCapture, points: &[Vec2]) -> GestureOutcome {
        let (first, rest) = points.split_first().unwrap();
        let (last, middle) = rest.split_last().unwrap();
        capture.handle(PointerInput::Down(*first), viewport());
        for point in middle {
            capture.handle(PointerInput::Move(*point), viewport());
        }
        capture.handle(PointerInput::Up(*last), viewport())
    }

    fn ring(count: usize, radius: f32) -> Vec<Vec2> {
        (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * std::f32::consts::TAU;
                Vec2::new(400.0, 300.0) + Vec2::new(angle.cos(), angle.sin()) * radius
            })
            .collect()
    }

    #[test]
    fn test_lasso_completes_closed() {
        let mut capture = capture(GestureMode::Lasso);
        let GestureOutcome::Completed(shape) = drag(&mut capture, &ring(12, 80.0)) else {
            panic!("expected a completed lasso");
        };
        let ShapeOutline::Polygon { points } = shape.outline else {
            panic!("expected polygon");
        };
        assert_eq!(points.len(), 13);
        assert_eq!(points.first(), points.last());
        assert_eq!(capture.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_dense_moves_are_thinned() {
        let mut capture = capture(GestureMode::Lasso);
        capture.handle(PointerInput::Down(Vec2::new(10.0, 10.0)), viewport());
        for step in 1..=10 {
            capture.handle(PointerInput::Move(Vec2::new(10.0 + step as f32 * 0.5, 10.0)), viewport());
        }
        // Accepted only once the pointer is more than 2px from the last point.
        assert_eq!(capture.points().len(), 3);
    }

    #[test]
    fn test_short_lasso_is_cancelled() {
        let mut capture = capture(GestureMode::Lasso);
        assert_eq!(drag(&mut capture, &ring(4, 80.0)), GestureOutcome::Cancelled);
        assert!(capture.points().is_empty());
    }

    #[test]
    fn test_circle_radius_follows_pointer() {
        let mut capture = capture(GestureMode::Circle);
        let outcome = drag(
            &mut capture,
            &[Vec2::new(100.0, 100.0), Vec2::new(150.0, 100.0), Vec2::new(100.0, 140.0)],
        );
        let GestureOutcome::Completed(shape) = outcome else {
            panic!("expected a completed circle");
        };
        assert_eq!(
            shape.outline,
            ShapeOutline::Circle {
                center: Vec2::new(100.0, 100.0),
                radius: 40.0
            }
        );
    }

    #[test]
    fn test_circle_release_at_last_point_completes() {
        let mut capture = capture(GestureMode::Circle);
        capture.handle(PointerInput::Down(Vec2::new(100.0, 100.0)), viewport());
        capture.handle(PointerInput::Move(Vec2::new(160.0, 100.0)), viewport());
        assert_eq!(capture.last_point(), Some(Vec2::new(160.0, 100.0)));

        let release = capture.last_point().unwrap();
        let GestureOutcome::Completed(shape) =
            capture.handle(PointerInput::Up(release), viewport())
        else {
            panic!("expected a completed circle");
        };
        assert_eq!(
            shape.outline,
            ShapeOutline::Circle {
                center: Vec2::new(100.0, 100.0),
                radius: 60.0
            }
        );
        assert_eq!(capture.last_point(), None);
    }

    #[test]
    fn test_zero_and_tiny_circles_are_cancelled() {
        let mut capture = capture(GestureMode::Circle);
        let at = Vec2::new(100.0, 100.0);
        assert_eq!(drag(&mut capture, &[at, at]), GestureOutcome::Cancelled);
        assert_eq!(
            drag(&mut capture, &[at, Vec2::new(103.0, 100.0)]),
            GestureOutcome::Cancelled
        );
    }

    #[test]
    fn test_escape_discards_gesture() {
        let mut capture = capture(GestureMode::Lasso);
        capture.handle(PointerInput::Down(Vec2::ZERO), viewport());
        capture.handle(PointerInput::Move(Vec2::new(50.0, 0.0)), viewport());
        assert_eq!(capture.handle(PointerInput::Escape, viewport()), GestureOutcome::Cancelled);
        assert_eq!(capture.phase(), GesturePhase::Idle);
        assert!(capture.points().is_empty());
        assert_eq!(
            capture.handle(PointerInput::Up(Vec2::new(60.0, 60.0)), viewport()),
            GestureOutcome::Pending
        );
    }

    #[test]
    fn test_disabled_capture_ignores_pointer() {
        let mut capture = capture(GestureMode::Lasso);
        capture.handle(PointerInput::Down(Vec2::ZERO), viewport());
        capture.set_enabled(false);
        assert_eq!(capture.phase(), GesturePhase::Idle);
        assert_eq!(
            capture.handle(PointerInput::Down(Vec2::ZERO), viewport()),
            GestureOutcome::Pending
        );
        assert_eq!(capture.phase(), GesturePhase::Idle);
    }
}
