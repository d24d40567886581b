use crate::engine::selection::shape::{ScreenPoint, Viewport};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Camera state captured once, when a gesture is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewContext {
    pub camera_position: Vec3,
    pub camera_orientation: Quat,
    /// Vertical field of view in radians; `None` for orthographic cameras.
    pub fov: Option<f32>,
    pub near: f32,
    pub far: f32,
}

/// Projected position of a world point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub screen: ScreenPoint,
    /// Normalised device depth; inside `[-1, 1]` means between the clip planes.
    pub depth: f32,
}

impl ProjectedPoint {
    pub fn is_unclipped(&self) -> bool {
        (-1.0..=1.0).contains(&self.depth)
    }
}

/// A world-space ray limited to the camera's far plane.
#[derive(Debug, Clone, Copy)]
pub struct ViewportRay {
    pub ray: Ray3d,
    pub max_distance: f32,
}

/// Immutable snapshot of the active camera, able to project and unproject device pixels.
#[derive(Debug, Clone)]
pub struct SelectionCamera {
    position: Vec3,
    orientation: Quat,
    fov: Option<f32>,
    near: f32,
    far: f32,
    viewport: Viewport,
    clip_from_world: Mat4,
    world_from_clip: Mat4,
}

impl SelectionCamera {
    /// Perspective camera with a vertical field of view in radians.
    pub fn perspective(
        position: Vec3,
        orientation: Quat,
        fov: f32,
        near: f32,
        far: f32,
        viewport: Viewport,
    ) -> Option<Self> {
        if viewport.is_degenerate() || !(fov > 0.0 && near > 0.0 && far > near) {
            return None;
        }
        let aspect = viewport.width / viewport.height;
        let clip_from_view = Mat4::perspective_rh_gl(fov, aspect, near, far);
        Self::from_parts(position, orientation, Some(fov), near, far, viewport, clip_from_view)
    }

    /// Orthographic camera spanning `area` (view-space extents) between the clip planes.
    pub fn orthographic(
        position: Vec3,
        orientation: Quat,
        area: Rect,
        near: f32,
        far: f32,
        viewport: Viewport,
    ) -> Option<Self> {
        if viewport.is_degenerate() || area.is_empty() || !(far > near) {
            return None;
        }
        let clip_from_view =
            Mat4::orthographic_rh_gl(area.min.x, area.max.x, area.min.y, area.max.y, near, far);
        Self::from_parts(position, orientation, None, near, far, viewport, clip_from_view)
    }

    /// Perspective camera at `eye` looking towards `target`.
    pub fn looking_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov: f32,
        near: f32,
        far: f32,
        viewport: Viewport,
    ) -> Option<Self> {
        let transform = Transform::from_translation(eye).looking_at(target, up);
        Self::perspective(eye, transform.rotation, fov, near, far, viewport)
    }

    /// Snapshot of a Bevy camera. Custom projections are not supported.
    pub fn from_projection(
        projection: &Projection,
        transform: &GlobalTransform,
        viewport: Viewport,
    ) -> Option<Self> {
        let (_, rotation, translation) = transform.to_scale_rotation_translation();
        match projection {
            Projection::Perspective(perspective) => Self::perspective(
                translation,
                rotation,
                perspective.fov,
                perspective.near,
                perspective.far,
                viewport,
            ),
            Projection::Orthographic(orthographic) => Self::orthographic(
                translation,
                rotation,
                orthographic.area,
                orthographic.near,
                orthographic.far,
                viewport,
            ),
            _ => None,
        }
    }

    fn from_parts(
        position: Vec3,
        orientation: Quat,
        fov: Option<f32>,
        near: f32,
        far: f32,
        viewport: Viewport,
        clip_from_view: Mat4,
    ) -> Option<Self> {
        let world_from_view = Mat4::from_rotation_translation(orientation, position);
        let clip_from_world = clip_from_view * world_from_view.inverse();
        let world_from_clip = clip_from_world.inverse();
        if !world_from_clip.is_finite() {
            return None;
        }

        Some(Self {
            position,
            orientation,
            fov,
            near,
            far,
            viewport,
            clip_from_world,
            world_from_clip,
        })
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn view_context(&self) -> ViewContext {
        ViewContext {
            camera_position: self.position,
            camera_orientation: self.orientation,
            fov: self.fov,
            near: self.near,
            far: self.far,
        }
    }

    fn screen_to_ndc(&self, screen: ScreenPoint) -> Vec2 {
        Vec2::new(
            screen.x / self.viewport.width * 2.0 - 1.0,
            1.0 - screen.y / self.viewport.height * 2.0,
        )
    }

    /// Ray through a device pixel, starting on the near plane.
    pub fn viewport_ray(&self, screen: ScreenPoint) -> Option<ViewportRay> {
        let ndc = self.screen_to_ndc(screen);
        let near = self.world_from_clip.project_point3(ndc.extend(-1.0));
        let far = self.world_from_clip.project_point3(ndc.extend(1.0));
        let span = far - near;
        let direction = Dir3::new(span).ok()?;

        Some(ViewportRay {
            ray: Ray3d::new(near, direction),
            max_distance: span.length(),
        })
    }

    /// World point to device pixel and NDC depth. `None` behind the camera.
    pub fn project(&self, world: Vec3) -> Option<ProjectedPoint> {
        let clip = self.clip_from_world * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(ProjectedPoint {
            screen: Vec2::new(
                (ndc.x + 1.0) * 0.5 * self.viewport.width,
                (1.0 - ndc.y) * 0.5 * self.viewport.height,
            ),
            depth: ndc.z,
        })
    }
}
