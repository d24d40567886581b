/// Linear RGBA colour of the in-progress gesture outline.
pub const GESTURE_PREVIEW_COLOUR: [f32; 4] = [1.0, 0.85, 0.1, 1.0];

/// Distance in front of the near plane at which the gesture outline is drawn.
pub const GESTURE_PREVIEW_DEPTH: f32 = 0.05;

/// Segment count used to draw circle gestures.
pub const CIRCLE_PREVIEW_SEGMENTS: usize = 48;

/// Linear RGBA colour of the extracted patch overlay.
pub const PATCH_OVERLAY_COLOUR: [f32; 4] = [0.1, 0.75, 1.0, 0.45];

/// World-space offset applied along the oriented normal to keep the overlay above the surface.
pub const PATCH_OVERLAY_OFFSET: f32 = 0.002;
