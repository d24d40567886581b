use bevy::prelude::*;

/// Axis-aligned bounds used for ray culling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self { min: first, max: first }, |acc, p| Self {
            min: acc.min.min(*p),
            max: acc.max.max(*p),
        }))
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Bounds of the eight transformed corners.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
        .map(|corner| matrix.transform_point3(corner));
        // Eight corners, never empty.
        Self::from_points(corners.iter()).unwrap_or(*self)
    }
}

/// Component-wise reciprocal of a ray direction, infinite on zero components.
pub fn inverse_direction(direction: Vec3) -> Vec3 {
    Vec3::new(
        if direction.x != 0.0 { 1.0 / direction.x } else { f32::INFINITY },
        if direction.y != 0.0 { 1.0 / direction.y } else { f32::INFINITY },
        if direction.z != 0.0 { 1.0 / direction.z } else { f32::INFINITY },
    )
}

/// Slab-method ray–AABB test. Returns the entry distance (0 when the origin is inside)
/// if the box is reached within `max_distance`.
pub fn ray_aabb_entry(origin: Vec3, inv_direction: Vec3, aabb: &Aabb, max_distance: f32) -> Option<f32> {
    let t1 = (aabb.min - origin) * inv_direction;
    let t2 = (aabb.max - origin) * inv_direction;

    let mut t_enter = 0.0_f32;
    let mut t_exit = max_distance;
    for axis in 0..3 {
        let (a, b) = (t1[axis], t2[axis]);
        // Origin on the slab plane of an axis the ray runs parallel to.
        if a.is_nan() || b.is_nan() {
            continue;
        }
        t_enter = t_enter.max(a.min(b));
        t_exit = t_exit.min(a.max(b));
    }

    (t_enter <= t_exit).then_some(t_enter)
}

/// Möller–Trumbore intersection, both windings. Returns the ray parameter.
#[allow(clippy::many_single_char_names)]
pub fn ray_triangle_hit(origin: Vec3, direction: Vec3, triangle: &[Vec3; 3]) -> Option<f32> {
    let [a, b, c] = *triangle;
    let edge1 = b - a;
    let edge2 = c - a;

    let h = direction.cross(edge2);
    let det = edge1.dot(h);
    // Parallel test relative to the edge and direction lengths, so tiny triangles still hit.
    let parallel_limit = f32::EPSILON * edge1.length() * edge2.length() * direction.length();
    if det.abs() <= parallel_limit || !det.is_finite() {
        return None;
    }

    let f = 1.0 / det;
    let s = origin - a;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > 0.0 && t.is_finite()).then_some(t)
}
