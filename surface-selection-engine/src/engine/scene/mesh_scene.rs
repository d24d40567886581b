use super::bvh::{BvhTriangle, TriangleBvh};
use super::ray::{Aabb, inverse_direction, ray_aabb_entry};
use crate::engine::assets::selection_config::SceneFilter;
use crate::engine::camera::selection_camera::ViewportRay;
use crate::engine::selection::hit::SurfaceHit;
use bevy::prelude::*;
use constants::selection::NORMAL_EPSILON;

/// Index of an object inside a scene snapshot.
pub type ObjectHandle = usize;

/// Read-only scene access needed by the selection pipeline.
pub trait SceneQuery {
    /// Objects that may receive selection rays.
    fn eligible_objects(&self, filter: &SceneFilter) -> Vec<ObjectHandle>;

    /// Nearest intersection of `ray` with any of `objects`.
    fn cast_ray(&self, ray: &ViewportRay, objects: &[ObjectHandle]) -> Option<SurfaceHit>;

    /// World-space vertices of one face. With duplicate mesh ids the first object wins.
    fn world_triangle(&self, mesh_id: &str, face_index: usize) -> Option<[Vec3; 3]>;
}

/// Triangle geometry plus identity and placement, as handed over by the host.
#[derive(Debug, Clone)]
pub struct SceneObject {
    name: Option<String>,
    id: Option<String>,
    transform: Mat4,
    visible: bool,
    positions: Vec<Vec3>,
    indices: Option<Vec<u32>>,
}

impl SceneObject {
    /// `indices` groups positions into triangles three at a time; without them every
    /// consecutive position triple is a triangle.
    pub fn new(positions: Vec<Vec3>, indices: Option<Vec<u32>>) -> Self {
        Self {
            name: None,
            id: None,
            transform: Mat4::IDENTITY,
            visible: true,
            positions,
            indices,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Identity used when the object has no usable name.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Local-space faces in index order. Out-of-range index triples are dropped.
    fn local_faces(&self) -> Vec<(usize, [Vec3; 3])> {
        let fetch = |i: u32| self.positions.get(i as usize).copied();
        match &self.indices {
            Some(indices) => indices
                .chunks_exact(3)
                .enumerate()
                .filter_map(|(face, tri)| Some((face, [fetch(tri[0])?, fetch(tri[1])?, fetch(tri[2])?])))
                .collect(),
            None => self
                .positions
                .chunks_exact(3)
                .enumerate()
                .map(|(face, tri)| (face, [tri[0], tri[1], tri[2]]))
                .collect(),
        }
    }
}

#[derive(Debug)]
struct PreparedObject {
    mesh_id: String,
    name: Option<String>,
    visible: bool,
    world_from_local: Mat4,
    /// `None` for singular transforms; such objects are never hit.
    local_from_world: Option<Mat4>,
    normal_matrix: Mat3,
    /// Sorted by face index.
    faces: Vec<(usize, [Vec3; 3])>,
    bvh: TriangleBvh,
    world_bounds: Option<Aabb>,
}

/// CPU scene snapshot with per-object BVHs.
#[derive(Debug, Default)]
pub struct MeshScene {
    objects: Vec<PreparedObject>,
}

impl MeshScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objects(objects: impl IntoIterator<Item = SceneObject>) -> Self {
        let mut scene = Self::new();
        for object in objects {
            scene.push(object);
        }
        scene
    }

    pub fn push(&mut self, object: SceneObject) -> ObjectHandle {
        let handle = self.objects.len();
        let mesh_id = object
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| object.id.clone())
            .unwrap_or_else(|| format!("mesh-{handle}"));

        let world_from_local = object.transform;
        // Only exactly singular transforms are rejected; small uniform scales stay hittable.
        let inverse = world_from_local.inverse();
        let local_from_world =
            (world_from_local.determinant() != 0.0 && inverse.is_finite()).then_some(inverse);
        let normal_matrix = Mat3::from_mat4(world_from_local).inverse().transpose();

        let faces = object.local_faces();
        let bvh = TriangleBvh::build(
            faces
                .iter()
                .filter(|(_, tri)| (tri[1] - tri[0]).cross(tri[2] - tri[0]).length_squared() > 0.0)
                .map(|(face, tri)| BvhTriangle::new(*tri, *face))
                .collect(),
        );
        let world_bounds = bvh.bounds().map(|bounds| bounds.transformed(&world_from_local));

        self.objects.push(PreparedObject {
            mesh_id,
            name: object.name,
            visible: object.visible,
            world_from_local,
            local_from_world,
            normal_matrix,
            faces,
            bvh,
            world_bounds,
        });
        handle
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn mesh_id(&self, handle: ObjectHandle) -> Option<&str> {
        self.objects.get(handle).map(|object| object.mesh_id.as_str())
    }

    /// Total number of ray-testable triangles.
    pub fn triangle_count(&self) -> usize {
        self.objects.iter().map(|object| object.bvh.len()).sum()
    }
}

impl SceneQuery for MeshScene {
    fn eligible_objects(&self, filter: &SceneFilter) -> Vec<ObjectHandle> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, object)| filter.accepts(object.name.as_deref(), object.visible))
            .map(|(handle, _)| handle)
            .collect()
    }

    fn cast_ray(&self, ray: &ViewportRay, objects: &[ObjectHandle]) -> Option<SurfaceHit> {
        let origin = ray.ray.origin;
        let direction = *ray.ray.direction;
        let inv_direction = inverse_direction(direction);

        let mut nearest: Option<SurfaceHit> = None;
        for &handle in objects {
            let Some(object) = self.objects.get(handle) else {
                continue;
            };
            let (Some(local_from_world), Some(bounds)) = (object.local_from_world, object.world_bounds)
            else {
                continue;
            };
            let limit = nearest.as_ref().map_or(ray.max_distance, |hit| hit.depth);
            if ray_aabb_entry(origin, inv_direction, &bounds, limit).is_none() {
                continue;
            }

            // Unnormalised local direction keeps the ray parameter in world units.
            let local_origin = local_from_world.transform_point3(origin);
            let local_direction = local_from_world.transform_vector3(direction);
            let Some(hit) = object.bvh.closest_hit(local_origin, local_direction, limit) else {
                continue;
            };
            if nearest.as_ref().is_some_and(|best| hit.distance >= best.depth) {
                continue;
            }

            let [a, b, c] = hit.vertices;
            let local_normal = (b - a).cross(c - a).normalize_or_zero();
            let world_normal = (object.normal_matrix * local_normal).normalize_or_zero();
            if world_normal.length_squared() < NORMAL_EPSILON {
                continue;
            }

            nearest = Some(SurfaceHit {
                world_point: origin + direction * hit.distance,
                world_normal,
                depth: hit.distance,
                mesh_id: object.mesh_id.clone(),
                face_index: hit.face_index,
            });
        }
        nearest
    }

    fn world_triangle(&self, mesh_id: &str, face_index: usize) -> Option<[Vec3; 3]> {
        let object = self.objects.iter().find(|object| object.mesh_id == mesh_id)?;
        let position = object
            .faces
            .binary_search_by_key(&face_index, |(face, _)| *face)
            .ok()?;
        let (_, local) = object.faces[position];
        Some(local.map(|vertex| object.world_from_local.transform_point3(vertex)))
    }
}
