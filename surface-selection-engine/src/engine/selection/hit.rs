use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// One successful ray intersection with the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceHit {
    pub world_point: Vec3,
    pub world_normal: Vec3,
    /// Distance along the unit-length viewport ray.
    pub depth: f32,
    pub mesh_id: String,
    pub face_index: usize,
}

impl SurfaceHit {
    pub fn face(&self) -> FaceRef {
        FaceRef {
            mesh_id: self.mesh_id.clone(),
            face_index: self.face_index,
        }
    }
}

/// Identity of one triangle of one mesh.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceRef {
    pub mesh_id: String,
    pub face_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceHitCount {
    #[serde(flatten)]
    pub face: FaceRef,
    pub hits: u32,
}

/// A triangle lying entirely inside the selection, in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    #[serde(flatten)]
    pub face: FaceRef,
    pub vertices: [Vec3; 3],
}

impl Triangle {
    pub fn centroid(&self) -> Vec3 {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }
}
