//! CPU scene snapshots and ray casting.

/// Median-split triangle BVH.
pub mod bvh;
/// Conversion from Bevy mesh entities.
pub mod extraction;
/// Per-object BVHs behind the `SceneQuery` trait.
pub mod mesh_scene;
/// Ray/box and ray/triangle primitives.
pub mod ray;
