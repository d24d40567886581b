//! Triangle bounding volume hierarchy for nearest-hit ray queries.
//!
//! Built top-down: bound the node, pick the axis of largest extent, sort triangles by
//! centroid along it and split at the median.

use super::ray::{Aabb, inverse_direction, ray_aabb_entry, ray_triangle_hit};
use bevy::prelude::*;
use std::cmp::Ordering;

const MAX_TRIANGLES_PER_LEAF: usize = 4;

/// A triangle stored in local space alongside the index of the face it came from.
#[derive(Debug, Clone)]
pub struct BvhTriangle {
    pub vertices: [Vec3; 3],
    pub face_index: usize,
    bounds: Aabb,
}

impl BvhTriangle {
    pub fn new(vertices: [Vec3; 3], face_index: usize) -> Self {
        let bounds = Aabb {
            min: vertices[0].min(vertices[1]).min(vertices[2]),
            max: vertices[0].max(vertices[1]).max(vertices[2]),
        };
        Self {
            vertices,
            face_index,
            bounds,
        }
    }
}

#[derive(Debug, Clone)]
enum BvhNode {
    Internal { bounds: Aabb, left: usize, right: usize },
    Leaf { bounds: Aabb, first: usize, count: usize },
}

impl BvhNode {
    fn bounds(&self) -> &Aabb {
        match self {
            Self::Internal { bounds, .. } | Self::Leaf { bounds, .. } => bounds,
        }
    }
}

/// Closest intersection reported by [`TriangleBvh::closest_hit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhHit {
    pub distance: f32,
    pub face_index: usize,
    pub vertices: [Vec3; 3],
}

#[derive(Debug, Clone, Default)]
pub struct TriangleBvh {
    nodes: Vec<BvhNode>,
    triangles: Vec<BvhTriangle>,
}

impl TriangleBvh {
    pub fn build(mut triangles: Vec<BvhTriangle>) -> Self {
        let mut bvh = Self::default();
        if triangles.is_empty() {
            return bvh;
        }
        bvh.nodes.reserve(triangles.len() * 2);
        let len = triangles.len();
        bvh.build_node(&mut triangles, 0, len);
        bvh.triangles = triangles;
        bvh
    }

    fn build_node(&mut self, triangles: &mut [BvhTriangle], start: usize, end: usize) -> usize {
        let slice = &triangles[start..end];
        let bounds = slice[1..]
            .iter()
            .fold(slice[0].bounds, |acc, triangle| acc.union(&triangle.bounds));
        let count = end - start;

        if count <= MAX_TRIANGLES_PER_LEAF {
            let index = self.nodes.len();
            self.nodes.push(BvhNode::Leaf { bounds, first: start, count });
            return index;
        }

        let extent = bounds.max - bounds.min;
        let axis = if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        };
        triangles[start..end].sort_by(|a, b| {
            a.bounds.centroid()[axis]
                .partial_cmp(&b.bounds.centroid()[axis])
                .unwrap_or(Ordering::Equal)
        });

        let mid = start + count / 2;
        let index = self.nodes.len();
        self.nodes.push(BvhNode::Internal { bounds, left: 0, right: 0 });

        let left_index = self.build_node(triangles, start, mid);
        let right_index = self.build_node(triangles, mid, end);
        if let BvhNode::Internal { left, right, .. } = &mut self.nodes[index] {
            *left = left_index;
            *right = right_index;
        }
        index
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.nodes.first().map(|node| *node.bounds())
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Nearest triangle hit within `max_distance`. `direction` need not be unit length;
    /// distances are in multiples of it. Equal distances resolve to the lower face index.
    pub fn closest_hit(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<BvhHit> {
        if self.is_empty() {
            return None;
        }

        let inv_direction = inverse_direction(direction);
        let mut best: Option<BvhHit> = None;
        let mut stack = vec![0_usize];

        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index];
            let limit = best.map_or(max_distance, |hit| hit.distance);
            if ray_aabb_entry(origin, inv_direction, node.bounds(), limit).is_none() {
                continue;
            }

            match node {
                BvhNode::Internal { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
                BvhNode::Leaf { first, count, .. } => {
                    for triangle in &self.triangles[*first..*first + *count] {
                        let Some(distance) = ray_triangle_hit(origin, direction, &triangle.vertices)
                        else {
                            continue;
                        };
                        if distance > max_distance {
                            continue;
                        }
                        let closer = match best {
                            None => true,
                            Some(hit) => {
                                distance < hit.distance
                                    || (distance == hit.distance && triangle.face_index < hit.face_index)
                            }
                        };
                        if closer {
                            best = Some(BvhHit {
                                distance,
                                face_index: triangle.face_index,
                                vertices: triangle.vertices,
                            });
                        }
                    }
                }
            }
        }

        best
    }
}
