use super::mesh_scene::{MeshScene, SceneObject};
use bevy::prelude::*;
use bevy::render::mesh::{PrimitiveTopology, VertexAttributeValues};

/// Copy triangle geometry out of a Bevy mesh. Non-triangle-list meshes are skipped.
pub fn scene_object_from_mesh(mesh: &Mesh) -> Option<SceneObject> {
    if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
        warn!(
            "Skipping mesh with unsupported topology {:?}",
            mesh.primitive_topology()
        );
        return None;
    }

    let positions: Vec<Vec3> = match mesh.attribute(Mesh::ATTRIBUTE_POSITION) {
        Some(VertexAttributeValues::Float32x3(values)) => {
            values.iter().map(|p| Vec3::from_array(*p)).collect()
        }
        _ => Vec::new(),
    };
    let indices = mesh
        .indices()
        .map(|indices| indices.iter().map(|i| i as u32).collect());

    Some(SceneObject::new(positions, indices))
}

/// Snapshot every mesh entity into a CPU scene for ray casting.
pub fn snapshot_scene<'a>(
    entities: impl IntoIterator<
        Item = (
            Entity,
            &'a Mesh3d,
            &'a GlobalTransform,
            &'a InheritedVisibility,
            Option<&'a Name>,
        ),
    >,
    meshes: &Assets<Mesh>,
) -> MeshScene {
    let mut scene = MeshScene::new();
    for (entity, mesh_handle, transform, visibility, name) in entities {
        let Some(mesh) = meshes.get(&mesh_handle.0) else {
            continue;
        };
        let Some(object) = scene_object_from_mesh(mesh) else {
            continue;
        };

        let mut object = object
            .with_id(format!("entity-{}", entity.index()))
            .with_transform(transform.compute_matrix())
            .with_visibility(visibility.get());
        if let Some(name) = name {
            object = object.named(name.as_str());
        }
        scene.push(object);
    }
    scene
}
