use bevy::prelude::*;
use std::f32::consts::FRAC_PI_3;
use surface_selection_engine::engine::assets::selection_config::SelectionConfig;
use surface_selection_engine::engine::camera::selection_camera::SelectionCamera;
use surface_selection_engine::engine::scene::extraction::scene_object_from_mesh;
use surface_selection_engine::engine::scene::mesh_scene::{MeshScene, SceneObject};
use surface_selection_engine::engine::selection::classifier::SurfaceType;
use surface_selection_engine::engine::selection::pipeline::summarize_selection;
use surface_selection_engine::engine::selection::shape::{SelectionShape, Viewport};

fn viewport() -> Viewport {
    Viewport::new(800.0, 600.0)
}

fn front_camera() -> SelectionCamera {
    SelectionCamera::looking_at(
        Vec3::new(0.0, 0.0, 5.0),
        Vec3::ZERO,
        Vec3::Y,
        FRAC_PI_3,
        0.1,
        100.0,
        viewport(),
    )
    .unwrap()
}

/// Square of side `2 * half` facing +Z, split along its diagonal into faces 0 and 1.
fn quad(name: &str, half: f32, z: f32) -> SceneObject {
    SceneObject::new(
        vec![
            Vec3::new(-half, -half, z),
            Vec3::new(half, -half, z),
            Vec3::new(half, half, z),
            Vec3::new(-half, half, z),
        ],
        Some(vec![0, 1, 2, 0, 2, 3]),
    )
    .named(name)
}

fn rectangle(min: Vec2, max: Vec2) -> SelectionShape {
    SelectionShape::polygon(
        vec![
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ],
        viewport(),
    )
    .unwrap()
}

// The unit quad projects to roughly x 296..504, y 196..404.
fn whole_quad_lasso() -> SelectionShape {
    rectangle(Vec2::new(250.0, 150.0), Vec2::new(550.0, 450.0))
}

#[test]
fn test_lasso_around_quad_extracts_both_triangles() {
    let scene = MeshScene::from_objects([quad("plate", 1.0, 0.0)]);
    let camera = front_camera();
    let summary = summarize_selection(
        whole_quad_lasso(),
        Some(&camera),
        &scene,
        &SelectionConfig::default(),
    );

    assert_eq!(summary.surface_type, SurfaceType::Planar);
    assert_eq!(summary.overlay_triangles.len(), 2);
    assert_eq!(summary.bounded_vertices.len(), 4);
    assert!(summary.raw_point_count > 1000);

    let normal = summary.normal.unwrap();
    assert!(normal.dot(Vec3::Z) > 0.999);
    assert!(summary.centroid.unwrap().length() < 0.05);

    let bounds = summary.bounding_box.unwrap();
    assert!((bounds.min - Vec3::new(-1.0, -1.0, 0.0)).length() < 1e-5);
    assert!((bounds.max - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-5);

    let dominant = summary.dominant_face.unwrap();
    assert_eq!(dominant.mesh_id, "plate");
    assert_eq!(summary.adjacent_faces.len(), 1);
    assert_ne!(summary.adjacent_faces[0].face_index, dominant.face_index);
}

#[test]
fn test_partial_lasso_keeps_faces_but_no_whole_triangles() {
    let scene = MeshScene::from_objects([quad("plate", 1.0, 0.0)]);
    let camera = front_camera();
    let summary = summarize_selection(
        rectangle(Vec2::new(250.0, 150.0), Vec2::new(400.0, 450.0)),
        Some(&camera),
        &scene,
        &SelectionConfig::default(),
    );

    assert!(!summary.is_empty());
    assert!(summary.overlay_triangles.is_empty());
    assert!(summary.bounding_box.is_none());
    // Face 1 covers three quarters of the left half.
    assert_eq!(summary.dominant_face.unwrap().face_index, 1);
    assert!(summary.centroid.unwrap().x < 0.0);
}

#[test]
fn test_nearest_object_occludes_the_one_behind() {
    let scene = MeshScene::from_objects([quad("back", 1.0, 0.0), quad("front", 0.4, 1.0)]);
    let camera = front_camera();
    let summary = summarize_selection(
        SelectionShape::circle(Vec2::new(400.0, 300.0), 20.0, viewport()).unwrap(),
        Some(&camera),
        &scene,
        &SelectionConfig::default(),
    );

    assert_eq!(summary.dominant_face.unwrap().mesh_id, "front");
    assert!(summary.sampled_surface.iter().all(|hit| hit.mesh_id == "front"));
    assert!(summary.sampled_points.iter().all(|point| (point.z - 1.0).abs() < 1e-4));
}

#[test]
fn test_circle_on_sphere_is_curved() {
    let object = scene_object_from_mesh(&Sphere::new(1.0).mesh().uv(64, 32))
        .unwrap()
        .named("ball");
    let scene = MeshScene::from_objects([object]);
    let camera = front_camera();
    let summary = summarize_selection(
        SelectionShape::circle(Vec2::new(400.0, 300.0), 60.0, viewport()).unwrap(),
        Some(&camera),
        &scene,
        &SelectionConfig::default(),
    );

    assert_eq!(summary.surface_type, SurfaceType::Curved);
    assert!(summary.normal.unwrap().dot(Vec3::Z) > 0.99);
    assert!(!summary.overlay_triangles.is_empty());
}

#[test]
fn test_selection_is_deterministic() {
    let scene = MeshScene::from_objects([quad("plate", 1.0, 0.0)]);
    let camera = front_camera();
    let config = SelectionConfig::default();
    let first = summarize_selection(whole_quad_lasso(), Some(&camera), &scene, &config);
    let second = summarize_selection(whole_quad_lasso(), Some(&camera), &scene, &config);
    assert_eq!(first, second);
    assert_eq!(first.to_request_params(), second.to_request_params());
}

#[test]
fn test_missing_camera_yields_empty_summary() {
    let scene = MeshScene::from_objects([quad("plate", 1.0, 0.0)]);
    let summary = summarize_selection(whole_quad_lasso(), None, &scene, &SelectionConfig::default());

    assert!(summary.is_empty());
    assert!(summary.view_context.is_none());
    assert_eq!(summary.surface_type, SurfaceType::Unknown);
    assert_eq!(summary.selection_shape, whole_quad_lasso());
}

#[test]
fn test_empty_and_filtered_scenes_yield_empty_summary() {
    let camera = front_camera();
    let config = SelectionConfig::default();

    let empty = summarize_selection(whole_quad_lasso(), Some(&camera), &MeshScene::new(), &config);
    assert_eq!(empty.raw_point_count, 0);
    assert!(empty.view_context.is_some());

    let helpers = MeshScene::from_objects([quad("Grid Helper", 1.0, 0.0)]);
    assert!(summarize_selection(whole_quad_lasso(), Some(&camera), &helpers, &config).is_empty());
}

#[test]
fn test_hidden_objects_need_include_hidden() {
    let scene = MeshScene::from_objects([quad("plate", 1.0, 0.0).with_visibility(false)]);
    let camera = front_camera();
    let mut config = SelectionConfig::default();
    assert!(summarize_selection(whole_quad_lasso(), Some(&camera), &scene, &config).is_empty());

    config.scene.include_hidden = true;
    assert!(!summarize_selection(whole_quad_lasso(), Some(&camera), &scene, &config).is_empty());
}

#[test]
fn test_zero_area_selection_yields_empty_summary() {
    let scene = MeshScene::from_objects([quad("plate", 1.0, 0.0)]);
    let camera = front_camera();
    let sliver = SelectionShape::polygon(
        vec![
            Vec2::new(300.0, 300.0),
            Vec2::new(400.0, 300.0),
            Vec2::new(500.0, 300.0),
        ],
        viewport(),
    )
    .unwrap();
    let summary = summarize_selection(sliver, Some(&camera), &scene, &SelectionConfig::default());
    assert!(summary.is_empty());
}

#[test]
fn test_transport_caps_bound_the_summary() {
    let scene = MeshScene::from_objects([quad("plate", 1.0, 0.0)]);
    let camera = front_camera();
    let mut config = SelectionConfig::default();
    config.summary.max_sampled_points = 100;
    config.summary.max_sampled_surface = 10;
    config.extraction.max_overlay_triangles = 1;

    let summary = summarize_selection(whole_quad_lasso(), Some(&camera), &scene, &config);
    assert!(summary.raw_point_count > 100);
    assert!(summary.sampled_points.len() <= 100);
    assert!(summary.sampled_surface.len() <= 10);
    assert_eq!(summary.overlay_triangles.len(), 1);
    assert_eq!(summary.bounded_vertices.len(), 3);

    let digest = summary.digest().unwrap();
    assert_eq!(digest.point_count, summary.sampled_points.len());
    assert_eq!(
        summary.to_request_params()["counts"]["raw_points"],
        serde_json::json!(summary.raw_point_count)
    );
}
