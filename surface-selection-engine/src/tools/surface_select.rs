use crate::engine::assets::selection_config::{CaptureSettings, SelectionConfig};
use crate::engine::camera::selection_camera::SelectionCamera;
use crate::engine::scene::extraction::snapshot_scene;
use crate::engine::selection::hit::Triangle;
use crate::engine::selection::pipeline::summarize_selection;
use crate::engine::selection::shape::{ScreenPoint, Viewport};
use crate::engine::selection::summary::RegionSummary;
use crate::tools::gesture::{GestureCapture, GestureMode, GestureOutcome, GesturePhase, PointerInput};
use crate::tools::tool_manager::{
    ClearToolEvent, ToolManager, ToolSelectionEvent, handle_clear_tool_events,
    handle_tool_keyboard_shortcuts, handle_tool_selection_events,
};
use bevy::asset::{LoadState, RenderAssetUsages};
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::window::PrimaryWindow;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::render_settings::{
    CIRCLE_PREVIEW_SEGMENTS, GESTURE_PREVIEW_COLOUR, GESTURE_PREVIEW_DEPTH, PATCH_OVERLAY_COLOUR,
    PATCH_OVERLAY_OFFSET,
};

/// Gesture state plus the most recent result.
#[derive(Resource, Debug, Default)]
pub struct SelectionSession {
    pub capture: GestureCapture,
    pub last_summary: Option<RegionSummary>,
}

impl SelectionSession {
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            capture: GestureCapture::new(settings),
            last_summary: None,
        }
    }

    /// Drop the gesture in progress and the last summary.
    /// Returns `true` when a summary was discarded.
    pub fn reset(&mut self) -> bool {
        self.capture.reset();
        self.last_summary.take().is_some()
    }
}

/// Fired once per finalized gesture, including empty results.
#[derive(Event, Debug, Clone)]
pub struct RegionSelected {
    pub summary: RegionSummary,
}

/// The previous selection was discarded.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SelectionCleared;

/// Marks the translucent patch mesh so it can be replaced and kept out of ray casts.
#[derive(Component)]
pub struct SelectionOverlay;

/// Tracks the optional on-disk config asset.
#[derive(Resource, Default)]
pub struct SelectionConfigLoader {
    path: Option<String>,
    handle: Option<Handle<SelectionConfig>>,
    applied: bool,
}

pub struct SurfaceSelectionPlugin {
    /// Asset path of a `*.selection.json` file. Defaults are used without one.
    pub config_path: Option<String>,
}

impl Plugin for SurfaceSelectionPlugin {
    fn build(&self, app: &mut App) {
        let config = SelectionConfig::default();
        app.add_plugins(JsonAssetPlugin::<SelectionConfig>::new(&["selection.json"]))
            .insert_resource(SelectionSession::new(config.capture.clone()))
            .insert_resource(config)
            .insert_resource(SelectionConfigLoader {
                path: self.config_path.clone(),
                ..default()
            })
            .init_resource::<ToolManager>()
            .add_event::<ToolSelectionEvent>()
            .add_event::<ClearToolEvent>()
            .add_event::<RegionSelected>()
            .add_event::<SelectionCleared>()
            .add_systems(Startup, start_config_load)
            .add_systems(
                Update,
                (
                    handle_tool_keyboard_shortcuts,
                    handle_tool_selection_events,
                    handle_clear_tool_events,
                    selection_input_system,
                    draw_gesture_preview,
                    update_patch_overlay,
                )
                    .chain(),
            )
            .add_systems(Update, apply_loaded_config);
    }
}

fn start_config_load(asset_server: Res<AssetServer>, mut loader: ResMut<SelectionConfigLoader>) {
    if let Some(path) = loader.path.clone() {
        info!("Loading selection config from {}", path);
        loader.handle = Some(asset_server.load(path));
    }
}

fn apply_loaded_config(
    asset_server: Res<AssetServer>,
    configs: Res<Assets<SelectionConfig>>,
    mut loader: ResMut<SelectionConfigLoader>,
    mut config: ResMut<SelectionConfig>,
    mut session: ResMut<SelectionSession>,
) {
    if loader.applied {
        return;
    }
    let Some(handle) = loader.handle.clone() else {
        return;
    };

    if let Some(loaded) = configs.get(&handle) {
        *config = loaded.clone();
        session.capture.set_settings(config.capture.clone());
        loader.applied = true;
        info!("Selection config applied");
    } else if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle.id()) {
        warn!("Selection config failed to load, keeping defaults: {}", err);
        loader.applied = true;
    }
}

/// Feeds pointer input into the gesture and runs the pipeline when one completes.
pub fn selection_input_system(
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &Projection, &GlobalTransform), With<Camera3d>>,
    mesh_entities: Query<
        (Entity, &Mesh3d, &GlobalTransform, &InheritedVisibility, Option<&Name>),
        Without<SelectionOverlay>,
    >,
    meshes: Res<Assets<Mesh>>,
    config: Res<SelectionConfig>,
    mut session: ResMut<SelectionSession>,
    mut selected: EventWriter<RegionSelected>,
    mut cleared: EventWriter<SelectionCleared>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let viewport = Viewport::new(window.physical_width() as f32, window.physical_height() as f32);
    let cursor = window.physical_cursor_position();

    let mut inputs: Vec<PointerInput> = Vec::new();
    if keyboard.just_pressed(KeyCode::Escape) {
        inputs.push(PointerInput::Escape);
    }
    if let Some(cursor) = cursor {
        if mouse_button.just_pressed(MouseButton::Left) {
            inputs.push(PointerInput::Down(cursor));
        } else if session.capture.phase() == GesturePhase::Drawing {
            inputs.push(PointerInput::Move(cursor));
        }
    }
    if mouse_button.just_released(MouseButton::Left) {
        // Released outside the window: close on the last tracked point.
        if let Some(point) = cursor.or_else(|| session.capture.last_point()) {
            inputs.push(PointerInput::Up(point));
        }
    }

    for input in inputs {
        if matches!(input, PointerInput::Down(_))
            && session.capture.is_enabled()
            && session.last_summary.take().is_some()
        {
            cleared.write(SelectionCleared);
        }

        match session.capture.handle(input, viewport) {
            GestureOutcome::Pending => {}
            GestureOutcome::Cancelled => {
                if session.last_summary.take().is_some() {
                    cleared.write(SelectionCleared);
                }
                info!("Selection gesture cancelled");
            }
            GestureOutcome::Completed(shape) => {
                let camera = cameras
                    .iter()
                    .find(|(camera, _, _)| camera.is_active)
                    .and_then(|(_, projection, transform)| {
                        SelectionCamera::from_projection(projection, transform, viewport)
                    });
                let scene = snapshot_scene(mesh_entities.iter(), &meshes);
                if scene.is_empty() {
                    debug!("No mesh entities to select against");
                } else {
                    debug!(
                        "Scene snapshot: {} objects, {} triangles",
                        scene.len(),
                        scene.triangle_count()
                    );
                }
                let summary = summarize_selection(shape, camera.as_ref(), &scene, &config);

                match &summary.dominant_face {
                    Some(face) => info!(
                        "Selected {} surface: {} hits, dominant face {}#{}, {} triangles",
                        summary.surface_type.as_str(),
                        summary.raw_point_count,
                        face.mesh_id,
                        face.face_index,
                        summary.overlay_triangles.len()
                    ),
                    None => info!("Selection found no surface"),
                }
                session.last_summary = Some(summary.clone());
                selected.write(RegionSelected { summary });
            }
        }
    }
}

/// Closed circle outline with `segments` edges.
pub fn circle_outline(center: ScreenPoint, radius: f32, segments: usize) -> Vec<ScreenPoint> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|i| {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

/// Draws the gesture in progress just in front of the camera.
pub fn draw_gesture_preview(
    session: Res<SelectionSession>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut gizmos: Gizmos,
) {
    let capture = &session.capture;
    if capture.phase() != GesturePhase::Drawing {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some((camera, camera_transform)) = cameras.iter().find(|(camera, _)| camera.is_active)
    else {
        return;
    };

    let outline = match (capture.mode(), capture.circle()) {
        (GestureMode::Circle, Some((center, radius))) => {
            circle_outline(center, radius, CIRCLE_PREVIEW_SEGMENTS)
        }
        _ => capture.points().to_vec(),
    };

    // Gesture points are physical pixels; viewport_to_world expects logical ones.
    let scale = window.scale_factor();
    let world: Vec<Vec3> = outline
        .iter()
        .filter_map(|point| camera.viewport_to_world(camera_transform, *point / scale).ok())
        .map(|ray| ray.get_point(GESTURE_PREVIEW_DEPTH))
        .collect();
    if world.len() < 2 {
        return;
    }

    let [r, g, b, a] = GESTURE_PREVIEW_COLOUR;
    gizmos.linestrip(world, Color::linear_rgba(r, g, b, a));
}

/// Triangle list mesh for the patch overlay, lifted `offset` along `normal`.
pub fn create_patch_mesh(triangles: &[Triangle], normal: Vec3, offset: f32) -> Mesh {
    let lift = normal.normalize_or_zero() * offset;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(triangles.len() * 3);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(triangles.len() * 3);

    for triangle in triangles {
        let [a, b, c] = triangle.vertices;
        let mut face_normal = (b - a).cross(c - a).normalize_or_zero();
        if face_normal.dot(normal) < 0.0 {
            face_normal = -face_normal;
        }
        for vertex in triangle.vertices {
            positions.push((vertex + lift).to_array());
            normals.push(face_normal.to_array());
        }
    }
    let indices: Vec<u32> = (0..positions.len() as u32).collect();

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Replaces the overlay whenever the selection changes.
pub fn update_patch_overlay(
    mut commands: Commands,
    mut selected: EventReader<RegionSelected>,
    mut cleared: EventReader<SelectionCleared>,
    existing: Query<Entity, With<SelectionOverlay>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let was_cleared = cleared.read().count() > 0;
    let latest = selected.read().last();
    if !was_cleared && latest.is_none() {
        return;
    }

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let Some(RegionSelected { summary }) = latest else {
        return;
    };
    if summary.overlay_triangles.is_empty() {
        return;
    }

    let normal = summary.normal.unwrap_or(Vec3::ZERO);
    let [r, g, b, a] = PATCH_OVERLAY_COLOUR;
    commands.spawn((
        Mesh3d(meshes.add(create_patch_mesh(
            &summary.overlay_triangles,
            normal,
            PATCH_OVERLAY_OFFSET,
        ))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::linear_rgba(r, g, b, a),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            double_sided: true,
            cull_mode: None,
            ..default()
        })),
        Transform::IDENTITY,
        SelectionOverlay,
    ));
}
