use crate::tools::surface_select::{RegionSelected, SelectionCleared, SurfaceSelectionPlugin};
use crate::tools::tool_manager::ToolManager;
use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::PresentMode;

const SELECTION_CONFIG_PATH: &str = "config/default.selection.json";

#[derive(Component)]
pub struct FpsText;

#[derive(Component)]
pub struct StatusText;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(SurfaceSelectionPlugin {
            config_path: Some(SELECTION_CONFIG_PATH.to_string()),
        })
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (fps_text_update_system, status_text_update_system, log_region_summaries),
        );

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

fn create_window_config() -> Window {
    Window {
        title: "Surface Selection".into(),
        present_mode: PresentMode::AutoVsync,
        ..default()
    }
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    spawn_lighting(&mut commands);
    spawn_camera(&mut commands);
    spawn_demo_parts(&mut commands, &mut meshes, &mut materials);
    create_native_overlays(&mut commands);
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}

fn spawn_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-2.5, 4.5, 9.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// A few primitives to select on. The grid plane is skipped by the default name filter.
fn spawn_demo_parts(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let parts: [(&str, Mesh, Vec3, Color); 3] = [
        (
            "Block",
            Mesh::from(Cuboid::new(1.5, 1.5, 1.5)),
            Vec3::new(-2.0, 0.75, 0.0),
            Color::srgb(0.8, 0.55, 0.35),
        ),
        (
            "Sphere",
            Sphere::new(0.9).mesh().uv(48, 24),
            Vec3::new(0.0, 0.9, 0.0),
            Color::srgb(0.55, 0.7, 0.85),
        ),
        (
            "Cylinder",
            Mesh::from(Cylinder::new(0.7, 2.0)),
            Vec3::new(2.2, 1.0, 0.0),
            Color::srgb(0.6, 0.8, 0.5),
        ),
    ];

    for (name, mesh, translation, colour) in parts {
        commands.spawn((
            Name::new(name),
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: colour,
                perceptual_roughness: 0.8,
                ..default()
            })),
            Transform::from_translation(translation),
        ));
    }

    commands.spawn((
        Name::new("Ground Grid"),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(12.0, 12.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.25, 0.25, 0.28))),
        Transform::IDENTITY,
    ));
}

fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("L: lasso   C: circle   X: clear   Esc: cancel"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(12.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                StatusText,
            ));
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 0., 0.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
        });
}

fn fps_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsText>>,
) {
    for mut text in &mut query {
        if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(value) = fps.smoothed() {
                text.0 = format!("FPS: {value:.1}");
            }
        }
    }
}

fn status_text_update_system(
    tool_manager: Res<ToolManager>,
    mut selected: EventReader<RegionSelected>,
    mut cleared: EventReader<SelectionCleared>,
    mut query: Query<&mut Text, With<StatusText>>,
) {
    let was_cleared = cleared.read().count() > 0;
    let latest = selected.read().last();
    if !tool_manager.is_changed() && !was_cleared && latest.is_none() {
        return;
    }

    let tool = tool_manager
        .active_tool()
        .map_or("none (L: lasso, C: circle)", |tool| tool.as_str());
    let selection = match latest {
        Some(RegionSelected { summary }) if !summary.is_empty() => format!(
            "{} surface, {} hits, {} triangles",
            summary.surface_type.as_str(),
            summary.raw_point_count,
            summary.overlay_triangles.len()
        ),
        Some(_) => "nothing under selection".to_string(),
        None => "none".to_string(),
    };

    for mut text in &mut query {
        text.0 = format!("Tool: {tool}   Selection: {selection}   (X: clear, Esc: cancel)");
    }
}

/// Prints the request payload a downstream consumer would receive.
fn log_region_summaries(mut selected: EventReader<RegionSelected>) {
    for RegionSelected { summary } in selected.read() {
        if let Some(digest) = summary.digest() {
            info!(
                "Selection digest: {} points around {:?}",
                digest.point_count, digest.centroid
            );
        }
        match serde_json::to_string(&summary.to_request_params()) {
            Ok(json) => info!("Selection request params: {}", json),
            Err(err) => warn!("Failed to serialise selection: {}", err),
        }
    }
}
