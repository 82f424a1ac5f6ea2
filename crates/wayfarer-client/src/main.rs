//! Animated route playback using Bevy.
//!
//! Fetches a driving route between two places, draws it as a track over a
//! ground plane and drives a 3D model along it in a ten second loop.

mod async_runtime;
mod camera;
mod directions;
mod launch_params;
mod overlay;
mod ui;

use std::time::Duration;

use async_runtime::AsyncRuntimePlugin;
use bevy::prelude::*;
use bevy::winit::{UpdateMode, WinitSettings};
use camera::MapCameraPlugin;
use directions::DirectionsPlugin;
use overlay::OverlayPlugin;
use ui::DirectionsUiPlugin;

/// Side length of the ground plane in meters.
const GROUND_SIZE: f32 = 20_000.0;

/// The ground sits just below the track so the line never z-fights with it.
const GROUND_OFFSET: f32 = -0.5;

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            MapCameraPlugin,
            DirectionsPlugin,
            OverlayPlugin,
            DirectionsUiPlugin,
        ))
        .add_systems(Startup, setup_scene);
    }
}

/// Set up the ground and lighting.
fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Name::new("Ground"),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.82, 0.84, 0.80),
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::from_xyz(0.0, GROUND_OFFSET, 0.0),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(200.0, 800.0, 400.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    tracing::info!("Scene setup complete");
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();
    tracing::info!(?params, "Launching");

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "wayfarer".to_string(),
        resolution: (1280, 720).into(),
        position: WindowPosition::Centered(MonitorSelection::Primary),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    // Redraw only on input or when the overlay asks for a frame.
    app.insert_resource(WinitSettings {
        focused_mode: UpdateMode::reactive(Duration::from_secs(1)),
        unfocused_mode: UpdateMode::reactive_low_power(Duration::from_secs(5)),
    });

    // Add async runtime (Tokio on native, no-op on WASM).
    app.add_plugins(AsyncRuntimePlugin);

    app.insert_resource(params).add_plugins(AppPlugin).run();
}
