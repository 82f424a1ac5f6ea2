//! Map-style camera: a look-at point with zoom, tilt and heading.
//!
//! The camera never moves on its own. It is positioned from [`MapView`]
//! whenever the view or the window size changes, and re-centered on the
//! middle of each newly activated route.

use std::f32::consts::FRAC_PI_4;

use bevy::prelude::*;
use bevy::transform::TransformSystems;
use bevy::window::PrimaryWindow;
use wayfarer_path::{LatLng, MercatorProjection, Projection as _};

use crate::launch_params::LaunchParams;
use crate::overlay::Overlay;

/// Plugin for the map camera.
pub struct MapCameraPlugin;

impl Plugin for MapCameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MapView>()
            .add_systems(Startup, spawn_camera)
            .add_systems(PostUpdate, apply_map_view.before(TransformSystems::Propagate));
    }
}

/// Zoom used when re-centering on a route.
pub const ROUTE_ZOOM: f32 = 17.0;

/// Web Mercator ground resolution at zoom 0 on the equator, meters per pixel.
const METERS_PER_PIXEL_ZOOM_0: f64 = 156_543.033_92;

/// Vertical field of view of the map camera.
pub const CAMERA_FOV: f32 = FRAC_PI_4;

/// Marker for the map camera.
#[derive(Component)]
pub struct MapCamera;

/// What the map camera looks at.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: f32,
    /// Degrees away from straight down.
    pub tilt: f32,
    /// Degrees clockwise from north.
    pub heading: f32,
}

impl FromWorld for MapView {
    fn from_world(world: &mut World) -> Self {
        let params = world.resource::<LaunchParams>();
        Self {
            center: params.center,
            zoom: params.zoom,
            tilt: params.tilt,
            heading: params.heading,
        }
    }
}

impl MapView {
    /// Look at `center` from route zoom, keeping tilt and heading.
    pub fn recenter(&mut self, center: LatLng) {
        self.center = center;
        self.zoom = ROUTE_ZOOM;
    }
}

/// Distance from the look-at point that shows `zoom`'s ground resolution
/// across a viewport `viewport_height` pixels tall.
pub fn camera_distance(latitude: f64, zoom: f32, viewport_height: f32, fov: f32) -> f32 {
    let meters_per_pixel =
        METERS_PER_PIXEL_ZOOM_0 * latitude.to_radians().cos() / 2f64.powf(f64::from(zoom));
    let visible = meters_per_pixel * f64::from(viewport_height);
    #[allow(clippy::cast_possible_truncation)]
    let distance = (visible / (2.0 * f64::from((fov / 2.0).tan()))) as f32;
    distance
}

/// Rotation from the Z-up local frame (east, north, up) into Bevy's Y-up
/// world: north becomes -Z and up becomes +Y.
pub fn enu_to_world() -> Quat {
    Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)
}

/// World-space camera transform for `view`.
pub fn camera_transform(
    view: &MapView,
    projection: &MercatorProjection,
    viewport_height: f32,
    fov: f32,
) -> Transform {
    let target = projection.project(view.center, 0.0);
    let distance = camera_distance(view.center.lat, view.zoom, viewport_height, fov);

    let heading = view.heading.to_radians();
    let tilt = view.tilt.to_radians();
    let forward = Vec3::new(heading.sin(), heading.cos(), 0.0);

    let eye = target - forward * distance * tilt.sin() + Vec3::Z * distance * tilt.cos();
    let up = forward * tilt.cos() + Vec3::Z * tilt.sin();

    let to_world = enu_to_world();
    Transform::from_translation(to_world * eye).looking_at(to_world * target, to_world * up)
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("Map camera"),
        MapCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV,
            near: 0.1,
            far: 100_000.0,
            ..Default::default()
        }),
        Transform::default(),
    ));
}

/// Position the camera from the map view.
#[allow(clippy::needless_pass_by_value)]
fn apply_map_view(
    view: Res<MapView>,
    overlay: Res<Overlay>,
    window: Single<Ref<Window>, With<PrimaryWindow>>,
    mut cameras: Query<&mut Transform, With<MapCamera>>,
) {
    if !view.is_changed() && !window.is_changed() {
        return;
    }
    let height = window.height().max(1.0);
    for mut transform in &mut cameras {
        *transform = camera_transform(&view, overlay.projection(), height, CAMERA_FOV);
    }
}
