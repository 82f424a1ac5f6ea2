//! The route overlay: a track line and an animated model above the ground.
//!
//! Everything is parented to one [`OverlayRoot`] entity that rotates the
//! Z-up local frame of the route projection into Bevy's Y-up world. Route
//! sessions live in [`Overlay`]; a short-lived [`BevyScene`] turns their
//! attach/detach calls into entity commands.

use bevy::gizmos::config::{DefaultGizmoConfigGroup, GizmoConfigStore, GizmoLineJoint};
use bevy::prelude::*;
use bevy::transform::TransformSystems;
use bevy::window::{PrimaryWindow, RequestRedraw};
use wayfarer_path::{
    Animator, Generation, LoadOutcome, MercatorProjection, ModelPose, RouteSessions,
    Scene as RouteScene, TrackGeometry, TrackStyle,
};
use web_time::Instant;

use crate::camera::{MapView, enu_to_world};
use crate::directions::{DirectionsState, PendingRoute, poll_route_results};
use crate::launch_params::LaunchParams;

/// Plugin for the route overlay.
pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Overlay>()
            .add_systems(Startup, (spawn_overlay_root, configure_track_gizmos))
            .add_systems(
                Update,
                (activate_pending_route, poll_model_loads, tick_overlay)
                    .chain()
                    .after(poll_route_results),
            )
            .add_systems(PostUpdate, draw_tracks.after(TransformSystems::Propagate));
    }
}

/// Parent of all overlay entities.
#[derive(Component)]
pub struct OverlayRoot;

/// A route track, drawn as a line strip in the overlay's local frame.
#[derive(Component)]
pub struct TrackLine {
    pub positions: Vec<Vec3>,
    pub color: Color,
}

/// The animated model of one route session.
#[derive(Component)]
pub struct AnimatedModel {
    pub generation: Generation,
}

/// A model asset requested for a route session.
struct PendingModel {
    generation: Generation,
    handle: Handle<Scene>,
}

/// Route sessions and everything needed to place them in the world.
#[derive(Resource)]
pub struct Overlay {
    sessions: RouteSessions<Entity, Entity>,
    projection: MercatorProjection,
    style: TrackStyle,
    model_path: String,
    model_scale: f32,
    /// Animation clock origin.
    started: Instant,
    loads: Vec<PendingModel>,
}

impl FromWorld for Overlay {
    fn from_world(world: &mut World) -> Self {
        let params = world.resource::<LaunchParams>();
        let style = TrackStyle::default();
        Self {
            sessions: RouteSessions::new(Animator::default(), style),
            projection: MercatorProjection::new(params.center),
            style,
            model_path: params.model_path.clone(),
            model_scale: params.model_scale,
            started: Instant::now(),
            loads: Vec::new(),
        }
    }
}

impl Overlay {
    pub fn sessions(&self) -> &RouteSessions<Entity, Entity> {
        &self.sessions
    }

    /// Projection anchored at the configured map center.
    pub fn projection(&self) -> &MercatorProjection {
        &self.projection
    }

    /// Number of model loads still in flight, including superseded ones.
    pub fn pending_loads(&self) -> usize {
        self.loads.len()
    }
}

/// Applies route session changes as entity commands.
pub struct BevyScene<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    root: Entity,
    model_scale: f32,
}

impl RouteScene for BevyScene<'_, '_, '_> {
    type Track = Entity;
    type Model = Entity;
    type Asset = Handle<Scene>;

    fn attach_track(&mut self, generation: Generation, geometry: &TrackGeometry) -> Entity {
        let [r, g, b] = geometry.style().rgb();
        self.commands
            .spawn((
                Name::new(format!("Route track {generation}")),
                TrackLine {
                    positions: geometry.positions().to_vec(),
                    color: Color::srgb(r, g, b),
                },
                Transform::default(),
                ChildOf(self.root),
            ))
            .id()
    }

    fn detach_track(&mut self, track: Entity) {
        self.commands.entity(track).despawn();
    }

    fn attach_model(&mut self, generation: Generation, asset: Handle<Scene>) -> Entity {
        self.commands
            .spawn((
                Name::new(format!("Route model {generation}")),
                AnimatedModel { generation },
                SceneRoot(asset),
                Transform::from_scale(Vec3::splat(self.model_scale)),
                ChildOf(self.root),
            ))
            .id()
    }

    fn detach_model(&mut self, model: Entity) {
        self.commands.entity(model).despawn();
    }
}

fn spawn_overlay_root(mut commands: Commands) {
    commands.spawn((
        Name::new("Route overlay"),
        OverlayRoot,
        Transform::from_rotation(enu_to_world()),
        Visibility::default(),
    ));
}

/// Track width is in pixels, so it stays constant under zoom.
#[allow(clippy::needless_pass_by_value)]
fn configure_track_gizmos(mut config_store: ResMut<GizmoConfigStore>, overlay: Res<Overlay>) {
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = overlay.style.line_width;
    config.line.joints = GizmoLineJoint::Round(4);
}

/// Replace the shown route with a freshly fetched one.
#[allow(clippy::needless_pass_by_value)]
fn activate_pending_route(
    mut commands: Commands,
    mut pending: ResMut<PendingRoute>,
    mut overlay: ResMut<Overlay>,
    mut view: ResMut<MapView>,
    mut directions: ResMut<DirectionsState>,
    asset_server: Res<AssetServer>,
    root: Single<Entity, With<OverlayRoot>>,
) {
    let Some(plan) = pending.0.take() else {
        return;
    };
    let midpoint = plan.route.midpoint();

    let overlay = &mut *overlay;
    let mut scene = BevyScene {
        commands: &mut commands,
        root: *root,
        model_scale: overlay.model_scale,
    };

    match overlay
        .sessions
        .activate(&mut scene, &overlay.projection, plan.route)
    {
        Ok(generation) => {
            let handle = asset_server
                .load(GltfAssetLabel::Scene(0).from_asset(overlay.model_path.clone()));
            overlay.loads.push(PendingModel { generation, handle });
            view.recenter(midpoint);
        }
        Err(e) => {
            tracing::warn!("Ignoring unusable route: {e}");
            directions.error = Some(e.to_string());
        }
    }
}

/// Hand finished model loads to their sessions.
///
/// Loads for superseded sessions are delivered too; the session rejects them.
#[allow(clippy::needless_pass_by_value)]
fn poll_model_loads(
    mut commands: Commands,
    mut overlay: ResMut<Overlay>,
    asset_server: Res<AssetServer>,
    root: Single<Entity, With<OverlayRoot>>,
) {
    if overlay.loads.is_empty() {
        return;
    }

    let overlay = &mut *overlay;
    let mut scene = BevyScene {
        commands: &mut commands,
        root: *root,
        model_scale: overlay.model_scale,
    };

    overlay.loads.retain(|load| {
        if asset_server.is_loaded_with_dependencies(load.handle.id()) {
            let outcome =
                overlay
                    .sessions
                    .complete_model_load(&mut scene, load.generation, load.handle.clone());
            if outcome == LoadOutcome::Stale {
                tracing::debug!(generation = %load.generation, "Model loaded for a replaced route");
            }
            return false;
        }
        if let bevy::asset::LoadState::Failed(err) = asset_server.load_state(load.handle.id()) {
            tracing::error!(
                generation = %load.generation,
                "Failed to load model {}: {err}",
                overlay.model_path
            );
            return false;
        }
        true
    });
}

/// Advance the animation and keep frames coming while a route is shown.
#[allow(clippy::needless_pass_by_value)]
fn tick_overlay(
    mut overlay: ResMut<Overlay>,
    window: Single<&Window, With<PrimaryWindow>>,
    mut models: Query<(&mut Transform, &AnimatedModel)>,
    mut redraw: MessageWriter<RequestRedraw>,
) {
    let elapsed = overlay.started.elapsed();
    let Some(update) = overlay.sessions.tick(elapsed, window.size()) else {
        return;
    };

    let current = overlay
        .sessions
        .current()
        .and_then(|s| Some((s.generation(), *s.model()?)));
    if let (Some(pose), Some((generation, model))) = (update.pose, current)
        && let Ok((mut transform, animated)) = models.get_mut(model)
        && animated.generation == generation
    {
        apply_pose(&mut transform, pose);
    }

    if update.redraw {
        redraw.write(RequestRedraw);
    }
}

/// Overwrite translation and rotation, leaving the model's scale alone.
fn apply_pose(transform: &mut Transform, pose: ModelPose) {
    transform.translation = pose.translation;
    transform.rotation = pose.rotation;
}

fn draw_tracks(mut gizmos: Gizmos, tracks: Query<(&TrackLine, &GlobalTransform)>) {
    for (line, transform) in &tracks {
        gizmos.linestrip(
            line.positions.iter().map(|&p| transform.transform_point(p)),
            line.color,
        );
    }
}
