//! Per-route scene sessions guarded by generation tokens.
//!
//! Every route activation creates one [`SceneSession`] that owns the track and
//! model attached to the scene on its behalf. Activating a new route detaches
//! everything the previous session attached before the new track goes in, so
//! the scene never holds more than one track and one model.
//!
//! Model loading is asynchronous and may finish after a newer route has been
//! activated. Loads are started with the [`Generation`] returned by
//! [`RouteSessions::activate`] and completed through
//! [`RouteSessions::complete_model_load`], which ignores stale generations.

use std::fmt;
use std::time::Duration;

use glam::Vec2;

use crate::animator::{Animator, FrameUpdate};
use crate::curve::RouteCurve;
use crate::error::Result;
use crate::geo::Route;
use crate::projection::Projection;
use crate::track::{TrackGeometry, TrackStyle};

/// Monotonic identifier of a route activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// The generation before any route was activated.
    pub const NONE: Self = Self(0);

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host-side scene operations a session needs.
///
/// Implementations own the actual render primitives; sessions only hold the
/// handles returned here and hand them back for removal.
pub trait Scene {
    /// Handle to an attached track primitive.
    type Track;
    /// Handle to an attached model instance.
    type Model;
    /// A loaded model asset, ready to attach.
    type Asset;

    fn attach_track(&mut self, generation: Generation, geometry: &TrackGeometry) -> Self::Track;
    fn detach_track(&mut self, track: Self::Track);
    fn attach_model(&mut self, generation: Generation, asset: Self::Asset) -> Self::Model;
    fn detach_model(&mut self, model: Self::Model);
}

/// Whether the session's model has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Waiting for the model asset; the track still renders.
    Idle,
    /// Model attached and looping along the route.
    Animating,
}

/// Result of delivering a model load to the sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The model was attached to the current session.
    Attached,
    /// The load belonged to a superseded or torn-down session and was dropped.
    Stale,
}

/// Everything attached to the scene for one route.
#[derive(Debug)]
pub struct SceneSession<T, M> {
    generation: Generation,
    route: Route,
    curve: RouteCurve,
    geometry: TrackGeometry,
    track: T,
    model: Option<M>,
}

impl<T, M> SceneSession<T, M> {
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    #[must_use]
    pub fn curve(&self) -> &RouteCurve {
        &self.curve
    }

    #[must_use]
    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    #[must_use]
    pub fn track(&self) -> &T {
        &self.track
    }

    #[must_use]
    pub fn model(&self) -> Option<&M> {
        self.model.as_ref()
    }

    #[must_use]
    pub fn model_state(&self) -> ModelState {
        if self.model.is_some() {
            ModelState::Animating
        } else {
            ModelState::Idle
        }
    }
}

/// Owner of the current [`SceneSession`] and the generation counter.
///
/// Generic over the scene's handle types rather than the scene itself, so a
/// host can keep the sessions in long-lived state and build a short-lived
/// [`Scene`] adapter each time it needs to attach or detach something.
pub struct RouteSessions<T, M> {
    current: Option<SceneSession<T, M>>,
    latest: Generation,
    animator: Animator,
    style: TrackStyle,
}

impl<T, M> Default for RouteSessions<T, M> {
    fn default() -> Self {
        Self::new(Animator::default(), TrackStyle::default())
    }
}

impl<T, M> RouteSessions<T, M> {
    #[must_use]
    pub fn new(animator: Animator, style: TrackStyle) -> Self {
        Self {
            current: None,
            latest: Generation::NONE,
            animator,
            style,
        }
    }

    /// The active session, if a route is shown.
    #[must_use]
    pub fn current(&self) -> Option<&SceneSession<T, M>> {
        self.current.as_ref()
    }

    /// Generation of the most recent activation.
    #[must_use]
    pub fn latest_generation(&self) -> Generation {
        self.latest
    }

    #[must_use]
    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Replace the shown route.
    ///
    /// Builds the new curve first; if that fails the current session is left
    /// untouched. Otherwise the old session is fully detached, then the new
    /// track is attached. The returned generation tags the model load for this
    /// route.
    pub fn activate<S: Scene<Track = T, Model = M>>(
        &mut self,
        scene: &mut S,
        projection: &impl Projection,
        route: Route,
    ) -> Result<Generation> {
        let curve = RouteCurve::new(projection.project_all(route.waypoints()))?;
        let geometry = TrackGeometry::from_curve(&curve, self.style);

        self.teardown(scene);

        let generation = self.latest.next();
        self.latest = generation;

        let track = scene.attach_track(generation, &geometry);
        tracing::info!(
            %generation,
            waypoints = route.len(),
            samples = geometry.sample_count(),
            length = curve.length(),
            "Activated route session"
        );

        self.current = Some(SceneSession {
            generation,
            route,
            curve,
            geometry,
            track,
            model: None,
        });
        Ok(generation)
    }

    /// Deliver a finished model load.
    ///
    /// The model is attached only if `generation` is the current session's.
    /// A repeated delivery for the current session replaces the previous
    /// model rather than adding a second one.
    pub fn complete_model_load<S: Scene<Track = T, Model = M>>(
        &mut self,
        scene: &mut S,
        generation: Generation,
        asset: S::Asset,
    ) -> LoadOutcome {
        let Some(session) = self
            .current
            .as_mut()
            .filter(|s| s.generation == generation)
        else {
            tracing::debug!(%generation, latest = %self.latest, "Dropping stale model load");
            return LoadOutcome::Stale;
        };

        if let Some(previous) = session.model.take() {
            scene.detach_model(previous);
        }
        session.model = Some(scene.attach_model(generation, asset));
        tracing::info!(%generation, "Model attached");
        LoadOutcome::Attached
    }

    /// Detach everything and forget the current session.
    pub fn deactivate<S: Scene<Track = T, Model = M>>(&mut self, scene: &mut S) {
        self.teardown(scene);
    }

    /// Advance one frame.
    ///
    /// Writes the viewport size into the track geometry and, once the model is
    /// attached, computes its pose. Returns `None` when no route is shown.
    pub fn tick(&mut self, elapsed: Duration, viewport: Vec2) -> Option<FrameUpdate> {
        let session = self.current.as_mut()?;
        session.geometry.set_resolution(viewport);
        let mut update = self.animator.frame(
            &session.curve,
            elapsed,
            viewport,
            session.model.is_some(),
        );
        update.resolution = session.geometry.resolution();
        Some(update)
    }

    fn teardown<S: Scene<Track = T, Model = M>>(&mut self, scene: &mut S) {
        let Some(session) = self.current.take() else {
            return;
        };
        if let Some(model) = session.model {
            scene.detach_model(model);
        }
        scene.detach_track(session.track);
        tracing::debug!(generation = %session.generation, "Tore down route session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::ANIMATION_PERIOD;
    use crate::error::PathError;
    use crate::geo::LatLng;
    use crate::projection::MercatorProjection;

    /// Scene double that enforces the one-track-one-model invariant.
    #[derive(Default)]
    struct RecordingScene {
        next_id: u32,
        tracks: Vec<(u32, Generation)>,
        models: Vec<(u32, &'static str)>,
        log: Vec<String>,
    }

    impl Scene for RecordingScene {
        type Track = u32;
        type Model = u32;
        type Asset = &'static str;

        fn attach_track(&mut self, generation: Generation, geometry: &TrackGeometry) -> u32 {
            assert!(self.tracks.is_empty(), "second track attached");
            self.next_id += 1;
            self.tracks.push((self.next_id, generation));
            self.log
                .push(format!("attach track {generation} ({})", geometry.sample_count()));
            self.next_id
        }

        fn detach_track(&mut self, track: u32) {
            let before = self.tracks.len();
            self.tracks.retain(|(id, _)| *id != track);
            assert_eq!(self.tracks.len() + 1, before, "detached unknown track");
            self.log.push("detach track".to_string());
        }

        fn attach_model(&mut self, generation: Generation, asset: &'static str) -> u32 {
            assert!(self.models.is_empty(), "second model attached");
            self.next_id += 1;
            self.models.push((self.next_id, asset));
            self.log.push(format!("attach model {generation} {asset}"));
            self.next_id
        }

        fn detach_model(&mut self, model: u32) {
            let before = self.models.len();
            self.models.retain(|(id, _)| *id != model);
            assert_eq!(self.models.len() + 1, before, "detached unknown model");
            self.log.push("detach model".to_string());
        }
    }

    fn projection() -> MercatorProjection {
        MercatorProjection::new(LatLng::new(26.1538, 91.7825))
    }

    fn route(offset: f64) -> Route {
        Route::new(vec![
            LatLng::new(26.1538 + offset, 91.7825),
            LatLng::new(26.1540 + offset, 91.7830),
            LatLng::new(26.1545 + offset, 91.7832),
        ])
        .unwrap()
    }

    #[test]
    fn test_activate_attaches_sampled_track() {
        let mut scene = RecordingScene::default();
        let mut sessions = RouteSessions::<u32, u32>::default();

        let generation = sessions.activate(&mut scene, &projection(), route(0.0)).unwrap();

        assert_eq!(generation, Generation::NONE.next());
        assert_eq!(scene.tracks, vec![(1, generation)]);
        assert_eq!(scene.log, vec![format!("attach track {generation} (31)")]);

        let session = sessions.current().unwrap();
        assert_eq!(session.model_state(), ModelState::Idle);
        assert_eq!(session.geometry().sample_count(), 31);
    }

    #[test]
    fn test_new_route_detaches_old_primitives_first() {
        let mut scene = RecordingScene::default();
        let mut sessions = RouteSessions::<u32, u32>::default();

        let first = sessions.activate(&mut scene, &projection(), route(0.0)).unwrap();
        assert_eq!(
            sessions.complete_model_load(&mut scene, first, "car"),
            LoadOutcome::Attached
        );

        let second = sessions.activate(&mut scene, &projection(), route(0.01)).unwrap();
        assert!(second > first);
        assert_eq!(scene.tracks, vec![(3, second)]);
        assert!(scene.models.is_empty());
        assert_eq!(
            scene.log[2..],
            [
                "detach model".to_string(),
                "detach track".to_string(),
                format!("attach track {second} (31)"),
            ]
        );
    }

    #[test]
    fn test_stale_model_load_does_not_touch_scene() {
        let mut scene = RecordingScene::default();
        let mut sessions = RouteSessions::<u32, u32>::default();

        let first = sessions.activate(&mut scene, &projection(), route(0.0)).unwrap();
        let second = sessions.activate(&mut scene, &projection(), route(0.01)).unwrap();
        let log_len = scene.log.len();

        // The first route's model finishes after the second route started.
        assert_eq!(
            sessions.complete_model_load(&mut scene, first, "old car"),
            LoadOutcome::Stale
        );
        assert_eq!(scene.log.len(), log_len);
        assert!(scene.models.is_empty());

        assert_eq!(
            sessions.complete_model_load(&mut scene, second, "new car"),
            LoadOutcome::Attached
        );
        assert_eq!(scene.models.len(), 1);
        assert_eq!(scene.models[0].1, "new car");
    }

    #[test]
    fn test_duplicate_completion_replaces_model() {
        let mut scene = RecordingScene::default();
        let mut sessions = RouteSessions::<u32, u32>::default();

        let generation = sessions.activate(&mut scene, &projection(), route(0.0)).unwrap();
        sessions.complete_model_load(&mut scene, generation, "a");
        sessions.complete_model_load(&mut scene, generation, "b");

        assert_eq!(scene.models.len(), 1);
        assert_eq!(scene.models[0].1, "b");
    }

    #[test]
    fn test_load_after_deactivate_is_stale() {
        let mut scene = RecordingScene::default();
        let mut sessions = RouteSessions::<u32, u32>::default();

        let generation = sessions.activate(&mut scene, &projection(), route(0.0)).unwrap();
        sessions.deactivate(&mut scene);

        assert!(scene.tracks.is_empty());
        assert!(sessions.current().is_none());
        assert_eq!(
            sessions.complete_model_load(&mut scene, generation, "car"),
            LoadOutcome::Stale
        );
        assert!(scene.models.is_empty());
    }

    /// Collapses every route onto its first waypoint.
    struct CollapsingProjection;

    impl Projection for CollapsingProjection {
        fn project(&self, _point: LatLng, _altitude: f64) -> glam::Vec3 {
            glam::Vec3::ZERO
        }

        fn project_all(&self, points: &[LatLng]) -> Vec<glam::Vec3> {
            points.iter().take(1).map(|&p| self.project(p, 0.0)).collect()
        }
    }

    #[test]
    fn test_degenerate_route_keeps_current_session() {
        let mut scene = RecordingScene::default();
        let mut sessions = RouteSessions::<u32, u32>::default();

        let generation = sessions.activate(&mut scene, &projection(), route(0.0)).unwrap();
        sessions.complete_model_load(&mut scene, generation, "car");
        let log_len = scene.log.len();

        let result = sessions.activate(&mut scene, &CollapsingProjection, route(0.01));
        assert_eq!(result, Err(PathError::TooFewPoints { actual: 1 }));

        assert_eq!(sessions.latest_generation(), generation);
        let session = sessions.current().unwrap();
        assert_eq!(session.generation(), generation);
        assert_eq!(session.model_state(), ModelState::Animating);
        assert_eq!(scene.log.len(), log_len);
        assert_eq!(scene.tracks, vec![(1, generation)]);
        assert_eq!(scene.models.len(), 1);
    }

    #[test]
    fn test_tick_without_route_is_none() {
        let mut sessions = RouteSessions::<u32, u32>::default();
        assert!(sessions.tick(Duration::from_secs(1), Vec2::new(800.0, 600.0)).is_none());
    }

    #[test]
    fn test_tick_idle_updates_resolution_only() {
        let mut scene = RecordingScene::default();
        let mut sessions = RouteSessions::<u32, u32>::default();
        sessions.activate(&mut scene, &projection(), route(0.0)).unwrap();

        let update = sessions
            .tick(Duration::from_secs(2), Vec2::new(800.0, 600.0))
            .unwrap();
        assert_eq!(update.pose, None);
        assert_eq!(update.resolution, Vec2::new(800.0, 600.0));
        assert!(update.redraw);
    }

    #[test]
    fn test_resize_mid_animation_updates_resolution_without_rebuild() {
        let mut scene = RecordingScene::default();
        let mut sessions = RouteSessions::<u32, u32>::default();
        let generation = sessions.activate(&mut scene, &projection(), route(0.0)).unwrap();
        sessions.complete_model_load(&mut scene, generation, "car");

        sessions.tick(Duration::from_secs(1), Vec2::new(1920.0, 1080.0));
        let positions = sessions.current().unwrap().geometry().positions().to_vec();
        let log_len = scene.log.len();

        let update = sessions
            .tick(Duration::from_secs(2), Vec2::new(1024.0, 768.0))
            .unwrap();

        assert_eq!(update.resolution, Vec2::new(1024.0, 768.0));
        let session = sessions.current().unwrap();
        assert_eq!(session.geometry().resolution(), Vec2::new(1024.0, 768.0));
        assert_eq!(session.geometry().positions(), positions.as_slice());
        assert_eq!(scene.log.len(), log_len);
    }

    #[test]
    fn test_tick_animating_loops_along_route() {
        let mut scene = RecordingScene::default();
        let mut sessions = RouteSessions::<u32, u32>::default();
        let generation = sessions.activate(&mut scene, &projection(), route(0.0)).unwrap();
        sessions.complete_model_load(&mut scene, generation, "car");

        let viewport = Vec2::new(800.0, 600.0);
        let start = sessions.tick(Duration::ZERO, viewport).unwrap().pose.unwrap();
        let looped = sessions
            .tick(ANIMATION_PERIOD * 3, viewport)
            .unwrap()
            .pose
            .unwrap();

        assert_eq!(start, looped);
        let first_point = sessions.current().unwrap().curve().points()[0];
        assert_eq!(start.translation, first_point);
    }
}
