//! Route fetching from the Maps web services.
//!
//! Each fetch geocodes the origin and destination, then asks for a driving
//! route between them. Requests are numbered; a result is only accepted if no
//! newer request has been issued since, so a slow response can never replace
//! the route the user asked for most recently.

use bevy::prelude::*;
use wayfarer::RoutePlan;

use crate::async_runtime::TaskSpawner;
use crate::launch_params::LaunchParams;

/// Plugin for fetching routes.
pub struct DirectionsPlugin;

impl Plugin for DirectionsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DirectionsState>()
            .init_resource::<PendingRoute>()
            .add_systems(Startup, request_initial_route)
            .add_systems(Update, poll_route_results);
    }
}

/// User agent for API requests.
const USER_AGENT: &str = "wayfarer/0.1 (https://github.com/wayfarer-maps/wayfarer)";

/// A finished fetch, tagged with the request that produced it.
type FetchResult = (RequestId, wayfarer::Result<RoutePlan>);

/// Sequence number of a route request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Hands out request ids and decides which results are still wanted.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: RequestId,
    /// The most recent request has not answered yet.
    in_flight: bool,
}

impl RequestTracker {
    /// Issue a new request id, superseding every earlier one.
    pub fn begin(&mut self) -> RequestId {
        self.latest = RequestId(self.latest.0 + 1);
        self.in_flight = true;
        self.latest
    }

    /// Record a response. Returns false if `id` has been superseded.
    pub fn finish(&mut self, id: RequestId) -> bool {
        if id != self.latest {
            return false;
        }
        self.in_flight = false;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn latest(&self) -> RequestId {
        self.latest
    }
}

/// Facts about the last accepted route, for display.
#[derive(Debug, Clone)]
pub struct RouteSummary {
    pub origin: String,
    pub destination: String,
    pub summary: Option<String>,
    pub distance_meters: u64,
    pub duration_seconds: u64,
}

impl RouteSummary {
    fn from_plan(plan: &RoutePlan) -> Self {
        let name = |place: &wayfarer::GeocodedPlace| {
            place
                .formatted_address
                .clone()
                .unwrap_or_else(|| place.query.clone())
        };
        Self {
            origin: name(&plan.origin),
            destination: name(&plan.destination),
            summary: plan.summary.clone(),
            distance_meters: plan.distance_meters,
            duration_seconds: plan.duration_seconds,
        }
    }
}

/// State of route fetching and the directions form.
#[derive(Resource)]
pub struct DirectionsState {
    /// Origin text as edited in the UI.
    pub origin: String,
    /// Destination text as edited in the UI.
    pub destination: String,
    /// Error from the last fetch, if any. Cleared by the next success.
    pub error: Option<String>,
    /// The last route that was accepted.
    pub last_route: Option<RouteSummary>,
    requests: RequestTracker,
    /// `None` when no API key was configured.
    client: Option<wayfarer::Client>,
    result_rx: async_channel::Receiver<FetchResult>,
    result_tx: async_channel::Sender<FetchResult>,
}

impl FromWorld for DirectionsState {
    fn from_world(world: &mut World) -> Self {
        let params = world.resource::<LaunchParams>();

        let client = if params.api_key.is_empty() {
            tracing::warn!(
                "No Maps API key configured; set {} to fetch routes",
                crate::launch_params::API_KEY_ENV
            );
            None
        } else {
            let http = reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("failed to create HTTP client");
            Some(
                wayfarer::Client::with_http(http, params.api_key.clone())
                    .with_path_detail(params.path_detail),
            )
        };

        // Unbounded: superseded requests may still answer.
        let (result_tx, result_rx) = async_channel::unbounded();
        Self {
            origin: params.origin.clone(),
            destination: params.destination.clone(),
            error: None,
            last_route: None,
            requests: RequestTracker::default(),
            client,
            result_rx,
            result_tx,
        }
    }
}

impl DirectionsState {
    pub fn is_loading(&self) -> bool {
        self.requests.is_loading()
    }

    pub fn can_request(&self) -> bool {
        self.client.is_some()
            && !self.origin.trim().is_empty()
            && !self.destination.trim().is_empty()
    }

    /// Start fetching a route between the current origin and destination.
    ///
    /// Any request still in flight is superseded, not cancelled.
    pub fn start_request(&mut self, spawner: &TaskSpawner<'_, '_>) {
        let Some(client) = self.client.clone() else {
            self.error = Some("No Maps API key configured".to_string());
            return;
        };
        if !self.can_request() {
            return;
        }

        let id = self.requests.begin();
        self.error = None;

        let origin = self.origin.trim().to_string();
        let destination = self.destination.trim().to_string();
        tracing::debug!(request = id.get(), %origin, %destination, "Requesting route");

        spawner.spawn_reply(self.result_tx.clone(), async move {
            (id, client.fetch_route(&origin, &destination).await)
        });
    }
}

/// A freshly accepted route waiting to be activated.
#[derive(Resource, Default)]
pub struct PendingRoute(pub Option<RoutePlan>);

fn request_initial_route(mut directions: ResMut<DirectionsState>, spawner: TaskSpawner) {
    directions.start_request(&spawner);
}

/// Poll for route results from background tasks.
#[allow(clippy::needless_pass_by_value)]
pub fn poll_route_results(
    mut directions: ResMut<DirectionsState>,
    mut pending: ResMut<PendingRoute>,
) {
    while let Ok((id, result)) = directions.result_rx.try_recv() {
        if !directions.requests.finish(id) {
            tracing::debug!(
                request = id.get(),
                latest = directions.requests.latest().get(),
                "Discarding superseded route result"
            );
            continue;
        }

        match result {
            Ok(plan) => {
                directions.error = None;
                directions.last_route = Some(RouteSummary::from_plan(&plan));
                pending.0 = Some(plan);
            }
            Err(e) => {
                tracing::warn!("Route fetch failed: {e}");
                directions.error = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_increase() {
        let mut tracker = RequestTracker::default();
        let first = tracker.begin();
        let second = tracker.begin();
        assert!(second > first);
        assert_eq!(tracker.latest(), second);
    }

    #[test]
    fn test_superseded_result_is_rejected() {
        let mut tracker = RequestTracker::default();
        let old = tracker.begin();
        let new = tracker.begin();

        assert!(!tracker.finish(old));
        assert!(tracker.is_loading());

        assert!(tracker.finish(new));
        assert!(!tracker.is_loading());
    }

    #[test]
    fn test_result_after_newer_answer_is_rejected() {
        let mut tracker = RequestTracker::default();
        let old = tracker.begin();
        let new = tracker.begin();
        assert!(tracker.finish(new));
        assert!(!tracker.finish(old));
        assert!(!tracker.is_loading());
    }

    #[test]
    fn test_idle_tracker_is_not_loading() {
        let tracker = RequestTracker::default();
        assert!(!tracker.is_loading());
        assert_eq!(tracker.latest().get(), 0);
    }
}
