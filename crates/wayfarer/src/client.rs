//! HTTP client for the Google Maps Geocoding and Directions APIs.

use futures_lite::future;
use serde::de::DeserializeOwned;
use wayfarer_path::{LatLng, Route};

use crate::error::{Error, Result};
use crate::polyline;
use crate::types::{
    DirectionsResponse, GeocodeResponse, GeocodedPlace, PathDetail, RoutePlan, TravelMode,
};

/// Base URL for the Google Maps web service APIs.
const BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

/// Status string the services use for success.
const STATUS_OK: &str = "OK";

const GEOCODE_ENDPOINT: &str = "geocode";
const DIRECTIONS_ENDPOINT: &str = "directions";

/// Client for resolving places and fetching routes.
///
/// Cloning is cheap; clones share the underlying connection pool.
///
/// # Example
///
/// ```ignore
/// let client = Client::new(api_key).with_path_detail(PathDetail::Steps);
/// let plan = client.fetch_route("475 Yonge St Toronto", "50 St Joseph St Toronto").await?;
/// ```
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    mode: TravelMode,
    detail: PathDetail,
}

impl Client {
    /// Create a client with a default HTTP client.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), api_key)
    }

    /// Create a client around an existing HTTP client.
    #[must_use]
    pub fn with_http(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            mode: TravelMode::Driving,
            detail: PathDetail::Overview,
        }
    }

    /// Set a custom base URL for testing.
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Choose which polyline becomes the route path.
    #[must_use]
    pub fn with_path_detail(mut self, detail: PathDetail) -> Self {
        self.detail = detail;
        self
    }

    /// Choose the travel mode. Defaults to driving.
    #[must_use]
    pub fn with_travel_mode(mut self, mode: TravelMode) -> Self {
        self.mode = mode;
        self
    }

    /// Resolve free text to the first matching place.
    pub async fn geocode(&self, address: &str) -> Result<GeocodedPlace> {
        let url = format!(
            "{}geocode/json?address={}&key={}",
            self.base_url,
            urlencoding::encode(address),
            urlencoding::encode(&self.api_key)
        );
        tracing::debug!(address, "geocoding");

        let response = self.fetch_json(GEOCODE_ENDPOINT, &url).await?;
        place_from_geocode(address, response)
    }

    /// Fetch the dense path of the first route between two coordinates.
    pub async fn directions(&self, origin: LatLng, destination: LatLng) -> Result<Route> {
        Ok(self.fetch_directions(origin, destination).await?.route)
    }

    /// Geocode both places, then fetch the route between them.
    pub async fn fetch_route(&self, origin: &str, destination: &str) -> Result<RoutePlan> {
        let (origin, destination) =
            future::try_zip(self.geocode(origin), self.geocode(destination)).await?;

        let parsed = self
            .fetch_directions(origin.location, destination.location)
            .await?;

        tracing::info!(
            origin = %origin.location,
            destination = %destination.location,
            waypoints = parsed.route.len(),
            "Fetched route"
        );

        Ok(RoutePlan {
            origin,
            destination,
            route: parsed.route,
            summary: parsed.summary,
            distance_meters: parsed.distance_meters,
            duration_seconds: parsed.duration_seconds,
        })
    }

    async fn fetch_directions(&self, origin: LatLng, destination: LatLng) -> Result<ParsedRoute> {
        let url = format!(
            "{}directions/json?origin={origin}&destination={destination}&mode={}&key={}",
            self.base_url,
            self.mode,
            urlencoding::encode(&self.api_key)
        );
        tracing::debug!(%origin, %destination, mode = %self.mode, "requesting directions");

        let response = self.fetch_json(DIRECTIONS_ENDPOINT, &url).await?;
        route_from_directions(response, self.detail)
    }

    /// GET `url` and decode the JSON body.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &str,
    ) -> Result<T> {
        let response = self.http.get(url).send().await.map_err(|e| Error::Http {
            endpoint,
            message: e.without_url().to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| Error::InvalidData {
            context: endpoint,
            detail: e.without_url().to_string(),
        })
    }
}

/// Path and metadata extracted from a directions response.
#[derive(Debug)]
struct ParsedRoute {
    route: Route,
    summary: Option<String>,
    distance_meters: u64,
    duration_seconds: u64,
}

fn check_status(endpoint: &'static str, status: String, message: Option<String>) -> Result<()> {
    if status == STATUS_OK {
        Ok(())
    } else {
        Err(Error::Api {
            endpoint,
            status,
            message,
        })
    }
}

fn place_from_geocode(query: &str, response: GeocodeResponse) -> Result<GeocodedPlace> {
    check_status(GEOCODE_ENDPOINT, response.status, response.error_message)?;

    let first = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| Error::NoResults {
            query: query.to_string(),
        })?;

    Ok(GeocodedPlace {
        query: query.to_string(),
        formatted_address: first.formatted_address,
        location: first.geometry.location.into(),
    })
}

fn route_from_directions(response: DirectionsResponse, detail: PathDetail) -> Result<ParsedRoute> {
    check_status(DIRECTIONS_ENDPOINT, response.status, response.error_message)?;

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| Error::NoResults {
            query: "directions".to_string(),
        })?;

    let has_steps = route.legs.iter().any(|leg| !leg.steps.is_empty());
    let points = match detail {
        PathDetail::Steps if has_steps => {
            let mut points: Vec<LatLng> = Vec::new();
            for step in route.legs.iter().flat_map(|leg| &leg.steps) {
                let decoded = polyline::decode(&step.polyline.points)?;
                // Consecutive steps share their joint point.
                let skip = usize::from(points.last().is_some() && points.last() == decoded.first());
                points.extend(decoded.into_iter().skip(skip));
            }
            points
        }
        PathDetail::Steps | PathDetail::Overview => {
            polyline::decode(&route.overview_polyline.points)?
        }
    };

    let distance_meters = route
        .legs
        .iter()
        .filter_map(|leg| leg.distance.as_ref())
        .map(|d| d.value)
        .sum();
    let duration_seconds = route
        .legs
        .iter()
        .filter_map(|leg| leg.duration.as_ref())
        .map(|d| d.value)
        .sum();

    Ok(ParsedRoute {
        route: Route::new(points)?,
        summary: route.summary.filter(|s| !s.is_empty()),
        distance_meters,
        duration_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_POLYLINE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn geocode_fixture(json: &str) -> GeocodeResponse {
        serde_json::from_str(json).unwrap()
    }

    fn directions_fixture(json: &str) -> DirectionsResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_client_default() {
        let client = Client::new("key");
        assert!(client.base_url.starts_with("https://"));
        assert_eq!(client.mode, TravelMode::Driving);
        assert_eq!(client.detail, PathDetail::Overview);
    }

    #[test]
    fn test_geocode_takes_first_result() {
        let response = geocode_fixture(
            r#"{
                "status": "OK",
                "results": [
                    {
                        "formatted_address": "RG Baruah Rd, Guwahati, Assam, India",
                        "geometry": { "location": { "lat": 26.1601, "lng": 91.7896 } }
                    },
                    {
                        "geometry": { "location": { "lat": 0.0, "lng": 0.0 } }
                    }
                ]
            }"#,
        );

        let place = place_from_geocode("RG Baruah Rd Guwahati", response).unwrap();
        assert_eq!(place.query, "RG Baruah Rd Guwahati");
        assert_eq!(
            place.formatted_address.as_deref(),
            Some("RG Baruah Rd, Guwahati, Assam, India")
        );
        assert_eq!(place.location, LatLng::new(26.1601, 91.7896));
    }

    #[test]
    fn test_geocode_status_is_surfaced() {
        let response = geocode_fixture(
            r#"{
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid.",
                "results": []
            }"#,
        );

        match place_from_geocode("anywhere", response) {
            Err(Error::Api {
                endpoint,
                status,
                message,
            }) => {
                assert_eq!(endpoint, "geocode");
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message.as_deref(), Some("The provided API key is invalid."));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_geocode_ok_without_results() {
        let response = geocode_fixture(r#"{ "status": "OK", "results": [] }"#);
        assert!(matches!(
            place_from_geocode("nowhere", response),
            Err(Error::NoResults { .. })
        ));
    }

    #[test]
    fn test_directions_uses_overview_polyline() {
        let response = directions_fixture(&format!(
            r#"{{
                "status": "OK",
                "routes": [
                    {{
                        "summary": "AT Rd",
                        "overview_polyline": {{ "points": "{REFERENCE_POLYLINE}" }},
                        "legs": [
                            {{
                                "distance": {{ "text": "5.1 km", "value": 5100 }},
                                "duration": {{ "text": "12 mins", "value": 720 }},
                                "steps": []
                            }}
                        ]
                    }},
                    {{
                        "overview_polyline": {{ "points": "??" }},
                        "legs": []
                    }}
                ]
            }}"#
        ));

        let parsed = route_from_directions(response, PathDetail::Overview).unwrap();
        assert_eq!(parsed.route.len(), 3);
        assert!((parsed.route.origin().lat - 38.5).abs() < 1e-9);
        assert!((parsed.route.destination().lng - -126.453).abs() < 1e-9);
        assert_eq!(parsed.summary.as_deref(), Some("AT Rd"));
        assert_eq!(parsed.distance_meters, 5100);
        assert_eq!(parsed.duration_seconds, 720);
    }

    #[test]
    fn test_directions_steps_are_joined_without_duplicates() {
        // Step one: (38.5, -120.2) -> (40.7, -120.95).
        // Step two: (40.7, -120.95) -> (43.252, -126.453).
        let response = directions_fixture(
            r#"{
                "status": "OK",
                "routes": [
                    {
                        "overview_polyline": { "points": "??" },
                        "legs": [
                            {
                                "steps": [
                                    { "polyline": { "points": "_p~iF~ps|U_ulLnnqC" } },
                                    { "polyline": { "points": "_flwFn`faV_mqNvxq`@" } }
                                ]
                            }
                        ]
                    }
                ]
            }"#,
        );

        let parsed = route_from_directions(response, PathDetail::Steps).unwrap();
        let points = parsed.route.waypoints();
        assert_eq!(points.len(), 3);
        assert!((points[1].lat - 40.7).abs() < 1e-9);
        assert!((points[2].lat - 43.252).abs() < 1e-9);
        assert_eq!(parsed.distance_meters, 0);
    }

    #[test]
    fn test_directions_steps_fall_back_to_overview() {
        let response = directions_fixture(&format!(
            r#"{{
                "status": "OK",
                "routes": [ {{ "overview_polyline": {{ "points": "{REFERENCE_POLYLINE}" }} }} ]
            }}"#
        ));

        let parsed = route_from_directions(response, PathDetail::Steps).unwrap();
        assert_eq!(parsed.route.len(), 3);
        assert_eq!(parsed.summary, None);
    }

    #[test]
    fn test_directions_zero_results() {
        let response = directions_fixture(r#"{ "status": "ZERO_RESULTS", "routes": [] }"#);
        match route_from_directions(response, PathDetail::Overview) {
            Err(Error::Api { status, .. }) => assert_eq!(status, "ZERO_RESULTS"),
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_directions_single_point_is_rejected() {
        let response = directions_fixture(
            r#"{ "status": "OK", "routes": [ { "overview_polyline": { "points": "??" } } ] }"#,
        );
        assert!(matches!(
            route_from_directions(response, PathDetail::Overview),
            Err(Error::Path(wayfarer_path::PathError::TooFewPoints { actual: 1 }))
        ));
    }

    #[test]
    fn test_directions_bad_polyline() {
        let response = directions_fixture(
            r#"{ "status": "OK", "routes": [ { "overview_polyline": { "points": "_p~iF" } } ] }"#,
        );
        assert!(matches!(
            route_from_directions(response, PathDetail::Overview),
            Err(Error::Polyline(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_errors_do_not_leak_api_key() {
        let client = Client::new("secret-key-123").with_base_url("http://127.0.0.1:9/".to_string());

        let error = client.geocode("somewhere").await.unwrap_err();
        assert!(matches!(error, Error::Http { endpoint: "geocode", .. }));
        assert!(!error.to_string().contains("secret-key-123"));
    }
}
