//! Request options, results and wire types for the directions client.

use std::fmt;

use serde::Deserialize;
use wayfarer_path::{LatLng, Route};

/// Travel mode sent to the Directions API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
}

impl TravelMode {
    /// Query-string value for the `mode` parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which polyline of the first route becomes the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathDetail {
    /// The route's smoothed overview polyline.
    #[default]
    Overview,
    /// Every step polyline of every leg, concatenated.
    Steps,
}

/// A geocoded place.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    /// The query that produced this place.
    pub query: String,
    /// The service's formatted address, if given.
    pub formatted_address: Option<String>,
    pub location: LatLng,
}

/// A resolved origin/destination pair and the route between them.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub origin: GeocodedPlace,
    pub destination: GeocodedPlace,
    pub route: Route,
    /// Short description of the route, e.g. the main road names.
    pub summary: Option<String>,
    /// Total distance over all legs, in meters.
    pub distance_meters: u64,
    /// Total duration over all legs, in seconds.
    pub duration_seconds: u64,
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    pub location: WireLatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct WireLatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<WireLatLng> for LatLng {
    fn from(p: WireLatLng) -> Self {
        LatLng::new(p.lat, p.lng)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub routes: Vec<WireRoute>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireRoute {
    #[serde(default)]
    pub summary: Option<String>,
    pub overview_polyline: EncodedPolyline,
    #[serde(default)]
    pub legs: Vec<WireLeg>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireLeg {
    #[serde(default)]
    pub distance: Option<TextValue>,
    #[serde(default)]
    pub duration: Option<TextValue>,
    #[serde(default)]
    pub steps: Vec<WireStep>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireStep {
    pub polyline: EncodedPolyline,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EncodedPolyline {
    pub points: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextValue {
    pub value: u64,
}
