//! Geographic waypoints and routes.

use std::fmt;

use crate::error::{PathError, Result};

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// An ordered path of waypoints between two places.
///
/// Order defines the direction of travel. A route always has at least two
/// waypoints; [`Route::new`] rejects anything shorter.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    waypoints: Vec<LatLng>,
}

impl Route {
    /// Create a route from waypoints in travel order.
    pub fn new(waypoints: Vec<LatLng>) -> Result<Self> {
        if waypoints.len() < 2 {
            return Err(PathError::TooFewPoints {
                actual: waypoints.len(),
            });
        }
        Ok(Self { waypoints })
    }

    /// The waypoints in travel order.
    #[must_use]
    pub fn waypoints(&self) -> &[LatLng] {
        &self.waypoints
    }

    /// Number of waypoints (always at least two).
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// First waypoint.
    #[must_use]
    pub fn origin(&self) -> LatLng {
        self.waypoints[0]
    }

    /// Last waypoint.
    #[must_use]
    pub fn destination(&self) -> LatLng {
        self.waypoints[self.waypoints.len() - 1]
    }

    /// The waypoint at index `len / 2`, used to re-center the camera.
    #[must_use]
    pub fn midpoint(&self) -> LatLng {
        self.waypoints[self.waypoints.len() / 2]
    }
}
