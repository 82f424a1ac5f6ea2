//! Geographic to scene-local coordinate projection.
//!
//! Scene-local coordinates are Z-up meters: X points east, Y points north and
//! Z is altitude. Hosts with a different up axis apply one root transform.

use glam::{DVec3, Vec3};

use crate::geo::LatLng;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_371_008.8;

/// Maps geographic coordinates into the local 3D space of a scene.
pub trait Projection {
    /// Project a coordinate at the given altitude (meters) into scene space.
    fn project(&self, point: LatLng, altitude: f64) -> Vec3;

    /// Project every point, at ground level, preserving order.
    fn project_all(&self, points: &[LatLng]) -> Vec<Vec3> {
        points.iter().map(|&p| self.project(p, 0.0)).collect()
    }
}

/// Spherical Web-Mercator projection relative to a fixed anchor.
///
/// Distances are scaled by the cosine of the anchor latitude so that one unit
/// is roughly one meter near the anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorProjection {
    anchor: LatLng,
    anchor_mercator_y: f64,
    scale: f64,
}

impl MercatorProjection {
    #[must_use]
    pub fn new(anchor: LatLng) -> Self {
        Self {
            anchor,
            anchor_mercator_y: mercator_y(anchor.lat),
            scale: anchor.lat.to_radians().cos(),
        }
    }

    /// The coordinate that projects to the scene origin.
    #[must_use]
    pub fn anchor(&self) -> LatLng {
        self.anchor
    }

    /// Projection in double precision.
    #[must_use]
    pub fn project_f64(&self, point: LatLng, altitude: f64) -> DVec3 {
        let dx = EARTH_RADIUS * (point.lng - self.anchor.lng).to_radians();
        let dy = EARTH_RADIUS * (mercator_y(point.lat) - self.anchor_mercator_y);
        DVec3::new(dx * self.scale, dy * self.scale, altitude)
    }
}

impl Projection for MercatorProjection {
    fn project(&self, point: LatLng, altitude: f64) -> Vec3 {
        self.project_f64(point, altitude).as_vec3()
    }
}

/// Unitless Mercator northing for a latitude in degrees.
fn mercator_y(lat_deg: f64) -> f64 {
    (std::f64::consts::FRAC_PI_4 + lat_deg.to_radians() / 2.0)
        .tan()
        .ln()
}
