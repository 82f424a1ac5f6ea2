//! Track geometry sampled from a route curve.

use glam::{Vec2, Vec3};

use crate::curve::RouteCurve;

/// Samples per input waypoint.
pub const SAMPLES_PER_WAYPOINT: usize = 10;

/// Visual style of a track line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackStyle {
    /// Color as `0xRRGGBB`.
    pub color: u32,
    /// Line width in screen pixels.
    pub line_width: f32,
}

impl Default for TrackStyle {
    fn default() -> Self {
        Self {
            color: 0x00ff_b703,
            line_width: 8.0,
        }
    }
}

impl TrackStyle {
    /// Color channels as floats in `[0, 1]` (sRGB).
    #[must_use]
    pub fn rgb(&self) -> [f32; 3] {
        #[allow(clippy::cast_possible_truncation)]
        let channel = |shift: u32| f32::from((self.color >> shift) as u8) / 255.0;
        [channel(16), channel(8), channel(0)]
    }
}

/// A renderable polyline along a route.
///
/// Line widths are specified in pixels, so the renderer needs the current
/// viewport size to convert them; [`set_resolution`](Self::set_resolution)
/// must be called whenever the viewport changes. Positions never change after
/// construction.
#[derive(Debug, Clone)]
pub struct TrackGeometry {
    positions: Vec<Vec3>,
    style: TrackStyle,
    resolution: Vec2,
}

impl TrackGeometry {
    /// Sample `curve` at `10 × point_count + 1` arc-length-spaced positions.
    #[must_use]
    pub fn from_curve(curve: &RouteCurve, style: TrackStyle) -> Self {
        let divisions = curve.point_count() * SAMPLES_PER_WAYPOINT;
        Self {
            positions: curve.spaced_points(divisions),
            style,
            resolution: Vec2::ONE,
        }
    }

    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn style(&self) -> TrackStyle {
        self.style
    }

    /// Viewport size in pixels last supplied by the host.
    #[must_use]
    pub fn resolution(&self) -> Vec2 {
        self.resolution
    }

    /// Record the current viewport size. Zero-sized viewports are ignored.
    pub fn set_resolution(&mut self, resolution: Vec2) {
        if resolution.x > 0.0 && resolution.y > 0.0 {
            self.resolution = resolution;
        }
    }

    /// Half the line width in normalized device coordinates, per axis.
    ///
    /// This is the offset a screen-space line shader extrudes each vertex by.
    #[must_use]
    pub fn half_width_ndc(&self) -> Vec2 {
        Vec2::splat(self.style.line_width) / self.resolution
    }
}
