//! Centripetal Catmull-Rom curve through a route's projected points.
//!
//! The curve is open: the first and last segments use phantom control points
//! reflected through the endpoints. Each segment is stored as cubic Hermite
//! coefficients so both position and derivative are cheap to evaluate.
//!
//! Two parameterisations are provided:
//!
//! - `t` (raw spline parameter): waypoint `i` of `n` lies exactly at
//!   `t = i / (n - 1)`
//! - `u` (arc length): equal steps in `u` cover equal distances along the
//!   curve; used for sampling track geometry and for animation

use glam::Vec3;

use crate::error::{PathError, Result};

/// Minimum number of divisions in the arc-length table.
const MIN_ARC_LENGTH_DIVISIONS: usize = 200;

/// Arc-length divisions per spline segment for long routes.
const ARC_LENGTH_DIVISIONS_PER_SEGMENT: usize = 8;

/// Knot intervals shorter than this are treated as degenerate.
const MIN_KNOT_INTERVAL: f32 = 1e-4;

/// Parameter step used when the analytic derivative vanishes.
const TANGENT_FALLBACK_DELTA: f32 = 1e-4;

/// A cubic segment `c0 + c1·w + c2·w² + c3·w³` for `w` in `[0, 1]`.
#[derive(Debug, Clone, Copy)]
struct Segment {
    c0: Vec3,
    c1: Vec3,
    c2: Vec3,
    c3: Vec3,
}

impl Segment {
    /// Build the non-uniform Catmull-Rom segment between `x1` and `x2`.
    fn centripetal(x0: Vec3, x1: Vec3, x2: Vec3, x3: Vec3) -> Self {
        let mut dt0 = x0.distance_squared(x1).powf(0.25);
        let mut dt1 = x1.distance_squared(x2).powf(0.25);
        let mut dt2 = x2.distance_squared(x3).powf(0.25);

        // Repeated points would otherwise divide by zero.
        if dt1 < MIN_KNOT_INTERVAL {
            dt1 = 1.0;
        }
        if dt0 < MIN_KNOT_INTERVAL {
            dt0 = dt1;
        }
        if dt2 < MIN_KNOT_INTERVAL {
            dt2 = dt1;
        }

        let t1 = ((x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1) * dt1;
        let t2 = ((x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2) * dt1;

        Self {
            c0: x1,
            c1: t1,
            c2: -3.0 * x1 + 3.0 * x2 - 2.0 * t1 - t2,
            c3: 2.0 * x1 - 2.0 * x2 + t1 + t2,
        }
    }

    fn position(&self, w: f32) -> Vec3 {
        ((self.c3 * w + self.c2) * w + self.c1) * w + self.c0
    }

    fn derivative(&self, w: f32) -> Vec3 {
        (self.c3 * (3.0 * w) + self.c2 * 2.0) * w + self.c1
    }
}

/// A smooth interpolating curve through an ordered list of points.
#[derive(Debug, Clone)]
pub struct RouteCurve {
    points: Vec<Vec3>,
    segments: Vec<Segment>,
    /// Cumulative length at `t = i / divisions`.
    arc_lengths: Vec<f32>,
}

impl RouteCurve {
    /// Build a curve through `points` in order.
    ///
    /// Two points produce a straight segment.
    pub fn new(points: Vec<Vec3>) -> Result<Self> {
        if points.len() < 2 {
            return Err(PathError::TooFewPoints {
                actual: points.len(),
            });
        }

        let last = points.len() - 1;
        let segments = (0..last)
            .map(|i| {
                let x1 = points[i];
                let x2 = points[i + 1];
                let x0 = if i == 0 { 2.0 * x1 - x2 } else { points[i - 1] };
                let x3 = if i + 1 == last {
                    2.0 * x2 - x1
                } else {
                    points[i + 2]
                };
                Segment::centripetal(x0, x1, x2, x3)
            })
            .collect::<Vec<_>>();

        let divisions =
            MIN_ARC_LENGTH_DIVISIONS.max(segments.len() * ARC_LENGTH_DIVISIONS_PER_SEGMENT);

        let mut curve = Self {
            points,
            segments,
            arc_lengths: Vec::with_capacity(divisions + 1),
        };
        curve.build_arc_lengths(divisions);
        Ok(curve)
    }

    /// The interpolated input points.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Number of input points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Approximate total length of the curve.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Position at raw spline parameter `t`, clamped to `[0, 1]`.
    #[must_use]
    pub fn point(&self, t: f32) -> Vec3 {
        let (index, w) = self.locate(t);
        if w >= 1.0 {
            return self.points[index + 1];
        }
        self.segments[index].position(w)
    }

    /// Unit tangent at raw spline parameter `t`.
    #[must_use]
    pub fn tangent(&self, t: f32) -> Vec3 {
        let (index, w) = self.locate(t);
        if let Some(direction) = self.segments[index].derivative(w).try_normalize() {
            return direction;
        }

        // Cusp or fully repeated points: use the local chord instead.
        let t = t.clamp(0.0, 1.0);
        let before = self.point((t - TANGENT_FALLBACK_DELTA).max(0.0));
        let after = self.point((t + TANGENT_FALLBACK_DELTA).min(1.0));
        (after - before).try_normalize().unwrap_or(Vec3::X)
    }

    /// Position at arc-length parameter `u`, clamped to `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    /// Unit tangent at arc-length parameter `u`.
    #[must_use]
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        self.tangent(self.u_to_t(u))
    }

    /// `divisions + 1` points evenly spaced by arc length, both ends included.
    #[must_use]
    pub fn spaced_points(&self, divisions: usize) -> Vec<Vec3> {
        if divisions == 0 {
            return vec![self.point_at(0.0)];
        }
        #[allow(clippy::cast_precision_loss)]
        let step = 1.0 / divisions as f32;
        (0..=divisions)
            .map(|d| {
                #[allow(clippy::cast_precision_loss)]
                let u = if d == divisions { 1.0 } else { d as f32 * step };
                self.point_at(u)
            })
            .collect()
    }

    /// Map an arc-length fraction to the raw spline parameter.
    #[must_use]
    pub fn u_to_t(&self, u: f32) -> f32 {
        let u = u.clamp(0.0, 1.0);
        let total = self.length();
        if total <= 0.0 {
            return u;
        }

        let divisions = self.arc_lengths.len() - 1;
        let target = u * total;

        // Last table entry not past the target.
        let upper = self.arc_lengths.partition_point(|&l| l <= target);
        let i = upper.saturating_sub(1).min(divisions - 1);

        let start = self.arc_lengths[i];
        let span = self.arc_lengths[i + 1] - start;
        let fraction = if span > 0.0 {
            ((target - start) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        #[allow(clippy::cast_precision_loss)]
        let t = (i as f32 + fraction) / divisions as f32;
        t.min(1.0)
    }

    /// Segment index and local weight for raw parameter `t`.
    fn locate(&self, t: f32) -> (usize, f32) {
        let last_segment = self.segments.len() - 1;
        #[allow(clippy::cast_precision_loss)]
        let p = t.clamp(0.0, 1.0) * self.segments.len() as f32;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = p.floor() as usize;
        if index > last_segment {
            return (last_segment, 1.0);
        }
        #[allow(clippy::cast_precision_loss)]
        let w = p - index as f32;
        (index, w)
    }

    fn build_arc_lengths(&mut self, divisions: usize) {
        self.arc_lengths.clear();
        self.arc_lengths.push(0.0);

        let mut previous = self.point(0.0);
        let mut total = 0.0;
        for d in 1..=divisions {
            #[allow(clippy::cast_precision_loss)]
            let current = self.point(d as f32 / divisions as f32);
            total += current.distance(previous);
            self.arc_lengths.push(total);
            previous = current;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f32 = 1e-4;

    fn assert_close(actual: Vec3, expected: Vec3, tolerance: f32) {
        assert!(
            actual.distance(expected) <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_curve() -> RouteCurve {
        RouteCurve::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_rejects_fewer_than_two_points() {
        assert_eq!(
            RouteCurve::new(vec![Vec3::ONE]).unwrap_err(),
            PathError::TooFewPoints { actual: 1 }
        );
        assert!(RouteCurve::new(Vec::new()).is_err());
    }

    #[test]
    fn test_passes_through_every_point() {
        let curve = sample_curve();
        assert_close(curve.point(0.0), Vec3::new(0.0, 0.0, 0.0), EPSILON);
        assert_close(curve.point(0.5), Vec3::new(1.0, 0.0, 0.0), EPSILON);
        assert_close(curve.point(1.0), Vec3::new(2.0, 1.0, 0.0), EPSILON);
    }

    #[test]
    fn test_arc_length_endpoints() {
        let curve = sample_curve();
        assert_eq!(curve.point_at(0.0), Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(curve.point_at(1.0), Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_two_points_form_a_straight_segment() {
        let a = Vec3::new(-3.0, 2.0, 1.0);
        let b = Vec3::new(5.0, -2.0, 1.0);
        let curve = RouteCurve::new(vec![a, b]).unwrap();

        for i in 0..=10 {
            let u = i as f32 / 10.0;
            assert_close(curve.point_at(u), a.lerp(b, u), 1e-3);
        }
        assert!((curve.length() - a.distance(b)).abs() < 1e-3);
        assert_close(curve.tangent_at(0.3), (b - a).normalize(), EPSILON);
    }

    #[test]
    fn test_arc_length_sampling_is_uniform() {
        // Unevenly spaced control points along a straight line.
        let curve = RouteCurve::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
        ])
        .unwrap();

        let samples = curve.spaced_points(20);
        let step = curve.length() / 20.0;
        for pair in samples.windows(2) {
            let gap = pair[0].distance(pair[1]);
            assert!((gap - step).abs() < step * 0.05, "gap {gap}, step {step}");
        }
    }

    #[test]
    fn test_tangent_is_continuous_at_waypoints() {
        let curve = sample_curve();
        let before = curve.tangent(0.5 - 1e-3);
        let after = curve.tangent(0.5 + 1e-3);
        assert!(before.dot(after) > 0.999);
    }

    #[test]
    fn test_duplicate_points_do_not_produce_nan() {
        let curve = RouteCurve::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        ])
        .unwrap();

        for i in 0..=20 {
            let u = i as f32 / 20.0;
            assert!(curve.point_at(u).is_finite());
            let tangent = curve.tangent_at(u);
            assert!(tangent.is_finite());
            assert!((tangent.length() - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_fully_degenerate_curve_has_fallback_tangent() {
        let curve = RouteCurve::new(vec![Vec3::ONE, Vec3::ONE]).unwrap();
        assert_eq!(curve.length(), 0.0);
        assert_eq!(curve.point_at(0.7), Vec3::ONE);
        assert_eq!(curve.tangent_at(0.7), Vec3::X);
    }

    #[test]
    fn test_parameters_are_clamped() {
        let curve = sample_curve();
        assert_eq!(curve.point(-1.0), curve.point(0.0));
        assert_eq!(curve.point(2.0), curve.point(1.0));
        assert_eq!(curve.point_at(1.5), curve.point_at(1.0));
    }

    fn route_points() -> impl Strategy<Value = Vec<Vec3>> {
        prop::collection::vec(
            (-500.0f32..500.0, -500.0f32..500.0, -5.0f32..5.0),
            2..24,
        )
        .prop_map(|coords| {
            coords
                .into_iter()
                .map(|(x, y, z)| Vec3::new(x, y, z))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn test_interpolates_waypoints_at_even_parameters(points in route_points()) {
            let curve = RouteCurve::new(points.clone()).unwrap();
            let n = points.len();
            for (i, expected) in points.iter().enumerate() {
                let t = i as f32 / (n - 1) as f32;
                let actual = curve.point(t);
                prop_assert!(
                    actual.distance(*expected) <= 1e-2,
                    "waypoint {} expected {} got {}", i, expected, actual
                );
            }
        }

        #[test]
        fn test_tangent_is_unit_length(points in route_points(), u in 0.0f32..=1.0) {
            let curve = RouteCurve::new(points).unwrap();
            let tangent = curve.tangent_at(u);
            prop_assert!((tangent.length() - 1.0).abs() < 1e-3);
        }
    }
}
