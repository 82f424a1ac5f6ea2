//! Per-frame model placement along a route curve.
//!
//! The animator never reads a clock: the host passes elapsed wall-clock time
//! and the animator turns it into a looping progress value, a position on the
//! curve and an orientation facing along the curve.

use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use glam::{Quat, Vec2, Vec3};

use crate::curve::RouteCurve;

/// Time for one full traversal of the route.
pub const ANIMATION_PERIOD: Duration = Duration::from_secs(10);

/// Axis the model asset treats as "forward" before correction.
pub const FRONT_VECTOR: Vec3 = Vec3::NEG_Y;

/// Fraction of the current loop completed at `elapsed`, in `[0, 1)`.
///
/// A zero period yields 0.
#[must_use]
pub fn loop_progress(elapsed: Duration, period: Duration) -> f32 {
    let period = period.as_nanos();
    if period == 0 {
        return 0.0;
    }
    let phase = elapsed.as_nanos() % period;
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let progress = (phase as f64 / period as f64) as f32;
    progress
}

/// Position and orientation of the animated model in scene space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for ModelPose {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Tunables for the animator.
#[derive(Debug, Clone, Copy)]
pub struct AnimatorConfig {
    /// Duration of one loop.
    pub period: Duration,
    /// Model-space axis aligned with the curve tangent.
    pub forward: Vec3,
    /// Local rotation applied after tangent alignment to match the asset's
    /// authored orientation.
    pub correction: Quat,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            period: ANIMATION_PERIOD,
            forward: FRONT_VECTOR,
            correction: Quat::from_rotation_x(FRAC_PI_2) * Quat::from_rotation_y(FRAC_PI_2),
        }
    }
}

/// Output of one frame tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUpdate {
    /// Loop progress used for this frame.
    pub progress: f32,
    /// Model pose, or `None` while the model is still loading.
    pub pose: Option<ModelPose>,
    /// Viewport size written to the track geometry.
    pub resolution: Vec2,
    /// The host must schedule a redraw.
    pub redraw: bool,
}

/// Evaluates model poses along a curve.
#[derive(Debug, Clone, Copy, Default)]
pub struct Animator {
    config: AnimatorConfig,
}

impl Animator {
    #[must_use]
    pub fn new(config: AnimatorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    #[must_use]
    pub fn progress(&self, elapsed: Duration) -> f32 {
        loop_progress(elapsed, self.config.period)
    }

    /// Pose at arc-length progress `progress` along `curve`.
    #[must_use]
    pub fn pose_at(&self, curve: &RouteCurve, progress: f32) -> ModelPose {
        let mut pose = ModelPose::default();
        self.write_pose(curve, progress, &mut pose);
        pose
    }

    /// Overwrite `pose` in place with the pose at `progress`.
    pub fn write_pose(&self, curve: &RouteCurve, progress: f32, pose: &mut ModelPose) {
        pose.translation = curve.point_at(progress);
        let tangent = curve.tangent_at(progress);
        let forward = self.config.forward.normalize_or(FRONT_VECTOR);
        pose.rotation = Quat::from_rotation_arc(forward, tangent) * self.config.correction;
    }

    /// Compute everything a host needs for one rendered frame.
    ///
    /// With `model_loaded` false the pose is skipped and only the viewport
    /// resolution is reported.
    #[must_use]
    pub fn frame(
        &self,
        curve: &RouteCurve,
        elapsed: Duration,
        viewport: Vec2,
        model_loaded: bool,
    ) -> FrameUpdate {
        let progress = self.progress(elapsed);
        FrameUpdate {
            progress,
            pose: model_loaded.then(|| self.pose_at(curve, progress)),
            resolution: viewport,
            redraw: true,
        }
    }
}
