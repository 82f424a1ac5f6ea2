//! Route curves, track geometry and per-frame animation for route playback.
//!
//! This crate holds the host-independent half of Wayfarer: it turns an ordered
//! list of geographic waypoints into a smooth 3D curve, samples that curve into
//! a drawable track, and evaluates where an animated model sits on the curve at
//! any moment. Rendering, asset loading and networking live elsewhere and reach
//! this crate through the [`Scene`] and [`Projection`] traits.
//!
//! # Design principles
//!
//! - **Pure evaluation**: the animator is a function of curve, clock and
//!   viewport; nothing here reads a clock or a window itself
//! - **One session per route**: every primitive attached to the scene belongs
//!   to exactly one [`SceneSession`], torn down before its successor is built
//! - **Generation-tagged completions**: late async results are compared against
//!   the current [`Generation`] and dropped when stale
//!
//! # Example
//!
//! ```ignore
//! use wayfarer_path::{LatLng, MercatorProjection, Route, RouteSessions};
//!
//! let projection = MercatorProjection::new(LatLng::new(26.1538, 91.7825));
//! let route = Route::new(waypoints)?;
//! let generation = sessions.activate(&mut scene, &projection, route)?;
//! // ...later, when the model finishes loading:
//! sessions.complete_model_load(&mut scene, generation, model);
//! ```

pub mod animator;
pub mod curve;
mod error;
pub mod geo;
pub mod projection;
pub mod session;
pub mod track;

pub use animator::{Animator, AnimatorConfig, FrameUpdate, ModelPose, loop_progress};
pub use curve::RouteCurve;
pub use error::{PathError, Result};
pub use geo::{LatLng, Route};
pub use projection::{MercatorProjection, Projection};
pub use session::{Generation, LoadOutcome, ModelState, RouteSessions, Scene, SceneSession};
pub use track::{TrackGeometry, TrackStyle};
