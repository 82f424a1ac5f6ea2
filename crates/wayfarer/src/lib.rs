//! Async geocoding and driving-directions client.
//!
//! Resolves two free-text places to coordinates, asks the Google Maps
//! Directions API for a driving route between them and returns the dense
//! path as a [`Route`] ready for curve building.
//!
//! # Design principles
//!
//! - **Runtime-agnostic**: returns `impl Future`, works with any executor and
//!   on WASM via reqwest's fetch backend
//! - **Explicit failures**: every non-`OK` service status is an [`Error`];
//!   callers decide whether to keep their previous route
//! - **Credential hygiene**: the API key never appears in errors or logs
//!
//! # Example
//!
//! ```ignore
//! use wayfarer::Client;
//!
//! let client = Client::new(api_key);
//! let plan = client
//!     .fetch_route("RG Baruah Rd Guwahati", "Japorigog Guwahati")
//!     .await?;
//! println!("{} waypoints", plan.route.len());
//! ```

mod client;
mod error;
pub mod polyline;
pub mod types;

pub use client::Client;
pub use error::{Error, Result};
pub use types::{GeocodedPlace, PathDetail, RoutePlan, TravelMode};

// Re-export path types for convenience.
pub use wayfarer_path::{LatLng, Route};
