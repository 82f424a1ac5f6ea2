//! Launch parameter parsing for the client.
//!
//! On native, parameters are parsed from command-line arguments using clap,
//! with the API key also readable from the environment. On WASM, defaults are
//! used and the API key is embedded at compile time.

use std::fmt;

use bevy::prelude::*;
use wayfarer::PathDetail;
use wayfarer_path::LatLng;

/// Environment variable holding the Maps API key.
pub const API_KEY_ENV: &str = "WAYFARER_MAPS_API_KEY";

/// Default map center (Guwahati).
const DEFAULT_LAT: f64 = 26.1538;
const DEFAULT_LNG: f64 = 91.7825;
const DEFAULT_ZOOM: f32 = 18.0;
/// Degrees away from straight down.
const DEFAULT_TILT: f32 = 60.0;
/// Degrees clockwise from north.
const DEFAULT_HEADING: f32 = 25.0;
const DEFAULT_ORIGIN: &str = "RG Baruah Rd Guwahati";
const DEFAULT_DESTINATION: &str = "Japorigog Guwahati";
/// glTF asset path, relative to the `assets` directory.
const DEFAULT_MODEL: &str = "car/scene.gltf";
const DEFAULT_MODEL_SCALE: f32 = 0.02;

/// Launch parameters for the client.
#[derive(Resource, Clone)]
pub struct LaunchParams {
    /// Maps API key. Empty disables route fetching.
    pub api_key: String,
    /// Map center; also the anchor of the local projection.
    pub center: LatLng,
    pub zoom: f32,
    pub tilt: f32,
    pub heading: f32,
    /// Origin place name for the first route.
    pub origin: String,
    /// Destination place name for the first route.
    pub destination: String,
    pub model_path: String,
    pub model_scale: f32,
    pub path_detail: PathDetail,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            center: LatLng::new(DEFAULT_LAT, DEFAULT_LNG),
            zoom: DEFAULT_ZOOM,
            tilt: DEFAULT_TILT,
            heading: DEFAULT_HEADING,
            origin: DEFAULT_ORIGIN.to_string(),
            destination: DEFAULT_DESTINATION.to_string(),
            model_path: DEFAULT_MODEL.to_string(),
            model_scale: DEFAULT_MODEL_SCALE,
            path_detail: PathDetail::Overview,
        }
    }
}

// Hand-written so the API key never reaches a log line.
impl fmt::Debug for LaunchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchParams")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("center", &self.center)
            .field("zoom", &self.zoom)
            .field("tilt", &self.tilt)
            .field("heading", &self.heading)
            .field("origin", &self.origin)
            .field("destination", &self.destination)
            .field("model_path", &self.model_path)
            .field("model_scale", &self.model_scale)
            .field("path_detail", &self.path_detail)
            .finish()
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    #[command(about = "Animate a model along a driving route")]
    struct CliArgs {
        /// Maps API key.
        #[arg(long, env = API_KEY_ENV, default_value = "", hide_env_values = true)]
        api_key: String,

        /// Map center latitude in degrees.
        #[arg(long, default_value_t = DEFAULT_LAT)]
        lat: f64,

        /// Map center longitude in degrees.
        #[arg(long, default_value_t = DEFAULT_LNG)]
        lng: f64,

        /// Initial zoom level.
        #[arg(long, default_value_t = DEFAULT_ZOOM)]
        zoom: f32,

        /// Camera tilt from straight down, in degrees.
        #[arg(long, default_value_t = DEFAULT_TILT)]
        tilt: f32,

        /// Camera heading clockwise from north, in degrees.
        #[arg(long, default_value_t = DEFAULT_HEADING)]
        heading: f32,

        /// Origin of the first route.
        #[arg(long, default_value = DEFAULT_ORIGIN)]
        origin: String,

        /// Destination of the first route.
        #[arg(long, default_value = DEFAULT_DESTINATION)]
        destination: String,

        /// glTF model path relative to the assets directory.
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,

        /// Uniform scale applied to the model.
        #[arg(long, default_value_t = DEFAULT_MODEL_SCALE)]
        model_scale: f32,

        /// Follow every step polyline instead of the route overview.
        #[arg(long)]
        step_paths: bool,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        LaunchParams {
            api_key: args.api_key,
            center: LatLng::new(args.lat, args.lng),
            zoom: args.zoom,
            tilt: args.tilt,
            heading: args.heading,
            origin: args.origin,
            destination: args.destination,
            model_path: args.model,
            model_scale: args.model_scale,
            path_detail: if args.step_paths {
                PathDetail::Steps
            } else {
                PathDetail::Overview
            },
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams {
            api_key: option_env!("WAYFARER_MAPS_API_KEY").unwrap_or_default().to_string(),
            ..LaunchParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let params = LaunchParams {
            api_key: "secret-key".to_string(),
            ..LaunchParams::default()
        };
        let printed = format!("{params:?}");
        assert!(!printed.contains("secret-key"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_defaults_point_at_guwahati() {
        let params = LaunchParams::default();
        assert_eq!(params.center, LatLng::new(26.1538, 91.7825));
        assert_eq!(params.origin, "RG Baruah Rd Guwahati");
        assert_eq!(params.destination, "Japorigog Guwahati");
        assert!(params.api_key.is_empty());
    }
}
