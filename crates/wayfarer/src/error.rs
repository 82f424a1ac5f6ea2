//! Error types for the wayfarer crate.

use std::fmt;

use crate::polyline::PolylineError;

/// Result type for wayfarer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching a route.
///
/// Endpoints are identified by name rather than URL because request URLs
/// carry the API key.
#[derive(Debug)]
pub enum Error {
    /// HTTP request failed.
    Http {
        /// The service endpoint that failed.
        endpoint: &'static str,
        /// The error message.
        message: String,
    },
    /// HTTP response had a non-success status code.
    HttpStatus {
        /// The service endpoint that returned the error.
        endpoint: &'static str,
        /// The HTTP status code.
        status: u16,
    },
    /// The service answered with a status other than `OK`.
    Api {
        /// The service endpoint that rejected the request.
        endpoint: &'static str,
        /// The service status string, e.g. `ZERO_RESULTS`.
        status: String,
        /// Optional human-readable detail from the service.
        message: Option<String>,
    },
    /// The service returned `OK` with nothing usable in it.
    NoResults {
        /// What was asked for.
        query: String,
    },
    /// Invalid data in response.
    InvalidData {
        /// Context for where the error occurred.
        context: &'static str,
        /// Description of what was invalid.
        detail: String,
    },
    /// An encoded polyline could not be decoded.
    Polyline(PolylineError),
    /// The decoded path cannot form a route.
    Path(wayfarer_path::PathError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http { endpoint, message } => {
                write!(f, "{endpoint} request failed: {message}")
            }
            Error::HttpStatus { endpoint, status } => {
                write!(f, "{endpoint} request returned status {status}")
            }
            Error::Api {
                endpoint,
                status,
                message,
            } => match message {
                Some(message) => write!(f, "{endpoint} returned {status}: {message}"),
                None => write!(f, "{endpoint} returned {status}"),
            },
            Error::NoResults { query } => write!(f, "no results for {query}"),
            Error::InvalidData { context, detail } => {
                write!(f, "invalid {context}: {detail}")
            }
            Error::Polyline(e) => write!(f, "polyline error: {e}"),
            Error::Path(e) => write!(f, "path error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Polyline(e) => Some(e),
            Error::Path(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PolylineError> for Error {
    fn from(e: PolylineError) -> Self {
        Error::Polyline(e)
    }
}

impl From<wayfarer_path::PathError> for Error {
    fn from(e: wayfarer_path::PathError) -> Self {
        Error::Path(e)
    }
}
