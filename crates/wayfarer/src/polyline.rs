//! Encoded polyline decoding.
//!
//! Implements Google's encoded polyline algorithm: each coordinate is stored
//! as the zig-zag encoded delta from the previous one, split into 5-bit chunks
//! offset by 63 into printable ASCII.

use std::fmt;

use wayfarer_path::LatLng;

/// Coordinate precision used by the Directions API (1e-5 degrees).
pub const DEFAULT_PRECISION: u32 = 5;

/// Errors that can occur while decoding a polyline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolylineError {
    /// A byte outside the polyline alphabet (`?`..=`~`).
    InvalidCharacter { index: usize, byte: u8 },
    /// The string ended inside a value or between latitude and longitude.
    Truncated { index: usize },
    /// A value used more continuation chunks than fit in 64 bits, or the
    /// running coordinate left the `i64` range.
    Overflow { index: usize },
}

impl fmt::Display for PolylineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCharacter { index, byte } => {
                write!(f, "invalid byte 0x{byte:02x} at index {index}")
            }
            Self::Truncated { index } => write!(f, "polyline truncated at index {index}"),
            Self::Overflow { index } => write!(f, "value overflow at index {index}"),
        }
    }
}

impl std::error::Error for PolylineError {}

/// Decode a polyline at the Directions API precision.
pub fn decode(encoded: &str) -> Result<Vec<LatLng>, PolylineError> {
    decode_with_precision(encoded, DEFAULT_PRECISION)
}

/// Decode a polyline whose coordinates were scaled by `10^precision`.
pub fn decode_with_precision(encoded: &str, precision: u32) -> Result<Vec<LatLng>, PolylineError> {
    let bytes = encoded.as_bytes();
    let factor = 10f64.powi(i32::try_from(precision).unwrap_or(i32::MAX));

    let mut points = Vec::new();
    let mut index = 0;
    let (mut lat, mut lng) = (0i64, 0i64);

    while index < bytes.len() {
        let delta = read_value(bytes, &mut index)?;
        lat = lat.checked_add(delta).ok_or(PolylineError::Overflow { index })?;
        if index >= bytes.len() {
            return Err(PolylineError::Truncated { index });
        }
        let delta = read_value(bytes, &mut index)?;
        lng = lng.checked_add(delta).ok_or(PolylineError::Overflow { index })?;

        #[allow(clippy::cast_precision_loss)]
        points.push(LatLng::new(lat as f64 / factor, lng as f64 / factor));
    }

    Ok(points)
}

/// Read one zig-zag encoded value starting at `index`.
fn read_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let mut result: u64 = 0;
    let mut shift = 0;

    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(PolylineError::Truncated { index: *index });
        };
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter {
                index: *index,
                byte,
            });
        }
        if shift > 60 {
            return Err(PolylineError::Overflow { index: *index });
        }

        let chunk = u64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        *index += 1;

        if chunk < 0x20 {
            break;
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    let value = if result & 1 == 0 {
        (result >> 1) as i64
    } else {
        !((result >> 1) as i64)
    };
    Ok(value)
}
