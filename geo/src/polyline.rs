//! Decoder for the 1e5-precision encoded polyline format.

use crate::{GeoError, LatLng};

const PRECISION: f64 = 1e5;

/// Decodes an encoded polyline into coordinates.
///
/// # Errors
/// Returns [`GeoError::MalformedPolyline`] if the string ends in the middle of
/// a value, contains bytes outside the encoding alphabet, or encodes a value
/// wider than 32 bits.
pub fn decode_polyline(encoded: &str) -> Result<Vec<LatLng>, GeoError> {
    let bytes = encoded.as_bytes();
    let mut coordinates = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        let start = index;
        lat = lat
            .checked_add(next_delta(bytes, &mut index)?)
            .ok_or(GeoError::MalformedPolyline(start))?;
        let start = index;
        lng = lng
            .checked_add(next_delta(bytes, &mut index)?)
            .ok_or(GeoError::MalformedPolyline(start))?;

        #[allow(clippy::cast_precision_loss)]
        coordinates.push(LatLng {
            lat: lat as f64 / PRECISION,
            lng: lng as f64 / PRECISION,
        });
    }

    Ok(coordinates)
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, GeoError> {
    let mut shift = 0_u32;
    let mut result: i64 = 0;

    loop {
        let byte = *bytes
            .get(*index)
            .ok_or(GeoError::MalformedPolyline(*index))?;
        // Seven 5-bit chunks cover a signed 32-bit value.
        if !(63..=126).contains(&byte) || shift > 30 {
            return Err(GeoError::MalformedPolyline(*index));
        }
        *index += 1;

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
