//! Geometry helpers shared by the location, places and routing crates.
//!
//! Everything here is a pure function over WGS84 degrees. Distances use the
//! spherical haversine formula; interpolation is linear in latitude/longitude
//! space and is only meaningful for short, city-scale legs.

#![warn(missing_docs)]

mod polyline;

pub use polyline::decode_polyline;

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by [`distance_meters`].
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Metres per degree used by the equirectangular approximation.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Default number of segments between origin and destination.
pub const DEFAULT_INTERPOLATION_STEPS: u32 = 6;

/// Default walking speed in metres per second.
pub const DEFAULT_WALKING_SPEED_MPS: f64 = 1.4;

/// Lower bound for any walking-duration estimate.
pub const MIN_WALKING_DURATION_SECONDS: u64 = 60;

/// Errors produced by the geometry helpers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    /// Latitude or longitude is NaN or infinite.
    #[error("invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate {
        /// Offending latitude.
        lat: f64,
        /// Offending longitude.
        lng: f64,
    },
    /// Walking speed must be strictly positive.
    #[error("walking speed must be greater than zero, got {0}")]
    InvalidSpeed(f64),
    /// Encoded polyline ended in the middle of a value.
    #[error("malformed polyline at byte {0}")]
    MalformedPolyline(usize),
}

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Creates a coordinate, rejecting non-finite components.
    ///
    /// # Errors
    /// Returns [`GeoError::InvalidCoordinate`] if either value is NaN or infinite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        Self { lat, lng }.validate()
    }

    /// Returns `true` if both components are finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Returns `self` if both components are finite.
    ///
    /// # Errors
    /// Returns [`GeoError::InvalidCoordinate`] otherwise.
    pub const fn validate(self) -> Result<Self, GeoError> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(GeoError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

/// A polyline vertex. Clients plot vertices in `sequence` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Zero-based position along the line.
    pub sequence: u32,
}

impl RoutePoint {
    /// The coordinate of this vertex.
    #[must_use]
    pub const fn position(&self) -> LatLng {
        LatLng {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// Great-circle distance between two points in metres.
#[must_use]
pub fn distance_meters(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (d_lat / 2.0).sin();
    let sin_lng = (d_lng / 2.0).sin();

    let h = sin_lng
        .mul_add(
            sin_lng * a.lat.to_radians().cos() * b.lat.to_radians().cos(),
            sin_lat * sin_lat,
        )
        .clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Rounds a distance to whole metres, saturating at the bounds of `u32`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn round_meters(distance: f64) -> u32 {
    // `as` saturates and maps NaN to zero.
    distance.round() as u32
}

/// Flat-earth distance from `origin` to `point` in metres.
///
/// Good enough for city-scale filtering. Breaks down near the poles and
/// across the antimeridian.
#[must_use]
pub fn equirectangular_distance_meters(origin: LatLng, point: LatLng) -> f64 {
    let lat_diff = (point.lat - origin.lat) * METERS_PER_DEGREE;
    let lng_diff = (point.lng - origin.lng) * METERS_PER_DEGREE * origin.lat.to_radians().cos();
    lat_diff.hypot(lng_diff)
}

/// Returns `steps + 1` points evenly spaced between `start` and `end`.
///
/// With `steps == 0` the endpoints are returned unchanged.
#[must_use]
pub fn interpolate(start: LatLng, end: LatLng, steps: u32) -> Vec<LatLng> {
    if steps == 0 {
        return vec![start, end];
    }

    // The last vertex is `end` itself, not a rounded lerp of it.
    (0..steps)
        .map(|i| {
            let t = f64::from(i) / f64::from(steps);
            LatLng {
                lat: lerp(start.lat, end.lat, t),
                lng: lerp(start.lng, end.lng, t),
            }
        })
        .chain(std::iter::once(end))
        .collect()
}

/// Interpolates between `start` and `end` and numbers the vertices from zero.
#[must_use]
pub fn build_route_polyline(start: LatLng, end: LatLng, steps: u32) -> Vec<RoutePoint> {
    number_points(interpolate(start, end, steps))
}

/// Assigns sequence numbers in iteration order.
#[must_use]
pub fn number_points(points: impl IntoIterator<Item = LatLng>) -> Vec<RoutePoint> {
    points
        .into_iter()
        .zip(0_u32..)
        .map(|(point, sequence)| RoutePoint {
            lat: point.lat,
            lng: point.lng,
            sequence,
        })
        .collect()
}

/// Estimated walking time in whole seconds, never below one minute.
///
/// # Errors
/// Returns [`GeoError::InvalidSpeed`] if `speed_mps` is not a positive number.
pub fn estimate_walking_duration_seconds(
    distance_meters: f64,
    speed_mps: f64,
) -> Result<u64, GeoError> {
    if !speed_mps.is_finite() || speed_mps <= 0.0 {
        return Err(GeoError::InvalidSpeed(speed_mps));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let seconds = (distance_meters.max(0.0) / speed_mps).round() as u64;
    Ok(seconds.max(MIN_WALKING_DURATION_SECONDS))
}

fn lerp(start: f64, end: f64, t: f64) -> f64 {
    (end - start).mul_add(t, start)
}
