//! Point-of-interest lookup.
//!
//! [`PlacesRepository`] is the seam between the routing service and wherever
//! places come from. Two implementations ship here: an in-memory catalog and a
//! Google Places adapter.

#![warn(missing_docs)]

mod catalog;
mod google;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
pub use strollkit_geo::LatLng;
use strollkit_geo::GeoError;

pub use catalog::demo_catalog;
pub use google::{GooglePlacesConfig, GooglePlacesRepository};
pub use memory::InMemoryPlacesRepository;

/// Search radius used when a query doesn't name one.
pub const DEFAULT_RADIUS_METERS: f64 = 1_000.0;

/// Result count used when a query doesn't name one.
pub const DEFAULT_LIMIT: usize = 20;

/// Upper bound on the result count of a single search.
pub const MAX_LIMIT: usize = 50;

/// A place near the query origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyPlace {
    /// Repository-unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Human-readable address.
    pub address: String,
    /// Distance from the query origin, recomputed on every search.
    pub distance_meters: u32,
    /// Category tags such as `park` or `cafe`.
    pub types: Vec<String>,
    /// Average rating, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Whether the place is open right now, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open_now: Option<bool>,
}

impl NearbyPlace {
    /// The coordinate of this place.
    #[must_use]
    pub const fn position(&self) -> LatLng {
        LatLng {
            lat: self.lat,
            lng: self.lng,
        }
    }

    /// Whether any of this place's types appears in `requested`.
    #[must_use]
    pub fn matches_any(&self, requested: &[&str]) -> bool {
        self.types.iter().any(|t| requested.contains(&t.as_str()))
    }
}

/// Wire shape of a nearby search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyResponse {
    /// Places sorted by ascending distance.
    pub places: Vec<NearbyPlace>,
}

/// Parameters of a nearby search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    /// Search centre.
    pub origin: LatLng,
    /// Search radius in metres.
    pub radius_meters: Option<f64>,
    /// Maximum number of results.
    pub limit: Option<usize>,
    /// Comma-separated type filter, e.g. `"cafe,park"`.
    pub types: Option<String>,
}

impl NearbyQuery {
    /// A query around `origin` with every option at its default.
    #[must_use]
    pub const fn around(origin: LatLng) -> Self {
        Self {
            origin,
            radius_meters: None,
            limit: None,
            types: None,
        }
    }

    /// Effective radius in metres.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius_meters.unwrap_or(DEFAULT_RADIUS_METERS)
    }

    /// Effective result limit, clamped to [`MAX_LIMIT`].
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
    }

    /// The requested types, trimmed, or `None` when no filter applies.
    #[must_use]
    pub fn requested_types(&self) -> Option<Vec<&str>> {
        let types: Vec<&str> = self
            .types
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        (!types.is_empty()).then_some(types)
    }
}

/// Errors produced by places repositories.
#[derive(Debug, thiserror::Error)]
pub enum PlacesError {
    /// The query origin is not a usable coordinate.
    #[error("invalid search origin: {0}")]
    InvalidOrigin(#[from] GeoError),
    /// The adapter was configured without an API key.
    #[error("Google Places API key is required")]
    MissingApiKey,
    /// The request could not be sent or its body could not be read.
    #[error("places request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body was not the expected JSON document.
    #[error("unexpected places response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The backend answered with an error status.
    #[error("Google Places API error: {status}{}", .message.as_deref().map(|m| format!(" - {m}")).unwrap_or_default())]
    Api {
        /// Status string reported by the backend.
        status: String,
        /// Optional detail reported by the backend.
        message: Option<String>,
    },
}

/// Lookup of places by id and by proximity.
#[async_trait]
pub trait PlacesRepository: Send + Sync {
    /// Fetches a single place, or `None` if the id is unknown.
    ///
    /// # Errors
    /// Returns a [`PlacesError`] if the backend could not be queried.
    async fn find_by_id(&self, id: &str) -> Result<Option<NearbyPlace>, PlacesError>;

    /// Places around `query.origin`, nearest first.
    ///
    /// # Errors
    /// Returns a [`PlacesError`] if the origin is invalid or the backend fails.
    async fn find_nearby(&self, query: &NearbyQuery) -> Result<Vec<NearbyPlace>, PlacesError>;
}
