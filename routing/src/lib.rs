//! Walking routes to known places.
//!
//! A [`RoutingService`] resolves a destination through a
//! [`PlacesRepository`](strollkit_places::PlacesRepository) and then asks its
//! [`RouteEngine`]s for a route, in order, until one answers. A
//! [`HeuristicRouteEngine`] is always part of the chain, so a route comes back
//! even when every network engine is down.
//!
//! ```no_run
//! # async fn demo() -> Result<(), strollkit_routing::RoutingServiceError> {
//! use std::sync::Arc;
//! use strollkit_places::{InMemoryPlacesRepository, demo_catalog};
//! use strollkit_routing::{LatLng, RouteRequest, RoutingService};
//!
//! let places = Arc::new(InMemoryPlacesRepository::new(demo_catalog()));
//! let service = RoutingService::new(places, Vec::new());
//! let route = service
//!     .get_walking_route(&RouteRequest {
//!         origin: LatLng { lat: 40.7829, lng: -73.9654 },
//!         destination_id: "spot_004".into(),
//!     })
//!     .await?;
//! println!("{} m", route.summary.distance_meters);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod engines;
mod service;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strollkit_geo::{GeoError, RoutePoint};

pub use engines::{
    GoogleDirectionsConfig, GoogleDirectionsEngine, HeuristicOptions, HeuristicRouteEngine,
};
pub use service::{RoutingService, RoutingServiceError};
pub use strollkit_geo::LatLng;

/// Travel mode of a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    /// On foot.
    #[default]
    Walking,
    /// By car.
    Driving,
    /// By bicycle.
    Bicycling,
}

impl RouteMode {
    /// Wire spelling of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Driving => "driving",
            Self::Bicycling => "bicycling",
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that names no [`RouteMode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route mode `{0}`")]
pub struct ParseModeError(pub String);

impl FromStr for RouteMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walking" => Ok(Self::Walking),
            "driving" => Ok(Self::Driving),
            "bicycling" => Ok(Self::Bicycling),
            other => Err(ParseModeError(other.to_owned())),
        }
    }
}

/// A request for a route from a coordinate to a stored place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    /// Where the walk starts.
    pub origin: LatLng,
    /// Id of the destination in the places repository.
    pub destination_id: String,
}

/// Engine input once the destination is resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteInput {
    /// Start of the route.
    pub origin: LatLng,
    /// End of the route.
    pub destination: LatLng,
    /// Travel mode.
    pub mode: RouteMode,
}

/// Totals for a whole route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    /// Length in whole metres.
    pub distance_meters: u32,
    /// Travel time in whole seconds.
    pub duration_seconds: u64,
    /// Mode the route was computed for.
    pub mode: RouteMode,
}

/// One turn-by-turn instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    /// Plain-text instruction.
    pub instruction: String,
    /// Length of the step in metres.
    pub distance_meters: u32,
    /// Duration of the step in seconds.
    pub duration_seconds: u64,
    /// Where the step starts.
    pub start_location: LatLng,
    /// Where the step ends.
    pub end_location: LatLng,
}

/// A computed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    /// Start of the route.
    pub origin: LatLng,
    /// End of the route.
    pub destination: LatLng,
    /// Totals.
    pub summary: RouteSummary,
    /// Vertices in drawing order, numbered from zero.
    pub polyline: Vec<RoutePoint>,
    /// Turn-by-turn instructions, when the engine provides them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<RouteStep>>,
}

/// Errors produced by a single [`RouteEngine`].
#[derive(Debug, thiserror::Error)]
pub enum RouteEngineError {
    /// The engine was asked for a mode it doesn't handle.
    #[error("{0} routes are not supported by this engine")]
    UnsupportedMode(RouteMode),
    /// Walking speed must be strictly positive.
    #[error("walking speed must be greater than zero, got {0}")]
    InvalidSpeed(f64),
    /// A coordinate or encoded polyline was unusable.
    #[error(transparent)]
    Geometry(#[from] GeoError),
    /// The adapter was configured without an API key.
    #[error("Google Directions API key is required")]
    MissingApiKey,
    /// The backend found no route between the two points.
    #[error("No route found between origin and destination")]
    NoRoute,
    /// The backend answered with an error status.
    #[error("Google Directions API error: {status}{}", .message.as_deref().map(|m| format!(" - {m}")).unwrap_or_default())]
    Api {
        /// Status string reported by the backend.
        status: String,
        /// Optional detail reported by the backend.
        message: Option<String>,
    },
    /// The request could not be sent or its body could not be read.
    #[error("directions request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body was not the expected JSON document.
    #[error("unexpected directions response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The backend answered OK without a usable route.
    #[error("{0}")]
    EmptyResponse(&'static str),
}

/// A strategy that computes a route between two coordinates.
#[async_trait]
pub trait RouteEngine: Send + Sync {
    /// Stable identifier, used in logs and to detect the heuristic engine.
    ///
    /// The id [`HeuristicRouteEngine::ID`] is reserved. [`RoutingService`]
    /// skips its built-in fallback when any supplied engine reports it, so an
    /// engine using that id takes over the last-resort role and must not fail
    /// for valid walking input.
    fn id(&self) -> &str;

    /// Whether this engine can compute routes in `mode`.
    fn supports(&self, mode: RouteMode) -> bool;

    /// Computes a route.
    ///
    /// # Errors
    /// Returns a [`RouteEngineError`] describing why no route was produced.
    async fn compute_route(&self, input: RouteInput) -> Result<RouteResponse, RouteEngineError>;
}
