//! # Strollkit
//!
//! Location acquisition and walking-route orchestration with graceful fallback.
//!
//! Strollkit answers three questions: where am I, what quiet places are nearby,
//! and how do I walk there. Each answer comes from an ordered chain of
//! interchangeable strategies, so a dead GPS or a rejected API key degrades the
//! result instead of failing the request.
//!
//! ## Features
//!
//! Each capability lives in its own crate and is re-exported behind a feature.
//!
//! - `geo`: Distance, interpolation and polyline helpers.
//! - `permission`: Location permission checks.
//! - `location`: Provider fallback with a last-known-location cache.
//! - `places`: Nearby search over an in-memory catalog or Google Places.
//! - `routing`: Route engines with a guaranteed heuristic fallback.
//!
//! `location` and `routing` are enabled by default. Use the `full` feature to
//! enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! strollkit = { version = "0.1", features = ["full"] }
//! ```
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use strollkit::location::providers::MockLocationProvider;
//! use strollkit::location::{LocationRequest, LocationService, LocationServiceOptions};
//! use strollkit::places::{InMemoryPlacesRepository, demo_catalog};
//! use strollkit::routing::{RouteRequest, RoutingService};
//!
//! async fn walk_to_the_garden() -> Result<(), Box<dyn std::error::Error>> {
//!     let location = LocationService::new(
//!         vec![Arc::new(MockLocationProvider::default())],
//!         LocationServiceOptions::default(),
//!     )?;
//!     let here = location.get_current_location(&LocationRequest::default()).await?;
//!
//!     let routing = RoutingService::new(
//!         Arc::new(InMemoryPlacesRepository::new(demo_catalog())),
//!         Vec::new(),
//!     );
//!     let route = routing
//!         .get_walking_route(&RouteRequest {
//!             origin: here.position(),
//!             destination_id: "spot_004".into(),
//!         })
//!         .await?;
//!     println!("{} m", route.summary.distance_meters);
//!     Ok(())
//! }
//! ```

#[cfg(feature = "geo")]
pub use strollkit_geo as geo;

#[cfg(feature = "permission")]
pub use strollkit_permission as permission;

#[cfg(feature = "location")]
pub use strollkit_location as location;

#[cfg(feature = "places")]
pub use strollkit_places as places;

#[cfg(feature = "routing")]
pub use strollkit_routing as routing;
