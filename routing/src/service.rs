use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use strollkit_places::PlacesRepository;

use crate::{
    HeuristicRouteEngine, RouteEngine, RouteEngineError, RouteInput, RouteMode, RouteRequest,
    RouteResponse,
};

/// Failure of [`RoutingService::get_walking_route`].
///
/// `causes` holds one error per engine that was tried, in order. It is empty
/// when the request failed before any engine ran.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RoutingServiceError {
    /// Human-readable summary.
    pub message: String,
    /// Per-engine failures.
    pub causes: Vec<RouteEngineError>,
}

impl RoutingServiceError {
    fn early(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            causes: Vec::new(),
        }
    }
}

/// Resolves destinations and tries route engines in order.
pub struct RoutingService {
    places: Arc<dyn PlacesRepository>,
    engines: Vec<Arc<dyn RouteEngine>>,
    mode: RouteMode,
}

impl fmt::Debug for RoutingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingService")
            .field("engines", &self.engine_ids())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl RoutingService {
    /// Creates a walking-mode service.
    ///
    /// A default [`HeuristicRouteEngine`] is appended unless `engines` already
    /// contains an engine with its id. See [`RouteEngine::id`] for what that
    /// id commits an engine to.
    #[must_use]
    pub fn new(places: Arc<dyn PlacesRepository>, mut engines: Vec<Arc<dyn RouteEngine>>) -> Self {
        if !engines.iter().any(|e| e.id() == HeuristicRouteEngine::ID) {
            engines.push(Arc::new(HeuristicRouteEngine::default()));
        }
        Self {
            places,
            engines,
            mode: RouteMode::Walking,
        }
    }

    /// Sets the mode engines are filtered by.
    #[must_use]
    pub const fn with_mode(mut self, mode: RouteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Ids of the configured engines in trial order.
    #[must_use]
    pub fn engine_ids(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.id()).collect()
    }

    /// Computes a route from `request.origin` to the stored destination.
    ///
    /// # Errors
    /// Fails with empty causes when the destination is unknown, no engine
    /// supports the mode, or the origin is not finite. Fails with one cause per
    /// engine when every engine fails.
    pub async fn get_walking_route(
        &self,
        request: &RouteRequest,
    ) -> Result<RouteResponse, RoutingServiceError> {
        let destination = match self.places.find_by_id(&request.destination_id).await {
            Ok(Some(place)) => place.position(),
            Ok(None) => {
                return Err(RoutingServiceError::early(format!(
                    "Unknown destination {}",
                    request.destination_id
                )));
            }
            Err(err) => {
                warn!("destination lookup for {} failed: {err}", request.destination_id);
                return Err(RoutingServiceError::early(format!(
                    "Failed to resolve destination {}: {err}",
                    request.destination_id
                )));
            }
        };

        let candidates: Vec<&Arc<dyn RouteEngine>> = self
            .engines
            .iter()
            .filter(|e| e.supports(self.mode))
            .collect();
        if candidates.is_empty() {
            return Err(RoutingServiceError::early(format!(
                "No routing engines support {} mode",
                self.mode
            )));
        }

        if !request.origin.is_finite() {
            return Err(RoutingServiceError::early("Origin coordinates are invalid"));
        }

        let input = RouteInput {
            origin: request.origin,
            destination,
            mode: self.mode,
        };

        let mut causes = Vec::new();
        for engine in candidates {
            debug!("computing {} route with {}", self.mode, engine.id());
            match engine.compute_route(input).await {
                Ok(route) => return Ok(route),
                Err(err) => {
                    warn!("route engine {} failed: {err}", engine.id());
                    causes.push(err);
                }
            }
        }

        Err(RoutingServiceError {
            message: "All routing engines failed".to_owned(),
            causes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strollkit_places::InMemoryPlacesRepository;

    #[test]
    fn heuristic_is_appended_once() {
        let places = Arc::new(InMemoryPlacesRepository::default());

        let service = RoutingService::new(places.clone(), Vec::new());
        assert_eq!(service.engine_ids(), ["heuristic"]);

        let service = RoutingService::new(
            places,
            vec![Arc::new(HeuristicRouteEngine::default()) as Arc<dyn RouteEngine>],
        );
        assert_eq!(service.engine_ids(), ["heuristic"]);
    }

    #[test]
    fn error_displays_its_message() {
        let err = RoutingServiceError::early("Origin coordinates are invalid");
        assert_eq!(err.to_string(), "Origin coordinates are invalid");
        assert!(err.causes.is_empty());
    }
}
