use async_trait::async_trait;
use strollkit_geo::{
    DEFAULT_INTERPOLATION_STEPS, DEFAULT_WALKING_SPEED_MPS, GeoError, distance_meters,
    estimate_walking_duration_seconds, interpolate, number_points, round_meters,
};

use crate::{RouteEngine, RouteEngineError, RouteInput, RouteMode, RouteResponse, RouteSummary};

/// Tuning for [`HeuristicRouteEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicOptions {
    /// Segments between origin and destination.
    pub interpolation_steps: u32,
    /// Assumed walking speed in metres per second.
    pub walking_speed_mps: f64,
}

impl Default for HeuristicOptions {
    fn default() -> Self {
        Self {
            interpolation_steps: DEFAULT_INTERPOLATION_STEPS,
            walking_speed_mps: DEFAULT_WALKING_SPEED_MPS,
        }
    }
}

/// Straight-line walking routes computed offline.
///
/// Never touches the network, so it is the engine of last resort. The
/// polyline is the interpolated line with the destination repeated as a
/// closing vertex, `interpolation_steps + 2` points in total.
#[derive(Debug, Clone, Default)]
pub struct HeuristicRouteEngine {
    options: HeuristicOptions,
}

impl HeuristicRouteEngine {
    /// Identifier reported by [`RouteEngine::id`].
    pub const ID: &'static str = "heuristic";

    /// Creates an engine with custom tuning.
    ///
    /// # Errors
    /// Returns [`RouteEngineError::InvalidSpeed`] if the speed is not positive.
    pub fn new(options: HeuristicOptions) -> Result<Self, RouteEngineError> {
        let speed = options.walking_speed_mps;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(RouteEngineError::InvalidSpeed(speed));
        }
        Ok(Self { options })
    }

    /// Current tuning.
    #[must_use]
    pub const fn options(&self) -> HeuristicOptions {
        self.options
    }
}

#[async_trait]
impl RouteEngine for HeuristicRouteEngine {
    fn id(&self) -> &str {
        Self::ID
    }

    fn supports(&self, mode: RouteMode) -> bool {
        mode == RouteMode::Walking
    }

    async fn compute_route(&self, input: RouteInput) -> Result<RouteResponse, RouteEngineError> {
        if !self.supports(input.mode) {
            return Err(RouteEngineError::UnsupportedMode(input.mode));
        }
        let origin = input.origin.validate()?;
        let destination = input.destination.validate()?;

        let distance = distance_meters(origin, destination);
        let duration = estimate_walking_duration_seconds(distance, self.options.walking_speed_mps)
            .map_err(|err| match err {
                GeoError::InvalidSpeed(speed) => RouteEngineError::InvalidSpeed(speed),
                other => other.into(),
            })?;

        let steps = self.options.interpolation_steps;
        let mut line = interpolate(origin, destination, steps);
        // `interpolate` already yields both endpoints when there are no steps.
        if steps > 0 {
            line.push(destination);
        }

        Ok(RouteResponse {
            origin,
            destination,
            summary: RouteSummary {
                distance_meters: round_meters(distance),
                duration_seconds: duration,
                mode: input.mode,
            },
            polyline: number_points(line),
            steps: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LatLng;

    fn input(mode: RouteMode) -> RouteInput {
        RouteInput {
            origin: LatLng {
                lat: 40.7829,
                lng: -73.9654,
            },
            destination: LatLng {
                lat: 40.7945,
                lng: -73.952,
            },
            mode,
        }
    }

    #[tokio::test]
    async fn computes_a_straight_walking_route() {
        let route = HeuristicRouteEngine::default()
            .compute_route(input(RouteMode::Walking))
            .await
            .unwrap();

        assert!(route.summary.distance_meters > 1_000);
        assert!(route.summary.duration_seconds >= 60);
        assert_eq!(route.summary.mode, RouteMode::Walking);
        assert_eq!(route.polyline.len(), 8);
        assert_eq!(route.polyline[0].position(), route.origin);
        assert_eq!(route.polyline[6].position(), route.destination);
        assert_eq!(route.polyline[7].position(), route.destination);
        assert!(route.polyline.windows(2).all(|w| w[1].sequence == w[0].sequence + 1));
        assert!(route.steps.is_none());
    }

    #[tokio::test]
    async fn polyline_has_two_more_points_than_steps() {
        for steps in [0, 1, 3] {
            let engine = HeuristicRouteEngine::new(HeuristicOptions {
                interpolation_steps: steps,
                ..HeuristicOptions::default()
            })
            .unwrap();
            let route = engine.compute_route(input(RouteMode::Walking)).await.unwrap();

            assert_eq!(route.polyline.len(), steps as usize + 2, "steps = {steps}");
            assert_eq!(route.polyline[0].position(), route.origin);
            assert_eq!(route.polyline.last().unwrap().position(), route.destination);
        }
    }

    #[tokio::test]
    async fn duration_follows_configured_speed() {
        let slow = HeuristicRouteEngine::new(HeuristicOptions {
            walking_speed_mps: 0.7,
            ..HeuristicOptions::default()
        })
        .unwrap();
        let fast = HeuristicRouteEngine::default();

        let slow_route = slow.compute_route(input(RouteMode::Walking)).await.unwrap();
        let fast_route = fast.compute_route(input(RouteMode::Walking)).await.unwrap();
        assert!(slow_route.summary.duration_seconds > fast_route.summary.duration_seconds);
    }

    #[tokio::test]
    async fn rejects_other_modes() {
        let engine = HeuristicRouteEngine::default();
        assert!(!engine.supports(RouteMode::Driving));
        assert!(matches!(
            engine.compute_route(input(RouteMode::Driving)).await,
            Err(RouteEngineError::UnsupportedMode(RouteMode::Driving))
        ));
    }

    #[test]
    fn rejects_non_positive_speed() {
        for speed in [0.0, -1.4, f64::NAN] {
            let result = HeuristicRouteEngine::new(HeuristicOptions {
                walking_speed_mps: speed,
                ..HeuristicOptions::default()
            });
            assert!(matches!(result, Err(RouteEngineError::InvalidSpeed(_))));
        }
    }

    #[tokio::test]
    async fn rejects_non_finite_destination() {
        let mut bad = input(RouteMode::Walking);
        bad.destination.lng = f64::INFINITY;
        assert!(matches!(
            HeuristicRouteEngine::default().compute_route(bad).await,
            Err(RouteEngineError::Geometry(GeoError::InvalidCoordinate { .. }))
        ));
    }
}
