use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use strollkit_places::{InMemoryPlacesRepository, NearbyPlace};
use strollkit_routing::{
    HeuristicOptions, HeuristicRouteEngine, LatLng, RouteEngine, RouteEngineError, RouteInput,
    RouteMode, RouteRequest, RouteResponse, RoutingService,
};

/// Fails every request and counts how often it was asked.
struct Broken {
    id: &'static str,
    modes: &'static [RouteMode],
    calls: AtomicUsize,
}

impl Broken {
    fn new(id: &'static str, modes: &'static [RouteMode]) -> Arc<Self> {
        Arc::new(Self {
            id,
            modes,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteEngine for Broken {
    fn id(&self) -> &str {
        self.id
    }

    fn supports(&self, mode: RouteMode) -> bool {
        self.modes.contains(&mode)
    }

    async fn compute_route(&self, _input: RouteInput) -> Result<RouteResponse, RouteEngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RouteEngineError::NoRoute)
    }
}

fn cafe() -> NearbyPlace {
    NearbyPlace {
        id: "cafe".into(),
        name: "Cafe".into(),
        lat: 1.001,
        lng: 1.002,
        address: "Corner".into(),
        distance_meters: 0,
        types: vec!["cafe".into()],
        rating: None,
        is_open_now: None,
    }
}

fn places() -> Arc<InMemoryPlacesRepository> {
    Arc::new(InMemoryPlacesRepository::new([cafe()]))
}

fn request(destination_id: &str) -> RouteRequest {
    RouteRequest {
        origin: LatLng { lat: 1.0, lng: 1.0 },
        destination_id: destination_id.into(),
    }
}

#[tokio::test]
async fn heuristic_route_to_a_known_place() {
    let options = HeuristicOptions::default();
    let heuristic = HeuristicRouteEngine::new(options).unwrap();
    let service = RoutingService::new(places(), vec![Arc::new(heuristic)]);

    let route = service.get_walking_route(&request("cafe")).await.unwrap();

    assert!(route.summary.distance_meters > 0);
    assert_eq!(route.polyline.len(), options.interpolation_steps as usize + 2);
    for (expected, point) in route.polyline.iter().enumerate() {
        assert_eq!(point.sequence as usize, expected);
    }
    assert_eq!(route.destination, LatLng { lat: 1.001, lng: 1.002 });
}

#[tokio::test]
async fn unknown_destination_never_reaches_an_engine() {
    let engine = Broken::new("remote", &[RouteMode::Walking]);
    let service = RoutingService::new(places(), vec![engine.clone()]);

    let err = service.get_walking_route(&request("missing")).await.unwrap_err();

    assert_eq!(err.message, "Unknown destination missing");
    assert!(err.causes.is_empty());
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn failing_engines_fall_back_to_the_implicit_heuristic() {
    let first = Broken::new("first", &[RouteMode::Walking]);
    let second = Broken::new("second", &[RouteMode::Walking, RouteMode::Driving]);
    let service = RoutingService::new(places(), vec![first.clone(), second.clone()]);

    assert_eq!(service.engine_ids(), ["first", "second", "heuristic"]);

    let route = service.get_walking_route(&request("cafe")).await.unwrap();
    assert!(route.summary.distance_meters > 0);
    assert!(route.polyline.len() > 1);
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 1);
}

#[tokio::test]
async fn engines_for_other_modes_are_skipped() {
    let driving = Broken::new("driving-only", &[RouteMode::Driving]);
    let service = RoutingService::new(places(), vec![driving.clone()]);

    service.get_walking_route(&request("cafe")).await.unwrap();
    assert_eq!(driving.calls(), 0);
}

#[tokio::test]
async fn exhausted_engines_report_every_cause() {
    let first = Broken::new("first", &[RouteMode::Driving]);
    let second = Broken::new("second", &[RouteMode::Driving]);
    let service = RoutingService::new(places(), vec![first.clone(), second.clone()])
        .with_mode(RouteMode::Driving);

    let err = service.get_walking_route(&request("cafe")).await.unwrap_err();

    assert_eq!(err.message, "All routing engines failed");
    assert_eq!(err.causes.len(), 2);
    assert!(err.causes.iter().all(|c| matches!(c, RouteEngineError::NoRoute)));
}

#[tokio::test]
async fn no_engine_for_the_mode() {
    let service = RoutingService::new(places(), Vec::new()).with_mode(RouteMode::Bicycling);

    let err = service.get_walking_route(&request("cafe")).await.unwrap_err();
    assert_eq!(err.message, "No routing engines support bicycling mode");
    assert!(err.causes.is_empty());
}

#[tokio::test]
async fn non_finite_origin_is_rejected_before_any_engine() {
    let engine = Broken::new("remote", &[RouteMode::Walking]);
    let service = RoutingService::new(places(), vec![engine.clone()]);

    let err = service
        .get_walking_route(&RouteRequest {
            origin: LatLng {
                lat: f64::NAN,
                lng: 1.0,
            },
            destination_id: "cafe".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.message, "Origin coordinates are invalid");
    assert!(err.causes.is_empty());
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn engine_with_the_reserved_id_replaces_the_fallback() {
    let custom = Broken::new(HeuristicRouteEngine::ID, &[RouteMode::Walking]);
    let service = RoutingService::new(places(), vec![custom.clone()]);

    assert_eq!(service.engine_ids(), [HeuristicRouteEngine::ID]);

    let err = service.get_walking_route(&request("cafe")).await.unwrap_err();
    assert_eq!(err.message, "All routing engines failed");
    assert_eq!(err.causes.len(), 1);
    assert_eq!(custom.calls(), 1);
}
