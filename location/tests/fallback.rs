use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use strollkit_location::providers::{
    ForwardedLocationProvider, MockLocationProvider, PermissionGatedProvider,
};
use strollkit_location::{
    GeolocationMode, LatLng, LocateRequest, LocationErrorCode, LocationProvider, LocationRequest,
    LocationService, LocationServiceError, LocationServiceOptions, LocationState, ManualClock,
    PermissionStatus, ProviderError,
};
use strollkit_permission::StaticPermissions;

/// A provider that can be switched between working and failing.
struct ToggleProvider {
    id: &'static str,
    modes: Vec<GeolocationMode>,
    position: (f64, f64),
    failure: std::sync::Mutex<Option<LocationErrorCode>>,
    calls: AtomicUsize,
}

impl ToggleProvider {
    fn new(id: &'static str, modes: &[GeolocationMode], position: (f64, f64)) -> Arc<Self> {
        Arc::new(Self {
            id,
            modes: modes.to_vec(),
            position,
            failure: std::sync::Mutex::new(None),
            calls: AtomicUsize::new(0),
        })
    }

    fn fail(&self, reason: LocationErrorCode) {
        *self.failure.lock().unwrap() = Some(reason);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for ToggleProvider {
    fn id(&self) -> &str {
        self.id
    }

    fn supports(&self, mode: GeolocationMode) -> bool {
        self.modes.contains(&mode)
    }

    async fn locate(&self, request: LocateRequest) -> Result<LocationState, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = *self.failure.lock().unwrap() {
            return Err(ProviderError::new(reason, format!("{} failure", self.id)));
        }
        Ok(LocationState {
            lat: self.position.0,
            lng: self.position.1,
            accuracy_meters: Some(5.0),
            mode: request.mode,
            updated_at: None,
            is_stale: false,
        })
    }
}

use GeolocationMode::{BatterySaving, HighAccuracy};

fn service_with(
    providers: Vec<Arc<dyn LocationProvider>>,
    clock: Arc<ManualClock>,
    stale_tolerance: Duration,
) -> LocationService {
    LocationService::new(
        providers,
        LocationServiceOptions::default()
            .with_default_mode(HighAccuracy)
            .with_stale_tolerance(stale_tolerance)
            .with_clock(clock),
    )
    .unwrap()
}

#[tokio::test]
async fn prefers_providers_matching_the_current_mode() {
    let gps = ToggleProvider::new("gps", &[HighAccuracy], (1.0, 1.0));
    let network = ToggleProvider::new("network", &[BatterySaving], (2.0, 2.0));
    let service = service_with(
        vec![gps.clone(), network.clone()],
        Arc::new(ManualClock::new(0)),
        Duration::from_secs(120),
    );

    let location = service
        .get_current_location(&LocationRequest::default())
        .await
        .unwrap();

    assert_eq!(location.mode, HighAccuracy);
    assert!((location.lat - 1.0).abs() < 1e-9);
    assert!(!location.is_stale);
    assert_eq!(network.calls(), 0);
}

#[tokio::test]
async fn falls_back_to_the_alternate_mode() {
    let gps = ToggleProvider::new("gps", &[HighAccuracy], (1.0, 1.0));
    gps.fail(LocationErrorCode::ProviderOff);
    let network = ToggleProvider::new("network", &[BatterySaving], (2.0, 2.0));
    let service = service_with(
        vec![gps.clone(), network.clone()],
        Arc::new(ManualClock::new(0)),
        Duration::from_secs(120),
    );

    let location = service
        .get_current_location(&LocationRequest::default())
        .await
        .unwrap();

    assert_eq!(location.mode, BatterySaving);
    assert!((location.lat - 2.0).abs() < 1e-9);
    assert_eq!(service.mode(), BatterySaving);
    assert_eq!(gps.calls(), 1);
}

#[tokio::test]
async fn serves_stale_snapshot_after_tolerance() {
    let clock = Arc::new(ManualClock::new(10_000));
    let gps = ToggleProvider::new("gps", &[HighAccuracy], (1.0, 1.0));
    let network = ToggleProvider::new("network", &[BatterySaving], (2.0, 2.0));
    let service = service_with(
        vec![gps.clone(), network.clone()],
        clock.clone(),
        Duration::from_millis(1_000),
    );

    let fresh = service
        .get_current_location(&LocationRequest::default())
        .await
        .unwrap();

    gps.fail(LocationErrorCode::Timeout);
    network.fail(LocationErrorCode::Timeout);
    clock.advance(Duration::from_millis(1_500));

    let stale = service
        .get_current_location(&LocationRequest::default())
        .await
        .unwrap();

    assert!(stale.is_stale);
    assert!((stale.lat - fresh.lat).abs() < 1e-9);
    assert!((stale.lng - fresh.lng).abs() < 1e-9);
    assert_eq!(stale.updated_at, fresh.updated_at);
}

#[tokio::test]
async fn cached_snapshot_within_tolerance_is_not_stale() {
    let clock = Arc::new(ManualClock::new(10_000));
    let gps = ToggleProvider::new("gps", &[HighAccuracy], (1.0, 1.0));
    let service = service_with(vec![gps.clone()], clock.clone(), Duration::from_millis(1_000));

    service
        .get_current_location(&LocationRequest::default())
        .await
        .unwrap();
    gps.fail(LocationErrorCode::ProviderOff);
    clock.advance(Duration::from_millis(1_000));

    let cached = service
        .get_current_location(&LocationRequest::default())
        .await
        .unwrap();
    assert!(!cached.is_stale);
}

#[tokio::test]
async fn strict_callers_get_an_error_despite_the_cache() {
    let clock = Arc::new(ManualClock::new(0));
    let gps = ToggleProvider::new("gps", &[HighAccuracy], (1.0, 1.0));
    let network = ToggleProvider::new("network", &[BatterySaving], (2.0, 2.0));
    let service = service_with(
        vec![gps.clone(), network.clone()],
        clock,
        Duration::from_secs(120),
    );

    service
        .get_current_location(&LocationRequest::default())
        .await
        .unwrap();
    gps.fail(LocationErrorCode::PermissionDenied);
    network.fail(LocationErrorCode::ProviderOff);

    let err = service
        .get_current_location(&LocationRequest {
            allow_stale: Some(false),
            ..LocationRequest::default()
        })
        .await
        .unwrap_err();

    let LocationServiceError::Exhausted { errors } = err else {
        panic!("expected provider exhaustion");
    };
    let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
    assert_eq!(
        codes,
        [LocationErrorCode::PermissionDenied, LocationErrorCode::ProviderOff]
    );
}

#[tokio::test]
async fn total_failure_without_cache_is_an_error() {
    let gps = ToggleProvider::new("gps", &[HighAccuracy], (1.0, 1.0));
    gps.fail(LocationErrorCode::Unknown);
    let service = service_with(
        vec![gps],
        Arc::new(ManualClock::new(0)),
        Duration::from_secs(120),
    );

    assert!(matches!(
        service
            .get_current_location(&LocationRequest::default())
            .await,
        Err(LocationServiceError::Exhausted { .. })
    ));
}

/// Counts calls and never reports support.
struct Unsupported {
    called: AtomicBool,
}

#[async_trait]
impl LocationProvider for Unsupported {
    fn id(&self) -> &str {
        "unsupported"
    }

    fn supports(&self, _mode: GeolocationMode) -> bool {
        false
    }

    async fn locate(&self, _request: LocateRequest) -> Result<LocationState, ProviderError> {
        self.called.store(true, Ordering::SeqCst);
        Err(ProviderError::unknown("must not be called"))
    }
}

#[tokio::test]
async fn providers_without_support_are_skipped_in_both_modes() {
    let unsupported = Arc::new(Unsupported {
        called: AtomicBool::new(false),
    });
    let service = LocationService::new(
        vec![unsupported.clone(), Arc::new(MockLocationProvider::default())],
        LocationServiceOptions::default(),
    )
    .unwrap();

    service
        .get_current_location(&LocationRequest::default())
        .await
        .unwrap();
    assert!(!unsupported.called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn forwarded_coordinates_win_over_mock() {
    let forwarded = ForwardedLocationProvider::from_params(Some(51.5), Some(-0.12), Some(8.0))
        .unwrap();
    let service = LocationService::new(
        vec![
            Arc::new(forwarded),
            Arc::new(MockLocationProvider::default()),
        ],
        LocationServiceOptions::default(),
    )
    .unwrap();

    let location = service
        .get_current_location(&LocationRequest::default())
        .await
        .unwrap();
    assert_eq!(location.position(), LatLng { lat: 51.5, lng: -0.12 });
    assert_eq!(location.accuracy_meters, Some(8.0));
}

#[tokio::test]
async fn denied_permission_falls_through_to_the_next_provider() {
    let gated = PermissionGatedProvider::new(
        MockLocationProvider::new(LatLng { lat: 9.0, lng: 9.0 }, None),
        StaticPermissions::new(PermissionStatus::Denied),
    );
    let fallback = MockLocationProvider::new(LatLng { lat: 1.0, lng: 2.0 }, None);
    let service = LocationService::new(
        vec![Arc::new(gated), Arc::new(fallback)],
        LocationServiceOptions::default(),
    )
    .unwrap();

    let location = service
        .get_current_location(&LocationRequest::default())
        .await
        .unwrap();
    assert_eq!(location.position(), LatLng { lat: 1.0, lng: 2.0 });
}
