use async_trait::async_trait;

use crate::{
    GeolocationMode, LatLng, LocateRequest, LocationProvider, LocationState, ProviderError,
    unix_millis,
};

/// Where [`MockLocationProvider`] places the user by default.
pub const DEFAULT_MOCK_POSITION: LatLng = LatLng {
    lat: 40.7829,
    lng: -73.9654,
};

const DEFAULT_MOCK_ACCURACY_METERS: f64 = 10.0;

/// Always reports the same coordinate, in whatever mode was asked for.
///
/// Useful as the last entry of a chain during development, and in tests.
#[derive(Debug, Clone, Copy)]
pub struct MockLocationProvider {
    position: LatLng,
    accuracy_meters: Option<f64>,
}

impl Default for MockLocationProvider {
    fn default() -> Self {
        Self::new(DEFAULT_MOCK_POSITION, Some(DEFAULT_MOCK_ACCURACY_METERS))
    }
}

impl MockLocationProvider {
    /// A provider pinned to `position`.
    #[must_use]
    pub const fn new(position: LatLng, accuracy_meters: Option<f64>) -> Self {
        Self {
            position,
            accuracy_meters,
        }
    }
}

#[async_trait]
impl LocationProvider for MockLocationProvider {
    fn id(&self) -> &str {
        "mock"
    }

    fn supports(&self, _mode: GeolocationMode) -> bool {
        true
    }

    async fn locate(&self, request: LocateRequest) -> Result<LocationState, ProviderError> {
        Ok(LocationState {
            lat: self.position.lat,
            lng: self.position.lng,
            accuracy_meters: self.accuracy_meters,
            mode: request.mode,
            updated_at: Some(unix_millis()),
            is_stale: false,
        })
    }
}
