use async_trait::async_trait;

use super::race_timeout;
use crate::{GeolocationMode, LocateRequest, LocationProvider, LocationState, ProviderError, sys};

/// The host's own location service.
///
/// Uses GeoClue2 on Linux and the WinRT geolocator on Windows; other targets
/// report `PROVIDER_OFF`. Every attempt is raced against its time budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceLocationProvider;

impl DeviceLocationProvider {
    /// Creates the provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LocationProvider for DeviceLocationProvider {
    fn id(&self) -> &str {
        "device"
    }

    fn supports(&self, _mode: GeolocationMode) -> bool {
        true
    }

    async fn locate(&self, request: LocateRequest) -> Result<LocationState, ProviderError> {
        let fix = race_timeout(sys::get_location(request.mode), request.timeout).await?;

        Ok(LocationState {
            lat: fix.position.lat,
            lng: fix.position.lng,
            accuracy_meters: fix.accuracy_meters,
            mode: request.mode,
            updated_at: fix.timestamp_ms,
            is_stale: false,
        })
    }
}
