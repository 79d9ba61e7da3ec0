use async_trait::async_trait;

use crate::{
    GeolocationMode, LatLng, LocateRequest, LocationProvider, LocationState, ProviderError,
    unix_millis,
};

/// Serves coordinates measured elsewhere, typically by the client device and
/// forwarded with the request.
#[derive(Debug, Clone, Copy)]
pub struct ForwardedLocationProvider {
    position: LatLng,
    accuracy_meters: Option<f64>,
}

impl ForwardedLocationProvider {
    /// Wraps the given coordinates. Non-finite values make the provider
    /// report no supported modes.
    #[must_use]
    pub const fn new(position: LatLng, accuracy_meters: Option<f64>) -> Self {
        Self {
            position,
            accuracy_meters,
        }
    }

    /// Builds a provider from loosely typed request parameters.
    ///
    /// Returns `None` unless both `lat` and `lng` are present and finite.
    /// A non-finite accuracy is dropped rather than rejected.
    #[must_use]
    pub fn from_params(lat: Option<f64>, lng: Option<f64>, accuracy: Option<f64>) -> Option<Self> {
        let position = LatLng::new(lat?, lng?).ok()?;
        Some(Self::new(position, accuracy.filter(|a| a.is_finite())))
    }

    /// The forwarded coordinate.
    #[must_use]
    pub const fn position(&self) -> LatLng {
        self.position
    }
}

#[async_trait]
impl LocationProvider for ForwardedLocationProvider {
    fn id(&self) -> &str {
        "forwarded"
    }

    fn supports(&self, _mode: GeolocationMode) -> bool {
        self.position.is_finite()
    }

    async fn locate(&self, request: LocateRequest) -> Result<LocationState, ProviderError> {
        if !self.supports(request.mode) {
            return Err(ProviderError::unknown("forwarded coordinates are invalid"));
        }

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
