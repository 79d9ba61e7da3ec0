//! Platform-specific location implementations.

use crate::LatLng;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "windows")]
pub(crate) use windows::get_location;

#[cfg(target_os = "linux")]
pub(crate) use linux::get_location;

/// A raw fix straight from the platform.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fix {
    pub position: LatLng,
    pub accuracy_meters: Option<f64>,
    pub timestamp_ms: Option<u64>,
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub(crate) async fn get_location(
    _mode: crate::GeolocationMode,
) -> Result<Fix, crate::ProviderError> {
    Err(crate::ProviderError::provider_off(
        "no device location service on this platform",
    ))
}
