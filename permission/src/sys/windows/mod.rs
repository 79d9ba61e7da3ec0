//! Windows permission implementation using the WinRT geolocator access check.

use windows::Devices::Geolocation::{GeolocationAccessStatus, Geolocator};

use crate::{Permission, PermissionError, PermissionStatus};

pub(crate) async fn check(permission: Permission) -> PermissionStatus {
    request(permission)
        .await
        .unwrap_or(PermissionStatus::NotDetermined)
}

// Coarse and precise location share one consent switch on Windows.
pub(crate) async fn request(_permission: Permission) -> Result<PermissionStatus, PermissionError> {
    let status = Geolocator::RequestAccessAsync()
        .and_then(|op| op.get())
        .map_err(|e| PermissionError::Unknown(e.message().to_string()))?;

    Ok(match status {
        GeolocationAccessStatus::Allowed => PermissionStatus::Granted,
        GeolocationAccessStatus::Denied => PermissionStatus::Denied,
        _ => PermissionStatus::NotDetermined,
    })
}
