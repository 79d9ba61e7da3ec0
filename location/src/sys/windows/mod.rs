//! Windows location implementation using the WinRT geolocator.

use windows::Devices::Geolocation::{Geolocator, PositionAccuracy};

use super::Fix;
use crate::{GeolocationMode, LatLng, ProviderError};

// HRESULT_FROM_WIN32(ERROR_ACCESS_DENIED)
#[allow(clippy::cast_possible_wrap)]
const E_ACCESSDENIED: i32 = 0x8007_0005_u32 as i32;

// 100 ns ticks between 1601-01-01 and 1970-01-01.
const UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;

fn map_error(context: &str, error: &windows::core::Error) -> ProviderError {
    let message = format!("{context}: {}", error.message());
    if error.code().0 == E_ACCESSDENIED {
        ProviderError::permission_denied(message)
    } else {
        ProviderError::unknown(message)
    }
}

pub(crate) async fn get_location(mode: GeolocationMode) -> Result<Fix, ProviderError> {
    let geolocator = Geolocator::new()
        .map_err(|e| ProviderError::provider_off(format!("geolocator unavailable: {}", e.message())))?;

    let accuracy = match mode {
        GeolocationMode::HighAccuracy => PositionAccuracy::High,
        GeolocationMode::BatterySaving => PositionAccuracy::Default,
    };
    geolocator
        .SetDesiredAccuracy(accuracy)
        .map_err(|e| map_error("failed to set accuracy", &e))?;

    let position = geolocator
        .GetGeopositionAsync()
        .and_then(|op| op.get())
        .map_err(|e| map_error("failed to get position", &e))?;

    let coordinate = position
        .Coordinate()
        .map_err(|e| map_error("missing coordinate", &e))?;
    let point = coordinate
        .Point()
        .and_then(|p| p.Position())
        .map_err(|e| map_error("missing position", &e))?;

    let timestamp_ms = coordinate
        .Timestamp()
        .ok()
        .and_then(|t| u64::try_from((t.UniversalTime - UNIX_EPOCH_TICKS) / 10_000).ok());
    let accuracy_meters = coordinate.Accuracy().ok().filter(|a| a.is_finite());

    let position = LatLng::new(point.Latitude, point.Longitude)
        .map_err(|e| ProviderError::unknown(format!("geolocator: {e}")))?;

    Ok(Fix {
        position,
        accuracy_meters,
        timestamp_ms,
    })
}
