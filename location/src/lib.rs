//! Location acquisition with provider fallback.
//!
//! A [`LocationService`] owns an ordered list of [`LocationProvider`]s. Each
//! call builds an attempt chain from the providers that support the desired
//! [`GeolocationMode`], optionally followed by the ones supporting the other
//! mode, and returns the first fix. When every provider fails the last good
//! fix is served instead, flagged stale once it is older than the configured
//! tolerance.
//!
//! ```ignore
//! use std::sync::Arc;
//! use strollkit_location::{LocationRequest, LocationService, LocationServiceOptions};
//! use strollkit_location::providers::{DeviceLocationProvider, MockLocationProvider};
//!
//! let service = LocationService::new(
//!     vec![Arc::new(DeviceLocationProvider::new()), Arc::new(MockLocationProvider::default())],
//!     LocationServiceOptions::default(),
//! )?;
//! let here = service.get_current_location(&LocationRequest::default()).await?;
//! println!("{}, {} (stale: {})", here.lat, here.lng, here.is_stale);
//! ```

#![warn(missing_docs)]

mod clock;
pub mod providers;
mod service;
/// Platform-specific implementations.
pub(crate) mod sys;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use clock::{Clock, ManualClock, SystemClock, unix_millis};
pub use service::{LocationRequest, LocationService, LocationServiceError, LocationServiceOptions};
pub use strollkit_geo::LatLng;
pub use strollkit_permission::{Permission, PermissionGate, PermissionStatus};

/// A class of acquisition strategy, not a specific provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeolocationMode {
    /// Satellite-grade fixes, expensive on battery.
    HighAccuracy,
    /// Network or cell based fixes.
    #[default]
    BatterySaving,
}

impl GeolocationMode {
    /// The single fallback mode for `self`.
    #[must_use]
    pub const fn alternate(self) -> Self {
        match self {
            Self::HighAccuracy => Self::BatterySaving,
            Self::BatterySaving => Self::HighAccuracy,
        }
    }

    /// Wire spelling of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighAccuracy => "highAccuracy",
            Self::BatterySaving => "batterySaving",
        }
    }
}

impl fmt::Display for GeolocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that names no [`GeolocationMode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown geolocation mode `{0}`")]
pub struct ParseModeError(pub String);

impl std::str::FromStr for GeolocationMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highAccuracy" => Ok(Self::HighAccuracy),
            "batterySaving" => Ok(Self::BatterySaving),
            other => Err(ParseModeError(other.to_owned())),
        }
    }
}

/// A position fix as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationState {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Horizontal accuracy radius in metres, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_meters: Option<f64>,
    /// The mode that actually produced this fix.
    pub mode: GeolocationMode,
    /// Unix epoch milliseconds. Always present once the service returns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
    /// Whether the fix is older than the service's stale tolerance.
    #[serde(default)]
    pub is_stale: bool,
}

impl LocationState {
    /// The coordinate of this fix.
    #[must_use]
    pub const fn position(&self) -> LatLng {
        LatLng {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// Why a single provider attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationErrorCode {
    /// The user or policy refused location access.
    PermissionDenied,
    /// The sensor or service is switched off or absent.
    ProviderOff,
    /// No fix arrived within the attempt's time budget.
    Timeout,
    /// Anything else.
    Unknown,
}

impl fmt::Display for LocationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ProviderOff => "PROVIDER_OFF",
            Self::Timeout => "TIMEOUT",
            Self::Unknown => "UNKNOWN",
        })
    }
}

/// A recorded attempt failure, as reported in [`LocationServiceError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationError {
    /// Failure category.
    pub code: LocationErrorCode,
    /// Human-readable detail.
    pub message: String,
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Failure of a single [`LocationProvider::locate`] call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}: {message}")]
pub struct ProviderError {
    /// Failure category.
    pub reason: LocationErrorCode,
    /// Human-readable detail.
    pub message: String,
}

impl ProviderError {
    /// Creates an error with the given category.
    pub fn new(reason: LocationErrorCode, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    /// Shorthand for [`LocationErrorCode::PermissionDenied`].
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(LocationErrorCode::PermissionDenied, message)
    }

    /// Shorthand for [`LocationErrorCode::ProviderOff`].
    pub fn provider_off(message: impl Into<String>) -> Self {
        Self::new(LocationErrorCode::ProviderOff, message)
    }

    /// Shorthand for [`LocationErrorCode::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(LocationErrorCode::Timeout, message)
    }

    /// Shorthand for [`LocationErrorCode::Unknown`].
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LocationErrorCode::Unknown, message)
    }
}

impl From<ProviderError> for LocationError {
    fn from(error: ProviderError) -> Self {
        Self {
            code: error.reason,
            message: error.message,
        }
    }
}

/// Parameters handed to a provider for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocateRequest {
    /// Mode this attempt runs in.
    pub mode: GeolocationMode,
    /// Time budget the provider must honor.
    pub timeout: Duration,
}

/// One concrete location-acquisition strategy.
///
/// The service only calls [`locate`](Self::locate) for modes where
/// [`supports`](Self::supports) returned `true`.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Stable identifier used in logs.
    fn id(&self) -> &str;

    /// Whether this provider can produce fixes in `mode`.
    fn supports(&self, mode: GeolocationMode) -> bool;

    /// Produce one fix.
    ///
    /// # Errors
    /// Returns a [`ProviderError`] describing why no fix was produced.
    async fn locate(&self, request: LocateRequest) -> Result<LocationState, ProviderError>;
}
