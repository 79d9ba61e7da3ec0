use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::{
    Clock, GeolocationMode, LocateRequest, LocationError, LocationProvider, LocationState,
    ProviderError, SystemClock,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5_000);
const DEFAULT_STALE_TOLERANCE: Duration = Duration::from_millis(120_000);

/// Errors surfaced by [`LocationService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationServiceError {
    /// The service was constructed without providers.
    #[error("location service requires at least one provider")]
    NoProviders,
    /// Every attempt failed and no usable snapshot was cached.
    #[error("unable to acquire location ({} attempts failed)", .errors.len())]
    Exhausted {
        /// One entry per failed attempt, in attempt order.
        errors: Vec<LocationError>,
    },
}

/// Construction-time configuration for [`LocationService`].
#[derive(Clone)]
pub struct LocationServiceOptions {
    /// Mode used when a request doesn't name one, until a fix in another mode succeeds.
    pub default_mode: GeolocationMode,
    /// Per-attempt time budget when a request doesn't name one.
    pub default_timeout: Duration,
    /// Age after which a cached fix is reported stale.
    pub stale_tolerance: Duration,
    /// Whether providers of the alternate mode are tried after the desired ones.
    pub allow_mode_fallback: bool,
    /// Time source for snapshots and staleness.
    pub clock: Arc<dyn Clock>,
}

impl Default for LocationServiceOptions {
    fn default() -> Self {
        Self {
            default_mode: GeolocationMode::BatterySaving,
            default_timeout: DEFAULT_TIMEOUT,
            stale_tolerance: DEFAULT_STALE_TOLERANCE,
            allow_mode_fallback: true,
            clock: Arc::new(SystemClock),
        }
    }
}

impl LocationServiceOptions {
    /// Sets the initial preferred mode.
    #[must_use]
    pub const fn with_default_mode(mut self, mode: GeolocationMode) -> Self {
        self.default_mode = mode;
        self
    }

    /// Sets the per-attempt time budget.
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Sets the staleness threshold.
    #[must_use]
    pub const fn with_stale_tolerance(mut self, tolerance: Duration) -> Self {
        self.stale_tolerance = tolerance;
        self
    }

    /// Enables or disables alternate-mode fallback by default.
    #[must_use]
    pub const fn with_mode_fallback(mut self, allow: bool) -> Self {
        self.allow_mode_fallback = allow;
        self
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl fmt::Debug for LocationServiceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationServiceOptions")
            .field("default_mode", &self.default_mode)
            .field("default_timeout", &self.default_timeout)
            .field("stale_tolerance", &self.stale_tolerance)
            .field("allow_mode_fallback", &self.allow_mode_fallback)
            .finish_non_exhaustive()
    }
}

/// Per-call overrides. Unset fields fall back to the service configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    /// Desired mode.
    pub mode: Option<GeolocationMode>,
    /// Per-attempt time budget in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Whether to try the alternate mode's providers.
    pub allow_mode_fallback: Option<bool>,
    /// Whether a cached fix may be served when every provider fails.
    pub allow_stale: Option<bool>,
}

#[derive(Debug, Clone)]
struct Snapshot {
    state: LocationState,
    captured_at: u64,
}

#[derive(Debug)]
struct ServiceState {
    mode: GeolocationMode,
    last_known: Option<Snapshot>,
}

/// Ordered provider fallback with a single-slot last-known cache.
///
/// Attempts run strictly one after another. The preferred mode and the
/// cached snapshot are shared by every caller of one instance; concurrent
/// successes overwrite each other and the last writer wins.
pub struct LocationService {
    providers: Vec<Arc<dyn LocationProvider>>,
    default_timeout: Duration,
    stale_tolerance: Duration,
    allow_mode_fallback: bool,
    clock: Arc<dyn Clock>,
    state: Mutex<ServiceState>,
}

impl fmt::Debug for LocationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.providers.iter().map(|p| p.id()).collect();
        f.debug_struct("LocationService")
            .field("providers", &ids)
            .field("default_timeout", &self.default_timeout)
            .field("stale_tolerance", &self.stale_tolerance)
            .field("allow_mode_fallback", &self.allow_mode_fallback)
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}

impl LocationService {
    /// Creates a service trying `providers` in the given order.
    ///
    /// # Errors
    /// Returns [`LocationServiceError::NoProviders`] if `providers` is empty.
    pub fn new(
        providers: Vec<Arc<dyn LocationProvider>>,
        options: LocationServiceOptions,
    ) -> Result<Self, LocationServiceError> {
        if providers.is_empty() {
            return Err(LocationServiceError::NoProviders);
        }

        Ok(Self {
            providers,
            default_timeout: options.default_timeout,
            stale_tolerance: options.stale_tolerance,
            allow_mode_fallback: options.allow_mode_fallback,
            clock: options.clock,
            state: Mutex::new(ServiceState {
                mode: options.default_mode,
                last_known: None,
            }),
        })
    }

    /// The currently preferred mode.
    #[must_use]
    pub fn mode(&self) -> GeolocationMode {
        self.lock().mode
    }

    /// Overrides the preferred mode.
    pub fn set_mode(&self, mode: GeolocationMode) {
        self.lock().mode = mode;
    }

    /// The last successful fix, exactly as it was returned.
    #[must_use]
    pub fn last_known_location(&self) -> Option<LocationState> {
        self.lock().last_known.as_ref().map(|s| s.state.clone())
    }

    /// Acquires the current position.
    ///
    /// # Errors
    /// Returns [`LocationServiceError::Exhausted`] when every attempt failed
    /// and either no fix is cached or the request disallows stale data.
    pub async fn get_current_location(
        &self,
        request: &LocationRequest,
    ) -> Result<LocationState, LocationServiceError> {
        let desired_mode = request.mode.unwrap_or_else(|| self.mode());
        let timeout = request
            .timeout_ms
            .map_or(self.default_timeout, Duration::from_millis);
        let allow_mode_fallback = request
            .allow_mode_fallback
            .unwrap_or(self.allow_mode_fallback);

        let mut errors = Vec::new();

        for (provider, mode) in self.attempt_chain(desired_mode, allow_mode_fallback) {
            debug!("trying location provider `{}` in {mode}", provider.id());
            match provider.locate(LocateRequest { mode, timeout }).await {
                Ok(location) => match location.position().validate() {
                    Ok(_) => return Ok(self.record(location, mode)),
                    Err(err) => {
                        warn!("location provider `{}` returned {err}", provider.id());
                        errors.push(LocationError::from(ProviderError::unknown(format!(
                            "{} returned {err}",
                            provider.id()
                        ))));
                    }
                },
                Err(err) => {
                    warn!("location provider `{}` failed: {err}", provider.id());
                    errors.push(LocationError::from(err));
                }
            }
        }

        if request.allow_stale != Some(false) {
            if let Some(cached) = self.cached_location() {
                info!(
                    "all location providers failed, serving cached fix (stale: {})",
                    cached.is_stale
                );
                return Ok(cached);
            }
        }

        Err(LocationServiceError::Exhausted { errors })
    }

    fn attempt_chain(
        &self,
        desired_mode: GeolocationMode,
        allow_mode_fallback: bool,
    ) -> Vec<(&Arc<dyn LocationProvider>, GeolocationMode)> {
        let mut attempts = self.providers_for(desired_mode);
        if allow_mode_fallback {
            attempts.extend(self.providers_for(desired_mode.alternate()));
        }
        attempts
    }

    fn providers_for(
        &self,
        mode: GeolocationMode,
    ) -> Vec<(&Arc<dyn LocationProvider>, GeolocationMode)> {
        self.providers
            .iter()
            .filter(|provider| provider.supports(mode))
            .map(|provider| (provider, mode))
            .collect()
    }

    fn record(&self, location: LocationState, mode: GeolocationMode) -> LocationState {
        let now = self.clock.now_ms();
        let normalized = LocationState {
            mode,
            updated_at: Some(location.updated_at.unwrap_or(now)),
            is_stale: false,
            ..location
        };

        let mut state = self.lock();
        state.last_known = Some(Snapshot {
            state: normalized.clone(),
            captured_at: now,
        });
        state.mode = mode;
        normalized
    }

    fn cached_location(&self) -> Option<LocationState> {
        let snapshot = self.lock().last_known.clone()?;
        let age = self.clock.now_ms().saturating_sub(snapshot.captured_at);
        let tolerance = u64::try_from(self.stale_tolerance.as_millis()).unwrap_or(u64::MAX);
        Some(LocationState {
            is_stale: age > tolerance,
            ..snapshot.state
        })
    }

    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
