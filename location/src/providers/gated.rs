use async_trait::async_trait;
use log::debug;
use strollkit_permission::{Permission, PermissionGate, PermissionStatus};

use crate::{GeolocationMode, LocateRequest, LocationProvider, LocationState, ProviderError};

/// Asks a [`PermissionGate`] before every delegated fix.
///
/// High-accuracy attempts ask for [`Permission::PreciseLocation`], battery
/// saving ones for [`Permission::Location`]. An undetermined status triggers a
/// request; anything other than granted fails the attempt with
/// `PERMISSION_DENIED`.
#[derive(Debug)]
pub struct PermissionGatedProvider<P, G> {
    inner: P,
    gate: G,
}

impl<P, G> PermissionGatedProvider<P, G> {
    /// Wraps `inner` behind `gate`.
    pub const fn new(inner: P, gate: G) -> Self {
        Self { inner, gate }
    }

    /// The wrapped provider.
    pub const fn inner(&self) -> &P {
        &self.inner
    }
}

const fn permission_for(mode: GeolocationMode) -> Permission {
    match mode {
        GeolocationMode::HighAccuracy => Permission::PreciseLocation,
        GeolocationMode::BatterySaving => Permission::Location,
    }
}

#[async_trait]
impl<P, G> LocationProvider for PermissionGatedProvider<P, G>
where
    P: LocationProvider,
    G: PermissionGate,
{
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn supports(&self, mode: GeolocationMode) -> bool {
        self.inner.supports(mode)
    }

    async fn locate(&self, request: LocateRequest) -> Result<LocationState, ProviderError> {
        let permission = permission_for(request.mode);
        let status = self
            .gate
            .ensure(permission)
            .await
            .map_err(|e| ProviderError::unknown(format!("permission check failed: {e}")))?;

        match status {
            PermissionStatus::Granted => self.inner.locate(request).await,
            other => {
                debug!("{permission:?} is {other:?}, skipping `{}`", self.inner.id());
                Err(ProviderError::permission_denied(format!(
                    "{permission:?} permission is {other:?}"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use strollkit_permission::{PermissionError, StaticPermissions};

    use super::*;
    use crate::LocationErrorCode;
    use crate::providers::MockLocationProvider;

    fn request(mode: GeolocationMode) -> LocateRequest {
        LocateRequest {
            mode,
            timeout: Duration::from_millis(100),
        }
    }

    #[tokio::test]
    async fn granted_delegates_to_inner_provider() {
        let provider =
            PermissionGatedProvider::new(MockLocationProvider::default(), StaticPermissions::granted());
        let fix = provider
            .locate(request(GeolocationMode::HighAccuracy))
            .await
            .unwrap();
        assert_eq!(fix.mode, GeolocationMode::HighAccuracy);
        assert_eq!(provider.id(), "mock");
    }

    #[tokio::test]
    async fn denied_and_restricted_map_to_permission_denied() {
        for status in [PermissionStatus::Denied, PermissionStatus::Restricted] {
            let provider = PermissionGatedProvider::new(
                MockLocationProvider::default(),
                StaticPermissions::new(status),
            );
            let err = provider
                .locate(request(GeolocationMode::BatterySaving))
                .await
                .unwrap_err();
            assert_eq!(err.reason, LocationErrorCode::PermissionDenied);
        }
    }

    struct Broken;

    #[async_trait]
    impl PermissionGate for Broken {
        async fn check(&self, _permission: Permission) -> PermissionStatus {
            PermissionStatus::NotDetermined
        }

        async fn request(
            &self,
            _permission: Permission,
        ) -> Result<PermissionStatus, PermissionError> {
            Err(PermissionError::NotSupported)
        }
    }

    #[tokio::test]
    async fn gate_errors_map_to_unknown() {
        let provider = PermissionGatedProvider::new(MockLocationProvider::default(), Broken);
        let err = provider
            .locate(request(GeolocationMode::HighAccuracy))
            .await
            .unwrap_err();
        assert_eq!(err.reason, LocationErrorCode::Unknown);
    }
}
