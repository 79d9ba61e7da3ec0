//! Location permission handling.
//!
//! Providers that touch a device sensor ask a [`PermissionGate`] first. The
//! platform-backed gate is [`SystemPermissions`]; [`StaticPermissions`] answers
//! with a fixed status for hosts that resolved permission elsewhere.

#![warn(missing_docs)]

/// Platform-specific implementations.
pub mod sys;

use async_trait::async_trait;

/// Types of permissions that can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Permission {
    /// Coarse device location.
    Location,
    /// Precise (satellite-grade) device location.
    PreciseLocation,
}

/// The current status of a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionStatus {
    /// Permission has been granted by the user.
    Granted,
    /// Permission has been denied by the user.
    Denied,
    /// Permission is restricted by policy.
    Restricted,
    /// Permission has not been requested yet.
    NotDetermined,
}

impl PermissionStatus {
    /// Returns `true` for [`PermissionStatus::Granted`].
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Errors that can occur when requesting permissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    /// The permission type is not supported on this platform.
    #[error("permission not supported on this platform")]
    NotSupported,
    /// An unknown error occurred.
    #[error("unknown error: {0}")]
    Unknown(String),
}

/// Check the current status of a permission without requesting it.
pub async fn check(permission: Permission) -> PermissionStatus {
    sys::check(permission).await
}

/// Request a permission from the user.
///
/// If the permission has already been granted or denied, this returns
/// the current status without showing a prompt.
///
/// # Errors
/// Returns a `PermissionError` if:
/// - The permission type is not supported on this platform.
/// - An underlying platform error occurs.
pub async fn request(permission: Permission) -> Result<PermissionStatus, PermissionError> {
    sys::request(permission).await
}

/// Something that can answer permission questions.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Current status without prompting.
    async fn check(&self, permission: Permission) -> PermissionStatus;

    /// Prompt if needed and return the resulting status.
    ///
    /// # Errors
    /// Returns a [`PermissionError`] if the platform cannot answer.
    async fn request(&self, permission: Permission) -> Result<PermissionStatus, PermissionError>;

    /// Checks, then requests only when the status is still undetermined.
    ///
    /// # Errors
    /// Propagates errors from [`PermissionGate::request`].
    async fn ensure(&self, permission: Permission) -> Result<PermissionStatus, PermissionError> {
        match self.check(permission).await {
            PermissionStatus::NotDetermined => {
                log::debug!("requesting {permission:?}");
                self.request(permission).await
            }
            status => Ok(status),
        }
    }
}

/// Gate backed by the host platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPermissions;

#[async_trait]
impl PermissionGate for SystemPermissions {
    async fn check(&self, permission: Permission) -> PermissionStatus {
        check(permission).await
    }

    async fn request(&self, permission: Permission) -> Result<PermissionStatus, PermissionError> {
        request(permission).await
    }
}

/// Gate that always reports the same status.
#[derive(Debug, Clone, Copy)]
pub struct StaticPermissions {
    status: PermissionStatus,
}

impl StaticPermissions {
    /// A gate answering `status` for every permission.
    #[must_use]
    pub const fn new(status: PermissionStatus) -> Self {
        Self { status }
    }

    /// A gate that grants everything.
    #[must_use]
    pub const fn granted() -> Self {
        Self::new(PermissionStatus::Granted)
    }
}

#[async_trait]
impl PermissionGate for StaticPermissions {
    async fn check(&self, _permission: Permission) -> PermissionStatus {
        self.status
    }

    async fn request(&self, _permission: Permission) -> Result<PermissionStatus, PermissionError> {
        Ok(self.status)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct PromptOnce {
        prompts: AtomicUsize,
    }

    #[async_trait]
    impl PermissionGate for PromptOnce {
        async fn check(&self, _permission: Permission) -> PermissionStatus {
            if self.prompts.load(Ordering::SeqCst) == 0 {
                PermissionStatus::NotDetermined
            } else {
                PermissionStatus::Granted
            }
        }

        async fn request(
            &self,
            _permission: Permission,
        ) -> Result<PermissionStatus, PermissionError> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            Ok(PermissionStatus::Granted)
        }
    }

    #[tokio::test]
    async fn ensure_prompts_only_when_undetermined() {
        let gate = PromptOnce {
            prompts: AtomicUsize::new(0),
        };

        assert_eq!(
            gate.ensure(Permission::Location).await,
            Ok(PermissionStatus::Granted)
        );
        assert_eq!(
            gate.ensure(Permission::Location).await,
            Ok(PermissionStatus::Granted)
        );
        assert_eq!(gate.prompts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn static_gate_never_changes_its_answer() {
        let gate = StaticPermissions::new(PermissionStatus::Denied);
        assert_eq!(
            gate.ensure(Permission::PreciseLocation).await,
            Ok(PermissionStatus::Denied)
        );
        assert!(!gate.check(Permission::Location).await.is_granted());
    }
}
