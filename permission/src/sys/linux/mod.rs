//! Linux permission implementation.
//!
//! GeoClue2 decides per client over D-Bus; there is no separate runtime prompt
//! for a desktop process. Sandboxed builds (Flatpak/Snap) get the portal's
//! answer when the provider connects, so both checks report granted here.

use crate::{Permission, PermissionError, PermissionStatus};

pub(crate) async fn check(_permission: Permission) -> PermissionStatus {
    PermissionStatus::Granted
}

pub(crate) async fn request(_permission: Permission) -> Result<PermissionStatus, PermissionError> {
    Ok(PermissionStatus::Granted)
}
