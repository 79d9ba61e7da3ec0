//! Concrete [`LocationProvider`](crate::LocationProvider) strategies.

mod device;
mod forwarded;
mod gated;
mod mock;
mod timeout;

pub use device::DeviceLocationProvider;
pub use forwarded::ForwardedLocationProvider;
pub use gated::PermissionGatedProvider;
pub use mock::{DEFAULT_MOCK_POSITION, MockLocationProvider};
pub use timeout::race_timeout;
