use std::future::Future;
use std::time::Duration;

use futures::future::{self, Either};
use futures_timer::Delay;

use crate::ProviderError;

/// Runs `attempt` against a `timeout` deadline.
///
/// The attempt is dropped when the deadline fires first, and the race yields
/// a [`TIMEOUT`](crate::LocationErrorCode::Timeout) error.
///
/// # Errors
/// Returns the attempt's own error, or a timeout error.
pub async fn race_timeout<T, F>(attempt: F, timeout: Duration) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    let attempt = Box::pin(attempt);
    let deadline = Delay::new(timeout);

    match future::select(attempt, deadline).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(ProviderError::timeout(format!(
            "no fix within {} ms",
            timeout.as_millis()
        ))),
    }
}
