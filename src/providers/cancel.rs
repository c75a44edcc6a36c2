//! Cancellation of in-flight backend calls.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{NornError, Result};

/// Drive `fut` to completion unless `signal` fires first.
///
/// A signal that has already fired fails before `fut` is polled, so no I/O
/// starts. When the signal fires mid-flight `fut` is dropped, which aborts
/// the underlying transport call.
pub(crate) async fn cancellable<F, T>(signal: Option<&CancellationToken>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let Some(signal) = signal else {
        return fut.await;
    };
    if signal.is_cancelled() {
        return Err(NornError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = signal.cancelled() => {
            debug!("backend call cancelled");
            Err(NornError::Cancelled)
        }
        result = fut => result,
    }
}
