//! Utility functions.

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info};

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Run a collaborator call with a per-attempt deadline and at most one
/// retry. A stuck oracle or executor must not stall unrelated work.
///
/// The first attempt is retried on either timeout or error; the second
/// attempt's error is returned as-is, and a second timeout is mapped
/// through `on_timeout`.
pub async fn with_timeout_retry<T, E, F, Fut>(
    deadline_ms: u64,
    on_timeout: impl Fn(u64) -> E,
    op: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let deadline = Duration::from_millis(deadline_ms);

    match timeout(deadline, op()).await {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(_)) => debug!("Collaborator call failed, retrying once"),
        Err(_) => debug!(deadline_ms, "Collaborator call timed out, retrying once"),
    }

    match timeout(deadline, op()).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout(deadline_ms)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn returns_first_success_without_retry() {
        let attempts = AtomicU32::new(0);

        let result: Result<u32, &str> = with_timeout_retry(100, |_| "timeout", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_exactly_once_on_error() {
        let attempts = AtomicU32::new(0);

        let result: Result<u32, &str> = with_timeout_retry(100, |_| "timeout", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err("transient")
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn persistent_error_surfaces_after_one_retry() {
        let attempts = AtomicU32::new(0);

        let result: Result<u32, &str> = with_timeout_retry(100, |_| "timeout", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err("down") }
        })
        .await;

        assert_eq!(result, Err("down"));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn timeout_maps_through_on_timeout() {
        let result: Result<u32, String> =
            with_timeout_retry(10, |ms| format!("timed out after {}ms", ms), || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(1)
            })
            .await;

        assert_eq!(result, Err("timed out after 10ms".to_string()));
    }
}
