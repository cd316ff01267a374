use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::Notify;
use tracing::{debug, warn};

const BASE_DELAY: Duration = Duration::from_millis(250);
const MULTIPLIER: f64 = 2.0;
const MAX_SINGLE_DELAY: Duration = Duration::from_secs(8);
const JITTER_FRACTION: f64 = 0.2;

/// Lightweight cooperative cancellation signal. The teacher's stack doesn't
/// carry `tokio-util`, so this mirrors `tokio_util::sync::CancellationToken`'s
/// shape with a single `Arc<Notify>` instead of pulling in the crate for one
/// type.
#[derive(Clone, Default)]
pub struct CancellationToken {
    notify: Arc<Notify>,
    cancelled: Arc<std::sync::atomic::AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, std::sync::atomic::Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(std::sync::atomic::Ordering::SeqCst)
    }

    async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.notify.notified().await;
    }
}

#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    Succeeded(T),
    Exhausted(E),
    Cancelled,
}

/// Run `attempt` under a bounded exponential-backoff envelope.
///
/// `max_attempts` is the total attempt count (1 initial + retries). Delays
/// are non-decreasing, capped at [`MAX_SINGLE_DELAY`], and jittered by
/// ±[`JITTER_FRACTION`]. Only errors for which `is_retryable` returns true
/// are retried; any other error is returned immediately as `Exhausted`.
pub async fn retry_with_backoff<T, E, F, Fut>(
    max_attempts: u32,
    cancellation: &CancellationToken,
    is_retryable: impl Fn(&E) -> bool,
    mut attempt: F,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = max_attempts.max(1);
    let mut delay = BASE_DELAY;

    for n in 1..=max_attempts {
        if cancellation.is_cancelled() {
            return RetryOutcome::Cancelled;
        }

        let call = attempt(n);
        let result = tokio::select! {
            res = call => res,
            _ = cancellation.cancelled() => return RetryOutcome::Cancelled,
        };

        match result {
            Ok(value) => return RetryOutcome::Succeeded(value),
            Err(err) => {
                let retryable = is_retryable(&err);
                if !retryable || n == max_attempts {
                    warn!(attempt = n, max_attempts, retryable, "provisioning attempt failed, giving up");
                    return RetryOutcome::Exhausted(err);
                }

                let jittered = jitter(delay);
                debug!(attempt = n, max_attempts, delay_ms = jittered.as_millis() as u64, "provisioning attempt failed, retrying");

                tokio::select! {
                    _ = tokio::time::sleep(jittered) => {}
                    _ = cancellation.cancelled() => return RetryOutcome::Cancelled,
                }

                delay = Duration::from_secs_f64((delay.as_secs_f64() * MULTIPLIER).min(MAX_SINGLE_DELAY.as_secs_f64()));
            }
        }
    }

    unreachable!("loop always returns by max_attempts iteration")
}

fn jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let factor = 1.0 + rng.gen_range(-JITTER_FRACTION..=JITTER_FRACTION);
    Duration::from_secs_f64((delay.as_secs_f64() * factor).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_first_try() {
        let token = CancellationToken::new();
        let outcome = retry_with_backoff(
            5,
            &token,
            |_: &&str| true,
            |_n| async { Ok::<_, &str>(42) },
        )
        .await;
        assert!(matches!(outcome, RetryOutcome::Succeeded(42)));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_then_succeeds() {
        let token = CancellationToken::new();
        let calls = AtomicU32::new(0);
        let outcome = retry_with_backoff(
            5,
            &token,
            |_: &&str| true,
            |_n| {
                let prior = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if prior < 2 {
                        Err("transient")
                    } else {
                        Ok(99)
                    }
                }
            },
        )
        .await;
        assert!(matches!(outcome, RetryOutcome::Succeeded(99)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_attempts() {
        let token = CancellationToken::new();
        let calls = AtomicU32::new(0);
        let outcome = retry_with_backoff(
            3,
            &token,
            |_: &&str| true,
            |_n| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<i32, _>("permanent") }
            },
        )
        .await;
        assert!(matches!(outcome, RetryOutcome::Exhausted("permanent")));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_stops_immediately() {
        let token = CancellationToken::new();
        let calls = AtomicU32::new(0);
        let outcome = retry_with_backoff(
            5,
            &token,
            |_: &&str| false,
            |_n| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<i32, _>("rejected") }
            },
        )
        .await;
        assert!(matches!(outcome, RetryOutcome::Exhausted("rejected")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
