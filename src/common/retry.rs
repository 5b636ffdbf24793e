// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Fixed-interval polling that fits `attempts` tries into `timeout`.
    pub fn polling(interval: Duration, timeout: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        let attempts = (timeout.as_millis() / interval.as_millis()).max(1) as usize;
        Self {
            attempts,
            initial_delay: interval,
            max_delay: interval,
        }
    }

    pub fn backoff(attempts: usize, initial_delay: Duration) -> Self {
        Self {
            attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Retry an async operation while `retry_on` accepts the error, doubling the delay
/// up to `policy.max_delay`.
pub async fn retry_when<F, Fut, T, E, P>(
    mut op: F,
    policy: RetryPolicy,
    retry_on: P,
) -> Result<T, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < policy.attempts && retry_on(&e) => {
                sleep(delay).await;
                delay = delay.saturating_mul(2).min(policy.max_delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let counter = AtomicUsize::new(0);
        let res: Result<u32, ()> = retry_when(
            |_| {
                let current = counter.fetch_add(1, Ordering::Relaxed);
                async move { if current < 2 { Err(()) } else { Ok(7) } }
            },
            RetryPolicy::backoff(4, Duration::from_millis(1)),
            |_| true,
        )
        .await;

        assert_eq!(res.unwrap(), 7);
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn stops_on_rejected_error() {
        let counter = AtomicUsize::new(0);
        let res: Result<u32, &str> = retry_when(
            |_| {
                counter.fetch_add(1, Ordering::Relaxed);
                async move { Err("fatal") }
            },
            RetryPolicy::backoff(5, Duration::from_millis(1)),
            |e| *e != "fatal",
        )
        .await;

        assert_eq!(res, Err("fatal"));
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn polling_policy_fits_timeout() {
        let policy = RetryPolicy::polling(Duration::from_millis(250), Duration::from_secs(2));
        assert_eq!(policy.attempts, 8);
        assert_eq!(policy.max_delay, Duration::from_millis(250));
    }
}
