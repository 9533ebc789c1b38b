//! services/api/src/retry.rs
//!
//! The bounded fixed-delay retry policy shared by the content-generation
//! loop and the list-after-save backoff. Fixed delays, not exponential: the
//! upstream causes (provider hiccups, read-after-write lag) resolve within a
//! second or not at all.

use std::future::Future;
use std::time::Duration;

/// A bounded retry loop with a fixed delay between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// `attempts` must be at least 1.
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Runs `op` until it succeeds or the attempt budget is exhausted,
    /// sleeping the fixed delay between attempts. The last error is
    /// surfaced only after all attempts failed.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.attempts {
                        return Err(err);
                    }
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }

    /// Runs `op` until `accept` approves its output or the attempt budget is
    /// exhausted, returning the last output either way. Errors short-circuit
    /// immediately. Used for the empty-list read-after-save backoff, where an
    /// empty result is not an error but is worth retrying.
    pub async fn run_until<T, E, F, Fut, P>(&self, mut op: F, accept: P) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&T) -> bool,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let value = op(attempt).await?;
            if accept(&value) || attempt >= self.attempts {
                return Ok(value);
            }
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_first_attempt_without_sleeping() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let start = Instant::now();
        let result: Result<u32, &str> = policy.run(|_| async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn makes_exactly_three_attempts_with_one_second_gaps() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), String> = policy
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("attempt {} failed", attempt)) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two inter-attempt delays, at least one second each.
        assert!(start.elapsed() >= Duration::from_secs(2));
        // The last error is the one surfaced.
        assert_eq!(result.unwrap_err(), "attempt 3 failed");
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_midway_through_the_budget() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let result: Result<u32, &str> = policy
            .run(|attempt| async move {
                if attempt < 2 {
                    Err("not yet")
                } else {
                    Ok(attempt)
                }
            })
            .await;
        assert_eq!(result, Ok(2));
    }

    #[tokio::test(start_paused = true)]
    async fn run_until_returns_last_value_when_never_accepted() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let calls = AtomicU32::new(0);

        let result: Result<Vec<u32>, &str> = policy
            .run_until(
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(Vec::new()) }
                },
                |list: &Vec<u32>| !list.is_empty(),
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result, Ok(Vec::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn run_until_stops_as_soon_as_accepted() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let result: Result<Vec<u32>, &str> = policy
            .run_until(
                |attempt| async move {
                    if attempt == 2 {
                        Ok(vec![attempt])
                    } else {
                        Ok(Vec::new())
                    }
                },
                |list: &Vec<u32>| !list.is_empty(),
            )
            .await;
        assert_eq!(result, Ok(vec![2]));
    }
}
