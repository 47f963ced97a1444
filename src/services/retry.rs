//! Retry with exponential backoff for transactions aborted by a conflicting writer.
//!
//! Only errors reporting [`AppError::is_transient`] are retried. Every attempt re-runs the
//! whole transaction from scratch, so a retried operation either commits once or fails with
//! no visible effect.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::middleware::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(500),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Backoff before the retry that follows `attempt` (0-indexed), without jitter.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_ms = (self.initial_backoff.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32)) as u64;
        Duration::from_millis(backoff_ms).min(self.max_backoff)
    }

    fn jittered(&self, attempt: u32) -> Duration {
        let base = self.backoff_for_attempt(attempt);
        let jitter_ms = rand::thread_rng().gen_range(0..=base.as_millis().max(1) as u64);
        (base + Duration::from_millis(jitter_ms)).min(self.max_backoff)
    }

    pub async fn run<F, Fut, T>(&self, operation: &str, mut op: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => {
                    attempt += 1;
                    if attempt >= max_attempts {
                        warn!(operation, attempts = attempt, "transaction conflict, giving up");
                        return Err(AppError::TransactionConflict { attempts: attempt });
                    }
                    let wait = self.jittered(attempt - 1);
                    warn!(operation, attempt, ?wait, "transaction conflict, retrying");
                    tokio::time::sleep(wait).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
