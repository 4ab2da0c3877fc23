//! Retry schedule for `op` calls that fail with a TLS handshake timeout
//!
//! `op` talks to the 1Password servers on every call and intermittently
//! reports `TLS handshake timeout`. Those calls are repeated on a growing
//! delay; every other failure is returned immediately.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Extra `op` invocations allowed after the first one times out.
    /// Zero gives up on the first TLS timeout.
    pub max_attempts: u32,

    /// Wait before the first repeat, in milliseconds
    pub initial_delay_ms: u64,

    /// Ceiling on any single wait, in milliseconds
    pub max_delay_ms: u64,

    /// Factor applied to the wait after each timeout
    pub backoff_multiplier: f32,

    /// Fraction of the wait randomised up or down
    pub jitter_factor: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 250,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Fail on the first TLS timeout
    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Wait before repeating the `op` call after timeout number `attempt` (0-based)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let wait_ms = (self.initial_delay_ms as f64
            * (self.backoff_multiplier as f64).powi(exponent))
        .min(self.max_delay_ms as f64);

        let spread = wait_ms * self.jitter_factor as f64;
        let offset = rand::thread_rng().gen_range(-1.0..=1.0) * spread;

        Duration::from_millis((wait_ms + offset).max(0.0) as u64)
    }

    /// Whether another `op` call is allowed after `attempt` timeouts
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
