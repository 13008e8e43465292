//! Linear retry delays.

use std::time::Duration;

use backoff::backoff::Backoff;

/// Backoff whose k-th delay is `k * unit`, for at most `max_retries` delays.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    unit: Duration,
    max_retries: u32,
    attempt: u32,
}

impl LinearBackoff {
    pub fn new(unit: Duration, max_retries: u32) -> Self {
        Self {
            unit,
            max_retries,
            attempt: 0,
        }
    }
}

impl Backoff for LinearBackoff {
    fn reset(&mut self) {
        self.attempt = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_retries {
            return None;
        }
        self.attempt += 1;
        Some(self.unit * self.attempt)
    }
}
