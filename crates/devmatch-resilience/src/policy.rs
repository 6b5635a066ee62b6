// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Linear backoff retry policy.

use std::time::Duration;

/// What to do with a job whose call just failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-enqueue after the given delay.
    Retry(Duration),
    /// The attempt budget is spent; drop the job.
    GiveUp,
}

/// Linear backoff: the `n`th failure waits `n * step` before the next try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    step: Duration,
}

impl RetryPolicy {
    /// A policy waiting `step`, `2 * step`, `3 * step`, ...
    pub fn linear(step: Duration) -> Self {
        Self { step }
    }

    /// Backoff step.
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Decide the fate of a job after a failed call.
    ///
    /// `attempts` is the failure count *after* incrementing for the call that
    /// just failed. The job is retried while `attempts <= max_attempts`.
    pub fn decide(&self, attempts: u32, max_attempts: u32) -> RetryDecision {
        if attempts <= max_attempts {
            RetryDecision::Retry(self.step.saturating_mul(attempts))
        } else {
            RetryDecision::GiveUp
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::linear(Duration::from_secs(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_grow_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.decide(1, 3), RetryDecision::Retry(Duration::from_secs(3)));
        assert_eq!(policy.decide(2, 3), RetryDecision::Retry(Duration::from_secs(6)));
        assert_eq!(policy.decide(3, 3), RetryDecision::Retry(Duration::from_secs(9)));
    }

    #[test]
    fn gives_up_once_attempts_exceed_max() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.decide(4, 3), RetryDecision::GiveUp);
        assert_eq!(policy.decide(3, 2), RetryDecision::GiveUp);
    }

    #[test]
    fn custom_step() {
        let policy = RetryPolicy::linear(Duration::from_millis(10));
        assert_eq!(policy.step(), Duration::from_millis(10));
        assert_eq!(policy.decide(2, 5), RetryDecision::Retry(Duration::from_millis(20)));
    }
}
