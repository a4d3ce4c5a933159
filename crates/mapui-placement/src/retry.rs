// SPDX-License-Identifier: Apache-2.0
//! Re-measurement schedule for anchors that report a zero-size box.
//!
//! A pin measured before layout has no size yet. [`RetryPolicy`] tells the
//! host how long to wait before measuring it again and how many times to try.
//! Nothing here sleeps: the host schedules each wait on its own event loop
//! (`setTimeout`, a frame callback, a test clock).
//!
//! Waits follow fixed formulas, so a replay of the same measurements sees the
//! same schedule.
//!
//! ```
//! use mapui_placement::retry::{BackoffStrategy, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(3, BackoffStrategy::Linear { base_ms: 20, max_ms: 50 });
//! let waits: Vec<_> = policy.schedule().collect();
//! assert_eq!(
//!     waits,
//!     [20, 40, 50].map(Duration::from_millis).to_vec()
//! );
//! assert_eq!(policy.total_max_delay(), Duration::from_millis(110));
//! ```

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use web_time::Duration;

/// How the wait grows between re-measurements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Same wait every time; the usual "try again in 50 ms".
    Fixed { delay_ms: u64 },
    /// `base_ms` doubled per retry, never above `max_ms`.
    Exponential { base_ms: u64, max_ms: u64 },
    /// `base_ms` times the retry number, never above `max_ms`.
    Linear { base_ms: u64, max_ms: u64 },
}

impl BackoffStrategy {
    /// Milliseconds to wait before retry `retry` (0-based).
    fn wait_ms(&self, retry: u32) -> u64 {
        match *self {
            Self::Fixed { delay_ms } => delay_ms,
            Self::Exponential { base_ms, max_ms } => {
                let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
                base_ms.saturating_mul(factor).min(max_ms)
            }
            Self::Linear { base_ms, max_ms } => base_ms
                .saturating_mul(u64::from(retry).saturating_add(1))
                .min(max_ms),
        }
    }

    /// `(base_ms, max_ms)` for the growing strategies.
    fn bounds(&self) -> Option<(u64, u64)> {
        match *self {
            Self::Fixed { .. } => None,
            Self::Exponential { base_ms, max_ms } | Self::Linear { base_ms, max_ms } => {
                Some((base_ms, max_ms))
            }
        }
    }
}

/// How often, and after which waits, a zero-size anchor is measured again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Re-measurements after the first one. `0` gives up immediately.
    pub max_retries: u32,
    pub backoff: BackoffStrategy,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, backoff: BackoffStrategy) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Wait before retry `retry` (0-based).
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        Duration::from_millis(self.backoff.wait_ms(retry))
    }

    /// Every wait the policy allows, in order.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries).map(|retry| self.delay(retry))
    }

    /// Longest the host can spend waiting on one anchor.
    #[must_use]
    pub fn total_max_delay(&self) -> Duration {
        self.schedule().sum()
    }

    /// Problems with this policy, as `anchor_retry.*` config messages.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some((base_ms, max_ms)) = self.backoff.bounds().filter(|(base, max)| max < base) {
            errors.push(format!(
                "anchor_retry.backoff.max_ms ({max_ms}) must be at least base_ms ({base_ms})"
            ));
        }
        errors
    }
}

impl Default for RetryPolicy {
    /// Three re-measurements, 50 ms apart.
    fn default() -> Self {
        Self::new(3, BackoffStrategy::Fixed { delay_ms: 50 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_millis).collect()
    }

    #[test]
    fn default_retries_three_times_at_fifty_ms() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.schedule().collect::<Vec<_>>(), millis(&[50, 50, 50]));
        assert_eq!(policy.total_max_delay(), Duration::from_millis(150));
    }

    #[test]
    fn exponential_doubles_up_to_cap() {
        let policy = RetryPolicy::new(
            4,
            BackoffStrategy::Exponential {
                base_ms: 25,
                max_ms: 120,
            },
        );
        assert_eq!(
            policy.schedule().collect::<Vec<_>>(),
            millis(&[25, 50, 100, 120])
        );
    }

    #[test]
    fn linear_grows_by_base() {
        let policy = RetryPolicy::new(
            3,
            BackoffStrategy::Linear {
                base_ms: 100,
                max_ms: 250,
            },
        );
        assert_eq!(
            policy.schedule().collect::<Vec<_>>(),
            millis(&[100, 200, 250])
        );
    }

    #[test]
    fn zero_retries_has_no_waits() {
        let policy = RetryPolicy::new(0, BackoffStrategy::Fixed { delay_ms: 50 });
        assert_eq!(policy.schedule().count(), 0);
        assert_eq!(policy.total_max_delay(), Duration::ZERO);
    }

    #[test]
    fn huge_retry_numbers_saturate() {
        let exponential = BackoffStrategy::Exponential {
            base_ms: u64::MAX / 2,
            max_ms: u64::MAX,
        };
        assert_eq!(exponential.wait_ms(70), u64::MAX);
        let linear = BackoffStrategy::Linear {
            base_ms: u64::MAX,
            max_ms: 10,
        };
        assert_eq!(linear.wait_ms(u32::MAX), 10);
    }

    #[test]
    fn cap_below_base_is_rejected() {
        let policy = RetryPolicy::new(
            2,
            BackoffStrategy::Linear {
                base_ms: 100,
                max_ms: 50,
            },
        );
        let errors = policy.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("anchor_retry.backoff.max_ms"), "{errors:?}");
        assert!(RetryPolicy::default().validate().is_empty());
    }

    #[test]
    fn backoff_serializes_with_kind_tag() {
        let json = serde_json::to_string(&BackoffStrategy::Linear {
            base_ms: 10,
            max_ms: 40,
        })
        .expect("encode backoff");
        assert_eq!(json, r#"{"kind":"linear","base_ms":10,"max_ms":40}"#);
    }
}
