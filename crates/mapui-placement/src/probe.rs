//! Bounded re-measurement of anchors that have not been laid out yet.
//!
//! A pin that was just inserted (or whose SVG is still loading) can report a
//! zero-size bounding box. [`AnchorProbe`] turns "measure again shortly" into
//! an explicit state machine: the host feeds it measurements and gets back
//! either a usable rectangle or the delay before the next try. The host owns
//! the timer.

use mapui_core::Rect;
use thiserror::Error;
use web_time::Duration;

use crate::retry::RetryPolicy;

/// What the host should do after a measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeStep {
    /// The anchor has a size; go ahead and place the popover.
    Ready(Rect),
    /// Measure again after this delay.
    RetryAfter(Duration),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    #[error(
        "anchor still zero-size after {attempts} measurements over {} ms",
        .waited.as_millis()
    )]
    Exhausted {
        attempts: u32,
        last: Rect,
        /// Sum of the waits handed out before giving up.
        waited: Duration,
    },
}

impl ProbeError {
    /// The last measured rectangle, usable as a point anchor.
    #[must_use]
    pub fn fallback_anchor(&self) -> Rect {
        match self {
            Self::Exhausted { last, .. } => *last,
        }
    }
}

/// Retry state for measuring one anchor.
#[derive(Debug, Clone)]
pub struct AnchorProbe {
    policy: RetryPolicy,
    attempts: u32,
    waited: Duration,
}

impl AnchorProbe {
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
            waited: Duration::ZERO,
        }
    }

    /// Feed one measurement.
    pub fn observe(&mut self, rect: Rect) -> Result<ProbeStep, ProbeError> {
        let rect = rect.sanitized();
        self.attempts = self.attempts.saturating_add(1);

        if !rect.is_degenerate() {
            return Ok(ProbeStep::Ready(rect));
        }

        let retry = self.attempts - 1;
        tracing::warn!(
            message = "anchor.degenerate",
            attempt = self.attempts,
            max_retries = self.policy.max_retries,
            remaining_ms = self.remaining().as_millis() as u64,
        );

        if retry < self.policy.max_retries {
            let wait = self.policy.delay(retry);
            self.waited += wait;
            Ok(ProbeStep::RetryAfter(wait))
        } else {
            Err(ProbeError::Exhausted {
                attempts: self.attempts,
                last: rect,
                waited: self.waited,
            })
        }
    }

    /// Measurements fed so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Waiting time the policy still allows for this anchor.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.policy.total_max_delay().saturating_sub(self.waited)
    }

    /// Start over for a new anchor.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.waited = Duration::ZERO;
    }
}
