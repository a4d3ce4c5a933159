//! Two-pass placement session.
//!
//! The real popover size is only known after the host has rendered it. A
//! session solves once with an estimate, then accepts the measured rectangle
//! and corrects itself:
//!
//! ```text
//! open() ──► Estimate ──measure()──► Measured ──settle()──► Settled
//!              ▲                                               │
//!              └──────────────────── resize() ◄────────────────┘
//! ```
//!
//! The optional settle pass covers layout engines that move the popover again
//! after mount; the host schedules it [`PlacementSession::settle_delay`] after
//! the measure pass. Opening a new session simply replaces the old one.

use mapui_core::{Rect, Size, Viewport};
use serde::{Deserialize, Serialize};

use crate::arrow::{ArrowPlacement, compute_arrow_offset};
use crate::config::PlacementConfig;
use crate::solver::{PlacementResult, compute_placement};

/// Where a session is in the estimate/measure/settle protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Solved from an estimated size; the arrow is not positioned yet.
    Estimate,
    /// Corrected against the first measurement.
    Measured,
    /// Corrected against a late measurement.
    Settled,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Estimate => "estimate",
            Self::Measured => "measured",
            Self::Settled => "settled",
        }
    }
}

/// Outcome of a measure or settle pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correction {
    pub placement: PlacementResult,
    pub arrow: ArrowPlacement,
    /// The placement differs from the one the host is currently showing.
    pub placement_changed: bool,
    pub stage: Stage,
}

/// Placement state for one open popover.
#[derive(Debug, Clone)]
pub struct PlacementSession {
    anchor: Rect,
    viewport: Viewport,
    config: PlacementConfig,
    size: Size,
    placement: PlacementResult,
    arrow: ArrowPlacement,
    stage: Stage,
}

impl PlacementSession {
    /// Solve with `estimate` (or the configured default size).
    #[must_use]
    pub fn open(
        anchor: Rect,
        estimate: Option<Size>,
        viewport: Viewport,
        config: &PlacementConfig,
    ) -> Self {
        let size = config.estimate_or_default(estimate);
        let placement = compute_placement(anchor, size, viewport, config);
        tracing::debug!(
            message = "placement.session",
            stage = Stage::Estimate.as_str(),
            width = size.width,
            height = size.height,
        );
        Self {
            anchor,
            viewport,
            config: config.clone(),
            size,
            placement,
            arrow: ArrowPlacement::neutral(Some(placement.side)),
            stage: Stage::Estimate,
        }
    }

    /// Second pass: correct against the rendered popover rectangle.
    pub fn measure(&mut self, rendered: Option<Rect>) -> Correction {
        self.correct(rendered, Stage::Measured)
    }

    /// Third pass, after [`Self::settle_delay`]. Same as [`Self::measure`]
    /// but ends in [`Stage::Settled`].
    pub fn settle(&mut self, rendered: Option<Rect>) -> Correction {
        self.correct(rendered, Stage::Settled)
    }

    /// Re-solve for a new viewport with the last known size.
    pub fn resize(&mut self, viewport: Viewport) -> PlacementResult {
        self.viewport = viewport;
        self.placement = compute_placement(self.anchor, self.size, viewport, &self.config);
        self.arrow = ArrowPlacement::neutral(Some(self.placement.side));
        self.stage = Stage::Estimate;
        tracing::debug!(
            message = "placement.session",
            stage = self.stage.as_str(),
            viewport_width = viewport.width,
            viewport_height = viewport.height,
        );
        self.placement
    }

    fn correct(&mut self, rendered: Option<Rect>, next: Stage) -> Correction {
        let previous = self.placement;

        if let Some(rect) = rendered.map(Rect::sanitized) {
            let measured = self.config.measured_or_default(rect.size());
            if measured.max_delta(self.size) > self.config.remeasure_tolerance {
                self.size = measured;
                self.placement =
                    compute_placement(self.anchor, measured, self.viewport, &self.config);
            }
        }

        self.arrow = compute_arrow_offset(
            self.anchor,
            rendered,
            Some(self.placement.side),
            &self.config,
        );
        self.stage = self.stage.max(next);

        let placement_changed = self.placement != previous;
        tracing::debug!(
            message = "placement.session",
            stage = self.stage.as_str(),
            placement_changed,
        );

        Correction {
            placement: self.placement,
            arrow: self.arrow,
            placement_changed,
            stage: self.stage,
        }
    }

    #[must_use]
    pub fn placement(&self) -> PlacementResult {
        self.placement
    }

    #[must_use]
    pub fn arrow(&self) -> ArrowPlacement {
        self.arrow
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Size the current placement was solved with.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Delay the host should wait before calling [`Self::settle`].
    #[must_use]
    pub fn settle_delay(&self) -> web_time::Duration {
        self.config.settle_delay()
    }
}
