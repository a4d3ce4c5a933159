// SPDX-License-Identifier: Apache-2.0
//! Arrow offset solver.
//!
//! Runs after the popover has been laid out. The layout engine may not honor
//! the estimated size, so the arrow position is derived from the *rendered*
//! popover rectangle: find the popover edge facing the anchor, then project
//! the anchor's center onto that edge.

#![forbid(unsafe_code)]

use std::fmt;

use mapui_core::{Rect, clamp_span};
use serde::{Deserialize, Serialize};

use crate::config::PlacementConfig;
use crate::solver::Side;

/// A popover edge that can carry the arrow glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    /// Tie-break order when two edges face the anchor equally.
    pub const ORDER: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    /// The edge facing the anchor for a popover placed on `side` of it.
    ///
    /// A popover below its anchor points up from its top edge.
    #[must_use]
    pub fn facing(side: Side) -> Self {
        match side {
            Side::Bottom => Self::Top,
            Side::Top => Self::Bottom,
            Side::Right => Self::Left,
            Side::Left => Self::Right,
        }
    }

    /// Whether the edge runs horizontally (offset measured along X).
    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where along an edge the arrow sits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum ArrowOffset {
    /// Distance from the edge's start corner (left or top).
    Pixels(f64),
    /// Middle of the edge; used before the popover has been measured.
    Centered,
}

impl ArrowOffset {
    /// CSS length for the arrow's `left`/`top` property.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Pixels(px) => format!("{px}px"),
            Self::Centered => "50%".to_string(),
        }
    }

    /// Pixel value, if measured.
    #[must_use]
    pub fn pixels(&self) -> Option<f64> {
        match self {
            Self::Pixels(px) => Some(*px),
            Self::Centered => None,
        }
    }
}

/// Arrow position on the rendered popover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowPlacement {
    pub side: Edge,
    pub offset: ArrowOffset,
}

impl ArrowPlacement {
    /// Centered arrow on the edge facing a popover placed on `hint`.
    #[must_use]
    pub fn neutral(hint: Option<Side>) -> Self {
        Self {
            side: hint.map_or(Edge::Top, Edge::facing),
            offset: ArrowOffset::Centered,
        }
    }
}

/// Compute the arrow position for a rendered popover.
///
/// `rendered` is `None` (or zero-size) until the popover has been laid out;
/// the neutral default is returned and the caller asks again after render.
/// The rendered geometry wins over `hint` whenever the anchor center lies
/// outside the popover.
#[must_use]
pub fn compute_arrow_offset(
    anchor: Rect,
    rendered: Option<Rect>,
    hint: Option<Side>,
    config: &PlacementConfig,
) -> ArrowPlacement {
    let Some(popover) = rendered.map(Rect::sanitized).filter(|r| !r.is_empty()) else {
        let neutral = ArrowPlacement::neutral(hint);
        tracing::debug!(
            message = "placement.arrow",
            side = neutral.side.as_str(),
            measured = false,
        );
        return neutral;
    };

    let c = anchor.sanitized().center();
    let gap = |edge: Edge| match edge {
        Edge::Top => popover.top - c.y,
        Edge::Bottom => c.y - popover.bottom(),
        Edge::Left => popover.left - c.x,
        Edge::Right => c.x - popover.right(),
    };

    let mut widest = Edge::ORDER[0];
    for edge in &Edge::ORDER[1..] {
        if gap(*edge) > gap(widest) {
            widest = *edge;
        }
    }
    let side = if popover.contains(c) {
        hint.map_or(widest, Edge::facing)
    } else {
        widest
    };

    let (position, length) = if side.is_horizontal() {
        (c.x - popover.left, popover.width)
    } else {
        (c.y - popover.top, popover.height)
    };
    // clamp_span collapses to the midpoint when the popover is too small.
    let margin = config.arrow_margin.max(0.0);
    let offset = clamp_span(position, margin, length - margin);

    tracing::debug!(
        message = "placement.arrow",
        side = side.as_str(),
        offset,
        measured = true,
    );

    ArrowPlacement {
        side,
        offset: ArrowOffset::Pixels(offset),
    }
}
