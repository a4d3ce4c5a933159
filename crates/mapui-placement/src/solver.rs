// SPDX-License-Identifier: Apache-2.0
//! Position solver for anchored popovers.
//!
//! [`compute_placement`] chooses the side of the anchor a popover attaches to,
//! how it aligns along the perpendicular axis, and the two offsets a floating
//! layer needs to position it. The popover must fit the viewport, keep clear
//! of the reserved toolbar and timeline bands, and stay reachable by an arrow
//! pointing at the anchor's center.
//!
//! # Offsets
//!
//! - `side_offset` is measured from the anchor's **center** to the popover's
//!   near edge. It always exceeds the anchor half-extent, so the popover never
//!   covers the anchor.
//! - `align_offset` is the signed displacement of the popover's center from
//!   the anchor's center along the alignment axis (positive = right/down). It
//!   never exceeds `popover_extent / 2 - arrow_margin` in magnitude, so the
//!   arrow always lands on the popover body.
//!
//! # Side selection
//!
//! Sides are tried in the order bottom, top, right, left. The first one with
//! room for the popover plus its offset wins; if none has room, the side with
//! the most space is used with a slightly reduced offset. A top/bottom popover
//! that would still run into the toolbar is moved to the left side when that
//! side has room.
//!
//! # Example
//!
//! ```
//! use mapui_core::{Rect, Size, Viewport};
//! use mapui_placement::{Align, PlacementConfig, Side, compute_placement};
//!
//! let config = PlacementConfig::default();
//! let anchor = Rect::new(500.0, 400.0, 20.0, 20.0);
//! let placement = compute_placement(
//!     anchor,
//!     Size::new(500.0, 400.0),
//!     Viewport::new(1920.0, 1080.0),
//!     &config,
//! );
//! assert_eq!(placement.side, Side::Bottom);
//! assert_eq!(placement.align, Align::Center);
//! assert_eq!(placement.side_offset, 38.0);
//! ```

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use mapui_core::{Point, Rect, Size, Viewport, clamp_span};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PlacementConfig;

/// Which side of the anchor the popover attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// Preference order used when several sides have room.
    pub const PRIORITY: [Side; 4] = [Side::Bottom, Side::Top, Side::Right, Side::Left];

    /// Whether the popover stacks above/below the anchor.
    ///
    /// Vertical sides align along the horizontal axis and vice versa.
    #[must_use]
    pub fn is_vertical(self) -> bool {
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

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Side`] or [`Align`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} {value:?}")]
pub struct ParseDirectiveError {
    kind: &'static str,
    value: String,
}

impl FromStr for Side {
    type Err = ParseDirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(ParseDirectiveError {
                kind: "side",
                value: s.to_string(),
            }),
        }
    }
}

/// How the popover lines up with the anchor along the alignment axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Start,
    Center,
    End,
}

impl Align {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
        }
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Align {
    type Err = ParseDirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "center" => Ok(Self::Center),
            "end" => Ok(Self::End),
            _ => Err(ParseDirectiveError {
                kind: "align",
                value: s.to_string(),
            }),
        }
    }
}

/// Placement directives handed to the floating layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementResult {
    pub side: Side,
    pub align: Align,
    /// Distance from the anchor center to the popover's near edge.
    pub side_offset: f64,
    /// Popover center minus anchor center along the alignment axis.
    pub align_offset: f64,
    /// The chosen side had room for the whole popover.
    pub fits: bool,
    /// The toolbar-intrusion rule moved the popover to the left side.
    pub overridden: bool,
}

impl PlacementResult {
    /// The popover rectangle these directives describe for a popover of
    /// `popover` size around `anchor`.
    #[must_use]
    pub fn predicted_rect(&self, anchor: Rect, popover: Size) -> Rect {
        let c = anchor.center();
        let (w, h) = (popover.width, popover.height);
        match self.side {
            Side::Bottom => Rect::new(
                c.x + self.align_offset - w / 2.0,
                c.y + self.side_offset,
                w,
                h,
            ),
            Side::Top => Rect::new(
                c.x + self.align_offset - w / 2.0,
                c.y - self.side_offset - h,
                w,
                h,
            ),
            Side::Right => Rect::new(
                c.x + self.side_offset,
                c.y + self.align_offset - h / 2.0,
                w,
                h,
            ),
            Side::Left => Rect::new(
                c.x - self.side_offset - w,
                c.y + self.align_offset - h / 2.0,
                w,
                h,
            ),
        }
    }
}

/// Serializable input bundle for one placement, as sent by a host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub anchor: Rect,
    /// Estimated popover size; the configured default when absent.
    #[serde(default)]
    pub popover: Option<Size>,
    pub viewport: Viewport,
}

impl PlacementRequest {
    /// Solve with the estimate, or the configured default size.
    #[must_use]
    pub fn solve(&self, config: &PlacementConfig) -> PlacementResult {
        let size = config.estimate_or_default(self.popover);
        compute_placement(self.anchor, size, self.viewport, config)
    }
}

/// Compute where a popover of the estimated `popover` size should open.
///
/// Pure apart from a `tracing` debug event. Never panics: non-finite inputs
/// are treated as zero and a zero-size anchor is a valid point anchor.
#[must_use]
pub fn compute_placement(
    anchor: Rect,
    popover: Size,
    viewport: Viewport,
    config: &PlacementConfig,
) -> PlacementResult {
    let solver = Solver::new(
        anchor.sanitized(),
        popover.sanitized(),
        viewport.sanitized(),
        config,
    );
    let result = solver.solve();

    tracing::debug!(
        message = "placement.solve",
        side = result.side.as_str(),
        align = result.align.as_str(),
        side_offset = result.side_offset,
        align_offset = result.align_offset,
        fits = result.fits,
        overridden = result.overridden,
    );

    result
}

/// Geometry of the alignment axis for one side.
struct CrossAxis {
    /// Anchor center along the axis.
    pos: f64,
    /// Half the popover extent along the axis.
    half: f64,
    /// Allowed range for the popover center.
    lo: f64,
    hi: f64,
    /// Room between the anchor and the start/end limits of the axis.
    room_start: f64,
    room_end: f64,
    /// Viewport length along the axis.
    length: f64,
}

struct Solver<'a> {
    anchor: Rect,
    center: Point,
    popover: Size,
    viewport: Viewport,
    config: &'a PlacementConfig,
    toolbar_reserve: f64,
    top_reserve: f64,
    timeline_reserve: f64,
    /// Extra sideways clearance for anchors above the toolbar's start.
    corner_penalty: f64,
}

impl<'a> Solver<'a> {
    fn new(anchor: Rect, popover: Size, viewport: Viewport, config: &'a PlacementConfig) -> Self {
        let regions = &config.regions;
        let top_reserve = regions.top_reserve();
        Self {
            anchor,
            center: anchor.center(),
            popover,
            viewport,
            config,
            toolbar_reserve: regions.toolbar_reserve(),
            top_reserve,
            timeline_reserve: regions.timeline_reserve(),
            corner_penalty: if anchor.top < top_reserve {
                top_reserve
            } else {
                0.0
            },
        }
    }

    fn solve(&self) -> PlacementResult {
        let (side, _) = self.choose_side();
        let placement = self.place(side);

        if self.intrudes_toolbar(&placement) && side != Side::Left && self.fits(Side::Left) {
            return PlacementResult {
                overridden: true,
                ..self.place(Side::Left)
            };
        }
        placement
    }

    /// First fitting side in priority order, else the roomiest one.
    fn choose_side(&self) -> (Side, bool) {
        if let Some(side) = Side::PRIORITY.into_iter().find(|&side| self.fits(side)) {
            return (side, true);
        }
        let mut best = Side::PRIORITY[0];
        for side in &Side::PRIORITY[1..] {
            if self.space(*side) > self.space(best) {
                best = *side;
            }
        }
        (best, false)
    }

    fn place(&self, side: Side) -> PlacementResult {
        let fits = self.fits(side);
        let (align, align_offset) = self.align(side);
        PlacementResult {
            side,
            align,
            side_offset: self.side_offset(side, fits),
            align_offset,
            fits,
            overridden: false,
        }
    }

    fn half_extent(&self, side: Side) -> f64 {
        if side.is_vertical() {
            self.anchor.height / 2.0
        } else {
            self.anchor.width / 2.0
        }
    }

    /// Gap + arrow + anchor half-extent: the closest the popover may sit.
    fn min_offset(&self, side: Side) -> f64 {
        self.config.base_gap + self.config.arrow_size + self.half_extent(side)
    }

    fn popover_extent(&self, side: Side) -> f64 {
        if side.is_vertical() {
            self.popover.height
        } else {
            self.popover.width
        }
    }

    /// Usable distance from the anchor to the viewport edge on `side`, minus
    /// whatever reserved band lies in that direction.
    fn space(&self, side: Side) -> f64 {
        let margin = self.config.viewport_margin;
        match side {
            Side::Top => self.anchor.top - margin - self.top_reserve,
            Side::Right => {
                self.viewport.width
                    - self.anchor.right()
                    - margin
                    - self.toolbar_reserve
                    - self.corner_penalty
            }
            Side::Bottom => {
                self.viewport.height - self.anchor.bottom() - margin - self.timeline_reserve
            }
            Side::Left => self.anchor.left - margin - self.corner_penalty,
        }
    }

    fn fits(&self, side: Side) -> bool {
        self.space(side) >= self.popover_extent(side) + self.min_offset(side)
    }

    fn side_offset(&self, side: Side, fits: bool) -> f64 {
        let half = self.half_extent(side);
        let min_offset = self.min_offset(side);
        if fits {
            return min_offset;
        }
        let floor = half.ceil() + self.config.min_safe_clearance;
        floor
            .max(min_offset - self.config.forced_side_reduction)
            .max(half)
    }

    fn cross_axis(&self, side: Side) -> CrossAxis {
        let margin = self.config.viewport_margin;
        if side.is_vertical() {
            let half = self.popover.width / 2.0;
            let lo = margin + half;
            let pos = self.center.x;
            CrossAxis {
                pos,
                half,
                lo,
                hi: lo.max(self.viewport.width - margin - self.toolbar_reserve - half),
                room_start: pos - margin - self.corner_penalty,
                room_end: self.viewport.width
                    - pos
                    - margin
                    - self.toolbar_reserve
                    - self.corner_penalty,
                length: self.viewport.width,
            }
        } else {
            let half = self.popover.height / 2.0;
            let lo = margin + self.top_reserve + half;
            let pos = self.center.y;
            CrossAxis {
                pos,
                half,
                lo,
                hi: lo.max(self.viewport.height - margin - self.timeline_reserve - half),
                room_start: pos - margin - self.top_reserve,
                room_end: self.viewport.height - pos - margin - self.timeline_reserve,
                length: self.viewport.height,
            }
        }
    }

    /// Alignment and signed popover shift along the alignment axis.
    fn align(&self, side: Side) -> (Align, f64) {
        let axis = self.cross_axis(side);
        let candidate = clamp_span(axis.pos, axis.lo, axis.hi);
        let reach = (axis.half - self.config.arrow_margin).max(0.0);
        let shift = candidate - axis.pos;

        let align = if shift.abs() <= reach {
            Align::Center
        } else if axis.room_start < axis.half {
            Align::Start
        } else if axis.room_end < axis.half {
            Align::End
        } else if axis.pos < axis.length - axis.pos {
            Align::Start
        } else {
            Align::End
        };

        (align, shift.max(-reach).min(reach))
    }

    fn intrudes_toolbar(&self, placement: &PlacementResult) -> bool {
        if !placement.side.is_vertical() {
            return false;
        }
        let Some(toolbar) = self.config.regions.toolbar() else {
            return false;
        };
        let right_edge = self.center.x + placement.align_offset + self.popover.width / 2.0;
        right_edge > toolbar.left_edge(self.viewport.width)
    }
}
