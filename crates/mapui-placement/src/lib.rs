#![forbid(unsafe_code)]

//! Popover auto-placement for the map front end.
//!
//! Given the bounding box of a clicked pin, an estimated popover size and the
//! viewport, [`compute_placement`] returns side/align directives that keep the
//! popover inside the viewport, off the reserved toolbar and timeline bands,
//! and reachable by its arrow. Once the popover is rendered,
//! [`compute_arrow_offset`] positions the arrow against the real rectangle.
//!
//! [`PlacementSession`] strings the two passes together, and [`AnchorProbe`]
//! handles anchors that measure as zero-size before layout.
//!
//! # Role in mapui
//! The engine knows nothing about pins, SVGs or the DOM. `mapui-web` exposes it
//! to the browser and `mapui-probe` to the command line.

pub mod arrow;
pub mod config;
pub mod probe;
pub mod retry;
pub mod session;
pub mod solver;

pub use arrow::{ArrowOffset, ArrowPlacement, Edge, compute_arrow_offset};
pub use config::{ConfigError, PlacementConfig, ReservedRegions, TimelineBand, ToolbarBand};
pub use probe::{AnchorProbe, ProbeError, ProbeStep};
pub use retry::{BackoffStrategy, RetryPolicy};
pub use session::{Correction, PlacementSession, Stage};
pub use solver::{
    Align, ParseDirectiveError, PlacementRequest, PlacementResult, Side, compute_placement,
};

pub use mapui_core::{Point, Rect, Size, Viewport};
