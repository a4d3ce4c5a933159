#![forbid(unsafe_code)]

//! Browser bridge for the mapui placement engine.
//!
//! [`BridgeCore`] is a JSON-in/JSON-out facade over
//! `mapui_placement::PlacementSession` that compiles everywhere. On `wasm32`
//! it is exported to JavaScript as `PopoverPlacer`, next to the stateless
//! `computePlacement` and `computeArrowOffset` functions.
//!
//! Host protocol for one pin click:
//!
//! 1. `place({anchor, popover?, viewport})`: position the popover from the
//!    estimate and render it.
//! 2. `measure(renderedRect)` after layout: apply the corrected placement and
//!    draw the arrow.
//! 3. Optionally `settle(renderedRect)` after `settleDelayMs`.

pub mod bridge_core;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use bridge_core::{ArrowPayload, BridgeCore, BridgeError, Opened, config_from_json};

#[cfg(target_arch = "wasm32")]
pub use wasm::{PopoverPlacer, compute_arrow_offset_js, compute_placement_js};
