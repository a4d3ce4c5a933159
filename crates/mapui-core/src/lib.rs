#![forbid(unsafe_code)]

//! Core: geometric primitives shared by the mapui crates.
//!
//! # Role in mapui
//! `mapui-core` is the vocabulary layer. The placement engine
//! (`mapui-placement`), the browser bridge (`mapui-web`) and the diagnostics
//! CLI (`mapui-probe`) all exchange [`Rect`], [`Size`] and [`Viewport`]
//! values, which serialize to the same JSON shape a browser produces for a
//! `DOMRect`.

pub mod geometry;

pub use geometry::{Point, Rect, Size, Viewport, clamp_span, finite_or_zero};
