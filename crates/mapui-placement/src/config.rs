#![forbid(unsafe_code)]

//! Policy-as-data configuration for the placement engine.
//!
//! Every pixel constant the solvers use lives in [`PlacementConfig`], including
//! the two reserved bands (toolbar and timeline). Configs load from TOML or
//! JSON; every struct is `serde(default)`, so a file only names what it
//! overrides.
//!
//! # Loading
//!
//! ```toml
//! # mapui-placement.toml
//! arrow_margin = 25.0
//!
//! [regions.toolbar]
//! width = 360.0
//! margin_right = 30.0
//! top = 48.0
//!
//! [regions.timeline]
//! enabled = false
//! ```
//!
//! ```rust,ignore
//! let config = PlacementConfig::from_toml_file("mapui-placement.toml")?;
//! let config = PlacementConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! `PlacementConfig::default()` reproduces the map page layout: a 360px toolbar
//! docked 30px from the right edge starting 48px from the top, and a 140px
//! timeline sitting 20px above the bottom edge.

use std::path::Path;

use mapui_core::{Rect, Size, Viewport};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retry::RetryPolicy;

// ---------------------------------------------------------------------------
// Top-level PlacementConfig
// ---------------------------------------------------------------------------

/// Tunable parameters for the position and arrow solvers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Minimum visual gap between the anchor and the popover body. Default: 16.
    pub base_gap: f64,
    /// Size of the arrow glyph drawn between anchor and popover. Default: 12.
    pub arrow_size: f64,
    /// Minimum distance kept from the viewport edges. Default: 20.
    pub viewport_margin: f64,
    /// Minimum distance from the arrow to either popover corner. Default: 25.
    pub arrow_margin: f64,
    /// Pixels given back when the chosen side does not really fit. Default: 12.
    pub forced_side_reduction: f64,
    /// Clearance kept beyond the anchor half-extent even when forced. Default: 12.
    pub min_safe_clearance: f64,
    /// Measured-vs-estimated size difference that triggers a re-solve. Default: 1.
    pub remeasure_tolerance: f64,
    /// Delay before the optional settle pass, in milliseconds. Default: 50.
    pub settle_delay_ms: u64,
    /// Estimate used when the caller has no popover measurement. Default: 500x400.
    pub default_popover_size: Size,
    /// Retry policy for anchors that measure as zero-size. Default: 3 x 50ms.
    pub anchor_retry: RetryPolicy,
    /// Reserved viewport bands.
    pub regions: ReservedRegions,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            base_gap: 16.0,
            arrow_size: 12.0,
            viewport_margin: 20.0,
            arrow_margin: 25.0,
            forced_side_reduction: 12.0,
            min_safe_clearance: 12.0,
            remeasure_tolerance: 1.0,
            settle_delay_ms: 50,
            default_popover_size: Size::new(500.0, 400.0),
            anchor_retry: RetryPolicy::default(),
            regions: ReservedRegions::default(),
        }
    }
}

impl PlacementConfig {
    /// Same constants, no reserved bands.
    #[must_use]
    pub fn without_regions() -> Self {
        Self {
            regions: ReservedRegions::none(),
            ..Self::default()
        }
    }

    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load from disk, picking the format from the file extension.
    ///
    /// `.json` is parsed as JSON; anything else as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_file(path)
        } else {
            Self::from_toml_file(path)
        }
    }

    /// Render as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let non_negative = [
            ("base_gap", self.base_gap),
            ("arrow_size", self.arrow_size),
            ("viewport_margin", self.viewport_margin),
            ("arrow_margin", self.arrow_margin),
            ("forced_side_reduction", self.forced_side_reduction),
            ("min_safe_clearance", self.min_safe_clearance),
            ("remeasure_tolerance", self.remeasure_tolerance),
            ("regions.toolbar.width", self.regions.toolbar.width),
            ("regions.toolbar.margin_right", self.regions.toolbar.margin_right),
            ("regions.toolbar.top", self.regions.toolbar.top),
            ("regions.timeline.height", self.regions.timeline.height),
            (
                "regions.timeline.margin_bottom",
                self.regions.timeline.margin_bottom,
            ),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{name} must be finite and >= 0, got {value}"));
            }
        }

        if !self.default_popover_size.is_positive() {
            errors.push(format!(
                "default_popover_size must be positive, got {}x{}",
                self.default_popover_size.width, self.default_popover_size.height
            ));
        }

        errors.extend(self.anchor_retry.validate());
        errors
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// The caller's estimate, or [`Self::default_popover_size`] when it is
    /// missing or not positive.
    #[must_use]
    pub fn estimate_or_default(&self, estimate: Option<Size>) -> Size {
        match estimate {
            Some(size) if size.is_positive() => size,
            _ => self.default_popover_size,
        }
    }

    /// A measured popover size, with each missing (zero, negative or
    /// non-finite) dimension taken from [`Self::default_popover_size`].
    #[must_use]
    pub fn measured_or_default(&self, measured: Size) -> Size {
        let pick = |value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        Size::new(
            pick(measured.width, self.default_popover_size.width),
            pick(measured.height, self.default_popover_size.height),
        )
    }

    /// Delay before the settle pass.
    #[must_use]
    pub fn settle_delay(&self) -> web_time::Duration {
        web_time::Duration::from_millis(self.settle_delay_ms)
    }
}

// ---------------------------------------------------------------------------
// Reserved regions
// ---------------------------------------------------------------------------

/// Viewport bands the popover must never cover.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservedRegions {
    pub toolbar: ToolbarBand,
    pub timeline: TimelineBand,
}

impl ReservedRegions {
    /// Both bands disabled.
    #[must_use]
    pub fn none() -> Self {
        Self {
            toolbar: ToolbarBand {
                enabled: false,
                ..ToolbarBand::default()
            },
            timeline: TimelineBand {
                enabled: false,
                ..TimelineBand::default()
            },
        }
    }

    /// The toolbar band, if enabled.
    #[must_use]
    pub fn toolbar(&self) -> Option<&ToolbarBand> {
        self.toolbar.enabled.then_some(&self.toolbar)
    }

    /// The timeline band, if enabled.
    #[must_use]
    pub fn timeline(&self) -> Option<&TimelineBand> {
        self.timeline.enabled.then_some(&self.timeline)
    }

    /// Horizontal space the toolbar takes from the right edge.
    #[must_use]
    pub fn toolbar_reserve(&self) -> f64 {
        self.toolbar().map_or(0.0, ToolbarBand::reserve)
    }

    /// Strip above the toolbar's vertical start, reserved across the width.
    #[must_use]
    pub fn top_reserve(&self) -> f64 {
        self.toolbar().map_or(0.0, |band| band.top)
    }

    /// Vertical space the timeline takes from the bottom edge.
    #[must_use]
    pub fn timeline_reserve(&self) -> f64 {
        self.timeline().map_or(0.0, TimelineBand::reserve)
    }

    /// Concrete rectangles of the enabled bands for a viewport.
    #[must_use]
    pub fn rects(&self, viewport: Viewport) -> Vec<Rect> {
        let mut rects = Vec::with_capacity(2);
        if let Some(toolbar) = self.toolbar() {
            rects.push(toolbar.rect(viewport));
        }
        if let Some(timeline) = self.timeline() {
            rects.push(timeline.rect(viewport));
        }
        rects
    }
}

/// Right-docked toolbar panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolbarBand {
    /// Default: true.
    pub enabled: bool,
    /// Panel width. Default: 360.
    pub width: f64,
    /// Gap between the panel and the right viewport edge. Default: 30.
    pub margin_right: f64,
    /// Vertical start of the panel. Default: 48.
    pub top: f64,
}

impl Default for ToolbarBand {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 360.0,
            margin_right: 30.0,
            top: 48.0,
        }
    }
}

impl ToolbarBand {
    /// Width plus right margin.
    #[must_use]
    pub fn reserve(&self) -> f64 {
        self.width + self.margin_right
    }

    /// X coordinate of the panel's left edge.
    #[must_use]
    pub fn left_edge(&self, viewport_width: f64) -> f64 {
        viewport_width - self.reserve()
    }

    /// The panel runs from `top` down to the bottom of the viewport.
    #[must_use]
    pub fn rect(&self, viewport: Viewport) -> Rect {
        Rect::from_edges(
            self.left_edge(viewport.width),
            self.top,
            viewport.width - self.margin_right,
            viewport.height,
        )
    }
}

/// Full-width timeline bar near the bottom edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineBand {
    /// Default: true.
    pub enabled: bool,
    /// Bar height. Default: 140.
    pub height: f64,
    /// Gap between the bar and the bottom viewport edge. Default: 20.
    pub margin_bottom: f64,
}

impl Default for TimelineBand {
    fn default() -> Self {
        Self {
            enabled: true,
            height: 140.0,
            margin_bottom: 20.0,
        }
    }
}

impl TimelineBand {
    /// Height plus bottom margin.
    #[must_use]
    pub fn reserve(&self) -> f64 {
        self.height + self.margin_bottom
    }

    #[must_use]
    pub fn rect(&self, viewport: Viewport) -> Rect {
        let bottom = viewport.height - self.margin_bottom;
        Rect::from_edges(0.0, bottom - self.height, viewport.width, bottom)
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a placement configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::BackoffStrategy;

    #[test]
    fn measured_size_falls_back_per_dimension() {
        let config = PlacementConfig::default();
        assert_eq!(
            config.measured_or_default(Size::new(0.0, 250.0)),
            Size::new(500.0, 250.0)
        );
        assert_eq!(
            config.measured_or_default(Size::new(320.0, f64::NAN)),
            Size::new(320.0, 400.0)
        );
        assert_eq!(
            config.measured_or_default(Size::new(-1.0, 0.0)),
            Size::new(500.0, 400.0)
        );
    }

    #[test]
    fn retry_cap_below_base_fails_validation() {
        let err = PlacementConfig::from_toml_str(
            r#"
            [anchor_retry]
            max_retries = 2

            [anchor_retry.backoff]
            kind = "exponential"
            base_ms = 80
            max_ms = 40
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("anchor_retry.backoff.max_ms"), "{err}");
    }

    #[test]
    fn default_validates_clean() {
        let errors = PlacementConfig::default().validate();
        assert!(errors.is_empty(), "default should validate: {errors:?}");
    }

    #[test]
    fn default_reserves_match_page_layout() {
        let regions = ReservedRegions::default();
        assert_eq!(regions.toolbar_reserve(), 390.0);
        assert_eq!(regions.timeline_reserve(), 160.0);
        assert_eq!(regions.top_reserve(), 48.0);
    }

    #[test]
    fn disabled_bands_reserve_nothing() {
        let regions = ReservedRegions::none();
        assert!(regions.toolbar().is_none());
        assert!(regions.timeline().is_none());
        assert_eq!(regions.toolbar_reserve(), 0.0);
        assert_eq!(regions.top_reserve(), 0.0);
        assert_eq!(regions.timeline_reserve(), 0.0);
        assert!(regions.rects(Viewport::new(800.0, 600.0)).is_empty());
    }

    #[test]
    fn band_rects_for_full_hd() {
        let viewport = Viewport::new(1920.0, 1080.0);
        let regions = ReservedRegions::default();
        assert_eq!(
            regions.toolbar.rect(viewport),
            Rect::from_edges(1530.0, 48.0, 1890.0, 1080.0)
        );
        assert_eq!(
            regions.timeline.rect(viewport),
            Rect::from_edges(0.0, 920.0, 1920.0, 1060.0)
        );
    }

    #[test]
    fn partial_toml_preserves_defaults() {
        let config = PlacementConfig::from_toml_str(
            r#"
            arrow_margin = 30.0

            [regions.timeline]
            enabled = false
            "#,
        )
        .expect("partial toml");
        assert_eq!(config.arrow_margin, 30.0);
        assert!(config.regions.timeline().is_none());
        assert_eq!(config.base_gap, 16.0);
        assert_eq!(config.regions.toolbar.width, 360.0);
        assert_eq!(config.default_popover_size, Size::new(500.0, 400.0));
    }

    #[test]
    fn json_with_retry_override() {
        let config = PlacementConfig::from_json_str(
            r#"{"anchor_retry":{"max_retries":1,"backoff":{"kind":"fixed","delay_ms":50}}}"#,
        )
        .expect("json config");
        assert_eq!(config.anchor_retry.max_retries, 1);
        assert_eq!(
            config.anchor_retry.backoff,
            BackoffStrategy::Fixed { delay_ms: 50 }
        );
    }

    #[test]
    fn validate_catches_negative_margin() {
        let mut config = PlacementConfig::default();
        config.viewport_margin = -1.0;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("viewport_margin")));
    }

    #[test]
    fn validate_catches_nan_band() {
        let mut config = PlacementConfig::default();
        config.regions.toolbar.width = f64::NAN;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("regions.toolbar.width")));
    }

    #[test]
    fn validate_catches_empty_default_size() {
        let mut config = PlacementConfig::default();
        config.default_popover_size = Size::new(0.0, 400.0);
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("default_popover_size")));
    }

    #[test]
    fn loader_rejects_invalid_values() {
        let err = PlacementConfig::from_toml_str("arrow_margin = -3.0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("arrow_margin"));
    }

    #[test]
    fn loader_reports_parse_errors() {
        let err = PlacementConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        let err = PlacementConfig::from_toml_str("arrow_margin = [").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn toml_roundtrip_of_defaults() {
        let text = PlacementConfig::default()
            .to_toml_string()
            .expect("encode defaults");
        let parsed = PlacementConfig::from_toml_str(&text).expect("decode defaults");
        assert_eq!(parsed, PlacementConfig::default());
    }

    #[test]
    fn from_file_picks_format_by_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let json_path = dir.path().join("placement.json");
        std::fs::write(&json_path, r#"{"base_gap": 8.0}"#).expect("write json");
        let toml_path = dir.path().join("placement.toml");
        std::fs::write(&toml_path, "base_gap = 9.0").expect("write toml");

        assert_eq!(
            PlacementConfig::from_file(&json_path).expect("json").base_gap,
            8.0
        );
        assert_eq!(
            PlacementConfig::from_file(&toml_path).expect("toml").base_gap,
            9.0
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PlacementConfig::from_toml_file("/nonexistent/mapui.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn estimate_falls_back_to_default() {
        let config = PlacementConfig::default();
        assert_eq!(config.estimate_or_default(None), Size::new(500.0, 400.0));
        assert_eq!(
            config.estimate_or_default(Some(Size::new(0.0, 0.0))),
            Size::new(500.0, 400.0)
        );
        assert_eq!(
            config.estimate_or_default(Some(Size::new(320.0, 200.0))),
            Size::new(320.0, 200.0)
        );
    }
}
