#![forbid(unsafe_code)]

//! Platform-independent bridge between a JS host and the placement engine.
//!
//! Every entry point takes a JSON string and returns a JSON string, so the
//! same code backs the `wasm-bindgen` exports and the native tests. No JS/WASM
//! types here. Responses are always an envelope:
//!
//! ```json
//! {"status":"ok", ...payload}
//! {"status":"error","error":"..."}
//! ```

use mapui_placement::{
    ArrowPlacement, ConfigError, Correction, PlacementConfig, PlacementRequest, PlacementResult,
    PlacementSession, Rect, Side, Stage, Viewport, compute_arrow_offset,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid request JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid placement config: {0}")]
    Config(#[from] ConfigError),
    #[error("no open popover; call place() first")]
    NoSession,
}

#[derive(Serialize)]
#[serde(tag = "status")]
enum Envelope<T> {
    #[serde(rename = "ok")]
    Ok(T),
    #[serde(rename = "error")]
    Error { error: String },
}

/// Payload of `place` and `resize`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Opened {
    pub placement: PlacementResult,
    pub arrow: ArrowPlacement,
    pub stage: Stage,
    /// When the host should run the settle pass.
    pub settle_delay_ms: u64,
}

/// Payload of `arrow`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrowPayload {
    pub arrow: ArrowPlacement,
    pub css: String,
}

#[derive(Serialize)]
struct Ack {
    open: bool,
}

#[derive(Deserialize)]
struct ArrowRequest {
    anchor: Rect,
    #[serde(default)]
    popover: Option<Rect>,
    #[serde(default)]
    hint: Option<Side>,
}

/// Bridge state: the active config and the currently open popover.
#[derive(Debug, Clone, Default)]
pub struct BridgeCore {
    config: PlacementConfig,
    session: Option<PlacementSession>,
}

impl BridgeCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    #[must_use]
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Replace the config (`null` restores the defaults). Applies to the next
    /// `place`; an open popover keeps the config it was opened with.
    pub fn set_config_json(&mut self, json: &str) -> String {
        respond(self.try_set_config(json))
    }

    /// Open a popover: `{"anchor":Rect,"popover":Size?,"viewport":Viewport}`.
    pub fn place(&mut self, request_json: &str) -> String {
        respond(self.try_place(request_json))
    }

    /// Second pass with the rendered rect (or `null` when not laid out).
    pub fn measure(&mut self, rect_json: &str) -> String {
        respond(self.try_correct(rect_json, false))
    }

    /// Late corrective pass; same input as [`Self::measure`].
    pub fn settle(&mut self, rect_json: &str) -> String {
        respond(self.try_correct(rect_json, true))
    }

    /// Re-solve the open popover for `{"width":..,"height":..}`.
    pub fn resize(&mut self, viewport_json: &str) -> String {
        respond(self.try_resize(viewport_json))
    }

    /// Stateless arrow pass: `{"anchor":Rect,"popover":Rect?,"hint":Side?}`.
    pub fn arrow(&self, request_json: &str) -> String {
        respond(self.try_arrow(request_json))
    }

    /// Drop the open popover.
    pub fn close(&mut self) -> String {
        self.session = None;
        respond::<Ack>(Ok(Ack { open: false }))
    }

    fn try_set_config(&mut self, json: &str) -> Result<Ack, BridgeError> {
        self.config = config_from_json(Some(json))?;
        tracing::debug!(
            message = "bridge.config",
            toolbar = self.config.regions.toolbar().is_some(),
            timeline = self.config.regions.timeline().is_some(),
        );
        Ok(Ack {
            open: self.has_session(),
        })
    }

    fn try_place(&mut self, request_json: &str) -> Result<Opened, BridgeError> {
        let request: PlacementRequest = serde_json::from_str(request_json)?;
        let session = PlacementSession::open(
            request.anchor,
            request.popover,
            request.viewport,
            &self.config,
        );
        let opened = opened(&session);
        self.session = Some(session);
        Ok(opened)
    }

    fn try_correct(&mut self, rect_json: &str, settle: bool) -> Result<Correction, BridgeError> {
        let rendered: Option<Rect> = serde_json::from_str(rect_json)?;
        let session = self.session.as_mut().ok_or(BridgeError::NoSession)?;
        Ok(if settle {
            session.settle(rendered)
        } else {
            session.measure(rendered)
        })
    }

    fn try_resize(&mut self, viewport_json: &str) -> Result<Opened, BridgeError> {
        let viewport: Viewport = serde_json::from_str(viewport_json)?;
        let session = self.session.as_mut().ok_or(BridgeError::NoSession)?;
        session.resize(viewport);
        Ok(opened(session))
    }

    fn try_arrow(&self, request_json: &str) -> Result<ArrowPayload, BridgeError> {
        let request: ArrowRequest = serde_json::from_str(request_json)?;
        let arrow =
            compute_arrow_offset(request.anchor, request.popover, request.hint, &self.config);
        Ok(ArrowPayload {
            css: arrow.offset.to_css(),
            arrow,
        })
    }
}

/// Parse a partial JSON placement config. `None`, blank input and `null`
/// give the defaults.
pub fn config_from_json(json: Option<&str>) -> Result<PlacementConfig, BridgeError> {
    match json.map(str::trim) {
        None | Some("" | "null") => Ok(PlacementConfig::default()),
        Some(json) => Ok(PlacementConfig::from_json_str(json)?),
    }
}

fn opened(session: &PlacementSession) -> Opened {
    Opened {
        placement: session.placement(),
        arrow: session.arrow(),
        stage: session.stage(),
        settle_delay_ms: session.config().settle_delay_ms,
    }
}

fn respond<T: Serialize>(result: Result<T, BridgeError>) -> String {
    let envelope = match result {
        Ok(payload) => Envelope::Ok(payload),
        Err(err) => {
            tracing::warn!(message = "bridge.error", error = %err);
            Envelope::Error {
                error: err.to_string(),
            }
        }
    };
    serde_json::to_string(&envelope).unwrap_or_else(|err| {
        serde_json::json!({ "status": "error", "error": format!("encode: {err}") }).to_string()
    })
}
