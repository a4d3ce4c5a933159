#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the popover placer.
//!
//! This module wraps [`super::bridge_core::BridgeCore`] with JS-friendly
//! types. Only compiled on `wasm32` targets.

use js_sys::{Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use mapui_placement::{
    ArrowOffset, PlacementConfig, Rect, Side, Size, Viewport, compute_arrow_offset,
    compute_placement,
};

use super::bridge_core::{BridgeCore, config_from_json};

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "mapui panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("mapui panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn set_js(obj: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value);
}

fn get_f64(obj: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(obj, &JsValue::from_str(key))
        .ok()
        .and_then(|value| value.as_f64())
}

/// Read a `DOMRect` (or any `{left, top, width, height}` object).
fn rect_from_js(value: &JsValue) -> Option<Rect> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    Some(Rect::new(
        get_f64(value, "left")?,
        get_f64(value, "top")?,
        get_f64(value, "width").unwrap_or(0.0),
        get_f64(value, "height").unwrap_or(0.0),
    ))
}

fn size_from_js(value: &JsValue) -> Option<Size> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    Some(Size::new(get_f64(value, "width")?, get_f64(value, "height")?))
}

fn side_from_js(value: &JsValue) -> Option<Side> {
    value.as_string()?.parse().ok()
}

/// Layout config from a JSON string, a plain object, or nothing.
fn config_from_js(value: &JsValue) -> Result<PlacementConfig, JsValue> {
    let json = if value.is_null() || value.is_undefined() {
        None
    } else if let Some(text) = value.as_string() {
        Some(text)
    } else {
        let text = js_sys::JSON::stringify(value)?;
        Some(String::from(text))
    };
    config_from_json(json.as_deref()).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn parse_json(json: String) -> Result<JsValue, JsValue> {
    js_sys::JSON::parse(&json)
}

/// Stateful placer for one map page.
///
/// Methods take and return JSON strings; see `BridgeCore` for the shapes.
#[wasm_bindgen]
pub struct PopoverPlacer {
    inner: BridgeCore,
}

impl Default for PopoverPlacer {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl PopoverPlacer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        install_panic_hook();
        Self {
            inner: BridgeCore::new(),
        }
    }

    /// Replace the placement config with a (partial) JSON config.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, json: &str) -> String {
        self.inner.set_config_json(json)
    }

    pub fn place(&mut self, request_json: &str) -> String {
        self.inner.place(request_json)
    }

    pub fn measure(&mut self, rect_json: &str) -> String {
        self.inner.measure(rect_json)
    }

    pub fn settle(&mut self, rect_json: &str) -> String {
        self.inner.settle(rect_json)
    }

    pub fn resize(&mut self, viewport_json: &str) -> String {
        self.inner.resize(viewport_json)
    }

    pub fn arrow(&self, request_json: &str) -> String {
        self.inner.arrow(request_json)
    }

    pub fn close(&mut self) -> String {
        self.inner.close()
    }

    /// Same as `place`, parsed into a JS object.
    #[wasm_bindgen(js_name = placeObject)]
    pub fn place_object(&mut self, request_json: &str) -> Result<JsValue, JsValue> {
        parse_json(self.inner.place(request_json))
    }

    #[wasm_bindgen(js_name = settleDelayMs)]
    pub fn settle_delay_ms(&self) -> f64 {
        self.inner.config().settle_delay_ms as f64
    }
}

/// `computePlacement(anchorRect, popoverSize?, viewport, config?)`.
///
/// `config` is a partial placement config (object or JSON string) carrying
/// the reserved regions, e.g. `{regions: {timeline: {enabled: false}}}`; the
/// default page layout applies when it is omitted. Returns
/// `{side, align, sideOffset, alignOffset, fits, overridden}`.
#[wasm_bindgen(js_name = computePlacement)]
pub fn compute_placement_js(
    anchor: JsValue,
    popover: JsValue,
    viewport: JsValue,
    config: JsValue,
) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let anchor = rect_from_js(&anchor)
        .ok_or_else(|| JsValue::from_str("anchor must have numeric left and top"))?;
    let viewport = size_from_js(&viewport)
        .map(Viewport::from)
        .ok_or_else(|| JsValue::from_str("viewport must have numeric width and height"))?;
    let config = config_from_js(&config)?;
    let size = config.estimate_or_default(size_from_js(&popover));
    let result = compute_placement(anchor, size, viewport, &config);

    let out = Object::new();
    set_js(&out, "side", JsValue::from_str(result.side.as_str()));
    set_js(&out, "align", JsValue::from_str(result.align.as_str()));
    set_js(&out, "sideOffset", JsValue::from_f64(result.side_offset));
    set_js(&out, "alignOffset", JsValue::from_f64(result.align_offset));
    set_js(&out, "fits", JsValue::from_bool(result.fits));
    set_js(&out, "overridden", JsValue::from_bool(result.overridden));
    Ok(out.into())
}

/// `computeArrowOffset(anchorRect, renderedPopoverRect?, hintSide?)`.
/// Returns `{side, offset, css}` where `offset` is `null` before layout.
#[wasm_bindgen(js_name = computeArrowOffset)]
pub fn compute_arrow_offset_js(
    anchor: JsValue,
    popover: JsValue,
    hint: JsValue,
) -> Result<JsValue, JsValue> {
    install_panic_hook();
    let anchor = rect_from_js(&anchor)
        .ok_or_else(|| JsValue::from_str("anchor must have numeric left and top"))?;
    let arrow = compute_arrow_offset(
        anchor,
        rect_from_js(&popover),
        side_from_js(&hint),
        &PlacementConfig::default(),
    );

    let out = Object::new();
    set_js(&out, "side", JsValue::from_str(arrow.side.as_str()));
    let offset = match arrow.offset {
        ArrowOffset::Pixels(px) => JsValue::from_f64(px),
        ArrowOffset::Centered => JsValue::NULL,
    };
    set_js(&out, "offset", offset);
    set_js(&out, "css", JsValue::from_str(&arrow.offset.to_css()));
    Ok(out.into())
}
