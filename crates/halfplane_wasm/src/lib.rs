//! WASM bindings for the halfplane core library.
//!
//! The browser front end owns the canvas and the pointer; it asks this crate
//! for coset matrices, domain outlines and hover information and draws them.

mod explorer;
mod geometry;

pub use explorer::WasmCosetExplorer;
pub use geometry::{reduce_to_domain, trace_geodesic};

use serde::Serialize;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

pub(crate) fn js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}
