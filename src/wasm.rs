//! Browser bindings: lets a Web Worker run the engine off the UI thread.

use log::{Level, info};
use wasm_bindgen::prelude::*;

use crate::layout::{LayoutConfig, layout_json as run_layout_json};

/// Initialize logging and panic hooks for the WASM target.
#[wasm_bindgen(start)]
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Lays out a JSON request and returns the JSON response.
///
/// Failures are thrown as a JS `Error` whose `name` is the error kind.
#[wasm_bindgen(js_name = layoutJson)]
pub fn layout_json(input: &str) -> Result<String, JsValue> {
	run_layout_json(input, &LayoutConfig::default()).map_err(|err| {
		let js_err = js_sys::Error::new(&err.to_string());
		js_err.set_name(err.kind());
		js_err.into()
	})
}
