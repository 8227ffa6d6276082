use wasm_bindgen::prelude::*;

use js_sys::Date;
use serde_wasm_bindgen::to_value;

// Create a console module for logging
pub mod console;
// Import our models
mod models;
// Import our module state management
mod module_state;
// Import our archive extraction module
mod archive;
// Import our shapefile ingestion module
mod ingest;
// Import our reprojection module
mod reproject;
// Import our figure rendering module
mod figure;
// Import our upload session driver
mod session;
// Import our geometry functions
#[path = "../geometry_functions/measure.rs"]
pub mod measure;


use models::SessionStats;
use module_state::ModuleState;

// Enable better panic messages in console during development
#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

#[wasm_bindgen]
extern "C" {
    // JavaScript function that hands a finished figure to the page
    #[wasm_bindgen(js_namespace = wasmJsHelpers, js_name = displayFigure, catch)]
    pub fn display_figure(svg: &str, title: &str) -> Result<(), JsValue>;
}

// Use the macro from our console module
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => (crate::console::log(&format!($($t)*)))
}

use std::sync::Once;
static INIT: Once = Once::new();

// This sets up the wasm_bindgen start functionality
#[wasm_bindgen(start)]
pub fn start() {
    INIT.call_once(|| {
        // Set the panic hook for better error messages
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        // Log that the module has been initialized
        console_log!("WASM module initialized successfully");
    });
}

// Process one uploaded zipped shapefile: extract, parse, reproject, render.
// Every figure is pushed to the display hook; the full outcome (figures plus
// the optional user-visible error) is also returned to the caller.
#[wasm_bindgen]
pub fn process_shapefile_zip(data: &[u8]) -> Result<JsValue, JsValue> {
    let started = Date::now();
    console_log!("Processing uploaded archive, {} bytes", data.len());

    let outcome = session::process_upload(data).map_err(|e| JsValue::from_str(&e))?;

    if let Some(message) = &outcome.error {
        web_sys::console::warn_1(&JsValue::from_str(message));
    } else {
        for figure in &outcome.figures {
            display_figure(&figure.svg, &figure.title)?;
        }
        console_log!(
            "Rendered {} figure(s) in {} ms",
            outcome.figures.len(),
            Date::now() - started
        );
    }

    Ok(to_value(&outcome)?)
}

// Get information about the WASM module capabilities
#[wasm_bindgen]
pub fn get_module_info() -> String {
    serde_json::to_string(&serde_json::json!({
        "name": "parcelplot-core",
        "target_crs": "EPSG:32633",
        "figure_size": [figure::FIGURE_WIDTH, figure::FIGURE_HEIGHT],
        "title_field": ingest::TITLE_FIELD,
    }))
    .unwrap_or_else(|_| "{}".to_string())
}

// Function to get the session statistics
#[wasm_bindgen]
pub fn get_session_stats() -> Result<JsValue, JsValue> {
    let stats = ModuleState::with(|state| SessionStats {
        uploads_processed: state.uploads_processed,
        figures_rendered: state.figures_rendered,
        last_upload_error: state.last_upload_error.clone(),
    });

    Ok(to_value(&stats)?)
}

// Function to reset the session statistics
#[wasm_bindgen]
pub fn reset_session_stats() -> bool {
    ModuleState::with_mut(|state| state.reset());
    true
}
