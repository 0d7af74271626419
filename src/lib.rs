/// Sheet Capture - Chrome Extension that records page titles and URLs in a spreadsheet
/// Built with Rust + WASM + Yew

pub mod access;
pub mod append;
mod background;
pub mod coordinator;
pub mod error;
mod interop;
pub mod message;
pub mod operations;
pub mod page;
pub mod panel_state;
pub mod storage;
pub mod tab_data;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Background service worker entry points

#[wasm_bindgen]
pub async fn on_installed() {
    background::install().await;
}

#[wasm_bindgen]
pub async fn on_context_menu_clicked(info: JsValue, tab: JsValue) {
    if let Err(e) = background::context_menu_clicked(info, tab).await {
        log::error!("Context menu action failed: {}", e);
    }
}

#[wasm_bindgen]
pub async fn on_command(command: String) {
    if let Err(e) = background::command(&command).await {
        log::error!("Keyboard shortcut action failed: {}", e);
    }
}

#[wasm_bindgen]
pub async fn on_action_clicked(tab: JsValue) {
    if let Err(e) = background::action_clicked(tab).await {
        log::error!("Toolbar action failed: {}", e);
    }
}

#[wasm_bindgen]
pub async fn on_runtime_message(message: JsValue, sender_tab: JsValue) {
    if let Err(e) = background::runtime_message(message, sender_tab).await {
        log::error!("Panel submission failed: {}", e);
    }
}

// Content script entry point
#[wasm_bindgen]
pub async fn handle_page_command(command: JsValue) -> Result<JsValue, JsValue> {
    page::handle_command(command).await
}

// Start the Yew app for the options page
#[wasm_bindgen]
pub fn start_options() {
    yew::Renderer::<ui::options::OptionsPage>::new().render();
}
