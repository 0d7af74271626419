//! Page-context side of the page channel. Runs inside the content script.

pub mod clipboard;
pub mod links;
pub mod toast;

use crate::interop::{from_js, to_js};
use crate::message::{PageCommand, PanelSubmission, RuntimeMessage};
use crate::tab_data::Selection;
use crate::ui::panel;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/bridge/page.js")]
extern "C" {
    fn sendRuntimeMessage(message: JsValue);
}

/// Run one command from the background worker. Resolves to a string for
/// `findLinkTitle` and to null for everything else.
pub async fn handle_command(command: JsValue) -> Result<JsValue, JsValue> {
    let command: PageCommand = from_js(command).map_err(|e| JsValue::from_str(&e))?;
    log::debug!("Page command {}", command.name());

    match command {
        PageCommand::WriteClipboard { text } => {
            clipboard::write_text(&text).await;
            Ok(JsValue::NULL)
        }
        PageCommand::ShowToast { message } => {
            toast::show(&message).map_err(|e| JsValue::from_str(&e))?;
            Ok(JsValue::NULL)
        }
        PageCommand::FindLinkTitle { url } => Ok(links::find_link_title(&url)
            .map(|title| JsValue::from_str(&title))
            .unwrap_or(JsValue::NULL)),
        PageCommand::OpenPanel(request) => {
            panel::open(request).map_err(|e| JsValue::from_str(&e))?;
            Ok(JsValue::NULL)
        }
    }
}

/// Hand a finished panel selection to the background worker
pub fn submit_panel(title: &str, url: &str, selection: Selection) {
    let message = RuntimeMessage::SendFromPanel(PanelSubmission::new(title, url, selection));
    match to_js(&message) {
        Ok(js) => sendRuntimeMessage(js),
        Err(e) => log::error!("Failed to send panel selection: {}", e),
    }
}
