/// Clipboard writer for the page context

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlDocument, HtmlTextAreaElement};

/// Write `text` with navigator.clipboard, falling back to a hidden textarea
/// and execCommand("copy") when the async API is missing or rejects.
pub async fn write_text(text: &str) {
    match write_async(text).await {
        Ok(()) => {}
        Err(e) => {
            log::debug!("clipboard.writeText rejected ({:?}), using fallback", e);
            if let Err(e) = write_fallback(text) {
                log::warn!("Clipboard fallback failed: {:?}", e);
            }
        }
    }
}

async fn write_async(text: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let clipboard = js_sys::Reflect::get(&window.navigator(), &JsValue::from_str("clipboard"))?;
    if clipboard.is_undefined() || clipboard.is_null() {
        return Err("navigator.clipboard unavailable".into());
    }

    let write: js_sys::Function = js_sys::Reflect::get(&clipboard, &JsValue::from_str("writeText"))?.dyn_into()?;
    let promise: js_sys::Promise = write.call1(&clipboard, &JsValue::from_str(text))?.dyn_into()?;
    JsFuture::from(promise).await?;
    Ok(())
}

fn write_fallback(text: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document")?;
    let body = document.body().ok_or("no body")?;

    let textarea: HtmlTextAreaElement = document.create_element("textarea")?.dyn_into()?;
    textarea.set_value(text);
    textarea.style().set_css_text("position:fixed;opacity:0;");
    body.append_child(&textarea)?;
    textarea.select();

    let copied = document
        .dyn_ref::<HtmlDocument>()
        .map(|html| html.exec_command("copy"))
        .transpose();
    textarea.remove();

    match copied? {
        Some(true) => Ok(()),
        _ => Err("execCommand(\"copy\") returned false".into()),
    }
}
