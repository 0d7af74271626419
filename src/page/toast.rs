/// Transient on-page notification

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

pub const DISPLAY_MS: i32 = 2000;
pub const FADE_MS: i32 = 300;
pub const TOAST_CLASS: &str = "sheet-capture-toast";

const TOAST_STYLE: &str = "position:fixed;top:20px;right:20px;background:#333;color:#fff;\
    padding:12px 24px;border-radius:8px;z-index:2147483647;\
    font-size:14px;font-family:sans-serif;box-shadow:0 4px 12px rgba(0,0,0,0.3);\
    transition:opacity 0.3s;";

/// Each call appends its own element and schedules its own removal
pub fn show(message: &str) -> Result<HtmlElement, String> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let body = document.body().ok_or("no body")?;

    let toast: HtmlElement = document
        .create_element("div")
        .and_then(|el| el.dyn_into::<HtmlElement>().map_err(JsValue::from))
        .map_err(|e| format!("Failed to create toast: {:?}", e))?;
    toast.set_class_name(TOAST_CLASS);
    toast.set_text_content(Some(message));
    toast.style().set_css_text(TOAST_STYLE);
    body.append_child(&toast)
        .map_err(|e| format!("Failed to attach toast: {:?}", e))?;

    let fading = toast.clone();
    let fade_out = Closure::once_into_js(move || {
        let _ = fading.style().set_property("opacity", "0");
        let removing = fading.clone();
        let remove = Closure::once_into_js(move || removing.remove());
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(remove.unchecked_ref(), FADE_MS);
        }
    });
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(fade_out.unchecked_ref(), DISPLAY_MS)
        .map_err(|e| format!("Failed to schedule toast removal: {:?}", e))?;

    Ok(toast)
}
