/// JsValue conversion helpers shared by every extension context

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;

/// Serialize into plain JS objects (never `Map`), as chrome.* APIs expect
pub fn to_js<T: Serialize>(value: &T) -> Result<JsValue, String> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| format!("Failed to serialize: {:?}", e))
}

pub fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, String> {
    serde_wasm_bindgen::from_value(value).map_err(|e| format!("Failed to parse: {:?}", e))
}

/// Best-effort message out of a rejected promise
pub fn js_error(err: &JsValue) -> String {
    if let Some(message) = js_sys::Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
    {
        return message;
    }
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

pub fn is_nullish(value: &JsValue) -> bool {
    value.is_null() || value.is_undefined()
}
