//! Background service worker: Chrome event entry points and the page channel.

use crate::append::{RemoteAppendClient, ReqwestTransport};
use crate::coordinator::{
    CaptureFlow, Coordinator, PageChannel, Trigger, CONTEXT_MENU_ID, CONTEXT_MENU_TITLE, SHORTCUT_COMMAND,
};
use crate::error::CaptureError;
use crate::interop::{from_js, is_nullish, js_error, to_js};
use crate::message::{PageCommand, RuntimeMessage};
use crate::storage::{Settings, StoredSettings, STORAGE_KEYS};
use crate::tab_data::{MenuClickInfo, TabInfo};
use async_trait::async_trait;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge/background.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSyncStorage(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSyncStorage(items: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn createContextMenu(id: &str, title: &str, contexts: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendToTab(tab_id: i32, message: JsValue) -> Result<JsValue, JsValue>;
}

/// Page channel over chrome.tabs.sendMessage
pub struct ChromePageChannel;

#[async_trait(?Send)]
impl PageChannel for ChromePageChannel {
    async fn execute(&self, tab_id: i32, command: &PageCommand) -> Result<Option<String>, CaptureError> {
        let message = to_js(command).map_err(CaptureError::Serialization)?;
        let reply = sendToTab(tab_id, message)
            .await
            .map_err(|e| CaptureError::Injection(js_error(&e)))?;

        if is_nullish(&reply) {
            Ok(None)
        } else {
            Ok(reply.as_string())
        }
    }
}

pub async fn install() {
    let contexts = js_sys::Array::of2(&JsValue::from_str("page"), &JsValue::from_str("link"));
    if let Err(e) = createContextMenu(CONTEXT_MENU_ID, CONTEXT_MENU_TITLE, contexts.into()) {
        log::error!("Failed to create context menu: {}", js_error(&e));
    }

    match load_stored().await {
        Ok(stored) if stored.needs_defaults() => {
            let defaults = Settings {
                gas_url: stored.gas_url.clone(),
                ..Settings::default()
            };
            if let Err(e) = save_settings(&defaults).await {
                log::error!("Failed to write default settings: {}", e);
            } else {
                log::info!("Initialized default settings");
            }
        }
        Ok(_) => {}
        Err(e) => log::error!("Failed to read settings on install: {}", e),
    }
}

pub async fn context_menu_clicked(info: JsValue, tab: JsValue) -> Result<(), String> {
    let info: MenuClickInfo = from_js(info)?;
    let tab = parse_tab(tab)?;
    run(Trigger::ContextMenu { info, tab }).await;
    Ok(())
}

pub async fn command(command: &str) -> Result<(), String> {
    if command != SHORTCUT_COMMAND {
        return Ok(());
    }
    let tab_js = queryActiveTab()
        .await
        .map_err(|e| format!("Failed to query active tab: {}", js_error(&e)))?;
    let tab = parse_tab(tab_js)?;
    run(Trigger::Shortcut { tab }).await;
    Ok(())
}

pub async fn action_clicked(tab: JsValue) -> Result<(), String> {
    let tab: TabInfo = from_js(tab)?;
    run(Trigger::ToolbarIcon { tab }).await;
    Ok(())
}

pub async fn runtime_message(message: JsValue, sender_tab: JsValue) -> Result<(), String> {
    let value: serde_json::Value = from_js(message)?;
    let Some(RuntimeMessage::SendFromPanel(submission)) = RuntimeMessage::from_json(value) else {
        return Ok(());
    };
    let tab = parse_tab(sender_tab)?;
    run(Trigger::PanelSubmitted { submission, tab }).await;
    Ok(())
}

async fn run(trigger: Trigger) -> CaptureFlow {
    // Read once per capture; the options page may change it between captures
    let settings = match load_stored().await {
        Ok(stored) => stored.into_settings(),
        Err(e) => {
            log::error!("Failed to read settings, using defaults: {}", e);
            Settings::default()
        }
    };

    let client = RemoteAppendClient::new(ReqwestTransport::new());
    Coordinator::new(settings, &ChromePageChannel, &client).run(trigger).await
}

fn parse_tab(tab: JsValue) -> Result<Option<TabInfo>, String> {
    if is_nullish(&tab) {
        return Ok(None);
    }
    from_js(tab).map(Some)
}

async fn load_stored() -> Result<StoredSettings, CaptureError> {
    let keys = to_js(&STORAGE_KEYS).map_err(CaptureError::Serialization)?;
    let stored_js = getSyncStorage(keys)
        .await
        .map_err(|e| CaptureError::Storage(js_error(&e)))?;

    if is_nullish(&stored_js) {
        Ok(StoredSettings::default())
    } else {
        from_js(stored_js).map_err(CaptureError::Serialization)
    }
}

async fn save_settings(settings: &Settings) -> Result<(), CaptureError> {
    let items = to_js(&StoredSettings::from(settings)).map_err(CaptureError::Serialization)?;
    setSyncStorage(items)
        .await
        .map_err(|e| CaptureError::Storage(js_error(&e)))
}
