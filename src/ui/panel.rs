/// Capture panel: on-page modal for picking tags before a capture

use crate::message::PanelRequest;
use crate::page::submit_panel;
use crate::panel_state::{GroupControl, PanelSelection, panel_rows};
use crate::ui::components::{Button, ButtonVariant, Chip, TextField};
use std::cell::RefCell;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlElement, HtmlInputElement, ShadowRootInit, ShadowRootMode};
use yew::AppHandle;
use yew::prelude::*;

pub const PANEL_HOST_ID: &str = "sheet-capture-panel-host";

const PANEL_CSS: &str = ":host { all: initial; }
.overlay { position: fixed; inset: 0; z-index: 2147483646; background: rgba(0,0,0,0.35); display: flex; align-items: center; justify-content: center; font-family: sans-serif; }
.panel { background: white; color: #222; border-radius: 8px; padding: 20px; width: 420px; max-height: 80vh; overflow-y: auto; box-shadow: 0 8px 24px rgba(0,0,0,0.3); }
.page-title { font-size: 15px; font-weight: bold; margin: 0 0 4px; word-break: break-all; }
.page-url { font-size: 12px; color: #666; margin: 0 0 16px; word-break: break-all; }
.row { margin-bottom: 12px; }
.row-label { font-size: 12px; color: #555; margin-bottom: 6px; }
.actions { display: flex; justify-content: flex-end; gap: 8px; margin-top: 16px; }";

struct MountedPanel {
    host: Element,
    app: AppHandle<CapturePanel>,
}

thread_local! {
    static ACTIVE_PANEL: RefCell<Option<MountedPanel>> = const { RefCell::new(None) };
}

/// Mount a panel for `request`, replacing any panel already on the page
pub fn open(request: PanelRequest) -> Result<(), String> {
    close();

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document")?;
    // A re-injected content script has its own ACTIVE_PANEL, so also look in the DOM
    if let Some(stale) = document.get_element_by_id(PANEL_HOST_ID) {
        stale.remove();
    }

    let host = document
        .create_element("div")
        .map_err(|e| format!("Failed to create panel host: {:?}", e))?;
    host.set_id(PANEL_HOST_ID);
    let shadow = host
        .attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open))
        .map_err(|e| format!("Failed to attach shadow root: {:?}", e))?;
    let mount = document
        .create_element("div")
        .map_err(|e| format!("Failed to create panel root: {:?}", e))?;
    shadow
        .append_child(&mount)
        .map_err(|e| format!("Failed to mount panel: {:?}", e))?;
    document
        .body()
        .ok_or("no body")?
        .append_child(&host)
        .map_err(|e| format!("Failed to attach panel: {:?}", e))?;

    let app = yew::Renderer::<CapturePanel>::with_root_and_props(mount, CapturePanelProps { request }).render();
    ACTIVE_PANEL.with(|active| *active.borrow_mut() = Some(MountedPanel { host, app }));
    Ok(())
}

/// Remove the panel, if any
pub fn close() {
    let mounted = ACTIVE_PANEL.with(|active| active.borrow_mut().take());
    if let Some(MountedPanel { host, app }) = mounted {
        host.remove();
        // Called from inside the panel's own callbacks, so tear down later
        spawn_local(async move { app.destroy() });
    }
}

#[derive(Properties, PartialEq)]
pub struct CapturePanelProps {
    pub request: PanelRequest,
}

#[function_component(CapturePanel)]
pub fn capture_panel(props: &CapturePanelProps) -> Html {
    let selection = use_state(|| PanelSelection::for_schema(&props.request.schema));
    let overlay_ref = use_node_ref();
    let rows = panel_rows(&props.request.schema);

    // Focus the overlay so Enter/Escape reach it
    {
        let overlay_ref = overlay_ref.clone();
        use_effect_with((), move |_| {
            if let Some(overlay) = overlay_ref.cast::<HtmlElement>() {
                let _ = overlay.focus();
            }
            || ()
        });
    }

    let on_submit = {
        let selection = selection.clone();
        let request = props.request.clone();
        Callback::from(move |_: ()| {
            submit_panel(&request.title, &request.url, (*selection).clone().into_selection());
            close();
        })
    };

    let on_cancel = Callback::from(|_: ()| close());

    let on_chip = {
        let selection = selection.clone();
        Callback::from(move |(row, tag): (usize, String)| {
            let mut next = (*selection).clone();
            next.toggle_chip(row, &tag);
            selection.set(next);
        })
    };

    let on_text = {
        let selection = selection.clone();
        Callback::from(move |(row, text): (usize, String)| {
            let mut next = (*selection).clone();
            next.set_text(row, &text);
            selection.set(next);
        })
    };

    let on_keydown = {
        let on_submit = on_submit.clone();
        let on_cancel = on_cancel.clone();
        Callback::from(move |e: KeyboardEvent| {
            // Keys typed into the panel never reach the page's own shortcuts
            e.stop_propagation();
            // Enter/Escape during IME conversion belong to the input method
            if e.is_composing() {
                return;
            }
            match e.key().as_str() {
                "Escape" => on_cancel.emit(()),
                "Enter" => {
                    let on_button = e
                        .target_dyn_into::<HtmlElement>()
                        .is_some_and(|el| el.tag_name().eq_ignore_ascii_case("button"));
                    if !on_button {
                        e.prevent_default();
                        on_submit.emit(());
                    }
                }
                _ => {}
            }
        })
    };

    let stop_key = Callback::from(|e: KeyboardEvent| e.stop_propagation());

    // Clicks on the dimmed backdrop, not on the panel body, cancel
    let on_backdrop_click = {
        let overlay_ref = overlay_ref.clone();
        let on_cancel = on_cancel.clone();
        Callback::from(move |e: MouseEvent| {
            let target = e.target().and_then(|t| t.dyn_into::<Element>().ok());
            if target.is_some() && target == overlay_ref.cast::<Element>() {
                on_cancel.emit(());
            }
        })
    };

    html! {
        <>
            <style>{PANEL_CSS}</style>
            <div
                class="overlay"
                ref={overlay_ref}
                tabindex="-1"
                onkeydown={on_keydown}
                onkeyup={stop_key.clone()}
                onkeypress={stop_key}
                onclick={on_backdrop_click}
            >
                <div class="panel">
                    <p class="page-title">{&props.request.title}</p>
                    <p class="page-url">{&props.request.url}</p>

                    {for rows.iter().enumerate().map(|(row, panel_row)| html! {
                        <div class="row" key={row}>
                            <div class="row-label">{&panel_row.label}</div>
                            {match &panel_row.control {
                                GroupControl::Chips(tags) => html! {
                                    <div class="chips">
                                        {for tags.iter().map(|tag| {
                                            let tag_clone = tag.clone();
                                            html! {
                                                <Chip
                                                    key={tag.clone()}
                                                    label={tag.clone()}
                                                    selected={selection.is_selected(row, tag)}
                                                    onclick={on_chip.reform(move |_| (row, tag_clone.clone()))}
                                                />
                                            }
                                        })}
                                    </div>
                                },
                                GroupControl::FreeText => html! {
                                    <TextField
                                        value={selection.value(row).to_string()}
                                        oninput={on_text.reform(move |e: InputEvent| {
                                            let text = e
                                                .target_dyn_into::<HtmlInputElement>()
                                                .map(|input| input.value())
                                                .unwrap_or_default();
                                            (row, text)
                                        })}
                                    />
                                },
                            }}
                        </div>
                    })}

                    <div class="actions">
                        <Button onclick={on_cancel.reform(|_| ())} variant={ButtonVariant::Secondary}>
                            {"キャンセル"}
                        </Button>
                        <Button onclick={on_submit.reform(|_| ())}>
                            {"送信"}
                        </Button>
                    </div>
                </div>
            </div>
        </>
    }
}
