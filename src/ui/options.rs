/// Options page: endpoint URL and tag configuration

use crate::error::SettingsError;
use crate::interop::{from_js, is_nullish, js_error, to_js};
use crate::storage::{Schema, Settings, StoredSettings, STORAGE_KEYS};
use crate::tab_data::TagGroup;
use patternfly_yew::prelude::*;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge/options.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSyncStorage(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSyncStorage(items: JsValue) -> Result<(), JsValue>;
}

const STATUS_CLEAR_MS: i32 = 2000;

#[derive(Debug, Clone, PartialEq)]
enum ViewState {
    Loading,
    LoadFailed(String),
    Idle,
    Saved,
    SaveFailed(String),
}

#[derive(Debug)]
enum ViewAction {
    Loaded,
    LoadFailed(String),
    Saved,
    SaveFailed(String),
    ClearSaved,
}

impl ViewState {
    fn next(&self, action: ViewAction) -> ViewState {
        match (self, action) {
            // Stored settings were never read; keep the error up
            (ViewState::LoadFailed(_), _) => self.clone(),
            (_, ViewAction::Loaded) => ViewState::Idle,
            (_, ViewAction::LoadFailed(e)) => ViewState::LoadFailed(e),
            (_, ViewAction::Saved) => ViewState::Saved,
            (_, ViewAction::SaveFailed(e)) => ViewState::SaveFailed(e),
            (ViewState::Saved, ViewAction::ClearSaved) => ViewState::Idle,
            (_, ViewAction::ClearSaved) => self.clone(),
        }
    }

    /// Saving before settings are loaded would overwrite them with defaults
    fn can_save(&self) -> bool {
        !matches!(self, ViewState::Loading | ViewState::LoadFailed(_))
    }
}

impl Reducible for ViewState {
    type Action = ViewAction;

    fn reduce(self: Rc<Self>, action: ViewAction) -> Rc<Self> {
        Rc::new(self.next(action))
    }
}

#[function_component(OptionsPage)]
pub fn options_page() -> Html {
    let state = use_reducer(|| ViewState::Loading);
    let settings = use_state(Settings::default);
    let endpoint_input = use_state(String::new);
    let new_entry = use_state(String::new);
    let validation = use_state(|| None::<String>);

    // Load settings on mount
    {
        let state = state.clone();
        let settings = settings.clone();
        let endpoint_input = endpoint_input.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_settings().await {
                    Ok(loaded) => {
                        endpoint_input.set(loaded.gas_url.clone().unwrap_or_default());
                        settings.set(loaded);
                        state.dispatch(ViewAction::Loaded);
                    }
                    Err(e) => {
                        state.dispatch(ViewAction::LoadFailed(format!("Failed to load: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    // Apply a schema edit, surfacing validation errors inline
    let edit_schema = {
        let settings = settings.clone();
        let validation = validation.clone();

        Callback::from(move |edit: SchemaEdit| {
            let mut next = (*settings).clone();
            match edit.apply(&mut next.schema) {
                Ok(()) => {
                    settings.set(next);
                    validation.set(None);
                }
                Err(e) => validation.set(Some(e.to_string())),
            }
        })
    };

    let on_endpoint_input = {
        let endpoint_input = endpoint_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                endpoint_input.set(input.value());
            }
        })
    };

    let on_new_entry_input = {
        let new_entry = new_entry.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                new_entry.set(input.value());
            }
        })
    };

    let on_add_entry = {
        let new_entry = new_entry.clone();
        let edit_schema = edit_schema.clone();
        let settings = settings.clone();

        Callback::from(move |_| {
            let name = (*new_entry).clone();
            let edit = match settings.schema {
                Schema::Categories(_) => SchemaEdit::AddCategory(name),
                Schema::TagGroups(_) => SchemaEdit::AddGroup(name),
            };
            edit_schema.emit(edit);
            new_entry.set(String::new());
        })
    };

    let on_migrate = {
        let edit_schema = edit_schema.clone();
        Callback::from(move |_| edit_schema.emit(SchemaEdit::MigrateToTagGroups))
    };

    let on_save = {
        let settings = settings.clone();
        let endpoint_input = endpoint_input.clone();
        let state = state.clone();

        Callback::from(move |_| {
            if !state.can_save() {
                return;
            }
            let mut next = (*settings).clone();
            next.set_endpoint(&endpoint_input);
            endpoint_input.set(next.gas_url.clone().unwrap_or_default());
            settings.set(next.clone());

            let dispatcher = state.dispatcher();
            spawn_local(async move {
                match save_settings(&next).await {
                    Ok(()) => {
                        dispatcher.dispatch(ViewAction::Saved);
                        clear_status_later(dispatcher);
                    }
                    Err(e) => dispatcher.dispatch(ViewAction::SaveFailed(format!("Failed to save: {}", e))),
                }
            });
        })
    };

    let can_save = state.can_save();

    html! {
        <div class="container">
            <h1 class="main-title">{"Sheet Capture 設定"}</h1>

            // Status display
            {match &*state {
                ViewState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                ViewState::LoadFailed(err) | ViewState::SaveFailed(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                ViewState::Saved | ViewState::Idle => html! {}
            }}

            if let Some(message) = (*validation).clone() {
                <Alert r#type={AlertType::Warning} title={message} inline={true}>
                </Alert>
            }

            <section class="section">
                <h2 class="section-title">{"GAS Web App URL"}</h2>
                <input
                    type="url"
                    class="endpoint-input"
                    placeholder="https://script.google.com/macros/s/.../exec"
                    value={(*endpoint_input).clone()}
                    oninput={on_endpoint_input}
                />
            </section>

            <section class="section">
                {match &settings.schema {
                    Schema::TagGroups(groups) => html! {
                        <>
                            <h2 class="section-title">{"タググループ"}</h2>
                            <p class="section-hint">{"タグのないグループは自由入力欄になります。"}</p>
                            {for groups.iter().enumerate().map(|(index, group)| html! {
                                <GroupCard
                                    key={group.name.clone()}
                                    index={index}
                                    group={group.clone()}
                                    on_edit={edit_schema.clone()}
                                />
                            })}
                        </>
                    },
                    Schema::Categories(categories) => html! {
                        <>
                            <h2 class="section-title">{"カテゴリ"}</h2>
                            <div class="entry-list">
                                {for categories.iter().enumerate().map(|(index, category)| html! {
                                    <div key={category.clone()} class="entry-item">
                                        <span class="entry-name">{category}</span>
                                        <Button
                                            onclick={edit_schema.reform(move |_| SchemaEdit::RemoveCategory(index))}
                                            variant={ButtonVariant::Danger}
                                            size={ButtonSize::Small}
                                        >
                                            {"✗"}
                                        </Button>
                                    </div>
                                })}
                            </div>
                            <Button onclick={on_migrate} variant={ButtonVariant::Secondary}>
                                {"タググループ形式に移行"}
                            </Button>
                        </>
                    },
                }}

                <div class="add-entry">
                    <input
                        type="text"
                        class="entry-input"
                        placeholder={match settings.schema {
                            Schema::Categories(_) => "新しいカテゴリ",
                            Schema::TagGroups(_) => "新しいグループ名",
                        }}
                        value={(*new_entry).clone()}
                        oninput={on_new_entry_input}
                    />
                    <Button onclick={on_add_entry} variant={ButtonVariant::Secondary}>
                        {"追加"}
                    </Button>
                </div>
            </section>

            <div class="footer">
                <Button onclick={on_save} disabled={!can_save} variant={ButtonVariant::Primary}>
                    {"保存"}
                </Button>
                <span class="status">
                    {if *state == ViewState::Saved { "保存しました" } else { "" }}
                </span>
            </div>
        </div>
    }
}

/// One validated edit of the configured schema
#[derive(Debug, Clone, PartialEq)]
enum SchemaEdit {
    AddGroup(String),
    RemoveGroup(usize),
    RenameGroup(usize, String),
    AddTag(usize, String),
    RemoveTag(usize, usize),
    AddCategory(String),
    RemoveCategory(usize),
    MigrateToTagGroups,
}

impl SchemaEdit {
    fn apply(self, schema: &mut Schema) -> Result<(), SettingsError> {
        match self {
            SchemaEdit::AddGroup(name) => schema.add_group(&name),
            SchemaEdit::RemoveGroup(index) => schema.remove_group(index).map(|_| ()),
            SchemaEdit::RenameGroup(index, name) => schema.rename_group(index, &name),
            SchemaEdit::AddTag(index, tag) => schema.add_tag(index, &tag),
            SchemaEdit::RemoveTag(group, tag) => schema.remove_tag(group, tag).map(|_| ()),
            SchemaEdit::AddCategory(name) => schema.add_category(&name),
            SchemaEdit::RemoveCategory(index) => schema.remove_category(index).map(|_| ()),
            SchemaEdit::MigrateToTagGroups => schema.migrate_to_tag_groups(),
        }
    }
}

// Group card component
#[derive(Properties, PartialEq)]
struct GroupCardProps {
    index: usize,
    group: TagGroup,
    on_edit: Callback<SchemaEdit>,
}

#[function_component(GroupCard)]
fn group_card(props: &GroupCardProps) -> Html {
    let editing = use_state(|| false);
    let edit_value = use_state(String::new);
    let new_tag = use_state(String::new);
    let index = props.index;

    let on_start_edit = {
        let editing = editing.clone();
        let edit_value = edit_value.clone();
        let name = props.group.name.clone();
        Callback::from(move |_| {
            edit_value.set(name.clone());
            editing.set(true);
        })
    };

    let on_save_edit = {
        let editing = editing.clone();
        let edit_value = edit_value.clone();
        let on_edit = props.on_edit.clone();
        Callback::from(move |_| {
            on_edit.emit(SchemaEdit::RenameGroup(index, (*edit_value).clone()));
            editing.set(false);
        })
    };

    let on_cancel_edit = {
        let editing = editing.clone();
        Callback::from(move |_| editing.set(false))
    };

    let on_edit_input = {
        let edit_value = edit_value.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                edit_value.set(input.value());
            }
        })
    };

    let on_new_tag_input = {
        let new_tag = new_tag.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                new_tag.set(input.value());
            }
        })
    };

    let on_add_tag = {
        let new_tag = new_tag.clone();
        let on_edit = props.on_edit.clone();
        Callback::from(move |_| {
            on_edit.emit(SchemaEdit::AddTag(index, (*new_tag).clone()));
            new_tag.set(String::new());
        })
    };

    html! {
        <div class="group-card">
            <div class="group-header">
                if *editing {
                    <div class="group-title-edit-mode">
                        <input
                            type="text"
                            value={(*edit_value).clone()}
                            oninput={on_edit_input}
                            class="group-title-input"
                        />
                        <Button onclick={on_save_edit}>{"✓"}</Button>
                        <Button onclick={on_cancel_edit} variant={ButtonVariant::Secondary}>{"✗"}</Button>
                    </div>
                } else {
                    <div class="group-title-view-mode">
                        <h3 class="group-title" onclick={on_start_edit}>{&props.group.name}</h3>
                        <span class="edit-icon">{"✏️"}</span>
                    </div>
                }
                <Button
                    onclick={props.on_edit.reform(move |_| SchemaEdit::RemoveGroup(index))}
                    variant={ButtonVariant::Danger}
                >
                    {"🗑️"}
                </Button>
            </div>

            <div class="tags-list">
                if props.group.is_free_text() {
                    <p class="free-text-hint">{"自由入力"}</p>
                }
                {for props.group.tags.iter().enumerate().map(|(tag_index, tag)| html! {
                    <span key={tag.clone()} class="tag-item">
                        {tag}
                        <Button
                            onclick={props.on_edit.reform(move |_| SchemaEdit::RemoveTag(index, tag_index))}
                            variant={ButtonVariant::Plain}
                            size={ButtonSize::Small}
                        >
                            {"✗"}
                        </Button>
                    </span>
                })}
            </div>

            <div class="add-tag">
                <input
                    type="text"
                    class="tag-input"
                    placeholder="新しいタグ"
                    value={(*new_tag).clone()}
                    oninput={on_new_tag_input}
                />
                <Button onclick={on_add_tag} variant={ButtonVariant::Secondary} size={ButtonSize::Small}>
                    {"追加"}
                </Button>
            </div>
        </div>
    }
}

// Helper functions

async fn load_settings() -> Result<Settings, String> {
    let keys = to_js(&STORAGE_KEYS)?;
    let stored_js = getSyncStorage(keys)
        .await
        .map_err(|e| format!("Failed to get storage: {}", js_error(&e)))?;

    if is_nullish(&stored_js) {
        Ok(Settings::default())
    } else {
        from_js::<StoredSettings>(stored_js).map(StoredSettings::into_settings)
    }
}

async fn save_settings(settings: &Settings) -> Result<(), String> {
    let items = to_js(&StoredSettings::from(settings))?;

    setSyncStorage(items)
        .await
        .map_err(|e| format!("Failed to save storage: {}", js_error(&e)))
}

fn clear_status_later(dispatcher: UseReducerDispatcher<ViewState>) {
    let clear = Closure::once_into_js(move || dispatcher.dispatch(ViewAction::ClearSaved));
    if let Some(window) = web_sys::window() {
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(clear.unchecked_ref(), STATUS_CLEAR_MS);
    }
}
