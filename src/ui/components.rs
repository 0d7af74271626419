/// Reusable UI components for the capture panel. Styles are inline because
/// the panel renders inside a shadow root without the page's stylesheets.

use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ButtonProps {
    pub onclick: Callback<MouseEvent>,
    pub children: Children,
    #[prop_or_default]
    pub variant: ButtonVariant,
}

#[derive(PartialEq, Clone, Default)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
}

#[function_component(Button)]
pub fn button(props: &ButtonProps) -> Html {
    let base_style = "padding: 8px 18px; border: none; border-radius: 4px; font-size: 14px; cursor: pointer; font-weight: 500;";

    let variant_style = match props.variant {
        ButtonVariant::Primary => "background-color: #1a73e8; color: white;",
        ButtonVariant::Secondary => "background-color: #e0e0e0; color: #333;",
    };

    html! {
        <button
            type="button"
            onclick={props.onclick.clone()}
            style={format!("{} {}", base_style, variant_style)}
        >
            {props.children.clone()}
        </button>
    }
}

#[derive(Properties, PartialEq)]
pub struct ChipProps {
    pub label: AttrValue,
    pub selected: bool,
    pub onclick: Callback<MouseEvent>,
}

/// Toggle chip; one per predefined tag
#[function_component(Chip)]
pub fn chip(props: &ChipProps) -> Html {
    let (bg_color, fg_color, border_color) = if props.selected {
        ("#1a73e8", "white", "#1a73e8")
    } else {
        ("white", "#333", "#ccc")
    };

    html! {
        <button
            type="button"
            class={classes!("chip", props.selected.then_some("chip-selected"))}
            onclick={props.onclick.clone()}
            style={format!("padding: 4px 12px; margin: 0 6px 6px 0; border-radius: 16px; font-size: 13px; cursor: pointer; background-color: {}; color: {}; border: 1px solid {};", bg_color, fg_color, border_color)}
        >
            {props.label.clone()}
        </button>
    }
}

#[derive(Properties, PartialEq)]
pub struct TextFieldProps {
    pub value: AttrValue,
    pub oninput: Callback<InputEvent>,
    #[prop_or_default]
    pub placeholder: AttrValue,
}

#[function_component(TextField)]
pub fn text_field(props: &TextFieldProps) -> Html {
    html! {
        <input
            type="text"
            value={props.value.clone()}
            placeholder={props.placeholder.clone()}
            oninput={props.oninput.clone()}
            style="width: 100%; box-sizing: border-box; padding: 6px 8px; border: 1px solid #ccc; border-radius: 4px; font-size: 13px;"
        />
    }
}
