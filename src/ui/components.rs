/// Reusable UI components

use patternfly_yew::prelude::*;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Outcome of the last popup action
#[derive(Clone, PartialEq)]
pub enum ActionState {
    Idle,
    Busy(String),
    Success(String),
    Error(String),
}

impl ActionState {
    pub fn is_busy(&self) -> bool {
        matches!(self, ActionState::Busy(_))
    }
}

#[derive(Properties, PartialEq)]
pub struct StatusViewProps {
    pub state: ActionState,
}

#[function_component(StatusView)]
pub fn status_view(props: &StatusViewProps) -> Html {
    match &props.state {
        ActionState::Busy(msg) => html! {
            <div class="loading-text-center">
                <Spinner />
                <p class="loading-text">{msg}</p>
            </div>
        },
        ActionState::Success(msg) => html! {
            <div class="message-top-margin">
                <Alert r#type={AlertType::Success} title={msg.clone()} inline={true}>
                </Alert>
            </div>
        },
        ActionState::Error(err) => html! {
            <div class="message-top-margin">
                <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                    {err.clone()}
                </Alert>
            </div>
        },
        ActionState::Idle => html! {},
    }
}

#[derive(Properties, PartialEq)]
pub struct TextFieldProps {
    pub label: AttrValue,
    pub value: String,
    pub oninput: Callback<String>,
    #[prop_or(AttrValue::Static("text"))]
    pub input_type: AttrValue,
    #[prop_or_default]
    pub placeholder: AttrValue,
    #[prop_or(false)]
    pub disabled: bool,
}

#[function_component(TextField)]
pub fn text_field(props: &TextFieldProps) -> Html {
    let oninput = {
        let callback = props.oninput.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                callback.emit(input.value());
            }
        })
    };

    html! {
        <label class="field">
            <span class="field-label">{&props.label}</span>
            <input
                type={props.input_type.clone()}
                class="field-input"
                placeholder={props.placeholder.clone()}
                value={props.value.clone()}
                disabled={props.disabled}
                {oninput}
            />
        </label>
    }
}
