use web_sys::HtmlInputElement;
use yew::prelude::*;

/// State and callbacks for a free-text input that belongs to one round.
#[derive(Clone)]
pub struct TextField {
    /// The current text content of the input field.
    pub text: String,
    /// Callback for the input's `oninput` event.
    pub on_input: Callback<InputEvent>,
    /// Callback to replace the text programmatically.
    pub set: Callback<String>,
}

/// Text field that empties itself whenever `round` changes.
#[hook]
pub fn use_text_field(round: u64) -> TextField {
    let text = use_state(String::new);

    let on_input = {
        let text_setter = text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            text_setter.set(input.value());
        })
    };

    let set = {
        let text_setter = text.clone();
        Callback::from(move |value: String| text_setter.set(value))
    };

    {
        let text_setter = text.clone();
        use_effect_with(round, move |_| {
            text_setter.set(String::new());
            || ()
        });
    }

    TextField {
        text: (*text).clone(),
        on_input,
        set,
    }
}

/// Plain state that returns to `initial` whenever `round` changes.
#[hook]
pub fn use_round_state<T>(round: u64, initial: T) -> UseStateHandle<T>
where
    T: Clone + 'static,
{
    let state = use_state(|| initial.clone());
    {
        let state = state.clone();
        use_effect_with(round, move |_| {
            state.set(initial);
            || ()
        });
    }
    state
}
