use efficiency_tutor::format_comma;
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Current year from the browser clock, for the footer.
pub fn current_year() -> u32 {
    js_sys::Date::new_0().get_full_year()
}

/// Checked state of the checkbox that fired `e`.
pub fn checkbox_checked(e: &Event) -> bool {
    e.target()
        .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.checked())
        .unwrap_or(false)
}

/// Average accuracy as shown in the stats panel, `–` before any success.
pub fn format_accuracy(average: Option<f64>) -> String {
    match average {
        Some(avg) => format!("{} %", format_comma(avg, 1)),
        None => "–".to_string(),
    }
}

/// Split an answer template at its `__` placeholder.
pub fn split_template(template: &str) -> (&str, &str) {
    template.split_once("__").unwrap_or((template, ""))
}
