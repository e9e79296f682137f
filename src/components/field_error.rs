//! Inline validation message for one form field

use leptos::prelude::*;

use crate::models::ValidationErrors;

#[component]
pub fn FieldError(errors: RwSignal<ValidationErrors>, field: &'static str) -> impl IntoView {
    move || {
        errors.with(|e| e.get(field).map(|message| {
            let message = message.to_string();
            view! { <p class="field-error">{message}</p> }
        }))
    }
}
