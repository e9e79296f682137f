//! Update-password Page
//!
//! Target of the password-reset link. The link's tokens sign the user in
//! before the form is submitted.

use leptos::prelude::*;
use leptos::task::spawn_local;
use tasker_core::domain::validate_new_password;

use crate::browser::history;
use crate::commands;
use crate::components::FieldError;
use crate::context::use_app_context;
use crate::models::ValidationErrors;

#[component]
pub fn UpdatePassword() -> impl IntoView {
    let ctx = use_app_context();
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let errors = RwSignal::new(ValidationErrors::default());
    let (error_msg, set_error_msg) = signal(None::<String>);
    let (loading, set_loading) = signal(false);

    let fragment = history::current_hash();
    if fragment.contains("access_token") {
        spawn_local(async move {
            if let Err(message) = commands::accept_recovery_link(ctx, fragment).await {
                let _ = set_error_msg.try_set(Some(message));
            }
        });
    }

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let mut invalid = match validate_new_password(&password.get_untracked()) {
            Ok(_) => ValidationErrors::default(),
            Err(invalid) => invalid,
        };
        if password.get_untracked() != confirm.get_untracked() {
            invalid.push("confirm_password", "Passwords do not match");
        }
        if !invalid.is_empty() {
            errors.set(invalid);
            return;
        }
        errors.set(ValidationErrors::default());
        set_error_msg.set(None);
        set_loading.set(true);
        let new_password = password.get_untracked();
        spawn_local(async move {
            if let Err(message) = commands::update_password(ctx, new_password).await {
                let _ = set_error_msg.try_set(Some(message));
            }
            let _ = set_loading.try_set(false);
        });
    };

    view! {
        <div class="auth-page">
            <h1>"Choose a new password"</h1>
            <form class="auth-form" on:submit=submit>
                <label class="field">
                    <span>"New password"</span>
                    <input
                        type="password"
                        prop:value=move || password.get()
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                    />
                    <FieldError errors=errors field="password" />
                </label>
                <label class="field">
                    <span>"Confirm new password"</span>
                    <input
                        type="password"
                        prop:value=move || confirm.get()
                        on:input=move |ev| set_confirm.set(event_target_value(&ev))
                    />
                    <FieldError errors=errors field="confirm_password" />
                </label>
                {move || error_msg.get().map(|m| view! { <p class="form-error">{m}</p> })}
                <button type="submit" class="btn btn-primary" disabled=move || loading.get()>
                    {move || if loading.get() { "Updating..." } else { "Update password" }}
                </button>
            </form>
        </div>
    }
}
