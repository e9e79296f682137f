//! Forgot-password Page

use leptos::prelude::*;
use leptos::task::spawn_local;
use tasker_core::domain::validate_email;

use crate::commands;
use crate::components::FieldError;
use crate::context::use_app_context;
use crate::models::ValidationErrors;

#[component]
pub fn ForgotPassword() -> impl IntoView {
    let ctx = use_app_context();
    let (email, set_email) = signal(String::new());
    let errors = RwSignal::new(ValidationErrors::default());
    let (error_msg, set_error_msg) = signal(None::<String>);
    let (sent, set_sent) = signal(false);
    let (loading, set_loading) = signal(false);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let address = match validate_email(&email.get_untracked()) {
            Ok(address) => address,
            Err(invalid) => {
                errors.set(invalid);
                return;
            }
        };
        errors.set(ValidationErrors::default());
        set_error_msg.set(None);
        set_loading.set(true);
        spawn_local(async move {
            match commands::request_password_reset(ctx, address).await {
                Ok(()) => {
                    let _ = set_sent.try_set(true);
                }
                Err(message) => {
                    let _ = set_error_msg.try_set(Some(message));
                }
            }
            let _ = set_loading.try_set(false);
        });
    };

    view! {
        <div class="auth-page">
            <h1>"Reset your password"</h1>
            <Show
                when=move || sent.get()
                fallback=move || view! {
                    <form class="auth-form" on:submit=submit>
                        <label class="field">
                            <span>"Email"</span>
                            <input
                                type="email"
                                placeholder="you@example.com"
                                prop:value=move || email.get()
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                            />
                            <FieldError errors=errors field="email" />
                        </label>
                        {move || error_msg.get().map(|m| view! { <p class="form-error">{m}</p> })}
                        <button type="submit" class="btn btn-primary" disabled=move || loading.get()>
                            {move || if loading.get() { "Sending..." } else { "Send reset link" }}
                        </button>
                    </form>
                }
            >
                <p class="notice">"If an account exists for that email, a reset link is on its way."</p>
            </Show>
        </div>
    }
}
