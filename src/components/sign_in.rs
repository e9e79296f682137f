//! Sign-in Page

use leptos::prelude::*;
use leptos::task::spawn_local;
use tasker_core::domain::SignInForm;
use tasker_core::Route;

use crate::commands;
use crate::components::{FieldError, Link, OAuthButtons};
use crate::context::use_app_context;
use crate::models::ValidationErrors;

#[component]
pub fn SignIn() -> impl IntoView {
    let ctx = use_app_context();
    let form = RwSignal::new(SignInForm::default());
    let errors = RwSignal::new(ValidationErrors::default());
    let (error_msg, set_error_msg) = signal(None::<String>);
    let (loading, set_loading) = signal(false);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let credentials = match form.with_untracked(|f| f.validate()) {
            Ok(credentials) => credentials,
            Err(invalid) => {
                errors.set(invalid);
                return;
            }
        };
        errors.set(ValidationErrors::default());
        set_error_msg.set(None);
        set_loading.set(true);
        spawn_local(async move {
            if let Err(message) = commands::sign_in(ctx, credentials).await {
                let _ = set_error_msg.try_set(Some(message));
            }
            let _ = set_loading.try_set(false);
        });
    };

    view! {
        <div class="auth-page">
            <h1>"Sign in to Tasker"</h1>
            <form class="auth-form" on:submit=submit>
                <label class="field">
                    <span>"Email"</span>
                    <input
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || form.with(|f| f.email.clone())
                        on:input=move |ev| form.update(|f| f.email = event_target_value(&ev))
                    />
                    <FieldError errors=errors field="email" />
                </label>
                <label class="field">
                    <span>"Password"</span>
                    <input
                        type="password"
                        placeholder="••••••••"
                        prop:value=move || form.with(|f| f.password.clone())
                        on:input=move |ev| form.update(|f| f.password = event_target_value(&ev))
                    />
                    <FieldError errors=errors field="password" />
                </label>
                {move || error_msg.get().map(|m| view! { <p class="form-error">{m}</p> })}
                <button type="submit" class="btn btn-primary" disabled=move || loading.get()>
                    {move || if loading.get() { "Signing in..." } else { "Sign In" }}
                </button>
            </form>
            <Link to=Route::ForgotPassword class="auth-link">"Forgot your password?"</Link>
            <OAuthButtons />
            <p class="auth-switch">
                "Don't have an account? "
                <Link to=Route::SignUp>"Sign up"</Link>
            </p>
        </div>
    }
}
