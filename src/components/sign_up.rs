//! Sign-up Page
//!
//! When a bot-challenge site key is configured the widget renders into the
//! challenge container and its response is required on submit.

use leptos::prelude::*;
use leptos::task::spawn_local;
use tasker_core::domain::SignUpForm;
use tasker_core::Route;
use js_sys::{Function, Object, Reflect};
use leptos::html;
use wasm_bindgen::{JsCast, JsValue};

use crate::commands;
use crate::components::{FieldError, Link, OAuthButtons};
use crate::context::use_app_context;
use crate::models::ValidationErrors;

/// Field the challenge widget writes its token into
const CAPTCHA_RESPONSE_SELECTOR: &str = "[name='h-captcha-response']";

fn captcha_response() -> Option<String> {
    let element = document().query_selector(CAPTCHA_RESPONSE_SELECTOR).ok().flatten()?;
    Reflect::get(&element, &JsValue::from_str("value"))
        .ok()?
        .as_string()
        .filter(|token| !token.is_empty())
}

/// Render the challenge widget into `container` through the global
/// `hcaptcha` API loaded by the page (explicit render mode).
fn render_captcha(container: &web_sys::HtmlDivElement, site_key: &str) {
    let api = match Reflect::get(&window(), &JsValue::from_str("hcaptcha")) {
        Ok(api) if !api.is_undefined() => api,
        _ => {
            log::warn!("[CAPTCHA] Challenge script not loaded");
            return;
        }
    };
    let Some(render) = Reflect::get(&api, &JsValue::from_str("render")).ok().and_then(|f| f.dyn_into::<Function>().ok())
    else {
        log::warn!("[CAPTCHA] Challenge API has no render function");
        return;
    };
    let options = Object::new();
    if Reflect::set(&options, &JsValue::from_str("sitekey"), &JsValue::from_str(site_key)).is_err() {
        return;
    }
    if let Err(e) = render.call2(&api, container, &options) {
        log::error!("[CAPTCHA] Render failed: {:?}", e);
    }
}

#[component]
pub fn SignUp() -> impl IntoView {
    let ctx = use_app_context();
    let site_key = ctx.captcha_site_key();
    let captcha_required = site_key.is_some();

    let form = RwSignal::new(SignUpForm::default());
    let errors = RwSignal::new(ValidationErrors::default());
    let (error_msg, set_error_msg) = signal(None::<String>);
    let (loading, set_loading) = signal(false);
    let captcha_ref = NodeRef::<html::Div>::new();

    if let Some(key) = site_key.clone() {
        Effect::new(move |_| {
            if let Some(container) = captcha_ref.get() {
                render_captcha(&container, &key);
            }
        });
    }

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if captcha_required {
            form.update(|f| f.captcha_token = captcha_response());
        }
        let (credentials, captcha_token) = match form.with_untracked(|f| f.validate(captcha_required)) {
            Ok(valid) => valid,
            Err(invalid) => {
                errors.set(invalid);
                return;
            }
        };
        errors.set(ValidationErrors::default());
        set_error_msg.set(None);
        set_loading.set(true);
        spawn_local(async move {
            if let Err(message) = commands::sign_up(ctx, credentials, captcha_token).await {
                let _ = set_error_msg.try_set(Some(message));
            }
            let _ = set_loading.try_set(false);
        });
    };

    view! {
        <div class="auth-page">
            <h1>"Create an Account"</h1>
            <form class="auth-form" on:submit=submit>
                <label class="field">
                    <span>"Email"</span>
                    <input
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || form.with(|f| f.email.clone())
                        on:input=move |ev| form.update(|f| f.email = event_target_value(&ev))
                    />
                    <small>"We'll never share your email with anyone else."</small>
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
                    <small>"Must be at least 8 characters long."</small>
                    <FieldError errors=errors field="password" />
                </label>
                <label class="field">
                    <span>"Confirm Password"</span>
                    <input
                        type="password"
                        placeholder="••••••••"
                        prop:value=move || form.with(|f| f.confirm_password.clone())
                        on:input=move |ev| form.update(|f| f.confirm_password = event_target_value(&ev))
                    />
                    <small>"Must match the password entered above."</small>
                    <FieldError errors=errors field="confirm_password" />
                </label>
                {site_key.map(|key| view! {
                    <div class="captcha-container" data-sitekey=key node_ref=captcha_ref></div>
                    <FieldError errors=errors field="captcha" />
                })}
                {move || error_msg.get().map(|m| view! { <p class="form-error">{m}</p> })}
                <button type="submit" class="btn btn-primary" disabled=move || loading.get()>
                    {move || if loading.get() { "Signing up..." } else { "Sign Up" }}
                </button>
            </form>
            <OAuthButtons />
            <p class="auth-switch">
                "Already have an account? "
                <Link to=Route::SignIn>"Sign in"</Link>
            </p>
        </div>
    }
}
