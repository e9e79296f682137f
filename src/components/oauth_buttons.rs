//! Sign-in buttons for the OAuth providers

use leptos::prelude::*;
use tasker_core::domain::OAuthProvider;

use crate::commands;
use crate::context::use_app_context;
use crate::models::ToastKind;

const PROVIDERS: [OAuthProvider; 2] = [OAuthProvider::Google, OAuthProvider::Github];

#[component]
pub fn OAuthButtons() -> impl IntoView {
    let ctx = use_app_context();

    view! {
        <div class="oauth-divider"><span>"or continue with"</span></div>
        <div class="oauth-buttons">
            {PROVIDERS
                .into_iter()
                .map(|provider| {
                    view! {
                        <button
                            type="button"
                            class=format!("oauth-btn oauth-{}", provider.as_str())
                            on:click=move |_| {
                                if let Err(message) = commands::start_oauth(ctx, provider) {
                                    ctx.toast(ToastKind::Error, message);
                                }
                            }
                        >
                            {provider.label()}
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}
