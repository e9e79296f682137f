//! Landing point for OAuth and email-confirmation redirects

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::browser::history;
use crate::commands;
use crate::context::use_app_context;

#[component]
pub fn AuthCallback() -> impl IntoView {
    let ctx = use_app_context();
    let fragment = history::current_hash();
    spawn_local(commands::complete_redirect(ctx, fragment));

    view! {
        <div class="loading-page">
            <div class="spinner"></div>
            <p>"Signing you in..."</p>
        </div>
    }
}
