//! In-app link
//!
//! Renders a real `<a href>` but navigates through history without a reload.

use leptos::prelude::*;
use tasker_core::Route;

use crate::context::use_app_context;

#[component]
pub fn Link(to: Route, #[prop(optional, into)] class: String, children: Children) -> impl IntoView {
    let ctx = use_app_context();
    let href = to.path();

    view! {
        <a
            href=href
            class=class
            on:click=move |ev: web_sys::MouseEvent| {
                // Let modified clicks open a new tab.
                if ev.ctrl_key() || ev.meta_key() || ev.shift_key() {
                    return;
                }
                ev.prevent_default();
                ctx.navigate(to.clone());
            }
        >
            {children()}
        </a>
    }
}
