use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands;
use crate::context::use_app_context;

#[component]
pub fn SignOutButton() -> impl IntoView {
    let ctx = use_app_context();
    let (pending, set_pending) = signal(false);

    view! {
        <button
            class="sign-out-btn"
            disabled=move || pending.get()
            on:click=move |_| {
                set_pending.set(true);
                spawn_local(async move {
                    commands::sign_out(ctx).await;
                    set_pending.set(false);
                });
            }
        >
            "Sign Out"
        </button>
    }
}
