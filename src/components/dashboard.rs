//! Dashboard Page
//!
//! The signed-in user's list. Fetches once on mount, then follows the change
//! feed until the page is left.

use leptos::prelude::*;
use leptos::task::spawn_local;
use tasker_core::Subscription;

use crate::commands;
use crate::components::{CreateTodoForm, SignOutButton, TodoList};
use crate::context::use_app_context;

#[component]
pub fn Dashboard() -> impl IntoView {
    let ctx = use_app_context();
    let feed = StoredValue::new_local(None::<Subscription>);

    match ctx.session.get_untracked() {
        Some(session) => {
            let owner = session.user_id().clone();
            spawn_local(async move {
                commands::load_todos(ctx, owner.clone()).await;
                if let Some(subscription) = commands::watch_todos(ctx, owner).await {
                    // If the page is already gone the handle drops here and
                    // the subscription is released.
                    let _ = feed.try_update_value(|slot| *slot = Some(subscription));
                }
            });
        }
        None => log::warn!("[APP] Dashboard mounted without a session"),
    }

    on_cleanup(move || {
        let _ = feed.try_update_value(|slot| slot.take());
    });

    let email = move || {
        ctx.session
            .with(|s| s.as_ref().and_then(|s| s.user.email.clone()))
            .unwrap_or_default()
    };

    view! {
        <div class="dashboard">
            <header class="dashboard-header">
                <div>
                    <h1>"Dashboard"</h1>
                    <p>"Welcome, " {email}</p>
                </div>
                <SignOutButton />
            </header>
            <CreateTodoForm />
            <TodoList />
        </div>
    }
}
