//! Session gate for the guarded views
//!
//! Renders its children only once the session guard has authorized the
//! visitor; otherwise redirects to sign-in without fetching anything. Keeps
//! watching the session while mounted so a sign-out elsewhere also redirects.

use leptos::prelude::*;
use leptos::task::spawn_local;
use tasker_core::GuardDecision;

use crate::context::{use_app_context, AppContext};

fn apply(ctx: AppContext, decision: GuardDecision) {
    match decision {
        GuardDecision::Authorized(session) => ctx.set_session(Some(session)),
        GuardDecision::Redirect(route) => {
            ctx.set_session(None);
            ctx.redirect(route);
        }
    }
}

#[component]
pub fn RequireSession(children: ChildrenFn) -> impl IntoView {
    let ctx = use_app_context();
    let (checked, set_checked) = signal(false);

    let guard = ctx.services().guard;
    let watch = StoredValue::new_local(Some(guard.watch(move |decision| {
        if checked.get_untracked() {
            apply(ctx, decision);
        }
    })));
    on_cleanup(move || {
        let _ = watch.try_update_value(|w| w.take());
    });

    spawn_local(async move {
        let decision = guard.check().await;
        // Navigated away while the check was in flight.
        if checked.try_get_untracked().is_none() {
            return;
        }
        apply(ctx, decision);
        set_checked.set(true);
    });

    view! {
        <Show
            when=move || checked.get() && ctx.session.with(|s| s.is_some())
            fallback=|| view! {
                <div class="loading-page">
                    <div class="spinner"></div>
                </div>
            }
        >
            {children()}
        </Show>
    }
}
