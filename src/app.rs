//! Tasker Frontend App
//!
//! Builds the services, provides context and renders the view for the
//! current route.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;
use tasker_core::domain::{Session, SessionEvent};
use tasker_core::Route;

use crate::browser::history;
use crate::components::{
    AuthCallback, ConfirmEmail, Dashboard, ForgotPassword, Landing, NavBar, NotFound, RequireSession, SignIn,
    SignUp, SignUpError, ToastHost, TodoDetail, UpdatePassword,
};
use crate::context::AppContext;
use crate::services::Services;
use crate::store::AppState;

fn render_route(route: Route) -> AnyView {
    match route {
        Route::Home => view! { <Landing /> }.into_any(),
        Route::SignIn => view! { <SignIn /> }.into_any(),
        Route::SignUp => view! { <SignUp /> }.into_any(),
        Route::ConfirmEmail => view! { <ConfirmEmail /> }.into_any(),
        Route::SignUpError => view! { <SignUpError /> }.into_any(),
        Route::ForgotPassword => view! { <ForgotPassword /> }.into_any(),
        Route::UpdatePassword => view! { <UpdatePassword /> }.into_any(),
        Route::AuthCallback => view! { <AuthCallback /> }.into_any(),
        Route::Dashboard => view! {
            <RequireSession>
                <Dashboard />
            </RequireSession>
        }
        .into_any(),
        Route::TodoDetail(id) => view! {
            <RequireSession>
                <TodoDetail id=id.clone() />
            </RequireSession>
        }
        .into_any(),
        Route::NotFound(path) => view! { <NotFound path=path /> }.into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    let services = match Services::load() {
        Ok(services) => services,
        Err(e) => {
            log::error!("[APP] Cannot start: {}", e);
            return view! {
                <main class="config-error">
                    <h1>"Tasker"</h1>
                    <p>{e.user_message()}</p>
                </main>
            }
            .into_any();
        }
    };

    let store = Store::new(AppState::default());
    provide_context(store);
    let ctx = AppContext::new(services.clone(), history::current_route(), store);
    provide_context(ctx);

    // Mirror the provider's session for the whole app lifetime
    let listener = services.auth.on_session_change(Rc::new(move |event: SessionEvent, session: Option<Session>| {
        log::info!("[APP] Session event {:?}", event);
        match event {
            SessionEvent::SignedOut => ctx.set_session(None),
            SessionEvent::PasswordRecovery => {
                ctx.set_session(session);
                ctx.redirect(Route::UpdatePassword);
            }
            _ => ctx.set_session(session),
        }
    }));
    let _listener = StoredValue::new_local(listener);

    spawn_local(async move {
        match ctx.services().auth.get_session().await {
            Ok(session) => ctx.set_session(session),
            Err(e) => log::warn!("[APP] Could not restore session: {}", e),
        }
    });

    let _popstate = window_event_listener(leptos::ev::popstate, move |_| ctx.sync_route());

    view! {
        <div class="app-layout">
            <NavBar />
            <main class="main-content">
                {move || render_route(ctx.route.get())}
            </main>
            <ToastHost />
        </div>
    }
    .into_any()
}
