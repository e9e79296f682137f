//! Application Context
//!
//! Shared state provided via Leptos Context API.

use leptos::prelude::*;
use leptos::task::spawn_local;
use gloo_timers::future::TimeoutFuture;
use tasker_core::{DomainError, Route};

use crate::browser::history;
use crate::models::{Session, ToastKind, TOAST_DURATION_MS};
use crate::services::Services;
use crate::store::{store_dismiss_toast, store_push_toast, AppStore};

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Collaborators; not `Send`, so kept in local storage
    services: StoredValue<Services, LocalStorage>,
    /// Current view - read
    pub route: ReadSignal<Route>,
    set_route: WriteSignal<Route>,
    /// Signed-in session as last reported by the auth provider - read
    pub session: ReadSignal<Option<Session>>,
    set_session: WriteSignal<Option<Session>>,
    pub store: AppStore,
}

impl AppContext {
    pub fn new(services: Services, initial: Route, store: AppStore) -> Self {
        let (route, set_route) = signal(initial);
        let (session, set_session) = signal(None);
        Self {
            services: StoredValue::new_local(services),
            route,
            set_route,
            session,
            set_session,
            store,
        }
    }

    pub fn services(&self) -> Services {
        self.services.get_value()
    }

    pub fn captcha_site_key(&self) -> Option<String> {
        self.services.with_value(|s| s.config.captcha_site_key.clone())
    }

    /// Go to `route`, adding a history entry
    pub fn navigate(&self, route: Route) {
        log::info!("[APP] Navigate to {}", route);
        history::push(&route);
        self.set_route.set(route);
    }

    /// Redirect to `route` without a history entry
    pub fn redirect(&self, route: Route) {
        log::info!("[APP] Redirect to {}", route);
        history::replace(&route);
        self.set_route.set(route);
    }

    /// Re-read the route after the browser moved through history
    pub fn sync_route(&self) {
        self.set_route.set(history::current_route());
    }

    pub fn set_session(&self, session: Option<Session>) {
        self.set_session.set(session);
    }

    /// Show a toast that dismisses itself
    pub fn toast(&self, kind: ToastKind, message: impl Into<String>) {
        let store = self.store;
        let id = store_push_toast(&store, kind, message.into());
        spawn_local(async move {
            TimeoutFuture::new(TOAST_DURATION_MS).await;
            store_dismiss_toast(&store, id);
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.toast(ToastKind::Success, message);
    }

    /// Surface a failed call. Auth failures also send the user to sign-in.
    pub fn report(&self, err: &DomainError) {
        log::error!("[APP] {}", err);
        self.toast(ToastKind::Error, err.user_message());
        if err.is_auth() && self.route.get_untracked().requires_session() {
            self.set_session(None);
            self.redirect(Route::SignIn);
        }
    }
}

pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}
