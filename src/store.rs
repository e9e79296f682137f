//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The todo list is
//! a [`ListReconciler`]; every change goes through one `write()` so views
//! never observe a half-applied merge.

use leptos::prelude::*;
use reactive_stores::Store;
use tasker_core::{Applied, Change, ListReconciler, ReconcileTarget};

use crate::models::{Todo, Toast, ToastKind};

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// The signed-in user's todos, newest first
    pub todos: ListReconciler,
    /// Toasts currently on screen
    pub toasts: Vec<Toast>,
    pub next_toast_id: u32,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Fold a confirmed local mutation or a feed event into the list
pub fn store_apply(store: &AppStore, change: Change) -> Applied {
    store.todos().write().apply(change)
}

/// Replace the list with the initial fetch
pub fn store_seed(store: &AppStore, todos: Vec<Todo>) {
    store.todos().write().seed(todos);
}

/// Back to the loading placeholders
pub fn store_reset(store: &AppStore) {
    store.todos().write().reset();
}

pub fn store_find(store: &AppStore, id: &crate::models::TodoId) -> Option<Todo> {
    store.todos().with(|list| list.get(id).cloned())
}

/// Queue a toast and return its id
pub fn store_push_toast(store: &AppStore, kind: ToastKind, message: String) -> u32 {
    let id = store.next_toast_id().get_untracked();
    store.next_toast_id().set(id.wrapping_add(1));
    store.toasts().write().push(Toast { id, kind, message });
    id
}

pub fn store_dismiss_toast(store: &AppStore, id: u32) {
    store.toasts().write().retain(|toast| toast.id != id);
}

/// Feeds the change-feed subscriber straight into the store
#[derive(Clone, Copy)]
pub struct StoreTarget(pub AppStore);

impl ReconcileTarget for StoreTarget {
    fn apply_change(&self, change: Change) -> Applied {
        store_apply(&self.0, change)
    }
}
