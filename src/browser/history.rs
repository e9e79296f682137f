//! History API navigation

use leptos::prelude::window;
use tasker_core::Route;
use wasm_bindgen::JsValue;

pub fn current_route() -> Route {
    let path = window().location().pathname().unwrap_or_else(|_| "/".to_string());
    Route::parse(&path)
}

/// URL fragment including the leading `#`, empty when absent.
pub fn current_hash() -> String {
    window().location().hash().unwrap_or_default()
}

pub fn push(route: &Route) {
    let result = window()
        .history()
        .and_then(|h| h.push_state_with_url(&JsValue::NULL, "", Some(&route.path())));
    if let Err(e) = result {
        log::error!("[HISTORY] push {} failed: {:?}", route, e);
    }
}

/// Swap the current entry; used for redirects so "back" skips them.
pub fn replace(route: &Route) {
    let result = window()
        .history()
        .and_then(|h| h.replace_state_with_url(&JsValue::NULL, "", Some(&route.path())));
    if let Err(e) = result {
        log::error!("[HISTORY] replace {} failed: {:?}", route, e);
    }
}

/// Leave the app, e.g. for an OAuth provider.
pub fn leave_to(url: &str) {
    if let Err(e) = window().location().assign(url) {
        log::error!("[HISTORY] navigation to {} failed: {:?}", url, e);
    }
}
