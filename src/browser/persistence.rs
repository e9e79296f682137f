//! Session persistence in `localStorage`

use leptos::prelude::window;
use tasker_core::domain::Session;
use tasker_core::repository::SessionPersistence;
use web_sys::Storage;

const SESSION_KEY: &str = "tasker.session";

/// Keeps the session across reloads and shares it between tabs.
#[derive(Debug, Default)]
pub struct LocalSessionStore;

impl LocalSessionStore {
    fn storage() -> Option<Storage> {
        window().local_storage().ok().flatten()
    }
}

impl SessionPersistence for LocalSessionStore {
    fn load(&self) -> Option<Session> {
        let raw = Self::storage()?.get_item(SESSION_KEY).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("[SESSION] Discarding unreadable stored session: {}", e);
                None
            }
        }
    }

    fn save(&self, session: Option<&Session>) {
        let Some(storage) = Self::storage() else {
            log::warn!("[SESSION] localStorage unavailable, session will not survive a reload");
            return;
        };
        let result = match session {
            Some(session) => match serde_json::to_string(session) {
                Ok(raw) => storage.set_item(SESSION_KEY, &raw),
                Err(e) => {
                    log::error!("[SESSION] Could not serialize session: {}", e);
                    return;
                }
            },
            None => storage.remove_item(SESSION_KEY),
        };
        if let Err(e) = result {
            log::error!("[SESSION] localStorage write failed: {:?}", e);
        }
    }
}
