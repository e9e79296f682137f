//! Service Wiring
//!
//! Builds the collaborators once at start-up and hands them to the views
//! through context. Without a configured backend the app runs against the
//! in-memory backend so it can be tried offline.

use std::rc::Rc;

use tasker_core::config::{
    AppConfig, APP_URL_KEY, BACKEND_KEY_KEY, BACKEND_URL_KEY, CAPTCHA_SITE_KEY_KEY, STORAGE_BUCKET_KEY, TABLE_KEY,
};
use tasker_core::realtime::{socket_url, RealtimeFeed};
use tasker_core::repository::{AuthProvider, ChangeFeed, MemoryBackend, SupabaseClient};
use tasker_core::{DomainResult, SessionGuard, TodoStore};

use crate::browser::{BrowserTransport, LocalSessionStore};

#[derive(Clone)]
pub struct Services {
    pub config: AppConfig,
    pub auth: Rc<dyn AuthProvider>,
    pub todos: TodoStore,
    pub feed: Rc<dyn ChangeFeed>,
    pub guard: SessionGuard,
}

impl Services {
    pub fn load() -> DomainResult<Self> {
        let config = AppConfig::from_lookup(build_time_value)?;
        Self::from_config(config)
    }

    pub fn from_config(config: AppConfig) -> DomainResult<Self> {
        match SupabaseClient::from_config(&config, Rc::new(LocalSessionStore)) {
            Some(client) => {
                let url = socket_url(client.base_url(), client.anon_key())?;
                let client = Rc::new(client);
                let auth: Rc<dyn AuthProvider> = client.clone();
                let feed = RealtimeFeed::new(BrowserTransport, url, config.table.clone(), auth.clone());
                log::info!("[APP] Using hosted backend {}", client.base_url());
                Ok(Self {
                    todos: TodoStore::new(auth.clone(), client.clone(), client),
                    guard: SessionGuard::new(auth.clone()),
                    feed: Rc::new(feed),
                    auth,
                    config,
                })
            }
            None => {
                log::warn!("[APP] {} is not set, running against the in-memory backend", BACKEND_URL_KEY);
                let client = Rc::new(MemoryBackend::with_bucket(config.storage_bucket.clone()).client());
                let auth: Rc<dyn AuthProvider> = client.clone();
                Ok(Self {
                    todos: TodoStore::new(auth.clone(), client.clone(), client.clone()),
                    guard: SessionGuard::new(auth.clone()),
                    feed: client,
                    auth,
                    config,
                })
            }
        }
    }
}

/// Values baked in at build time. The app URL falls back to the page origin.
fn build_time_value(key: &str) -> Option<String> {
    let value = match key {
        APP_URL_KEY => option_env!("TASKER_APP_URL"),
        BACKEND_URL_KEY => option_env!("TASKER_BACKEND_URL"),
        BACKEND_KEY_KEY => option_env!("TASKER_BACKEND_KEY"),
        CAPTCHA_SITE_KEY_KEY => option_env!("TASKER_CAPTCHA_SITE_KEY"),
        STORAGE_BUCKET_KEY => option_env!("TASKER_STORAGE_BUCKET"),
        TABLE_KEY => option_env!("TASKER_TABLE"),
        _ => None,
    };
    match value {
        Some(value) => Some(value.to_string()),
        None if key == APP_URL_KEY => leptos::prelude::window().location().origin().ok(),
        None => None,
    }
}
