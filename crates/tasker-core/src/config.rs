//! Application Configuration
//!
//! Read once at start-up. The browser build feeds compile-time values through
//! [`AppConfig::from_lookup`]; native builds and tests read the process
//! environment.

use url::Url;

use crate::domain::{DomainError, DomainResult};

pub const APP_URL_KEY: &str = "TASKER_APP_URL";
pub const BACKEND_URL_KEY: &str = "TASKER_BACKEND_URL";
pub const BACKEND_KEY_KEY: &str = "TASKER_BACKEND_KEY";
pub const CAPTCHA_SITE_KEY_KEY: &str = "TASKER_CAPTCHA_SITE_KEY";
pub const STORAGE_BUCKET_KEY: &str = "TASKER_STORAGE_BUCKET";
pub const TABLE_KEY: &str = "TASKER_TABLE";

pub const DEFAULT_STORAGE_BUCKET: &str = "todos_cover_images";
pub const DEFAULT_TABLE: &str = "todos";

/// Hosted backend endpoint and its public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: Url,
    pub anon_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base for OAuth and password-reset redirect targets; always ends in `/`
    pub app_url: Url,
    /// `None` runs against the in-memory backend
    pub backend: Option<BackendConfig>,
    pub captcha_site_key: Option<String>,
    pub storage_bucket: String,
    pub table: String,
}

impl AppConfig {
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let app_url = get(APP_URL_KEY).ok_or_else(|| DomainError::Config(format!("{} is not set", APP_URL_KEY)))?;
        let app_url = parse_base_url(APP_URL_KEY, &app_url)?;

        let backend = match get(BACKEND_URL_KEY) {
            Some(url) => {
                let url = parse_base_url(BACKEND_URL_KEY, &url)?;
                let anon_key = get(BACKEND_KEY_KEY).ok_or_else(|| {
                    DomainError::Config(format!("{} is required when {} is set", BACKEND_KEY_KEY, BACKEND_URL_KEY))
                })?;
                Some(BackendConfig { url, anon_key })
            }
            None => None,
        };

        Ok(Self {
            app_url,
            backend,
            captcha_site_key: get(CAPTCHA_SITE_KEY_KEY),
            storage_bucket: get(STORAGE_BUCKET_KEY).unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string()),
            table: get(TABLE_KEY).unwrap_or_else(|| DEFAULT_TABLE.to_string()),
        })
    }

    pub fn captcha_required(&self) -> bool {
        self.captcha_site_key.is_some()
    }
}

fn parse_base_url(key: &str, raw: &str) -> DomainResult<Url> {
    let mut url = Url::parse(raw).map_err(|e| DomainError::Config(format!("{} is not a valid URL: {}", key, e)))?;
    if url.cannot_be_a_base() {
        return Err(DomainError::Config(format!("{} cannot be used as a base URL", key)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AppConfig::from_lookup(lookup(&[(APP_URL_KEY, "http://localhost:3000")])).unwrap();

        assert_eq!(config.app_url.as_str(), "http://localhost:3000/");
        assert_eq!(config.backend, None);
        assert_eq!(config.storage_bucket, DEFAULT_STORAGE_BUCKET);
        assert_eq!(config.table, DEFAULT_TABLE);
        assert!(!config.captcha_required());
    }

    #[test]
    fn test_full_config() {
        let config = AppConfig::from_lookup(lookup(&[
            (APP_URL_KEY, "https://tasker.example.com/app"),
            (BACKEND_URL_KEY, "https://abc.supabase.co"),
            (BACKEND_KEY_KEY, "anon"),
            (CAPTCHA_SITE_KEY_KEY, "site-key"),
            (STORAGE_BUCKET_KEY, "covers"),
        ]))
        .unwrap();

        assert_eq!(config.app_url.as_str(), "https://tasker.example.com/app/");
        let backend = config.backend.unwrap();
        assert_eq!(backend.url.as_str(), "https://abc.supabase.co/");
        assert_eq!(backend.anon_key, "anon");
        assert_eq!(config.captcha_site_key.as_deref(), Some("site-key"));
        assert_eq!(config.storage_bucket, "covers");
    }

    #[test]
    fn test_missing_app_url() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }

    #[test]
    fn test_backend_url_requires_key() {
        let err = AppConfig::from_lookup(lookup(&[
            (APP_URL_KEY, "http://localhost:3000"),
            (BACKEND_URL_KEY, "https://abc.supabase.co"),
        ]))
        .unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }

    #[test]
    fn test_invalid_url_and_blank_values() {
        let err = AppConfig::from_lookup(lookup(&[(APP_URL_KEY, "not a url")])).unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));

        let config =
            AppConfig::from_lookup(lookup(&[(APP_URL_KEY, "http://localhost"), (CAPTCHA_SITE_KEY_KEY, "  ")])).unwrap();
        assert_eq!(config.captcha_site_key, None);
    }
}
