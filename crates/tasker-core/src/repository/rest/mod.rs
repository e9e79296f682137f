//! Hosted Backend Client
//!
//! `reqwest` client for the hosted platform: GoTrue auth, PostgREST records
//! and the storage API. One [`SupabaseClient`] is constructed at start-up and
//! shared by cloning; clones share the session.

mod auth;
mod records;
mod storage;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::traits::{AuthProvider, SessionListener, SessionPersistence};
use crate::config::{AppConfig, BackendConfig};
use crate::domain::{DomainError, DomainResult, Session, SessionEvent};

#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base: Url,
    anon_key: String,
    table: String,
    bucket: String,
    session: Rc<RefCell<Option<Session>>>,
    listeners: Rc<RefCell<Vec<(u64, SessionListener)>>>,
    next_listener: Rc<Cell<u64>>,
    persistence: Rc<dyn SessionPersistence>,
}

impl SupabaseClient {
    pub fn new(
        backend: &BackendConfig,
        table: impl Into<String>,
        bucket: impl Into<String>,
        persistence: Rc<dyn SessionPersistence>,
    ) -> Self {
        let restored = persistence.load();
        if let Some(session) = &restored {
            log::info!("[REST] Restored session for {}", session.user_id());
        }
        Self {
            http: Client::new(),
            base: backend.url.clone(),
            anon_key: backend.anon_key.clone(),
            table: table.into(),
            bucket: bucket.into(),
            session: Rc::new(RefCell::new(restored)),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener: Rc::new(Cell::new(1)),
            persistence,
        }
    }

    /// `None` when the configuration has no backend URL.
    pub fn from_config(config: &AppConfig, persistence: Rc<dyn SessionPersistence>) -> Option<Self> {
        config
            .backend
            .as_ref()
            .map(|backend| Self::new(backend, config.table.clone(), config.storage_bucket.clone(), persistence))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn endpoint(&self, path: &str) -> DomainResult<Url> {
        self.base
            .join(path)
            .map_err(|e| DomainError::Config(format!("invalid endpoint {}: {}", path, e)))
    }

    /// Request with the platform key and a bearer token (the session's
    /// access token, or the anon key when signed out).
    fn request(&self, method: Method, url: Url, bearer: Option<&str>) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(self.anon_key.as_str()))
    }

    /// Access token of the current session, refreshed if needed.
    async fn access_token(&self) -> DomainResult<Option<String>> {
        Ok(self.get_session().await?.map(|s| s.access_token))
    }

    fn stored_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn set_session(&self, event: SessionEvent, session: Option<Session>) {
        *self.session.borrow_mut() = session.clone();
        self.persistence.save(session.as_ref());
        let listeners: Vec<SessionListener> = self.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(event, session.clone());
        }
    }
}

/// Which operation a failed response belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Auth,
    Records,
    Upload,
    Remove,
}

/// Map a non-success status to the error taxonomy.
pub(crate) fn status_error(op: Op, status: StatusCode, body: &str) -> DomainError {
    let message = error_message(body).unwrap_or_else(|| status.to_string());
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return DomainError::Auth(message);
    }
    match op {
        Op::Auth => DomainError::Auth(message),
        Op::Records if status == StatusCode::NOT_FOUND => DomainError::NotFound(message),
        Op::Records => DomainError::Store(message),
        Op::Upload => DomainError::Upload(message),
        Op::Remove => DomainError::AssetCleanup(message),
    }
}

/// Human-readable message from a platform error body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

fn transport_error(e: reqwest::Error) -> DomainError {
    DomainError::Transport(e.to_string())
}

async fn send(builder: RequestBuilder) -> DomainResult<Response> {
    builder.send().await.map_err(transport_error)
}

/// Fail with the mapped error unless the response is a success.
async fn check(op: Op, response: Response) -> DomainResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    log::warn!("[REST] {:?} request failed with {}: {}", op, status, body);
    Err(status_error(op, status, &body))
}

async fn read_json<T: DeserializeOwned>(op: Op, response: Response) -> DomainResult<T> {
    let response = check(op, response).await?;
    response.json::<T>().await.map_err(|e| match op {
        Op::Records => DomainError::Store(format!("unexpected response: {}", e)),
        _ => DomainError::Transport(format!("unexpected response: {}", e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::NoPersistence;

    pub(super) fn client() -> SupabaseClient {
        let backend = BackendConfig {
            url: Url::parse("https://project.supabase.co/").unwrap(),
            anon_key: "anon-key".to_string(),
        };
        SupabaseClient::new(&backend, "todos", "todos_cover_images", Rc::new(NoPersistence))
    }

    #[test]
    fn test_unauthorized_maps_to_auth() {
        let err = status_error(Op::Records, StatusCode::UNAUTHORIZED, r#"{"message":"JWT expired"}"#);
        assert_eq!(err, DomainError::Auth("JWT expired".to_string()));

        let err = status_error(Op::Upload, StatusCode::FORBIDDEN, "");
        assert!(err.is_auth());
    }

    #[test]
    fn test_status_mapping_per_operation() {
        let body = r#"{"message":"boom"}"#;
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        assert_eq!(status_error(Op::Records, status, body), DomainError::Store("boom".into()));
        assert_eq!(status_error(Op::Upload, status, body), DomainError::Upload("boom".into()));
        assert_eq!(status_error(Op::Remove, status, body), DomainError::AssetCleanup("boom".into()));
        assert_eq!(status_error(Op::Auth, StatusCode::BAD_REQUEST, body), DomainError::Auth("boom".into()));
    }

    #[test]
    fn test_error_message_keys() {
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#).as_deref(),
            Some("Invalid login credentials")
        );
        assert_eq!(error_message(r#"{"msg":"User already registered"}"#).as_deref(), Some("User already registered"));
        assert_eq!(error_message("<html>"), None);
    }

    #[test]
    fn test_endpoint_joins_base() {
        let client = client();
        assert_eq!(
            client.endpoint("auth/v1/user").unwrap().as_str(),
            "https://project.supabase.co/auth/v1/user"
        );
    }
}
