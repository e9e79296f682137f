//! Repository Layer - Core Traits
//!
//! Contracts of the external collaborators: authentication, the record
//! store, asset storage and the change feed. Implementations can target the
//! hosted backend, in-memory state, etc.
//!
//! Everything runs on one cooperative event loop, so none of the futures or
//! handles are required to be `Send`.

use std::rc::Rc;

use async_trait::async_trait;
use url::Url;

use crate::domain::{
    DomainResult, NewTodo, OAuthProvider, Session, SessionEvent, SignUpOutcome, Todo, TodoId, TodoPatch, User,
    UserId,
};
use crate::subscription::Subscription;

/// Called on every session-state change with the new session (if any).
pub type SessionListener = Rc<dyn Fn(SessionEvent, Option<Session>)>;

/// Authentication collaborator
#[async_trait(?Send)]
pub trait AuthProvider {
    /// Current session, refreshing the access token if it is about to expire.
    async fn get_session(&self) -> DomainResult<Option<Session>>;

    /// Register a listener for session-state changes.
    fn on_session_change(&self, listener: SessionListener) -> Subscription;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> DomainResult<Session>;

    async fn sign_up(&self, email: &str, password: &str, captcha_token: Option<&str>) -> DomainResult<SignUpOutcome>;

    async fn sign_out(&self) -> DomainResult<()>;

    async fn reset_password_for_email(&self, email: &str, redirect_to: &Url) -> DomainResult<()>;

    async fn update_password(&self, password: &str) -> DomainResult<User>;

    /// Where to send the browser to start an OAuth sign-in.
    fn provider_sign_in_url(&self, provider: OAuthProvider, redirect_to: &Url) -> DomainResult<Url>;

    /// Establish a session from the URL fragment of an auth redirect.
    async fn complete_redirect(&self, fragment: &str) -> DomainResult<Session>;
}

/// Row-level filtered CRUD against the single todo collection
#[async_trait(?Send)]
pub trait RecordStore {
    /// All records owned by `owner`, newest first.
    async fn select(&self, owner: &UserId) -> DomainResult<Vec<Todo>>;

    async fn find_by_id(&self, id: &TodoId) -> DomainResult<Option<Todo>>;

    /// Persist a draft; the store assigns `id` and `created_at`.
    async fn insert(&self, draft: &NewTodo) -> DomainResult<Todo>;

    async fn update(&self, id: &TodoId, patch: &TodoPatch) -> DomainResult<Todo>;

    /// Remove a record, returning the deleted row if there was one.
    async fn delete(&self, id: &TodoId) -> DomainResult<Option<Todo>>;
}

/// Object storage for cover images
#[async_trait(?Send)]
pub trait AssetStorage {
    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> DomainResult<()>;

    fn public_url(&self, path: &str) -> String;

    /// Inverse of [`AssetStorage::public_url`]. `None` for foreign URLs.
    fn path_from_public_url(&self, url: &str) -> Option<String>;

    async fn remove(&self, path: &str) -> DomainResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One notification from the change feed
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// New row for inserts and updates
    pub new: Option<Todo>,
    /// Primary key of the old row (always present for deletes)
    pub old_id: Option<TodoId>,
}

impl ChangeEvent {
    pub fn inserted(todo: Todo) -> Self {
        Self { kind: ChangeKind::Insert, new: Some(todo), old_id: None }
    }

    pub fn updated(todo: Todo) -> Self {
        let old_id = Some(todo.id.clone());
        Self { kind: ChangeKind::Update, new: Some(todo), old_id }
    }

    pub fn deleted(id: TodoId) -> Self {
        Self { kind: ChangeKind::Delete, new: None, old_id: Some(id) }
    }
}

/// Which records a feed subscription covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFilter {
    pub owner: UserId,
}

pub type ChangeSink = Rc<dyn Fn(ChangeEvent)>;

/// Push subscription delivering insert/update/delete notifications
#[async_trait(?Send)]
pub trait ChangeFeed {
    /// Attach `sink` to the stream for `filter`. Events are delivered in the
    /// order the backend emits them until the returned handle is dropped.
    async fn subscribe(&self, filter: ChangeFilter, sink: ChangeSink) -> DomainResult<Subscription>;
}

/// Keeps the session across page loads
pub trait SessionPersistence {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: Option<&Session>);
}

/// Session persistence that forgets everything on reload
#[derive(Debug, Default)]
pub struct NoPersistence;

impl SessionPersistence for NoPersistence {
    fn load(&self) -> Option<Session> {
        None
    }

    fn save(&self, _session: Option<&Session>) {}
}
