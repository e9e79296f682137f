//! In-Memory Backend
//!
//! A process-local stand-in for the hosted platform. One [`MemoryBackend`]
//! holds the shared state (accounts, records, assets, feed subscribers);
//! each [`MemoryClient`] is one browser session against it, so two clients
//! of the same backend behave like two tabs.
//!
//! Row-level security is emulated: clients only see their own records and
//! writes to another user's rows fail with `Auth`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use url::Url;
use uuid::Uuid;

use super::traits::{
    AssetStorage, AuthProvider, ChangeEvent, ChangeFeed, ChangeFilter, ChangeSink, RecordStore, SessionListener,
};
use crate::config::DEFAULT_STORAGE_BUCKET;
use crate::domain::{
    DomainError, DomainResult, NewTodo, OAuthProvider, Session, SessionEvent, SignUpOutcome, Todo, TodoId, TodoPatch,
    User, UserId,
};
use crate::subscription::Subscription;

const RLS_VIOLATION: &str = "row-level security policy violation";

/// How many times each backend call was made
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub selects: usize,
    pub finds: usize,
    pub inserts: usize,
    pub updates: usize,
    pub deletes: usize,
    pub uploads: usize,
    pub removes: usize,
    pub subscribes: usize,
}

impl CallCounts {
    /// Calls that touch the record collection.
    pub fn record_calls(&self) -> usize {
        self.selects + self.finds + self.inserts + self.updates + self.deletes
    }
}

/// An email the backend would have sent
#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub to: String,
    pub link: Url,
}

#[derive(Debug, Clone, Copy, Default)]
struct Failures {
    store: bool,
    upload: bool,
    remove: bool,
}

struct Account {
    user: User,
    password: String,
    confirmed: bool,
}

struct Asset {
    bytes: Vec<u8>,
    content_type: String,
}

struct FeedEntry {
    id: u64,
    owner: UserId,
    sink: ChangeSink,
}

struct State {
    bucket: String,
    accounts: Vec<Account>,
    access_tokens: HashMap<String, UserId>,
    refresh_tokens: HashMap<String, UserId>,
    records: Vec<Todo>,
    assets: HashMap<String, Asset>,
    feeds: Vec<FeedEntry>,
    mail: Vec<SentMail>,
    next_record: u64,
    next_feed: u64,
    token_ttl: Duration,
    confirm_sign_ups: bool,
    captcha_required: bool,
    failures: Failures,
    counts: CallCounts,
}

impl State {
    fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.user.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email)))
    }

    fn issue_session(&mut self, user: User) -> Session {
        let access_token = format!("mem-at-{}", Uuid::new_v4().simple());
        let refresh_token = format!("mem-rt-{}", Uuid::new_v4().simple());
        self.access_tokens.insert(access_token.clone(), user.id.clone());
        self.refresh_tokens.insert(refresh_token.clone(), user.id.clone());
        Session { user, access_token, refresh_token, expires_at: Utc::now() + self.token_ttl }
    }

    fn sinks_for(&self, owner: &UserId) -> Vec<ChangeSink> {
        self.feeds.iter().filter(|f| &f.owner == owner).map(|f| f.sink.clone()).collect()
    }
}

/// Shared in-memory platform state
#[derive(Clone)]
pub struct MemoryBackend {
    state: Rc<RefCell<State>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_bucket(DEFAULT_STORAGE_BUCKET)
    }

    pub fn with_bucket(bucket: impl Into<String>) -> Self {
        let state = State {
            bucket: bucket.into(),
            accounts: Vec::new(),
            access_tokens: HashMap::new(),
            refresh_tokens: HashMap::new(),
            records: Vec::new(),
            assets: HashMap::new(),
            feeds: Vec::new(),
            mail: Vec::new(),
            next_record: 1,
            next_feed: 1,
            token_ttl: Duration::hours(1),
            confirm_sign_ups: false,
            captcha_required: false,
            failures: Failures::default(),
            counts: CallCounts::default(),
        };
        Self { state: Rc::new(RefCell::new(state)) }
    }

    /// A new signed-out client (one browser tab).
    pub fn client(&self) -> MemoryClient {
        MemoryClient {
            backend: self.clone(),
            session: Rc::new(RefCell::new(None)),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener: Rc::new(Cell::new(1)),
        }
    }

    /// Create a confirmed account.
    pub fn register(&self, email: &str, password: &str) -> UserId {
        let id = UserId::new(Uuid::new_v4().to_string());
        self.state.borrow_mut().accounts.push(Account {
            user: User { id: id.clone(), email: Some(email.to_string()) },
            password: password.to_string(),
            confirmed: true,
        });
        id
    }

    /// Sign-ups wait for an emailed confirmation link.
    pub fn require_email_confirmation(&self, on: bool) {
        self.state.borrow_mut().confirm_sign_ups = on;
    }

    pub fn require_captcha(&self, on: bool) {
        self.state.borrow_mut().captcha_required = on;
    }

    pub fn set_token_ttl(&self, ttl: Duration) {
        self.state.borrow_mut().token_ttl = ttl;
    }

    pub fn fail_store(&self, on: bool) {
        self.state.borrow_mut().failures.store = on;
    }

    pub fn fail_uploads(&self, on: bool) {
        self.state.borrow_mut().failures.upload = on;
    }

    pub fn fail_asset_removal(&self, on: bool) {
        self.state.borrow_mut().failures.remove = on;
    }

    pub fn counts(&self) -> CallCounts {
        self.state.borrow().counts
    }

    pub fn has_asset(&self, path: &str) -> bool {
        self.state.borrow().assets.contains_key(path)
    }

    pub fn asset_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.state.borrow().assets.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn asset_content_type(&self, path: &str) -> Option<String> {
        self.state.borrow().assets.get(path).map(|a| a.content_type.clone())
    }

    /// Every stored record, regardless of owner.
    pub fn all_records(&self) -> Vec<Todo> {
        self.state.borrow().records.clone()
    }

    pub fn active_feeds(&self) -> usize {
        self.state.borrow().feeds.len()
    }

    pub fn sent_mail(&self) -> Vec<SentMail> {
        self.state.borrow().mail.clone()
    }

    fn broadcast(&self, owner: &UserId, event: ChangeEvent) {
        // Sinks run without the state borrowed.
        let sinks = self.state.borrow().sinks_for(owner);
        for sink in sinks {
            sink(event.clone());
        }
    }

    fn mail_link(&self, to: &str, redirect_to: &Url, session: &Session, kind: &str) {
        let expires_in = (session.expires_at - Utc::now()).num_seconds().max(0);
        let fragment: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("access_token", &session.access_token)
            .append_pair("refresh_token", &session.refresh_token)
            .append_pair("expires_in", &expires_in.to_string())
            .append_pair("token_type", "bearer")
            .append_pair("type", kind)
            .finish();
        let mut link = redirect_to.clone();
        link.set_fragment(Some(&fragment));
        self.state.borrow_mut().mail.push(SentMail { to: to.to_string(), link });
    }
}

/// One client session against a [`MemoryBackend`]
#[derive(Clone)]
pub struct MemoryClient {
    backend: MemoryBackend,
    session: Rc<RefCell<Option<Session>>>,
    listeners: Rc<RefCell<Vec<(u64, SessionListener)>>>,
    next_listener: Rc<Cell<u64>>,
}

impl MemoryClient {
    pub fn backend(&self) -> &MemoryBackend {
        &self.backend
    }

    fn current_user(&self) -> Option<UserId> {
        self.session.borrow().as_ref().map(|s| s.user_id().clone())
    }

    fn require_user(&self) -> DomainResult<UserId> {
        self.current_user().ok_or_else(|| DomainError::Auth("Your session has expired. Please sign in again.".to_string()))
    }

    fn set_session(&self, event: SessionEvent, session: Option<Session>) {
        *self.session.borrow_mut() = session.clone();
        let listeners: Vec<SessionListener> = self.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(event, session.clone());
        }
    }

    fn check_store_failure(&self) -> DomainResult<()> {
        if self.backend.state.borrow().failures.store {
            return Err(DomainError::Store("injected store failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl AuthProvider for MemoryClient {
    async fn get_session(&self) -> DomainResult<Option<Session>> {
        let current = self.session.borrow().clone();
        let Some(session) = current else {
            return Ok(None);
        };
        if !session.needs_refresh(Utc::now()) {
            return Ok(Some(session));
        }

        let refreshed = {
            let mut state = self.backend.state.borrow_mut();
            match state.refresh_tokens.remove(&session.refresh_token) {
                Some(_) => Some(state.issue_session(session.user.clone())),
                None => None,
            }
        };
        match refreshed {
            Some(next) => {
                log::debug!("[MEMORY] Rotated tokens for {}", next.user_id());
                self.set_session(SessionEvent::TokenRefreshed, Some(next.clone()));
                Ok(Some(next))
            }
            None => {
                self.set_session(SessionEvent::SignedOut, None);
                Err(DomainError::Auth("refresh token is no longer valid".to_string()))
            }
        }
    }

    fn on_session_change(&self, listener: SessionListener) -> Subscription {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, listener));

        let listeners = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().retain(|(lid, _)| *lid != id);
            }
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> DomainResult<Session> {
        let session = {
            let mut state = self.backend.state.borrow_mut();
            let user = match state.account_by_email(email) {
                Some(account) if account.password == password && account.confirmed => account.user.clone(),
                Some(account) if account.password == password => {
                    return Err(DomainError::Auth("Email not confirmed".to_string()))
                }
                _ => return Err(DomainError::Auth("Invalid login credentials".to_string())),
            };
            state.issue_session(user)
        };
        self.set_session(SessionEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str, captcha_token: Option<&str>) -> DomainResult<SignUpOutcome> {
        let (session, confirm) = {
            let mut state = self.backend.state.borrow_mut();
            if state.captcha_required && captcha_token.map_or(true, str::is_empty) {
                return Err(DomainError::Auth("captcha verification process failed".to_string()));
            }
            if state.account_by_email(email).is_some() {
                return Err(DomainError::Auth("User already registered".to_string()));
            }
            let confirm = state.confirm_sign_ups;
            let user = User { id: UserId::new(Uuid::new_v4().to_string()), email: Some(email.to_string()) };
            state.accounts.push(Account { user: user.clone(), password: password.to_string(), confirmed: !confirm });
            (state.issue_session(user), confirm)
        };

        if confirm {
            let target = Url::parse("memory://confirm/")
                .map_err(|e| DomainError::Config(format!("confirmation link: {}", e)))?;
            self.backend.mail_link(email, &target, &session, "signup");
            return Ok(SignUpOutcome::ConfirmationSent);
        }
        self.set_session(SessionEvent::SignedIn, Some(session.clone()));
        Ok(SignUpOutcome::SignedIn(session))
    }

    async fn sign_out(&self) -> DomainResult<()> {
        if let Some(session) = self.session.borrow().as_ref() {
            let mut state = self.backend.state.borrow_mut();
            state.access_tokens.remove(&session.access_token);
            state.refresh_tokens.remove(&session.refresh_token);
        }
        self.set_session(SessionEvent::SignedOut, None);
        Ok(())
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &Url) -> DomainResult<()> {
        let session = {
            let mut state = self.backend.state.borrow_mut();
            match state.account_by_email(email).map(|a| a.user.clone()) {
                Some(user) => state.issue_session(user),
                // Unknown addresses succeed silently.
                None => return Ok(()),
            }
        };
        self.backend.mail_link(email, redirect_to, &session, "recovery");
        Ok(())
    }

    async fn update_password(&self, password: &str) -> DomainResult<User> {
        let user_id = self.require_user()?;
        let user = {
            let mut state = self.backend.state.borrow_mut();
            let account = state
                .accounts
                .iter_mut()
                .find(|a| a.user.id == user_id)
                .ok_or_else(|| DomainError::Auth("user no longer exists".to_string()))?;
            account.password = password.to_string();
            account.user.clone()
        };
        let session = self.session.borrow().clone();
        self.set_session(SessionEvent::UserUpdated, session);
        Ok(user)
    }

    fn provider_sign_in_url(&self, provider: OAuthProvider, _redirect_to: &Url) -> DomainResult<Url> {
        Err(DomainError::Auth(format!("{} sign-in needs a hosted backend", provider.as_str())))
    }

    async fn complete_redirect(&self, fragment: &str) -> DomainResult<Session> {
        let tokens = Session::from_redirect_fragment(fragment)?;
        let recovery = tokens.recovery;
        let user = {
            let mut state = self.backend.state.borrow_mut();
            let user_id = state
                .access_tokens
                .get(&tokens.access_token)
                .cloned()
                .ok_or_else(|| DomainError::Auth("link is invalid or has expired".to_string()))?;
            let account = state
                .accounts
                .iter_mut()
                .find(|a| a.user.id == user_id)
                .ok_or_else(|| DomainError::Auth("user no longer exists".to_string()))?;
            account.confirmed = true;
            account.user.clone()
        };
        let session = tokens.into_session(user, Utc::now());
        let event = if recovery { SessionEvent::PasswordRecovery } else { SessionEvent::SignedIn };
        self.set_session(event, Some(session.clone()));
        Ok(session)
    }
}

#[async_trait(?Send)]
impl RecordStore for MemoryClient {
    async fn select(&self, owner: &UserId) -> DomainResult<Vec<Todo>> {
        self.backend.state.borrow_mut().counts.selects += 1;
        self.check_store_failure()?;

        // Anonymous or foreign reads see nothing, like a filtered select.
        if self.current_user().as_ref() != Some(owner) {
            return Ok(Vec::new());
        }
        let state = self.backend.state.borrow();
        let mut todos: Vec<Todo> = state.records.iter().filter(|t| &t.user_id == owner).cloned().collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn find_by_id(&self, id: &TodoId) -> DomainResult<Option<Todo>> {
        self.backend.state.borrow_mut().counts.finds += 1;
        self.check_store_failure()?;

        let Some(user) = self.current_user() else {
            return Ok(None);
        };
        let state = self.backend.state.borrow();
        Ok(state.records.iter().find(|t| &t.id == id && t.user_id == user).cloned())
    }

    async fn insert(&self, draft: &NewTodo) -> DomainResult<Todo> {
        self.backend.state.borrow_mut().counts.inserts += 1;
        self.check_store_failure()?;
        let user = self.require_user()?;
        if draft.user_id != user {
            return Err(DomainError::Auth(RLS_VIOLATION.to_string()));
        }

        let todo = {
            let mut state = self.backend.state.borrow_mut();
            let id = TodoId::new(state.next_record.to_string());
            state.next_record += 1;
            let todo = Todo {
                id,
                user_id: draft.user_id.clone(),
                title: draft.title.clone(),
                description: draft.description.clone(),
                due: draft.due,
                priority: draft.priority,
                status: draft.status,
                cover_image: draft.cover_image.clone(),
                created_at: Utc::now(),
            };
            state.records.push(todo.clone());
            todo
        };
        self.backend.broadcast(&todo.user_id, ChangeEvent::inserted(todo.clone()));
        Ok(todo)
    }

    async fn update(&self, id: &TodoId, patch: &TodoPatch) -> DomainResult<Todo> {
        self.backend.state.borrow_mut().counts.updates += 1;
        self.check_store_failure()?;
        let user = self.require_user()?;

        let todo = {
            let mut state = self.backend.state.borrow_mut();
            let record = state
                .records
                .iter_mut()
                .find(|t| &t.id == id)
                .ok_or_else(|| DomainError::NotFound(format!("todo {}", id)))?;
            if record.user_id != user {
                return Err(DomainError::Auth(RLS_VIOLATION.to_string()));
            }
            record.apply_patch(patch);
            record.clone()
        };
        self.backend.broadcast(&todo.user_id, ChangeEvent::updated(todo.clone()));
        Ok(todo)
    }

    async fn delete(&self, id: &TodoId) -> DomainResult<Option<Todo>> {
        self.backend.state.borrow_mut().counts.deletes += 1;
        self.check_store_failure()?;
        let user = self.require_user()?;

        let removed = {
            let mut state = self.backend.state.borrow_mut();
            match state.records.iter().position(|t| &t.id == id) {
                Some(idx) if state.records[idx].user_id != user => {
                    return Err(DomainError::Auth(RLS_VIOLATION.to_string()))
                }
                Some(idx) => Some(state.records.remove(idx)),
                None => None,
            }
        };
        if let Some(todo) = &removed {
            self.backend.broadcast(&todo.user_id, ChangeEvent::deleted(todo.id.clone()));
        }
        Ok(removed)
    }
}

#[async_trait(?Send)]
impl AssetStorage for MemoryClient {
    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> DomainResult<()> {
        self.backend.state.borrow_mut().counts.uploads += 1;
        if self.backend.state.borrow().failures.upload {
            return Err(DomainError::Upload("injected upload failure".to_string()));
        }
        let user = self.require_user()?;
        if path.split('/').next() != Some(user.as_str()) {
            return Err(DomainError::Auth(RLS_VIOLATION.to_string()));
        }

        let mut state = self.backend.state.borrow_mut();
        if state.assets.contains_key(path) {
            return Err(DomainError::Upload(format!("{} already exists", path)));
        }
        state
            .assets
            .insert(path.to_string(), Asset { bytes: bytes.to_vec(), content_type: content_type.to_string() });
        log::debug!("[MEMORY] Stored {} ({} bytes)", path, state.assets.get(path).map_or(0, |a| a.bytes.len()));
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://storage/{}/{}", self.backend.state.borrow().bucket, path)
    }

    fn path_from_public_url(&self, url: &str) -> Option<String> {
        let prefix = format!("memory://storage/{}/", self.backend.state.borrow().bucket);
        url.strip_prefix(&prefix).filter(|p| !p.is_empty()).map(str::to_string)
    }

    async fn remove(&self, path: &str) -> DomainResult<()> {
        self.backend.state.borrow_mut().counts.removes += 1;
        if self.backend.state.borrow().failures.remove {
            return Err(DomainError::AssetCleanup("injected remove failure".to_string()));
        }
        self.require_user()?;
        self.backend.state.borrow_mut().assets.remove(path);
        Ok(())
    }
}

#[async_trait(?Send)]
impl ChangeFeed for MemoryClient {
    async fn subscribe(&self, filter: ChangeFilter, sink: ChangeSink) -> DomainResult<Subscription> {
        self.backend.state.borrow_mut().counts.subscribes += 1;
        let user = self.require_user()?;
        if filter.owner != user {
            return Err(DomainError::Auth(RLS_VIOLATION.to_string()));
        }

        let id = {
            let mut state = self.backend.state.borrow_mut();
            let id = state.next_feed;
            state.next_feed += 1;
            state.feeds.push(FeedEntry { id, owner: filter.owner, sink });
            id
        };

        let state = Rc::downgrade(&self.backend.state);
        Ok(Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                state.borrow_mut().feeds.retain(|f| f.id != id);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, Status};

    fn draft(owner: &UserId, title: &str) -> NewTodo {
        NewTodo {
            user_id: owner.clone(),
            title: title.to_string(),
            description: None,
            due: None,
            priority: Priority::Medium,
            status: Status::Todo,
            cover_image: None,
        }
    }

    #[tokio::test]
    async fn test_sign_in_with_wrong_password() {
        let backend = MemoryBackend::new();
        backend.register("a@b.co", "correct horse");
        let client = backend.client();

        let err = client.sign_in_with_password("a@b.co", "wrong").await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(client.get_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rls_blocks_foreign_writes() {
        let backend = MemoryBackend::new();
        let alice = backend.register("alice@example.com", "password1");
        backend.register("bob@example.com", "password2");

        let a = backend.client();
        a.sign_in_with_password("alice@example.com", "password1").await.unwrap();
        let todo = a.insert(&draft(&alice, "Alice's")).await.unwrap();

        let b = backend.client();
        b.sign_in_with_password("bob@example.com", "password2").await.unwrap();
        assert!(b.delete(&todo.id).await.unwrap_err().is_auth());
        assert!(b.insert(&draft(&alice, "forged")).await.unwrap_err().is_auth());
        assert_eq!(b.select(&alice).await.unwrap(), Vec::new());
        assert_eq!(b.find_by_id(&todo.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expiring_token_is_rotated() {
        let backend = MemoryBackend::new();
        backend.register("a@b.co", "password1");
        backend.set_token_ttl(Duration::seconds(30));
        let client = backend.client();
        let events = Rc::new(RefCell::new(Vec::new()));
        let seen = events.clone();
        let _sub = client.on_session_change(Rc::new(move |event, _| seen.borrow_mut().push(event)));

        let first = client.sign_in_with_password("a@b.co", "password1").await.unwrap();
        let current = client.get_session().await.unwrap().unwrap();

        assert_ne!(first.access_token, current.access_token);
        assert_eq!(*events.borrow(), vec![SessionEvent::SignedIn, SessionEvent::TokenRefreshed]);
    }

    #[tokio::test]
    async fn test_recovery_link_establishes_session() {
        let backend = MemoryBackend::new();
        backend.register("a@b.co", "password1");
        let client = backend.client();
        let redirect = Url::parse("http://localhost:3000/update-password").unwrap();

        client.reset_password_for_email("a@b.co", &redirect).await.unwrap();
        client.reset_password_for_email("nobody@b.co", &redirect).await.unwrap();
        let mail = backend.sent_mail();
        assert_eq!(mail.len(), 1);
        assert_eq!(mail[0].link.path(), "/update-password");

        let session = client.complete_redirect(mail[0].link.fragment().unwrap()).await.unwrap();
        assert_eq!(session.user.email.as_deref(), Some("a@b.co"));

        client.update_password("brand new pw").await.unwrap();
        client.sign_out().await.unwrap();
        client.sign_in_with_password("a@b.co", "brand new pw").await.unwrap();
    }

    #[tokio::test]
    async fn test_sign_up_with_confirmation_and_captcha() {
        let backend = MemoryBackend::new();
        backend.require_email_confirmation(true);
        backend.require_captcha(true);
        let client = backend.client();

        let err = client.sign_up("new@b.co", "password1", None).await.unwrap_err();
        assert!(err.is_auth());

        let outcome = client.sign_up("new@b.co", "password1", Some("captcha")).await.unwrap();
        assert_eq!(outcome, SignUpOutcome::ConfirmationSent);
        assert!(client.sign_in_with_password("new@b.co", "password1").await.is_err());

        let link = backend.sent_mail().remove(0).link;
        client.complete_redirect(link.fragment().unwrap()).await.unwrap();
        client.sign_out().await.unwrap();
        client.sign_in_with_password("new@b.co", "password1").await.unwrap();
    }

    #[tokio::test]
    async fn test_public_url_round_trip() {
        let backend = MemoryBackend::with_bucket("covers");
        let client = backend.client();
        let url = client.public_url("u/u-1.png");

        assert_eq!(url, "memory://storage/covers/u/u-1.png");
        assert_eq!(client.path_from_public_url(&url).as_deref(), Some("u/u-1.png"));
        assert_eq!(client.path_from_public_url("https://elsewhere.test/x.png"), None);
    }

    #[tokio::test]
    async fn test_feed_release_removes_subscriber() {
        let backend = MemoryBackend::new();
        let owner = backend.register("a@b.co", "password1");
        let client = backend.client();
        client.sign_in_with_password("a@b.co", "password1").await.unwrap();

        let sub = client.subscribe(ChangeFilter { owner }, Rc::new(|_| {})).await.unwrap();
        assert_eq!(backend.active_feeds(), 1);
        drop(sub);
        assert_eq!(backend.active_feeds(), 0);
    }
}
