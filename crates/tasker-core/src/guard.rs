//! Session Guard
//!
//! Gates the guarded views. A visitor without a session is sent to sign-in
//! before any record is fetched. A failed session query counts as "no
//! session".

use std::rc::Rc;

use crate::domain::{Session, SessionEvent};
use crate::repository::AuthProvider;
use crate::routes::Route;
use crate::subscription::Subscription;

#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    Authorized(Session),
    Redirect(Route),
}

impl GuardDecision {
    fn from_session(session: Option<Session>) -> Self {
        match session {
            Some(session) => GuardDecision::Authorized(session),
            None => GuardDecision::Redirect(Route::SignIn),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            GuardDecision::Authorized(session) => Some(session),
            GuardDecision::Redirect(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct SessionGuard {
    auth: Rc<dyn AuthProvider>,
}

impl SessionGuard {
    pub fn new(auth: Rc<dyn AuthProvider>) -> Self {
        Self { auth }
    }

    pub async fn check(&self) -> GuardDecision {
        let session = match self.auth.get_session().await {
            Ok(session) => session,
            Err(e) => {
                log::error!("[GUARD] Session query failed, treating as signed out: {}", e);
                None
            }
        };
        if session.is_none() {
            log::info!("[GUARD] No session, redirecting to {}", Route::SignIn);
        }
        GuardDecision::from_session(session)
    }

    /// Re-evaluate on every session change (token refresh, sign-out in
    /// another tab) until the handle is dropped.
    pub fn watch<F>(&self, on_decision: F) -> Subscription
    where
        F: Fn(GuardDecision) + 'static,
    {
        self.auth.on_session_change(Rc::new(move |event: SessionEvent, session: Option<Session>| {
            log::debug!("[GUARD] Session event {:?}", event);
            let session = match event {
                SessionEvent::SignedOut => None,
                _ => session,
            };
            on_decision(GuardDecision::from_session(session));
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, DomainResult, OAuthProvider, SignUpOutcome, User, UserId};
    use crate::repository::SessionListener;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;
    use url::Url;

    /// Auth double whose session query can be scripted
    struct ScriptedAuth {
        answer: DomainResult<Option<Session>>,
        listener: RefCell<Option<SessionListener>>,
    }

    impl ScriptedAuth {
        fn new(answer: DomainResult<Option<Session>>) -> Rc<Self> {
            Rc::new(Self { answer, listener: RefCell::new(None) })
        }

        fn emit(&self, event: SessionEvent, session: Option<Session>) {
            let listener = self.listener.borrow().clone().expect("listener registered");
            listener(event, session);
        }
    }

    fn unsupported<T>() -> DomainResult<T> {
        Err(DomainError::Auth("unsupported".into()))
    }

    #[async_trait(?Send)]
    impl AuthProvider for ScriptedAuth {
        async fn get_session(&self) -> DomainResult<Option<Session>> {
            self.answer.clone()
        }

        fn on_session_change(&self, listener: SessionListener) -> Subscription {
            *self.listener.borrow_mut() = Some(listener);
            Subscription::detached()
        }

        async fn sign_in_with_password(&self, _: &str, _: &str) -> DomainResult<Session> {
            unsupported()
        }

        async fn sign_up(&self, _: &str, _: &str, _: Option<&str>) -> DomainResult<SignUpOutcome> {
            unsupported()
        }

        async fn sign_out(&self) -> DomainResult<()> {
            unsupported()
        }

        async fn reset_password_for_email(&self, _: &str, _: &Url) -> DomainResult<()> {
            unsupported()
        }

        async fn update_password(&self, _: &str) -> DomainResult<User> {
            unsupported()
        }

        fn provider_sign_in_url(&self, _: OAuthProvider, _: &Url) -> DomainResult<Url> {
            unsupported()
        }

        async fn complete_redirect(&self, _: &str) -> DomainResult<Session> {
            unsupported()
        }
    }

    fn session() -> Session {
        Session {
            user: User { id: UserId::new("u-1"), email: Some("a@b.co".into()) },
            access_token: "token".into(),
            refresh_token: "refresh".into(),
            expires_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_signed_in_is_authorized() {
        let guard = SessionGuard::new(ScriptedAuth::new(Ok(Some(session()))));
        assert_eq!(guard.check().await, GuardDecision::Authorized(session()));
    }

    #[tokio::test]
    async fn test_no_session_redirects() {
        let guard = SessionGuard::new(ScriptedAuth::new(Ok(None)));
        assert_eq!(guard.check().await, GuardDecision::Redirect(Route::SignIn));
    }

    #[tokio::test]
    async fn test_query_failure_fails_closed() {
        let guard = SessionGuard::new(ScriptedAuth::new(Err(DomainError::Transport("offline".into()))));
        assert_eq!(guard.check().await, GuardDecision::Redirect(Route::SignIn));
    }

    #[test]
    fn test_watch_follows_session_events() {
        let auth = ScriptedAuth::new(Ok(None));
        let guard = SessionGuard::new(auth.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        let _sub = guard.watch(move |decision| sink.borrow_mut().push(decision));

        auth.emit(SessionEvent::TokenRefreshed, Some(session()));
        auth.emit(SessionEvent::SignedOut, Some(session()));

        assert_eq!(
            *seen.borrow(),
            vec![GuardDecision::Authorized(session()), GuardDecision::Redirect(Route::SignIn)]
        );
    }
}
