//! GoTrue authentication endpoints

use std::rc::Rc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::{check, read_json, send, Op, SupabaseClient};
use crate::domain::{
    DomainError, DomainResult, OAuthProvider, RedirectTokens, Session, SessionEvent, SignUpOutcome, User,
};
use crate::repository::traits::{AuthProvider, SessionListener};
use crate::subscription::Subscription;

/// Token grant response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    user: User,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        RedirectTokens {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_in: self.expires_in,
            recovery: false,
        }
        .into_session(self.user, Utc::now())
    }
}

/// `/signup` answers with a session when confirmation is off, otherwise
/// with the bare user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(User),
}

fn default_expires_in() -> i64 {
    3600
}

impl SupabaseClient {
    async fn grant(&self, grant_type: &str, body: serde_json::Value) -> DomainResult<Session> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        let response = send(self.request(Method::POST, url, None).json(&body)).await?;
        let token: TokenResponse = read_json(Op::Auth, response).await?;
        Ok(token.into_session())
    }

    async fn fetch_user(&self, access_token: &str) -> DomainResult<User> {
        let url = self.endpoint("auth/v1/user")?;
        let response = send(self.request(Method::GET, url, Some(access_token))).await?;
        read_json(Op::Auth, response).await
    }

    /// OAuth authorize URL for `provider`, returning to `redirect_to`.
    pub(crate) fn authorize_url(&self, provider: OAuthProvider, redirect_to: &Url) -> DomainResult<Url> {
        let mut url = self.endpoint("auth/v1/authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to.as_str());
        Ok(url)
    }

    pub(crate) fn recover_url(&self, redirect_to: &Url) -> DomainResult<Url> {
        let mut url = self.endpoint("auth/v1/recover")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to.as_str());
        Ok(url)
    }
}

#[async_trait(?Send)]
impl AuthProvider for SupabaseClient {
    async fn get_session(&self) -> DomainResult<Option<Session>> {
        let Some(session) = self.stored_session() else {
            return Ok(None);
        };
        if !session.needs_refresh(Utc::now()) {
            return Ok(Some(session));
        }

        log::info!("[REST] Access token expiring, refreshing");
        match self.grant("refresh_token", json!({ "refresh_token": session.refresh_token })).await {
            Ok(next) => {
                self.set_session(SessionEvent::TokenRefreshed, Some(next.clone()));
                Ok(Some(next))
            }
            Err(e) if e.is_auth() => {
                log::warn!("[REST] Refresh rejected, signing out: {}", e);
                self.set_session(SessionEvent::SignedOut, None);
                Err(e)
            }
            Err(e) => Err(e),
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
        let session = self.grant("password", json!({ "email": email, "password": password })).await?;
        log::info!("[REST] Signed in as {}", session.user_id());
        self.set_session(SessionEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str, captcha_token: Option<&str>) -> DomainResult<SignUpOutcome> {
        let mut body = json!({ "email": email, "password": password });
        if let Some(token) = captcha_token {
            body["gotrue_meta_security"] = json!({ "captcha_token": token });
        }
        let url = self.endpoint("auth/v1/signup")?;
        let response = send(self.request(Method::POST, url, None).json(&body)).await?;

        match read_json::<SignUpResponse>(Op::Auth, response).await? {
            SignUpResponse::Session(token) => {
                let session = token.into_session();
                self.set_session(SessionEvent::SignedIn, Some(session.clone()));
                Ok(SignUpOutcome::SignedIn(session))
            }
            SignUpResponse::User(user) => {
                log::info!("[REST] Confirmation sent to {}", user.email.as_deref().unwrap_or(email));
                Ok(SignUpOutcome::ConfirmationSent)
            }
        }
    }

    async fn sign_out(&self) -> DomainResult<()> {
        if let Some(session) = self.stored_session() {
            let url = self.endpoint("auth/v1/logout")?;
            let result = send(self.request(Method::POST, url, Some(&session.access_token))).await;
            match result {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => log::warn!("[REST] Logout returned {}", response.status()),
                Err(e) => log::warn!("[REST] Logout failed: {}", e),
            }
        }
        // The local session goes regardless of what the server said.
        self.set_session(SessionEvent::SignedOut, None);
        Ok(())
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &Url) -> DomainResult<()> {
        let url = self.recover_url(redirect_to)?;
        let response = send(self.request(Method::POST, url, None).json(&json!({ "email": email }))).await?;
        check(Op::Auth, response).await?;
        Ok(())
    }

    async fn update_password(&self, password: &str) -> DomainResult<User> {
        let session = self
            .get_session()
            .await?
            .ok_or_else(|| DomainError::Auth("Your session has expired. Please sign in again.".to_string()))?;
        let url = self.endpoint("auth/v1/user")?;
        let request = self.request(Method::PUT, url, Some(&session.access_token)).json(&json!({ "password": password }));
        let user: User = read_json(Op::Auth, send(request).await?).await?;

        let updated = Session { user: user.clone(), ..session };
        self.set_session(SessionEvent::UserUpdated, Some(updated));
        Ok(user)
    }

    fn provider_sign_in_url(&self, provider: OAuthProvider, redirect_to: &Url) -> DomainResult<Url> {
        self.authorize_url(provider, redirect_to)
    }

    async fn complete_redirect(&self, fragment: &str) -> DomainResult<Session> {
        let tokens = Session::from_redirect_fragment(fragment)?;
        let recovery = tokens.recovery;
        let user = self.fetch_user(&tokens.access_token).await?;
        let session = tokens.into_session(user, Utc::now());

        let event = if recovery { SessionEvent::PasswordRecovery } else { SessionEvent::SignedIn };
        self.set_session(event, Some(session.clone()));
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::rest::tests::client;

    #[test]
    fn test_authorize_url() {
        let redirect = Url::parse("https://tasker.example.com/auth/callback").unwrap();
        let url = client().provider_sign_in_url(OAuthProvider::Github, &redirect).unwrap();

        assert_eq!(
            url.as_str(),
            "https://project.supabase.co/auth/v1/authorize?provider=github&redirect_to=https%3A%2F%2Ftasker.example.com%2Fauth%2Fcallback"
        );
    }

    #[test]
    fn test_recover_url_carries_redirect() {
        let redirect = Url::parse("http://localhost:3000/update-password").unwrap();
        let url = client().recover_url(&redirect).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/auth/v1/recover");
        assert_eq!(pairs, vec![("redirect_to".to_string(), redirect.to_string())]);
    }

    #[test]
    fn test_sign_up_response_shapes() {
        let with_session = r#"{
            "access_token": "at", "refresh_token": "rt", "expires_in": 3600, "token_type": "bearer",
            "user": {"id": "u-1", "email": "a@b.co", "aud": "authenticated"}
        }"#;
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(with_session).unwrap(),
            SignUpResponse::Session(_)
        ));

        let confirmation = r#"{"id": "u-1", "email": "a@b.co", "confirmation_sent_at": "2025-01-01T00:00:00Z"}"#;
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(confirmation).unwrap(),
            SignUpResponse::User(_)
        ));
    }

    #[tokio::test]
    async fn test_signed_out_client_has_no_session() {
        assert_eq!(client().get_session().await.unwrap(), None);
    }
}
