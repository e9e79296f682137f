//! Session Entity
//!
//! Derived from the authentication provider. Holds the signed-in user and the
//! tokens the hosted backend expects on every request.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult};

/// Identifier of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Refresh this long before the access token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

impl Session {
    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }

    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }

    /// Parse the tokens delivered in the URL fragment of an OAuth, recovery or
    /// email-confirmation redirect. The user is not part of the fragment; the
    /// caller resolves it with the access token.
    pub fn from_redirect_fragment(fragment: &str) -> DomainResult<RedirectTokens> {
        let fragment = fragment.trim_start_matches('#');
        let mut access_token = None;
        let mut refresh_token = None;
        let mut expires_in = None;
        let mut kind = None;
        let mut error = None;

        for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
            match key.as_ref() {
                "access_token" => access_token = Some(value.into_owned()),
                "refresh_token" => refresh_token = Some(value.into_owned()),
                "expires_in" => expires_in = value.parse::<i64>().ok(),
                "type" => kind = Some(value.into_owned()),
                "error_description" => error = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error {
            return Err(DomainError::Auth(error));
        }

        match (access_token, refresh_token) {
            (Some(access_token), Some(refresh_token)) => Ok(RedirectTokens {
                access_token,
                refresh_token,
                expires_in: expires_in.unwrap_or(3600),
                recovery: kind.as_deref() == Some("recovery"),
            }),
            _ => Err(DomainError::Auth("redirect did not carry a session".to_string())),
        }
    }
}

/// Tokens carried by an auth redirect
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    /// Set for password-recovery links
    pub recovery: bool,
}

impl RedirectTokens {
    pub fn into_session(self, user: User, now: DateTime<Utc>) -> Session {
        Session {
            user,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: now + Duration::seconds(self.expires_in),
        }
    }
}

/// Session-state change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

/// Outcome of a sign-up request
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// Email confirmation is disabled; the user is signed in.
    SignedIn(Session),
    /// A confirmation email was sent.
    ConfirmationSent,
}

/// Supported OAuth providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "Continue with Google",
            OAuthProvider::Github => "Continue with GitHub",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_oauth_fragment() {
        let tokens = Session::from_redirect_fragment(
            "#access_token=abc&expires_in=120&refresh_token=def&token_type=bearer&type=recovery",
        )
        .unwrap();

        assert_eq!(tokens.access_token, "abc");
        assert_eq!(tokens.refresh_token, "def");
        assert_eq!(tokens.expires_in, 120);
        assert!(tokens.recovery);
    }

    #[test]
    fn test_fragment_error_is_auth_error() {
        let err = Session::from_redirect_fragment("error=access_denied&error_description=Email+link+is+invalid")
            .unwrap_err();
        assert_eq!(err, DomainError::Auth("Email link is invalid".to_string()));
    }

    #[test]
    fn test_fragment_without_tokens() {
        assert!(Session::from_redirect_fragment("").unwrap_err().is_auth());
    }

    #[test]
    fn test_needs_refresh_margin() {
        let now = Utc::now();
        let session = RedirectTokens {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_in: 30,
            recovery: false,
        }
        .into_session(User { id: UserId::new("u"), email: None }, now);

        assert!(session.needs_refresh(now));
        assert!(!session.needs_refresh(now - Duration::seconds(120)));
    }
}
