//! Application Routes
//!
//! Paths the browser can be on. Parsing ignores query strings, fragments and
//! a trailing slash.

use std::fmt;

use url::Url;

use crate::domain::{DomainError, DomainResult, TodoId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    SignIn,
    SignUp,
    ConfirmEmail,
    SignUpError,
    ForgotPassword,
    UpdatePassword,
    AuthCallback,
    Dashboard,
    TodoDetail(TodoId),
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Route::Home,
            "/signin" => Route::SignIn,
            "/signup" => Route::SignUp,
            "/confirm-email" => Route::ConfirmEmail,
            "/signup-error" => Route::SignUpError,
            "/forgot-password" => Route::ForgotPassword,
            "/update-password" => Route::UpdatePassword,
            "/auth/callback" => Route::AuthCallback,
            "/dashboard" => Route::Dashboard,
            other => match other.strip_prefix("/todo/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Route::TodoDetail(TodoId::new(id)),
                _ => Route::NotFound(path.to_string()),
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::SignIn => "/signin".to_string(),
            Route::SignUp => "/signup".to_string(),
            Route::ConfirmEmail => "/confirm-email".to_string(),
            Route::SignUpError => "/signup-error".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::UpdatePassword => "/update-password".to_string(),
            Route::AuthCallback => "/auth/callback".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::TodoDetail(id) => format!("/todo/{}", id),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Views that need a session.
    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Dashboard | Route::TodoDetail(_))
    }

    /// Absolute URL of this route under `app_url`, used as a redirect target
    /// for OAuth and password-reset links.
    pub fn absolute(&self, app_url: &Url) -> DomainResult<Url> {
        app_url
            .join(self.path().trim_start_matches('/'))
            .map_err(|e| DomainError::Config(format!("cannot build redirect for {}: {}", self, e)))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_known_paths() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/signin"), Route::SignIn);
        assert_eq!(Route::parse("/dashboard/"), Route::Dashboard);
        assert_eq!(Route::parse("/auth/callback?code=1"), Route::AuthCallback);
        assert_eq!(Route::parse("/todo/42"), Route::TodoDetail(TodoId::new("42")));
    }

    #[test]
    fn test_parse_unknown_paths() {
        assert_eq!(Route::parse("/todo/"), Route::NotFound("/todo/".to_string()));
        assert_eq!(Route::parse("/todo/1/edit"), Route::NotFound("/todo/1/edit".to_string()));
        assert_eq!(Route::parse("/nope"), Route::NotFound("/nope".to_string()));
    }

    #[test]
    fn test_path_parses_back() {
        let routes = [Route::Home, Route::UpdatePassword, Route::TodoDetail(TodoId::new("abc"))];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn test_guarded_routes() {
        assert!(Route::Dashboard.requires_session());
        assert!(Route::TodoDetail(TodoId::new("1")).requires_session());
        assert!(!Route::SignIn.requires_session());
    }

    #[test]
    fn test_absolute_redirect_targets() {
        let base = Url::parse("https://tasker.example.com").unwrap();
        assert_eq!(
            Route::AuthCallback.absolute(&base).unwrap().as_str(),
            "https://tasker.example.com/auth/callback"
        );

        let nested = Url::parse("https://example.com/app/").unwrap();
        assert_eq!(
            Route::UpdatePassword.absolute(&nested).unwrap().as_str(),
            "https://example.com/app/update-password"
        );
    }
}
