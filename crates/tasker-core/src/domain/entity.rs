//! Domain Layer - Core Entity Trait and Errors
//!
//! Every persisted record has an identifier assigned by the store.
//! All fallible operations in the crate return [`DomainResult`].

use super::validation::ValidationErrors;

/// Core trait for all domain entities
pub trait Entity: Sized + Clone {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + std::hash::Hash;

    /// Returns the entity's unique identifier
    fn id(&self) -> &Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// No session, or the session expired. Callers redirect to sign-in.
    #[error("not authenticated: {0}")]
    Auth(String),

    /// Client-side schema rejection, raised before any network call.
    #[error("invalid input: {0}")]
    Validation(ValidationErrors),

    /// The backend rejected a create/update/delete/select.
    #[error("store error: {0}")]
    Store(String),

    /// Asset upload failed.
    #[error("upload failed: {0}")]
    Upload(String),

    /// Best-effort asset deletion failed. Logged only.
    #[error("asset cleanup failed: {0}")]
    AssetCleanup(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// The request never produced a response (network down, socket closed).
    #[error("transport error: {0}")]
    Transport(String),
}

impl DomainError {
    /// Whether the caller should redirect to sign-in.
    pub fn is_auth(&self) -> bool {
        matches!(self, DomainError::Auth(_))
    }

    /// Short text for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            DomainError::Auth(msg) if msg.is_empty() => "Please sign in again.".to_string(),
            DomainError::Auth(msg) => msg.clone(),
            DomainError::Validation(errors) => errors.to_string(),
            DomainError::Store(msg) => format!("Could not save your changes: {}", msg),
            DomainError::Upload(_) => "Failed to upload image".to_string(),
            DomainError::AssetCleanup(_) => "Could not remove the old image".to_string(),
            DomainError::NotFound(_) => "Todo not found.".to_string(),
            DomainError::Config(msg) => format!("Misconfigured application: {}", msg),
            DomainError::Transport(_) => "Network error, please try again.".to_string(),
        }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldError;

    #[test]
    fn test_auth_errors_redirect() {
        assert!(DomainError::Auth("expired".into()).is_auth());
        assert!(!DomainError::Store("nope".into()).is_auth());
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let err: DomainError = ValidationErrors::from(vec![FieldError::new("title", "Title is required")]).into();
        assert_eq!(err.user_message(), "title: Title is required");
    }
}
