//! Domain Layer
//!
//! Contains the domain entities, form validation and the error taxonomy.
//! This layer performs no I/O.

mod entity;
mod session;
mod todo;
mod validation;

pub use entity::{DomainError, DomainResult, Entity};
pub use session::{OAuthProvider, RedirectTokens, Session, SessionEvent, SignUpOutcome, User, UserId};
pub use todo::{NewTodo, Priority, Status, Todo, TodoId, TodoPatch};
pub use validation::{
    check_image_type, check_patch, validate_email, validate_new_password, Credentials, FieldError, SignInForm,
    SignUpForm, TodoForm, TodoInput, ValidationErrors, DEFAULT_DUE_TIME,
};
