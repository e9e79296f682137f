//! Frontend Commands
//!
//! Async wrappers the views call. Each one runs a service call, folds the
//! confirmed result into the store and turns failures into toasts or
//! redirects, so components only deal with inline validation.

mod auth;
mod todo;

pub use auth::*;
pub use todo::*;
