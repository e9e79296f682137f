//! UI Components
//!
//! Pages and the reusable pieces they are built from.

mod auth_callback;
mod auth_notices;
mod create_todo_form;
mod dashboard;
mod delete_confirm_button;
mod field_error;
mod forgot_password;
mod landing;
mod link;
mod nav_bar;
mod not_found;
mod oauth_buttons;
mod require_session;
mod sign_in;
mod sign_out_button;
mod sign_up;
mod toast_host;
mod todo_card;
mod todo_detail;
mod todo_fields;
mod todo_list;
mod update_password;
mod update_todo_form;

pub use auth_callback::AuthCallback;
pub use auth_notices::{ConfirmEmail, SignUpError};
pub use create_todo_form::CreateTodoForm;
pub use dashboard::Dashboard;
pub use delete_confirm_button::DeleteConfirmButton;
pub use field_error::FieldError;
pub use forgot_password::ForgotPassword;
pub use landing::Landing;
pub use link::Link;
pub use nav_bar::NavBar;
pub use not_found::NotFound;
pub use oauth_buttons::OAuthButtons;
pub use require_session::RequireSession;
pub use sign_in::SignIn;
pub use sign_out_button::SignOutButton;
pub use sign_up::SignUp;
pub use toast_host::ToastHost;
pub use todo_card::TodoCard;
pub use todo_detail::TodoDetail;
pub use todo_fields::{CoverPicker, TodoFields};
pub use todo_list::TodoList;
pub use update_password::UpdatePassword;
pub use update_todo_form::UpdateTodoForm;
