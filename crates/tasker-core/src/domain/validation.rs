//! Form Validation
//!
//! Every form is checked here before anything reaches the network. Errors are
//! collected per field so the UI can render them inline.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use super::session::UserId;
use super::todo::{NewTodo, Priority, Status, Todo, TodoPatch};

pub const TITLE_MIN_CHARS: usize = 3;
pub const DESCRIPTION_MIN_CHARS: usize = 3;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const DEFAULT_DUE_TIME: &str = "10:30:00";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// All field errors of one form submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message for `field`, for inline display.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect();
        f.write_str(&parts.join("; "))
    }
}

/// Raw values of the create/update todo form
#[derive(Debug, Clone, PartialEq)]
pub struct TodoForm {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    /// `HH:MM` or `HH:MM:SS`
    pub due_time: String,
    pub priority: String,
    pub status: String,
}

impl Default for TodoForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: None,
            due_time: DEFAULT_DUE_TIME.to_string(),
            priority: Priority::default().as_str().to_string(),
            status: Status::default().as_str().to_string(),
        }
    }
}

/// Validated todo fields, shared by create and update
#[derive(Debug, Clone, PartialEq)]
pub struct TodoInput {
    pub title: String,
    pub description: Option<String>,
    pub due: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: Status,
}

impl TodoForm {
    /// Prefill the form from an existing record (edit drawer).
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
            due_date: todo.due.map(|d| d.date_naive()),
            due_time: todo
                .due
                .map(|d| d.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| DEFAULT_DUE_TIME.to_string()),
            priority: todo.priority.as_str().to_string(),
            status: todo.status.as_str().to_string(),
        }
    }

    pub fn validate(&self) -> Result<TodoInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = self.title.trim().to_string();
        if let Err(msg) = check_title(&title) {
            errors.push("title", msg);
        }

        let description = optional_text(&self.description);
        if let Err(msg) = check_description(description.as_deref()) {
            errors.push("description", msg);
        }

        let due = match self.due_date {
            Some(date) => match parse_time(&self.due_time) {
                Some(time) => Some(Utc.from_utc_datetime(&date.and_time(time))),
                None => {
                    errors.push("due", "Pick a valid time");
                    None
                }
            },
            None => None,
        };

        let priority = Priority::parse(&self.priority).unwrap_or_else(|| {
            errors.push("priority", "Pick low, medium or high");
            Priority::default()
        });
        let status = Status::parse(&self.status).unwrap_or_else(|| {
            errors.push("status", "Pick todo, in progress or done");
            Status::default()
        });

        errors.into_result(TodoInput { title, description, due, priority, status })
    }
}

impl TodoInput {
    /// Re-check an input that was not produced by [`TodoForm::validate`].
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Err(msg) = check_title(self.title.trim()) {
            errors.push("title", msg);
        }
        if let Err(msg) = check_description(self.description.as_deref()) {
            errors.push("description", msg);
        }
        errors.into_result(())
    }

    pub fn into_new_todo(self, owner: UserId, cover_image: Option<String>) -> NewTodo {
        NewTodo {
            user_id: owner,
            title: self.title,
            description: self.description,
            due: self.due,
            priority: self.priority,
            status: self.status,
            cover_image,
        }
    }

    /// Patch containing only the fields that differ from `current`.
    pub fn patch_for(&self, current: &Todo) -> TodoPatch {
        let mut edited = current.clone();
        edited.title = self.title.clone();
        edited.description = self.description.clone();
        edited.due = self.due;
        edited.priority = self.priority;
        edited.status = self.status;
        TodoPatch::between(current, &edited)
    }
}

pub fn check_title(title: &str) -> Result<(), String> {
    if title.chars().count() < TITLE_MIN_CHARS {
        return Err("Title is required".to_string());
    }
    Ok(())
}

pub fn check_description(description: Option<&str>) -> Result<(), String> {
    match description {
        Some(d) if d.chars().count() < DESCRIPTION_MIN_CHARS => {
            Err("Description must be at least 3 characters long".to_string())
        }
        _ => Ok(()),
    }
}

/// Validate the fields a patch touches, with the same rules as the form.
pub fn check_patch(patch: &TodoPatch) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if let Some(title) = &patch.title {
        if let Err(msg) = check_title(title.trim()) {
            errors.push("title", msg);
        }
    }
    if let Some(description) = &patch.description {
        if let Err(msg) = check_description(description.as_deref()) {
            errors.push("description", msg);
        }
    }
    errors.into_result(())
}

pub fn check_image_type(content_type: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !content_type.starts_with("image/") {
        errors.push("cover_image", "File must be an image");
    }
    errors.into_result(())
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
}

/// Validated credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let email = self.email.trim().to_string();
        if !is_valid_email(&email) {
            errors.push("email", "Please enter a valid email");
        }
        if self.password.is_empty() {
            errors.push("password", "Password is required");
        }
        errors.into_result(Credentials { email, password: self.password.clone() })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub captcha_token: Option<String>,
}

impl SignUpForm {
    /// `captcha_required` is set when a bot-challenge site key is configured.
    pub fn validate(&self, captcha_required: bool) -> Result<(Credentials, Option<String>), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let email = self.email.trim().to_string();
        if !is_valid_email(&email) {
            errors.push("email", "Please enter a valid email");
        }
        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            errors.push("password", "Password must be at least 8 characters");
        }
        if self.confirm_password.chars().count() < PASSWORD_MIN_CHARS {
            errors.push("confirm_password", "Confirm password must be at least 8 characters");
        } else if self.password != self.confirm_password {
            errors.push("confirm_password", "Passwords do not match");
        }
        let captcha = self.captcha_token.clone().filter(|t| !t.is_empty());
        if captcha_required && captcha.is_none() {
            errors.push("captcha", "Please complete the challenge");
        }
        errors.into_result((Credentials { email, password: self.password.clone() }, captcha))
    }
}

pub fn validate_email(email: &str) -> Result<String, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let email = email.trim().to_string();
    if !is_valid_email(&email) {
        errors.push("email", "Please enter a valid email");
    }
    errors.into_result(email)
}

pub fn validate_new_password(password: &str) -> Result<String, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.push("password", "Password must be at least 8 characters");
    }
    errors.into_result(password.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form(title: &str) -> TodoForm {
        TodoForm { title: title.to_string(), ..Default::default() }
    }

    #[test]
    fn test_title_boundary() {
        let errors = form("ab").validate().unwrap_err();
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert!(form("abc").validate().is_ok());
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        assert!(form("日本語").validate().is_ok());
        assert!(form("  ab  ").validate().is_err());
    }

    #[test]
    fn test_description_optional_but_min_length() {
        let mut f = form("Buy milk");
        f.description = "   ".to_string();
        assert_eq!(f.validate().unwrap().description, None);

        f.description = "ok".to_string();
        assert!(f.validate().unwrap_err().get("description").is_some());

        f.description = "two liters".to_string();
        assert_eq!(f.validate().unwrap().description.as_deref(), Some("two liters"));
    }

    #[test]
    fn test_due_merges_date_and_time() {
        let mut f = form("Dentist");
        f.due_date = NaiveDate::from_ymd_opt(2030, 5, 1);
        f.due_time = "14:15".to_string();
        let input = f.validate().unwrap();
        assert_eq!(input.due.unwrap().to_rfc3339(), "2030-05-01T14:15:00+00:00");

        f.due_time = "25:00".to_string();
        assert!(f.validate().unwrap_err().get("due").is_some());
    }

    #[test]
    fn test_defaults_apply() {
        let input = form("Taxes").validate().unwrap();
        assert_eq!(input.priority, Priority::Medium);
        assert_eq!(input.status, Status::Todo);
    }

    #[test]
    fn test_check_patch() {
        let patch = TodoPatch { title: Some("no".into()), ..Default::default() };
        assert!(check_patch(&patch).is_err());
        assert!(check_patch(&TodoPatch { status: Some(Status::Done), ..Default::default() }).is_ok());
        assert!(check_patch(&TodoPatch { description: Some(None), ..Default::default() }).is_ok());
    }

    #[test]
    fn test_image_type() {
        assert!(check_image_type("image/png").is_ok());
        assert!(check_image_type("application/pdf").is_err());
    }

    #[test]
    fn test_sign_up_rules() {
        let mut f = SignUpForm {
            email: "a@example.com".into(),
            password: "password1".into(),
            confirm_password: "password2".into(),
            captcha_token: None,
        };
        let errors = f.validate(true).unwrap_err();
        assert_eq!(errors.get("confirm_password"), Some("Passwords do not match"));
        assert!(errors.get("captcha").is_some());

        f.confirm_password = "password1".into();
        let (creds, captcha) = f.validate(false).unwrap();
        assert_eq!(creds.email, "a@example.com");
        assert_eq!(captcha, None);
    }

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("user@mail.example.org").is_ok());
        assert!(validate_email("user@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a b@example.com").is_err());
    }

    #[test]
    fn test_new_password_length() {
        assert!(validate_new_password("1234567").is_err());
        assert!(validate_new_password("12345678").is_ok());
    }
}
