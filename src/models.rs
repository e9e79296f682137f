//! Frontend Models
//!
//! View-side data structures. Records themselves come from `tasker_core`.

use chrono::{DateTime, Utc};

pub use tasker_core::domain::{Priority, Session, Status, Todo, TodoId, ValidationErrors};

/// How long a toast stays on screen
pub const TOAST_DURATION_MS: u32 = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn class(&self) -> &'static str {
        match self {
            ToastKind::Success => "toast toast-success",
            ToastKind::Error => "toast toast-error",
            ToastKind::Info => "toast toast-info",
        }
    }
}

/// Transient notification
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u32,
    pub kind: ToastKind,
    pub message: String,
}

/// Due date as shown on cards. Due dates are entered and stored as UTC.
pub fn format_due(due: Option<DateTime<Utc>>) -> String {
    match due {
        Some(due) => due.format("%b %-d, %Y %H:%M").to_string(),
        None => "No due date".to_string(),
    }
}

pub fn status_class(status: Status) -> &'static str {
    match status {
        Status::Todo => "badge badge-todo",
        Status::InProgress => "badge badge-progress",
        Status::Done => "badge badge-done",
    }
}

/// Status a card should show after a status change settles. A rejected
/// change leaves the stored status in place.
pub fn settled_status(stored: Status, saved: Option<&Todo>) -> Status {
    saved.map_or(stored, |todo| todo.status)
}

pub fn priority_class(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "badge badge-low",
        Priority::Medium => "badge badge-medium",
        Priority::High => "badge badge-high",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_due_without_date() {
        assert_eq!(format_due(None), "No due date");
    }

    #[test]
    fn test_rejected_status_change_reverts_to_stored() {
        assert_eq!(settled_status(Status::Todo, None), Status::Todo);
    }

    #[test]
    fn test_saved_status_change_is_shown() {
        let saved: Todo = serde_json::from_value(serde_json::json!({
            "id": "1",
            "user_id": "owner",
            "title": "Write report",
            "status": "done",
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(settled_status(Status::Todo, Some(&saved)), Status::Done);
    }

    #[test]
    fn test_toast_classes_differ() {
        assert_ne!(ToastKind::Success.class(), ToastKind::Error.class());
    }
}
