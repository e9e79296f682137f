//! Todo Entity
//!
//! A single task owned by one user. `id` and `created_at` are assigned by the
//! store; everything else is edited by the owner.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::entity::Entity;
use super::session::UserId;

/// Opaque record identifier assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hosted stores hand out either bigint or uuid keys; both become strings.
impl<'de> Deserialize<'de> for TodoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => TodoId(s),
            Raw::Number(n) => TodoId(n.to_string()),
        })
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    #[serde(rename = "todo")]
    Todo,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(Status::Todo),
            "in-progress" => Some(Status::InProgress),
            "done" => Some(Status::Done),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in progress",
            Status::Done => "done",
        }
    }
}

/// A persisted todo record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    /// Owner; set at creation, never changed by the client
    pub user_id: UserId,
    pub title: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Status,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Apply a partial update in place. Fields absent from the patch are kept.
    pub fn apply_patch(&mut self, patch: &TodoPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(due) = patch.due {
            self.due = due;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(cover_image) = &patch.cover_image {
            self.cover_image = cover_image.clone();
        }
    }

    pub fn patched(&self, patch: &TodoPatch) -> Todo {
        let mut next = self.clone();
        next.apply_patch(patch);
        next
    }
}

impl Entity for Todo {
    type Id = TodoId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A todo before its first persistence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTodo {
    pub user_id: UserId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

/// Partial update. `None` leaves a field alone; for nullable fields
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<Option<String>>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.cover_image.is_none()
    }

    /// The fields of `edited` that differ from `current`.
    pub fn between(current: &Todo, edited: &Todo) -> TodoPatch {
        TodoPatch {
            title: (current.title != edited.title).then(|| edited.title.clone()),
            description: (current.description != edited.description).then(|| edited.description.clone()),
            due: (current.due != edited.due).then_some(edited.due),
            priority: (current.priority != edited.priority).then_some(edited.priority),
            status: (current.status != edited.status).then_some(edited.status),
            cover_image: (current.cover_image != edited.cover_image).then(|| edited.cover_image.clone()),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Todo {
        serde_json::from_value(json!({
            "id": 7,
            "user_id": "user-1",
            "title": "Write report",
            "description": null,
            "due": null,
            "priority": null,
            "status": "in-progress",
            "cover_image": "",
            "created_at": "2025-01-02T03:04:05Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_row_defaults() {
        let todo = sample();
        assert_eq!(todo.id, TodoId::new("7"));
        assert_eq!(todo.priority, Priority::Medium);
        assert_eq!(todo.status, Status::InProgress);
        assert_eq!(todo.cover_image, None);
        assert_eq!(todo.description, None);
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(serde_json::to_value(Status::InProgress).unwrap(), json!("in-progress"));
        assert_eq!(Status::parse("done"), Some(Status::Done));
        assert_eq!(Priority::parse("urgent"), None);
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let todo = sample();
        let patch = TodoPatch { status: Some(Status::Done), ..Default::default() };
        let next = todo.patched(&patch);

        assert_eq!(next.status, Status::Done);
        assert_eq!(next.title, todo.title);
        assert_eq!(next.priority, todo.priority);
        assert_eq!(next.created_at, todo.created_at);
    }

    #[test]
    fn test_patch_serializes_clears_as_null() {
        let patch = TodoPatch {
            description: Some(None),
            priority: Some(Priority::High),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "description": null, "priority": "high" })
        );
    }

    #[test]
    fn test_patch_between() {
        let todo = sample();
        let mut edited = todo.clone();
        edited.status = Status::Done;

        let patch = TodoPatch::between(&todo, &edited);
        assert_eq!(patch, TodoPatch { status: Some(Status::Done), ..Default::default() });
        assert!(TodoPatch::between(&todo, &todo).is_empty());
    }
}
