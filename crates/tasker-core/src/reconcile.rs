//! List Reconciler
//!
//! The in-memory ordered collection of todos, merged from the initial fetch,
//! local mutations confirmed by the store, and change-feed pushes.
//!
//! Merge rules, keyed by `id`:
//! - insert: prepend when the id is new; identical content is a no-op;
//!   differing content overwrites in place (last write wins)
//! - update: replace the matching record entirely; unknown id is a no-op
//! - delete: remove the matching record; unknown id is a no-op
//!
//! Each change is applied through `&mut self`, so an observer holding the
//! reconciler sees either the state before or after a change, never between.

use crate::domain::{Entity, Todo, TodoId};
use crate::repository::{ChangeEvent, ChangeKind};

/// A mutation of the list, from either a local action or the change feed
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Insert(Todo),
    Update(Todo),
    Delete(TodoId),
}

impl Change {
    /// Translate a feed notification. `None` when the payload lacks the row
    /// the kind requires.
    pub fn from_event(event: ChangeEvent) -> Option<Change> {
        match event.kind {
            ChangeKind::Insert => event.new.map(Change::Insert),
            ChangeKind::Update => event.new.map(Change::Update),
            ChangeKind::Delete => event.old_id.map(Change::Delete),
        }
    }

    pub fn id(&self) -> &TodoId {
        match self {
            Change::Insert(todo) | Change::Update(todo) => todo.id(),
            Change::Delete(id) => id,
        }
    }
}

/// What applying a change did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Inserted,
    Replaced,
    Removed,
    Unchanged,
}

/// Render state derived from the reconciler
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListView<'a> {
    /// The initial fetch is outstanding
    Loading,
    /// Fetched, nothing to show
    Empty,
    Ready(&'a [Todo]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListReconciler {
    records: Vec<Todo>,
    loading: bool,
}

impl Default for ListReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl ListReconciler {
    /// A reconciler waiting for its initial fetch.
    pub fn new() -> Self {
        Self { records: Vec::new(), loading: true }
    }

    /// Merge the initial fetch and leave the loading state.
    ///
    /// Records applied while the fetch was outstanding stay in front when the
    /// fetch does not contain them; on an id clash the fetched row wins.
    /// Duplicate ids in the fetch keep their first occurrence.
    pub fn seed(&mut self, records: Vec<Todo>) {
        let mut seeded: Vec<Todo> = Vec::with_capacity(self.records.len() + records.len());
        for todo in records {
            if !seeded.iter().any(|t| t.id == todo.id) {
                seeded.push(todo);
            }
        }
        let pending: Vec<Todo> = std::mem::take(&mut self.records)
            .into_iter()
            .filter(|t| !seeded.iter().any(|s| s.id == t.id))
            .collect();
        if !pending.is_empty() {
            log::debug!("[RECONCILE] Keeping {} record(s) applied during the initial fetch", pending.len());
        }
        self.records = pending;
        self.records.extend(seeded);
        self.loading = false;
    }

    /// Go back to the loading state, e.g. before a refetch.
    pub fn reset(&mut self) {
        self.records.clear();
        self.loading = true;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn records(&self) -> &[Todo] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.records.iter().find(|t| &t.id == id)
    }

    pub fn view(&self) -> ListView<'_> {
        if self.loading {
            ListView::Loading
        } else if self.records.is_empty() {
            ListView::Empty
        } else {
            ListView::Ready(&self.records)
        }
    }

    pub fn apply(&mut self, change: Change) -> Applied {
        match change {
            Change::Insert(todo) => self.insert(todo),
            Change::Update(todo) => self.replace(todo),
            Change::Delete(id) => self.remove(&id),
        }
    }

    fn position(&self, id: &TodoId) -> Option<usize> {
        self.records.iter().position(|t| &t.id == id)
    }

    fn insert(&mut self, todo: Todo) -> Applied {
        match self.position(&todo.id) {
            Some(idx) if self.records[idx] == todo => Applied::Unchanged,
            Some(idx) => {
                self.records[idx] = todo;
                Applied::Replaced
            }
            None => {
                self.records.insert(0, todo);
                Applied::Inserted
            }
        }
    }

    fn replace(&mut self, todo: Todo) -> Applied {
        match self.position(&todo.id) {
            Some(idx) if self.records[idx] == todo => Applied::Unchanged,
            Some(idx) => {
                self.records[idx] = todo;
                Applied::Replaced
            }
            None => Applied::Unchanged,
        }
    }

    fn remove(&mut self, id: &TodoId) -> Applied {
        match self.position(id) {
            Some(idx) => {
                self.records.remove(idx);
                Applied::Removed
            }
            None => Applied::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, Status, UserId};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn todo(id: &str, title: &str) -> Todo {
        Todo {
            id: TodoId::new(id),
            user_id: UserId::new("owner"),
            title: title.to_string(),
            description: None,
            due: None,
            priority: Priority::Medium,
            status: Status::Todo,
            cover_image: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn ids(list: &ListReconciler) -> Vec<&str> {
        list.records().iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_loading_and_empty_are_distinct() {
        let mut list = ListReconciler::new();
        assert_eq!(list.view(), ListView::Loading);

        list.seed(Vec::new());
        assert_eq!(list.view(), ListView::Empty);
    }

    #[test]
    fn test_insert_prepends() {
        let mut list = ListReconciler::new();
        list.seed(vec![todo("1", "first")]);

        assert_eq!(list.apply(Change::Insert(todo("2", "second"))), Applied::Inserted);
        assert_eq!(ids(&list), vec!["2", "1"]);
    }

    #[test]
    fn test_local_create_then_remote_echo_is_deduplicated() {
        let mut list = ListReconciler::new();
        list.seed(Vec::new());
        let created = todo("9", "Buy milk");

        list.apply(Change::Insert(created.clone()));
        assert_eq!(list.apply(Change::Insert(created)), Applied::Unchanged);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_differing_duplicate_insert_overwrites_in_place() {
        let mut list = ListReconciler::new();
        list.seed(vec![todo("1", "a"), todo("2", "b")]);

        assert_eq!(list.apply(Change::Insert(todo("2", "b, later"))), Applied::Replaced);
        assert_eq!(ids(&list), vec!["1", "2"]);
        assert_eq!(list.get(&TodoId::new("2")).unwrap().title, "b, later");
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut list = ListReconciler::new();
        list.seed(vec![todo("1", "a")]);
        let before = list.clone();

        assert_eq!(list.apply(Change::Update(todo("5", "ghost"))), Applied::Unchanged);
        assert_eq!(list, before);
    }

    #[test]
    fn test_update_replaces_whole_record() {
        let mut list = ListReconciler::new();
        list.seed(vec![todo("1", "a")]);
        let mut edited = todo("1", "a");
        edited.status = Status::Done;
        edited.description = Some("details".into());

        assert_eq!(list.apply(Change::Update(edited.clone())), Applied::Replaced);
        assert_eq!(list.get(&TodoId::new("1")), Some(&edited));
    }

    #[test]
    fn test_delete_twice_is_idempotent() {
        let mut once = ListReconciler::new();
        once.seed(vec![todo("1", "a"), todo("2", "b")]);
        let mut twice = once.clone();

        once.apply(Change::Delete(TodoId::new("1")));
        twice.apply(Change::Delete(TodoId::new("1")));
        assert_eq!(twice.apply(Change::Delete(TodoId::new("1"))), Applied::Unchanged);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_seed_drops_duplicate_ids() {
        let mut list = ListReconciler::new();
        list.seed(vec![todo("1", "a"), todo("1", "dup"), todo("2", "b")]);
        assert_eq!(ids(&list), vec!["1", "2"]);
        assert_eq!(list.get(&TodoId::new("1")).unwrap().title, "a");
    }

    #[test]
    fn test_create_during_initial_fetch_survives_seed() {
        let mut list = ListReconciler::new();
        let created = todo("9", "Created while loading");
        list.apply(Change::Insert(created.clone()));

        list.seed(Vec::new());

        assert_eq!(list.view(), ListView::Ready(std::slice::from_ref(&created)));
    }

    #[test]
    fn test_seed_keeps_pending_first_and_fetched_row_wins() {
        let mut list = ListReconciler::new();
        list.apply(Change::Insert(todo("2", "stale local")));
        list.apply(Change::Insert(todo("9", "new")));

        list.seed(vec![todo("2", "fetched"), todo("1", "older")]);

        assert_eq!(ids(&list), vec!["9", "2", "1"]);
        assert_eq!(list.get(&TodoId::new("2")).unwrap().title, "fetched");
    }

    #[test]
    fn test_from_event_requires_payload() {
        let event = ChangeEvent { kind: ChangeKind::Insert, new: None, old_id: None };
        assert_eq!(Change::from_event(event), None);
        assert_eq!(
            Change::from_event(ChangeEvent::deleted(TodoId::new("3"))),
            Some(Change::Delete(TodoId::new("3")))
        );
    }
}
