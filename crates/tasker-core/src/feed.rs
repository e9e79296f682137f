//! Change Feed Subscriber
//!
//! Folds change-feed notifications for the signed-in user into a list
//! reconciler. Reconnect and backoff belong to the feed's transport.

use std::cell::RefCell;
use std::rc::Rc;

use crate::domain::{DomainResult, UserId};
use crate::reconcile::{Applied, Change, ListReconciler};
use crate::repository::{ChangeEvent, ChangeFeed, ChangeFilter};
use crate::subscription::Subscription;

/// Anything a change can be folded into as one atomic step
pub trait ReconcileTarget {
    fn apply_change(&self, change: Change) -> Applied;
}

impl ReconcileTarget for Rc<RefCell<ListReconciler>> {
    fn apply_change(&self, change: Change) -> Applied {
        self.borrow_mut().apply(change)
    }
}

pub struct ChangeFeedSubscriber;

impl ChangeFeedSubscriber {
    /// Subscribe to `owner`'s records and apply every event to `target` until
    /// the returned handle is dropped.
    pub async fn attach<T>(feed: &dyn ChangeFeed, owner: &UserId, target: T) -> DomainResult<Subscription>
    where
        T: ReconcileTarget + 'static,
    {
        let expected_owner = owner.clone();
        let sink = Rc::new(move |event: ChangeEvent| {
            deliver(&target, &expected_owner, event);
        });

        let subscription = feed.subscribe(ChangeFilter { owner: owner.clone() }, sink).await?;
        log::info!("[FEED] Attached change feed for {}", owner);
        Ok(subscription)
    }
}

fn deliver<T: ReconcileTarget>(target: &T, owner: &UserId, event: ChangeEvent) {
    if let Some(todo) = &event.new {
        if &todo.user_id != owner {
            log::warn!("[FEED] Ignoring event for record {} owned by another user", todo.id);
            return;
        }
    }

    match Change::from_event(event) {
        Some(change) => {
            let id = change.id().clone();
            let applied = target.apply_change(change);
            log::debug!("[FEED] {} -> {:?}", id, applied);
        }
        None => log::warn!("[FEED] Dropping change event without a payload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, Status, Todo, TodoId};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::cell::Cell;

    use crate::repository::{ChangeKind, ChangeSink};

    /// Feed that hands its sink back to the test
    #[derive(Default)]
    struct ScriptedFeed {
        sink: RefCell<Option<ChangeSink>>,
        released: Rc<Cell<bool>>,
    }

    impl ScriptedFeed {
        fn push(&self, event: ChangeEvent) {
            let sink = self.sink.borrow().clone().expect("subscribed");
            sink(event);
        }
    }

    #[async_trait(?Send)]
    impl ChangeFeed for ScriptedFeed {
        async fn subscribe(&self, _filter: ChangeFilter, sink: ChangeSink) -> DomainResult<Subscription> {
            *self.sink.borrow_mut() = Some(sink);
            let released = self.released.clone();
            Ok(Subscription::new(move || released.set(true)))
        }
    }

    fn todo(id: &str, owner: &str) -> Todo {
        Todo {
            id: TodoId::new(id),
            user_id: UserId::new(owner),
            title: "Remote".to_string(),
            description: None,
            due: None,
            priority: Priority::High,
            status: Status::Todo,
            cover_image: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_events_fold_into_list() {
        let feed = ScriptedFeed::default();
        let list = Rc::new(RefCell::new(ListReconciler::new()));
        list.borrow_mut().seed(Vec::new());

        let _sub = ChangeFeedSubscriber::attach(&feed, &UserId::new("me"), list.clone()).await.unwrap();

        feed.push(ChangeEvent::inserted(todo("1", "me")));
        feed.push(ChangeEvent::inserted(todo("1", "me")));
        assert_eq!(list.borrow().len(), 1);

        feed.push(ChangeEvent::deleted(TodoId::new("1")));
        assert!(list.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_records_are_ignored() {
        let feed = ScriptedFeed::default();
        let list = Rc::new(RefCell::new(ListReconciler::new()));
        list.borrow_mut().seed(Vec::new());

        let _sub = ChangeFeedSubscriber::attach(&feed, &UserId::new("me"), list.clone()).await.unwrap();
        feed.push(ChangeEvent::inserted(todo("2", "someone-else")));
        feed.push(ChangeEvent { kind: ChangeKind::Update, new: None, old_id: None });

        assert!(list.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_dropping_handle_releases_feed() {
        let feed = ScriptedFeed::default();
        let list = Rc::new(RefCell::new(ListReconciler::new()));

        let sub = ChangeFeedSubscriber::attach(&feed, &UserId::new("me"), list).await.unwrap();
        assert!(!feed.released.get());
        drop(sub);
        assert!(feed.released.get());
    }
}
