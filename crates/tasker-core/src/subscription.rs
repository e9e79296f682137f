//! Subscription Handles
//!
//! Listener registrations (session changes, change feeds) hand back a
//! [`Subscription`]. Dropping it releases the listener, so the release runs on
//! every exit path of the owning view.

use std::fmt;

#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    /// A handle with nothing to release.
    pub fn detached() -> Self {
        Self { release: None }
    }

    /// Release now. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {
        drop(self);
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("active", &self.is_active()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_release_runs_once_on_drop() {
        let released = Rc::new(Cell::new(0));
        let counter = released.clone();
        {
            let _sub = Subscription::new(move || counter.set(counter.get() + 1));
        }
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn test_unsubscribe_releases() {
        let released = Rc::new(Cell::new(false));
        let flag = released.clone();
        let sub = Subscription::new(move || flag.set(true));
        assert!(sub.is_active());
        sub.unsubscribe();
        assert!(released.get());
    }
}
