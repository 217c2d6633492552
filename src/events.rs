//! Window event listener registry.
//!
//! A host owns one [`WindowEvents`]; scene code subscribes to resize
//! notifications through it and gets back a [`ResizeSubscription`] guard.
//! Dropping or cancelling the guard removes the listener, so a torn-down
//! scene can never be reached by a late resize.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Default)]
struct ListenerTable {
    next_id: u64,
    resize: Vec<u64>,
}

/// Listener registry shared between a host and its subscribers.
#[derive(Clone, Debug, Default)]
pub struct WindowEvents {
    table: Rc<RefCell<ListenerTable>>,
}

impl WindowEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resize listener.
    pub fn subscribe_resize(&self) -> ResizeSubscription {
        let mut table = self.table.borrow_mut();
        let id = table.next_id;
        table.next_id += 1;
        table.resize.push(id);
        ResizeSubscription {
            id,
            table: Rc::downgrade(&self.table),
        }
    }

    pub fn resize_listener_count(&self) -> usize {
        self.table.borrow().resize.len()
    }

    /// Whether a resize should be forwarded to anyone at all.
    pub fn has_resize_listeners(&self) -> bool {
        self.resize_listener_count() > 0
    }
}

/// A live resize listener. Unsubscribes on drop.
#[derive(Debug)]
pub struct ResizeSubscription {
    id: u64,
    table: Weak<RefCell<ListenerTable>>,
}

impl ResizeSubscription {
    /// True while the listener is still registered with a live host.
    pub fn is_active(&self) -> bool {
        self.table
            .upgrade()
            .is_some_and(|table| table.borrow().resize.contains(&self.id))
    }

    /// Removes the listener. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table.borrow_mut().resize.retain(|&id| id != self.id);
        }
        self.table = Weak::new();
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_unsubscribes_on_drop() {
        let events = WindowEvents::new();
        {
            let sub = events.subscribe_resize();
            assert!(sub.is_active());
            assert_eq!(events.resize_listener_count(), 1);
        }
        assert!(!events.has_resize_listeners());
    }

    #[test]
    fn cancel_is_idempotent_and_only_removes_itself() {
        let events = WindowEvents::new();
        let mut first = events.subscribe_resize();
        let second = events.subscribe_resize();

        first.cancel();
        first.cancel();
        assert!(!first.is_active());
        assert!(second.is_active());
        assert_eq!(events.resize_listener_count(), 1);
    }

    #[test]
    fn subscription_outliving_host_is_inert() {
        let events = WindowEvents::new();
        let mut sub = events.subscribe_resize();
        drop(events);
        assert!(!sub.is_active());
        sub.cancel();
    }
}
