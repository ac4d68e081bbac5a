//! Selection store shared between one graph view and its collaborators.
//!
//! The store holds two independently observed fields: the picked node and
//! the fullscreen flag. Setting a field replaces its value and then calls
//! every subscriber of that field, synchronously, before returning.
//!
//! Subscribers may call back into the store. Notification works on a
//! snapshot of the subscriber list taken at `set` time, so a subscriber
//! that sets a field or subscribes again re-enters without conflict, and a
//! subscriber added during a notification only sees later values. A
//! snapshot entry unsubscribed before its turn is skipped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::lineage::Node;

type Callback<T> = Rc<dyn Fn(&T)>;

struct Channel<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(u64, Callback<T>)>,
}

/// One observed value with its own subscriber set.
pub struct Observed<T> {
    channel: Rc<RefCell<Channel<T>>>,
}

impl<T> Clone for Observed<T> {
    fn clone(&self) -> Self {
        Self {
            channel: Rc::clone(&self.channel),
        }
    }
}

impl<T: Clone + 'static> Observed<T> {
    pub fn new(value: T) -> Self {
        Self {
            channel: Rc::new(RefCell::new(Channel {
                value,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> T {
        self.channel.borrow().value.clone()
    }

    pub fn set(&self, value: T) {
        let subscribers = {
            let mut channel = self.channel.borrow_mut();
            channel.value = value.clone();
            channel
                .subscribers
                .iter()
                .map(|(id, callback)| (*id, Rc::clone(callback)))
                .collect::<Vec<_>>()
        };

        for (id, callback) in subscribers {
            if !self.is_subscribed(id) {
                continue;
            }
            callback(&value);
        }
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.channel
            .borrow()
            .subscribers
            .iter()
            .any(|(existing, _)| *existing == id)
    }

    /// Sets the value computed from the current one.
    pub fn update(&self, next: impl FnOnce(&T) -> T) {
        let value = next(&self.get());
        self.set(value);
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut channel = self.channel.borrow_mut();
            let id = channel.next_id;
            channel.next_id += 1;
            channel.subscribers.push((id, Rc::new(callback)));
            id
        };

        let channel: Weak<RefCell<Channel<T>>> = Rc::downgrade(&self.channel);
        Subscription {
            cancel: Some(Box::new(move || {
                let Some(channel) = channel.upgrade() else {
                    return false;
                };
                let mut channel = channel.borrow_mut();
                let before = channel.subscribers.len();
                channel.subscribers.retain(|(existing, _)| *existing != id);
                channel.subscribers.len() != before
            })),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.channel.borrow().subscribers.len()
    }
}

/// Handle returned by `subscribe`. Dropping it keeps the subscription alive;
/// call [`Subscription::unsubscribe`] to end it.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() -> bool>>,
}

impl Subscription {
    /// Removes the callback. Returns `false` when it was already gone or the
    /// store no longer exists.
    pub fn unsubscribe(mut self) -> bool {
        self.cancel.take().is_some_and(|cancel| cancel())
    }
}

/// Picked node and fullscreen flag for one mounted graph view.
#[derive(Clone)]
pub struct SelectionStore {
    node: Observed<Option<Node>>,
    fullscreen: Observed<bool>,
}

impl SelectionStore {
    pub fn new(fullscreen: bool) -> Self {
        Self {
            node: Observed::new(None),
            fullscreen: Observed::new(fullscreen),
        }
    }

    pub fn node(&self) -> Option<Node> {
        self.node.get()
    }

    pub fn selected_name(&self) -> Option<String> {
        self.node.channel.borrow().value.as_ref().map(|node| node.name.clone())
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.node
            .channel
            .borrow()
            .value
            .as_ref()
            .is_some_and(|node| node.name == name)
    }

    pub fn set_node(&self, node: Option<Node>) {
        debug!(node = node.as_ref().map(|node| node.name.as_str()), "selection changed");
        self.node.set(node);
    }

    pub fn subscribe(&self, callback: impl Fn(Option<&Node>) + 'static) -> Subscription {
        self.node.subscribe(move |node| callback(node.as_ref()))
    }

    pub fn fullscreen(&self) -> bool {
        self.fullscreen.get()
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.fullscreen.set(fullscreen);
    }

    pub fn update_fullscreen(&self, next: impl FnOnce(bool) -> bool) {
        self.fullscreen.update(|current| next(*current));
    }

    pub fn toggle_fullscreen(&self) {
        self.update_fullscreen(|fullscreen| !fullscreen);
    }

    pub fn subscribe_fullscreen(&self, callback: impl Fn(bool) + 'static) -> Subscription {
        self.fullscreen.subscribe(move |fullscreen| callback(*fullscreen))
    }

    pub fn node_subscriber_count(&self) -> usize {
        self.node.subscriber_count()
    }

    pub fn fullscreen_subscriber_count(&self) -> usize {
        self.fullscreen.subscriber_count()
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new(false)
    }
}
