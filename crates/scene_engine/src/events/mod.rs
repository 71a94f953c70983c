//! Publish/subscribe event streams
//!
//! Key principles:
//! - The publisher only holds weak references to callbacks
//! - A subscription is an owned [`EventListener`] token; dropping it
//!   unsubscribes, so no callback outlives its owner
//! - Delivery is synchronous and in subscription order
//! - Listeners receive every event and do their own filtering

use std::any::TypeId;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::foundation::collections::{ComponentId, GameObjectId};
use crate::scene::{Capabilities, Component};

type Callback<T> = RefCell<dyn FnMut(&T)>;

/// Subscription token returned by [`EventStream::create_listener`]
///
/// Holds the only strong reference to the callback. The default value is an
/// empty token that is subscribed to nothing.
pub struct EventListener<T> {
    callback: Option<Rc<Callback<T>>>,
}

impl<T> EventListener<T> {
    /// Whether this token currently owns a subscription
    pub fn is_subscribed(&self) -> bool {
        self.callback.is_some()
    }

    /// Drop the subscription now instead of at end of scope
    pub fn unsubscribe(&mut self) {
        self.callback = None;
    }
}

impl<T> Default for EventListener<T> {
    fn default() -> Self {
        Self { callback: None }
    }
}

impl<T> fmt::Debug for EventListener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}

/// Event publisher with weakly held subscribers
pub struct EventStream<T> {
    listeners: Vec<Weak<Callback<T>>>,
}

impl<T: 'static> EventStream<T> {
    /// Create a stream with no subscribers
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Subscribe a callback; it stays registered while the returned token
    /// is alive
    pub fn create_listener<F>(&mut self, callback: F) -> EventListener<T>
    where
        F: FnMut(&T) + 'static,
    {
        let callback: Rc<Callback<T>> = Rc::new(RefCell::new(callback));
        self.listeners.push(Rc::downgrade(&callback));
        EventListener {
            callback: Some(callback),
        }
    }

    /// Deliver an event to every live subscriber
    ///
    /// Dead subscriptions are pruned first. Delivery works on a snapshot, so
    /// listeners created by a callback only see later events.
    pub fn notify(&mut self, event: &T) {
        self.listeners.retain(|l| l.strong_count() > 0);
        let live: Vec<Rc<Callback<T>>> = self.listeners.iter().filter_map(Weak::upgrade).collect();

        for listener in live {
            match listener.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(event),
                Err(_) => log::warn!("Skipping re-entrant event delivery to a busy listener"),
            }
        }
    }

    /// Number of live subscriptions
    pub fn listener_count(&self) -> usize {
        self.listeners.iter().filter(|l| l.strong_count() > 0).count()
    }
}

impl<T: 'static> Default for EventStream<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Whether a component joined or left the active set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentUpdateStatus {
    /// Became active (added to a live scene, or re-activated)
    Added,
    /// Left the active set (deactivated or destroyed)
    Removed,
}

/// Notification published on a scene's component-change stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentEvent {
    /// Component the event is about
    pub component: ComponentId,
    /// Owning GameObject
    pub game_object: GameObjectId,
    /// Added or removed
    pub status: ComponentUpdateStatus,
    /// Capabilities fixed at construction
    pub capabilities: Capabilities,
    /// Concrete type of the component
    pub type_id: TypeId,
    /// Concrete type name, for logging
    pub type_name: &'static str,
}

impl ComponentEvent {
    /// Whether the component is of concrete type `T`
    pub fn is<T: Component>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_receives_events() {
        let mut stream = EventStream::<u32>::new();
        let received = Rc::new(RefCell::new(Vec::new()));

        let sink = received.clone();
        let _listener = stream.create_listener(move |v: &u32| sink.borrow_mut().push(*v));

        stream.notify(&1);
        stream.notify(&2);
        assert_eq!(*received.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_dropping_listener_unsubscribes() {
        let mut stream = EventStream::<u32>::new();
        let count = Rc::new(RefCell::new(0));

        let sink = count.clone();
        let listener = stream.create_listener(move |_| *sink.borrow_mut() += 1);
        assert_eq!(stream.listener_count(), 1);

        stream.notify(&0);
        drop(listener);
        stream.notify(&0);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(stream.listener_count(), 0);
    }

    #[test]
    fn test_explicit_unsubscribe_and_default_token() {
        let mut stream = EventStream::<u32>::new();
        let mut listener = stream.create_listener(|_| {});
        assert!(listener.is_subscribed());

        listener.unsubscribe();
        assert!(!listener.is_subscribed());
        assert_eq!(stream.listener_count(), 0);

        let empty = EventListener::<u32>::default();
        assert!(!empty.is_subscribed());
    }

    #[test]
    fn test_delivery_in_subscription_order() {
        let mut stream = EventStream::<char>::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = log.clone();
        let _a = stream.create_listener(move |e: &char| first.borrow_mut().push(format!("a:{e}")));
        let second = log.clone();
        let _b = stream.create_listener(move |e: &char| second.borrow_mut().push(format!("b:{e}")));

        stream.notify(&'x');
        assert_eq!(*log.borrow(), vec!["a:x".to_string(), "b:x".to_string()]);
    }
}
