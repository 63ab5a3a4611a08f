//! DOM Events
//!
//! Event objects and listener callbacks. Dispatch lives on
//! [`DomTree::dispatch_event`](crate::DomTree::dispatch_event).

use std::fmt;
use std::rc::Rc;

use crate::NodeId;

/// DOM event
#[derive(Debug, Clone)]
pub struct DomEvent {
    /// Event type, e.g. `click`
    pub event_type: String,
    /// Node the event was dispatched to
    pub target: NodeId,
    /// Node whose listeners are currently running
    pub current_target: NodeId,
    pub bubbles: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    /// Create a bubbling event
    pub fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            bubbles: true,
            propagation_stopped: false,
        }
    }

    /// Create an event that only reaches the target
    pub fn non_bubbling(event_type: &str, target: NodeId) -> Self {
        Self {
            bubbles: false,
            ..Self::new(event_type, target)
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Event listener callback.
///
/// Listeners compare by identity: two clones of the same `Listener` are
/// equal, two listeners built from identical closures are not.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&mut DomEvent)>);

impl Listener {
    pub fn new(callback: impl Fn(&mut DomEvent) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Invoke the callback
    pub fn call(&self, event: &mut DomEvent) {
        (self.0)(event)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_listener_call() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let listener = Listener::new(move |_| counter.set(counter.get() + 1));

        let mut event = DomEvent::new("click", NodeId::ROOT);
        listener.call(&mut event);
        listener.clone().call(&mut event);

        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_listener_equality_is_identity() {
        let a = Listener::new(|_| {});
        let b = Listener::new(|_| {});

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_stop_propagation() {
        let mut event = DomEvent::non_bubbling("focus", NodeId::ROOT);
        assert!(!event.bubbles);
        event.stop_propagation();
        assert!(event.is_propagation_stopped());
    }
}
