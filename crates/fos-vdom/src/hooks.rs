//! Hook Store
//!
//! Component-local state kept in an ordered list of slots per fiber. The Nth
//! hook call of a render owns the Nth slot; the list moves from the alternate
//! fiber to the new one on every render. Each slot records the state type it
//! was created with, so a render whose calls diverge from the previous one is
//! caught instead of handing a slot to the wrong hook.

use std::any::{Any, type_name};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::{RenderError, RenderResult};

/// Flag shared by every setter of a fiber tree lineage.
///
/// Set when an update is enqueued, cleared when a render starts.
#[derive(Debug, Clone, Default)]
pub struct PendingUpdates(Rc<Cell<bool>>);

impl PendingUpdates {
    pub(crate) fn mark(&self) {
        self.0.set(true);
    }

    pub(crate) fn clear(&self) {
        self.0.set(false);
    }

    pub fn is_pending(&self) -> bool {
        self.0.get()
    }
}

enum StateUpdate<T> {
    Replace(T),
    Apply(Box<dyn FnOnce(&T) -> T>),
}

type UpdateQueue<T> = Rc<RefCell<VecDeque<StateUpdate<T>>>>;

/// One type-erased hook slot
pub(crate) trait HookSlot {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn describe(&self) -> String;
}

struct StateSlot<T> {
    state: T,
    queue: UpdateQueue<T>,
}

impl<T: 'static> StateSlot<T> {
    fn new(state: T) -> Self {
        Self {
            state,
            queue: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Fold queued updates into the state, oldest first
    fn fold(&mut self) -> usize {
        let mut applied = 0;
        loop {
            // Pop before applying so an updater may enqueue again
            let next = self.queue.borrow_mut().pop_front();
            let Some(update) = next else { break };
            self.state = match update {
                StateUpdate::Replace(value) => value,
                StateUpdate::Apply(f) => f(&self.state),
            };
            applied += 1;
        }
        applied
    }
}

impl<T: 'static> HookSlot for StateSlot<T> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn describe(&self) -> String {
        format!("use_state::<{}>", type_name::<T>())
    }
}

/// Handle that enqueues updates for one state slot.
///
/// Updates are applied the next time the owning component renders; a setter
/// kept past the fiber's deletion enqueues into a queue nobody reads.
pub struct StateSetter<T> {
    queue: UpdateQueue<T>,
    pending: PendingUpdates,
}

impl<T> StateSetter<T> {
    /// Replace the state
    pub fn set(&self, value: T) {
        self.queue.borrow_mut().push_back(StateUpdate::Replace(value));
        self.pending.mark();
    }

    /// Derive the next state from the previous one
    pub fn update(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.queue.borrow_mut().push_back(StateUpdate::Apply(Box::new(f)));
        self.pending.mark();
    }

    /// Number of updates waiting for the next render
    pub fn queued(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            pending: self.pending.clone(),
        }
    }
}

impl<T> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSetter")
            .field("state", &type_name::<T>())
            .field("queued", &self.queue.borrow().len())
            .finish()
    }
}

/// Hook context handed to a function component while it renders.
///
/// Hooks must be called unconditionally and in the same order on every
/// render of a component.
pub struct Hooks<'a> {
    component: &'a str,
    /// Slots of the previous render; `None` on first render
    previous: Option<VecDeque<Box<dyn HookSlot>>>,
    expected: usize,
    slots: Vec<Box<dyn HookSlot>>,
    pending: PendingUpdates,
}

impl<'a> Hooks<'a> {
    pub(crate) fn new(
        component: &'a str,
        previous: Option<Vec<Box<dyn HookSlot>>>,
        pending: PendingUpdates,
    ) -> Self {
        let expected = previous.as_ref().map_or(0, Vec::len);
        Self {
            component,
            previous: previous.map(VecDeque::from),
            expected,
            slots: Vec::with_capacity(expected),
            pending,
        }
    }

    fn violation(&self, expected: String, found: String) -> RenderError {
        tracing::warn!(component = self.component, %expected, %found, "hook order violation");
        RenderError::HookOrderViolation {
            component: self.component.to_string(),
            expected,
            found,
        }
    }

    /// Local state, initialised by `init` on the first render.
    ///
    /// Returns the current value, with queued updates applied, and a setter.
    pub fn use_state<T: Clone + 'static>(
        &mut self,
        init: impl FnOnce() -> T,
    ) -> RenderResult<(T, StateSetter<T>)> {
        let index = self.slots.len();
        let reused = self.previous.as_mut().map(VecDeque::pop_front);
        let mut slot: Box<dyn HookSlot> = match reused {
            None => Box::new(StateSlot::new(init())),
            Some(Some(slot)) => slot,
            Some(None) => {
                return Err(self.violation(
                    format!("{} hook call(s)", self.expected),
                    format!("extra call #{} to use_state::<{}>", index + 1, type_name::<T>()),
                ));
            }
        };

        let (value, setter) = match slot.as_any_mut().downcast_mut::<StateSlot<T>>() {
            Some(state) => {
                let applied = state.fold();
                if applied > 0 {
                    tracing::trace!(
                        component = self.component,
                        slot = index,
                        applied,
                        "folded state updates"
                    );
                }
                let setter = StateSetter {
                    queue: state.queue.clone(),
                    pending: self.pending.clone(),
                };
                (state.state.clone(), setter)
            }
            None => {
                let err = self.violation(
                    format!("{} at slot {index}", slot.describe()),
                    format!("use_state::<{}>", type_name::<T>()),
                );
                // Keep the slot so the state survives the failed render
                if let Some(previous) = self.previous.as_mut() {
                    previous.push_front(slot);
                }
                return Err(err);
            }
        };

        self.slots.push(slot);
        Ok((value, setter))
    }

    /// Hooks called so far in this render
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Check that the render called every hook of the previous one
    pub(crate) fn verify(&self) -> RenderResult<()> {
        match &self.previous {
            Some(previous) if !previous.is_empty() => Err(self.violation(
                format!("{} hook call(s)", self.expected),
                format!("{} hook call(s)", self.slots.len()),
            )),
            _ => Ok(()),
        }
    }

    /// Slots in call order, followed by any the render did not reach
    pub(crate) fn into_slots(self) -> Vec<Box<dyn HookSlot>> {
        let mut slots = self.slots;
        slots.extend(self.previous.into_iter().flatten());
        slots
    }
}

impl fmt::Debug for Hooks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("component", &self.component)
            .field("called", &self.slots.len())
            .field("expected", &self.expected)
            .finish()
    }
}
