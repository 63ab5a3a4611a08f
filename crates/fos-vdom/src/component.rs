//! Components
//!
//! Function components render through a closure receiving a [`Hooks`]
//! context. Class components are Rust types implementing [`ClassComponent`];
//! their instance lives on the fiber and moves to the next fiber at the same
//! position on every render.
//!
//! Identity decides whether two renders refer to "the same" component: a
//! function component is identified by its allocation (clone the
//! [`Component`] instead of building it again), a class component by its type.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::hooks::PendingUpdates;
use crate::{Element, Hooks, Props, RenderResult};

pub(crate) type RenderFn = dyn Fn(&Props, &mut Hooks<'_>) -> RenderResult<Element>;

/// Reference to a component, usable as an element type
#[derive(Clone)]
pub struct Component(Rc<ComponentDef>);

struct ComponentDef {
    name: String,
    kind: ComponentKind,
}

pub(crate) enum ComponentKind {
    Function(Box<RenderFn>),
    Class {
        type_id: TypeId,
        construct: fn(&Props) -> Box<dyn ClassInstance>,
    },
}

impl Component {
    /// Function component
    pub fn function(
        name: &str,
        render: impl Fn(&Props, &mut Hooks<'_>) -> RenderResult<Element> + 'static,
    ) -> Self {
        Self(Rc::new(ComponentDef {
            name: name.to_string(),
            kind: ComponentKind::Function(Box::new(render)),
        }))
    }

    /// Class component of type `C`
    pub fn class<C: ClassComponent>() -> Self {
        let full = std::any::type_name::<C>();
        let name = full.rsplit("::").next().unwrap_or(full);
        Self(Rc::new(ComponentDef {
            name: name.to_string(),
            kind: ComponentKind::Class {
                type_id: TypeId::of::<C>(),
                construct: construct_instance::<C>,
            },
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_class(&self) -> bool {
        matches!(self.0.kind, ComponentKind::Class { .. })
    }

    pub(crate) fn kind(&self) -> &ComponentKind {
        &self.0.kind
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0.kind, &other.0.kind) {
            (
                ComponentKind::Class { type_id: a, .. },
                ComponentKind::Class { type_id: b, .. },
            ) => a == b,
            (ComponentKind::Function(_), ComponentKind::Function(_)) => {
                Rc::ptr_eq(&self.0, &other.0)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_class() { "class" } else { "function" };
        write!(f, "Component({} {kind})", self.0.name)
    }
}

/// Stateful component whose instance persists across renders.
///
/// The instance is constructed the first time the component is placed at a
/// tree position and dropped when that position is deleted or changes type.
pub trait ClassComponent: Sized + 'static {
    /// Build the instance from its first props
    fn construct(props: &Props) -> Self;

    /// Render with the current props
    fn render(&mut self, props: &Props, updater: &Updater<Self>) -> RenderResult<Element>;
}

type ClassUpdate<C> = Box<dyn FnOnce(&mut C)>;

/// Enqueues state changes for a class component instance.
///
/// Queued closures run oldest first, right before the instance's next render.
pub struct Updater<C> {
    queue: Rc<RefCell<VecDeque<ClassUpdate<C>>>>,
    pending: PendingUpdates,
}

impl<C> Updater<C> {
    /// Schedule a mutation of the instance
    pub fn set_state(&self, update: impl FnOnce(&mut C) + 'static) {
        self.queue.borrow_mut().push_back(Box::new(update));
        self.pending.mark();
    }
}

impl<C> Clone for Updater<C> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            pending: self.pending.clone(),
        }
    }
}

impl<C> fmt::Debug for Updater<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater")
            .field("queued", &self.queue.borrow().len())
            .finish()
    }
}

/// Type-erased class instance stored on a fiber
pub(crate) trait ClassInstance {
    fn render(&mut self, props: &Props, pending: &PendingUpdates) -> RenderResult<Element>;
}

struct Instance<C> {
    component: C,
    queue: Rc<RefCell<VecDeque<ClassUpdate<C>>>>,
}

impl<C: ClassComponent> ClassInstance for Instance<C> {
    fn render(&mut self, props: &Props, pending: &PendingUpdates) -> RenderResult<Element> {
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(update) = next else { break };
            update(&mut self.component);
        }
        let updater = Updater {
            queue: self.queue.clone(),
            pending: pending.clone(),
        };
        self.component.render(props, &updater)
    }
}

fn construct_instance<C: ClassComponent>(props: &Props) -> Box<dyn ClassInstance> {
    Box::new(Instance {
        component: C::construct(props),
        queue: Rc::new(RefCell::new(VecDeque::new())),
    })
}
