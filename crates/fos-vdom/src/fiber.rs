//! Fiber Tree
//!
//! Arena of fibers mirroring one rendered element tree. Fibers link to each
//! other through [`FiberId`] indices: `child` (first child), `sibling` (next
//! sibling) and `parent` (the return edge). `alternate` is the index of the
//! fiber at the same position in the tree this one was diffed against; it
//! carries no ownership and is only meaningful relative to that tree.

use std::fmt;
use std::rc::Rc;

use crate::component::ClassInstance;
use crate::hooks::{HookSlot, PendingUpdates};
use crate::{ElementType, Props};

/// Fiber identifier (index into the arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiberId(pub(crate) u32);

impl FiberId {
    /// Root fiber, wrapping the container
    pub const ROOT: FiberId = FiberId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Action a fiber requires at commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectTag {
    /// Create the DOM node and insert it
    Placement,
    /// Patch props of the reused DOM node
    Update,
    /// Remove the DOM node(s) of a previous fiber
    Deletion,
}

/// One entry of the effect list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    pub tag: EffectTag,
    /// Fiber in the new tree, or in the previous tree for deletions
    pub fiber: FiberId,
    /// Child indices from the root down to the fiber
    pub path: Vec<usize>,
    /// Element type label (`div`, `#text`, component name)
    pub label: String,
}

/// One node of the fiber tree
pub struct Fiber<N> {
    /// `None` only for the root fiber
    pub(crate) element_type: Option<ElementType>,
    pub(crate) props: Rc<Props>,
    pub(crate) parent: Option<FiberId>,
    pub(crate) child: Option<FiberId>,
    pub(crate) sibling: Option<FiberId>,
    pub(crate) alternate: Option<FiberId>,
    pub(crate) dom: Option<N>,
    pub(crate) effect_tag: Option<EffectTag>,
    pub(crate) hooks: Vec<Box<dyn HookSlot>>,
    pub(crate) instance: Option<Box<dyn ClassInstance>>,
    /// Previous-tree fibers removed from this fiber's child positions
    pub(crate) deletions: Vec<FiberId>,
    /// Position among siblings
    pub(crate) index: usize,
    pub(crate) depth: usize,
}

impl<N> Fiber<N> {
    pub(crate) fn root(container: N, props: Props, alternate: Option<FiberId>) -> Self {
        Self {
            element_type: None,
            props: Rc::new(props),
            parent: None,
            child: None,
            sibling: None,
            alternate,
            dom: Some(container),
            effect_tag: None,
            hooks: Vec::new(),
            instance: None,
            deletions: Vec::new(),
            index: 0,
            depth: 0,
        }
    }

    pub(crate) fn new(
        element_type: ElementType,
        props: Rc<Props>,
        parent: FiberId,
        index: usize,
        depth: usize,
    ) -> Self {
        Self {
            element_type: Some(element_type),
            props,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: None,
            dom: None,
            effect_tag: Some(EffectTag::Placement),
            hooks: Vec::new(),
            instance: None,
            deletions: Vec::new(),
            index,
            depth,
        }
    }

    /// Element type; `None` for the root
    pub fn element_type(&self) -> Option<&ElementType> {
        self.element_type.as_ref()
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn parent(&self) -> Option<FiberId> {
        self.parent
    }

    pub fn child(&self) -> Option<FiberId> {
        self.child
    }

    pub fn sibling(&self) -> Option<FiberId> {
        self.sibling
    }

    pub fn alternate(&self) -> Option<FiberId> {
        self.alternate
    }

    /// DOM node owned by this fiber (the container for the root)
    pub fn dom(&self) -> Option<&N> {
        self.dom.as_ref()
    }

    pub fn effect_tag(&self) -> Option<EffectTag> {
        self.effect_tag
    }

    /// Number of hook slots, for component fibers
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    pub fn has_instance(&self) -> bool {
        self.instance.is_some()
    }

    pub fn is_root(&self) -> bool {
        self.element_type.is_none()
    }

    pub fn is_component(&self) -> bool {
        self.element_type.as_ref().is_some_and(ElementType::is_component)
    }

    /// Position among siblings
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn label(&self) -> &str {
        self.element_type.as_ref().map_or("#root", ElementType::label)
    }
}

impl<N: fmt::Debug> fmt::Debug for Fiber<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fiber")
            .field("type", &self.label())
            .field("effect_tag", &self.effect_tag)
            .field("dom", &self.dom)
            .field("parent", &self.parent)
            .field("child", &self.child)
            .field("sibling", &self.sibling)
            .field("alternate", &self.alternate)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Arena of fibers produced by one render
pub struct FiberTree<N> {
    container: N,
    pub(crate) fibers: Vec<Fiber<N>>,
    pub(crate) effects: Vec<Effect>,
    pub(crate) pending: PendingUpdates,
}

impl<N: Clone> FiberTree<N> {
    /// Tree holding only the root fiber for `container`
    pub(crate) fn new(
        container: N,
        props: Props,
        alternate: Option<FiberId>,
        pending: PendingUpdates,
    ) -> Self {
        Self {
            fibers: vec![Fiber::root(container.clone(), props, alternate)],
            container,
            effects: Vec::new(),
            pending,
        }
    }
}

impl<N> FiberTree<N> {

    pub(crate) fn push(&mut self, fiber: Fiber<N>) -> FiberId {
        let id = FiberId(self.fibers.len() as u32);
        self.fibers.push(fiber);
        id
    }

    #[inline]
    pub fn root(&self) -> FiberId {
        FiberId::ROOT
    }

    /// Container the tree is rendered into
    pub fn container(&self) -> &N {
        &self.container
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.fibers.get(id.index())
    }

    pub(crate) fn fiber(&self, id: FiberId) -> &Fiber<N> {
        &self.fibers[id.index()]
    }

    pub(crate) fn fiber_mut(&mut self, id: FiberId) -> &mut Fiber<N> {
        &mut self.fibers[id.index()]
    }

    /// Number of fibers, root included
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Child ids of a fiber, in order
    pub fn children(&self, id: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut next = self.get(id).and_then(|f| f.child);
        while let Some(child) = next {
            out.push(child);
            next = self.fiber(child).sibling;
        }
        out
    }

    /// Fiber at a path of child indices from the root
    pub fn at_path(&self, path: &[usize]) -> Option<FiberId> {
        let mut current = FiberId::ROOT;
        for &index in path {
            current = *self.children(current).get(index)?;
        }
        Some(current)
    }

    /// Child indices from the root down to `id`
    pub fn path(&self, id: FiberId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = self.get(id);
        while let Some(fiber) = current {
            let Some(parent) = fiber.parent else { break };
            path.push(fiber.index);
            current = self.get(parent);
        }
        path.reverse();
        path
    }

    /// Effect list of the render that produced this tree, in commit order
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Effects carrying `tag`
    pub fn effects_tagged(&self, tag: EffectTag) -> impl Iterator<Item = &Effect> {
        self.effects.iter().filter(move |e| e.tag == tag)
    }

    /// Whether a setter has enqueued an update since this tree was rendered
    pub fn has_pending_updates(&self) -> bool {
        self.pending.is_pending()
    }

    /// Pre-order walk: node, child subtree, then siblings
    pub(crate) fn next_in_order(&self, id: FiberId, stop: FiberId) -> Option<FiberId> {
        let fiber = self.fiber(id);
        if let Some(child) = fiber.child {
            return Some(child);
        }
        let mut current = id;
        loop {
            if current == stop {
                return None;
            }
            let fiber = self.fiber(current);
            if let Some(sibling) = fiber.sibling {
                return Some(sibling);
            }
            current = fiber.parent?;
        }
    }

    /// Ids of `start` and all its descendants, in pre-order
    pub(crate) fn subtree(&self, start: FiberId) -> Vec<FiberId> {
        let mut out = vec![start];
        let mut next = self.fiber(start).child;
        while let Some(id) = next {
            out.push(id);
            next = self.next_in_order(id, start);
        }
        out
    }
}

impl<N: fmt::Debug> fmt::Debug for FiberTree<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FiberTree")
            .field("fibers", &self.fibers.len())
            .field("effects", &self.effects)
            .field("pending", &self.pending.is_pending())
            .finish()
    }
}
