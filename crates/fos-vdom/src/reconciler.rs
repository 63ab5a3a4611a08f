//! Reconciler
//!
//! Diffs an element tree against the previous fiber tree of the same
//! container. Children are matched by index only: the same type at the same
//! position is an update, anything else replaces the position. Component
//! fibers are rendered here, as they are reached, so hooks and class
//! instances move from the alternate before the component's children are
//! diffed.

use std::fmt;
use std::mem;

use crate::component::ComponentKind;
use crate::fiber::{Effect, EffectTag, Fiber, FiberId, FiberTree};
use crate::{Component, Config, Element, ElementType, Hooks, Props, RenderError, RenderResult};

/// Result of a diff, ready to commit
pub struct WorkTree<N> {
    pub(crate) tree: FiberTree<N>,
    /// Tree diffed against; deletion effects point into it
    pub(crate) previous: Option<FiberTree<N>>,
}

impl<N> WorkTree<N> {
    /// The new fiber tree
    pub fn tree(&self) -> &FiberTree<N> {
        &self.tree
    }

    pub fn previous(&self) -> Option<&FiberTree<N>> {
        self.previous.as_ref()
    }

    /// Effects to apply, in commit order
    pub fn effects(&self) -> &[Effect] {
        self.tree.effects()
    }
}

impl<N: fmt::Debug> fmt::Debug for WorkTree<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkTree")
            .field("tree", &self.tree)
            .field("has_previous", &self.previous.is_some())
            .finish()
    }
}

/// Build the fiber tree for `element` rendered into `container`.
///
/// `previous` is the last committed tree for the same container. On success
/// it is taken: hook state and class instances move to the new tree. On
/// failure it is put back with its state intact, so the caller can retry
/// against it. A tree rendered into another container is dropped either way.
pub fn reconcile<N: Clone + PartialEq + fmt::Debug>(
    element: &Element,
    container: N,
    previous: &mut Option<FiberTree<N>>,
    config: &Config,
) -> RenderResult<WorkTree<N>> {
    let taken = previous.take().filter(|prev| {
        let same = prev.container() == &container;
        if !same {
            tracing::warn!(
                ?container,
                "previous tree belongs to another container, rendering from scratch"
            );
        }
        same
    });

    let pending = taken.as_ref().map(|prev| prev.pending.clone()).unwrap_or_default();
    let was_pending = pending.is_pending();
    pending.clear();

    let mut root_props = Props::new();
    root_props.set_children(vec![element.clone()]);
    let alternate = taken.as_ref().map(|_| FiberId::ROOT);

    let mut reconciler = Reconciler {
        tree: FiberTree::new(container, root_props, alternate, pending.clone()),
        previous: taken,
        config,
    };

    if let Err(err) = reconciler.run() {
        *previous = reconciler.restore();
        if was_pending {
            pending.mark();
        }
        return Err(err);
    }
    reconciler.collect_effects();

    let Reconciler { tree, previous, .. } = reconciler;
    tracing::debug!(
        fibers = tree.len(),
        placements = tree.effects_tagged(EffectTag::Placement).count(),
        updates = tree.effects_tagged(EffectTag::Update).count(),
        deletions = tree.effects_tagged(EffectTag::Deletion).count(),
        "reconciled"
    );
    Ok(WorkTree { tree, previous })
}

struct Reconciler<'c, N> {
    tree: FiberTree<N>,
    previous: Option<FiberTree<N>>,
    config: &'c Config,
}

impl<N: Clone + PartialEq + fmt::Debug> Reconciler<'_, N> {
    fn run(&mut self) -> RenderResult<()> {
        let mut next = Some(FiberId::ROOT);
        while let Some(id) = next {
            self.perform_unit(id)?;
            next = self.tree.next_in_order(id, FiberId::ROOT);
        }
        Ok(())
    }

    /// Hand hook slots and class instances back to the previous tree
    fn restore(self) -> Option<FiberTree<N>> {
        let Reconciler { mut tree, mut previous, .. } = self;
        let prev = previous.as_mut()?;
        for fiber in tree.fibers.iter_mut().filter(|f| !f.is_root()) {
            let Some(alt) = fiber.alternate else { continue };
            let old = prev.fiber_mut(alt);
            if !fiber.hooks.is_empty() {
                old.hooks = mem::take(&mut fiber.hooks);
            }
            if let Some(instance) = fiber.instance.take() {
                old.instance = Some(instance);
            }
        }
        tracing::debug!("diff failed, previous tree kept");
        previous
    }

    /// Render the fiber if it is a component, then diff its children
    fn perform_unit(&mut self, id: FiberId) -> RenderResult<()> {
        let fiber = self.tree.fiber(id);
        let props = fiber.props.clone();
        let children = match fiber.element_type.clone() {
            Some(ElementType::Component(component)) => {
                vec![self.render_component(id, &component, &props)?]
            }
            _ => props.children().to_vec(),
        };
        self.reconcile_children(id, &children)
    }

    fn render_component(
        &mut self,
        id: FiberId,
        component: &Component,
        props: &Props,
    ) -> RenderResult<Element> {
        let alternate = self.tree.fiber(id).alternate;
        let pending = self.tree.pending.clone();

        match component.kind() {
            ComponentKind::Function(render) => {
                let previous_hooks = match (alternate, self.previous.as_mut()) {
                    (Some(alt), Some(prev)) => Some(mem::take(&mut prev.fiber_mut(alt).hooks)),
                    _ => None,
                };
                let mut hooks = Hooks::new(component.name(), previous_hooks, pending);
                let result = render(props, &mut hooks).and_then(|element| {
                    hooks.verify()?;
                    Ok(element)
                });
                let slots = hooks.into_slots();
                match (&result, alternate, self.previous.as_mut()) {
                    (Ok(_), ..) => self.tree.fiber_mut(id).hooks = slots,
                    (Err(_), Some(alt), Some(prev)) => prev.fiber_mut(alt).hooks = slots,
                    (Err(_), ..) => {}
                }
                result
            }
            ComponentKind::Class { construct, .. } => {
                let reused = match (alternate, self.previous.as_mut()) {
                    (Some(alt), Some(prev)) => prev.fiber_mut(alt).instance.take(),
                    _ => None,
                };
                let mut instance = reused.unwrap_or_else(|| {
                    tracing::trace!(component = component.name(), "constructing instance");
                    construct(props)
                });
                let element = instance.render(props, &pending);
                self.tree.fiber_mut(id).instance = Some(instance);
                element
            }
        }
    }

    fn reconcile_children(&mut self, parent: FiberId, elements: &[Element]) -> RenderResult<()> {
        let depth = self.tree.fiber(parent).depth + 1;
        if !elements.is_empty() && depth > self.config.max_depth {
            tracing::warn!(limit = self.config.max_depth, "fiber tree too deep");
            return Err(RenderError::DepthExceeded { limit: self.config.max_depth });
        }

        let old = match (self.tree.fiber(parent).alternate, &self.previous) {
            (Some(alt), Some(prev)) => prev.children(alt),
            _ => Vec::new(),
        };

        let mut prev_sibling: Option<FiberId> = None;
        for index in 0..elements.len().max(old.len()) {
            let element = elements.get(index);
            let old_id = old.get(index).copied();

            let matched = match (element, old_id, &self.previous) {
                (Some(el), Some(old_id), Some(prev))
                    if prev.fiber(old_id).element_type.as_ref() == Some(el.element_type()) =>
                {
                    Some(old_id)
                }
                _ => None,
            };
            if let Some(old_id) = old_id.filter(|_| matched.is_none()) {
                self.delete(parent, old_id);
            }

            let Some(element) = element else { continue };
            let mut fiber = Fiber::new(
                element.element_type().clone(),
                element.shared_props(),
                parent,
                index,
                depth,
            );
            match (matched, &self.previous) {
                (Some(old_id), Some(prev)) => {
                    fiber.alternate = Some(old_id);
                    fiber.dom = prev.fiber(old_id).dom.clone();
                    fiber.effect_tag = Some(EffectTag::Update);
                }
                _ => element.element_type().validate()?,
            }

            let id = self.tree.push(fiber);
            match prev_sibling {
                None => self.tree.fiber_mut(parent).child = Some(id),
                Some(sibling) => self.tree.fiber_mut(sibling).sibling = Some(id),
            }
            prev_sibling = Some(id);
        }
        Ok(())
    }

    /// Schedule a previous subtree for removal under `parent`
    fn delete(&mut self, parent: FiberId, old: FiberId) {
        self.tree.fiber_mut(parent).deletions.push(old);
    }

    /// Effect list in commit order: node, its child deletions, then its subtree.
    ///
    /// Runs only once the diff succeeded; deleted subtrees of the previous
    /// tree are tagged here so a failed diff leaves that tree untouched.
    fn collect_effects(&mut self) {
        let mut effects = Vec::new();
        for id in self.tree.subtree(FiberId::ROOT) {
            let fiber = self.tree.fiber(id);
            if let Some(tag) = fiber.effect_tag {
                effects.push(Effect {
                    tag,
                    fiber: id,
                    path: self.tree.path(id),
                    label: fiber.label().to_string(),
                });
            }
            if let Some(prev) = self.previous.as_mut() {
                for &old in &fiber.deletions {
                    for doomed in prev.subtree(old) {
                        prev.fiber_mut(doomed).effect_tag = Some(EffectTag::Deletion);
                    }
                    effects.push(Effect {
                        tag: EffectTag::Deletion,
                        fiber: old,
                        path: prev.path(old),
                        label: prev.fiber(old).label().to_string(),
                    });
                }
            }
        }
        self.tree.effects = effects;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_element;

    fn list(items: &[&str]) -> Element {
        let children: Vec<Element> = items
            .iter()
            .map(|tag| create_element(*tag, Props::new(), Vec::<Element>::new()))
            .collect();
        create_element("ul", Props::new(), children)
    }

    fn labels(tree: &FiberTree<u32>, tag: EffectTag) -> Vec<(Vec<usize>, String)> {
        tree.effects_tagged(tag).map(|e| (e.path.clone(), e.label.clone())).collect()
    }

    fn diff(element: &Element, previous: &mut Option<FiberTree<u32>>) -> WorkTree<u32> {
        reconcile(element, 0u32, previous, &Config::default()).unwrap()
    }

    #[test]
    fn test_first_render_places_everything() {
        let work = diff(&list(&["li", "li"]), &mut None);

        assert_eq!(work.tree().len(), 4);
        assert_eq!(work.effects().len(), 3);
        assert!(work.effects().iter().all(|e| e.tag == EffectTag::Placement));
        assert_eq!(work.effects()[0].path, vec![0]);

        let li = work.tree().at_path(&[0, 1]).unwrap();
        assert_eq!(work.tree().fiber(li).depth(), 2);
    }

    #[test]
    fn test_positional_matching() {
        let first = diff(&list(&["li", "p", "li"]), &mut None);
        let mut previous = Some(first.tree);
        let second = diff(&list(&["li", "li"]), &mut previous);
        let tree = second.tree();

        assert!(previous.is_none(), "taken on success");
        assert_eq!(labels(tree, EffectTag::Update), vec![
            (vec![0], "ul".to_string()),
            (vec![0, 0], "li".to_string()),
        ]);
        assert_eq!(labels(tree, EffectTag::Placement), vec![(vec![0, 1], "li".to_string())]);
        assert_eq!(labels(tree, EffectTag::Deletion), vec![
            (vec![0, 1], "p".to_string()),
            (vec![0, 2], "li".to_string()),
        ]);
    }

    #[test]
    fn test_deletion_follows_parent_effect() {
        let first = diff(&list(&["a", "b"]), &mut None);
        let second = diff(&list(&["a"]), &mut Some(first.tree));

        let tags: Vec<_> = second.effects().iter().map(|e| e.tag).collect();
        assert_eq!(tags, vec![EffectTag::Update, EffectTag::Deletion, EffectTag::Update]);
    }

    #[test]
    fn test_other_container_starts_fresh() {
        let first = diff(&list(&["li"]), &mut None);
        let mut previous = Some(first.tree);
        let second = reconcile(&list(&["li"]), 7u32, &mut previous, &Config::default()).unwrap();

        assert!(second.previous().is_none());
        assert!(second.effects().iter().all(|e| e.tag == EffectTag::Placement));
    }

    #[test]
    fn test_invalid_tag_rejected() {
        let el = create_element("div", Props::new(), [list(&["bad tag"])]);
        let err = reconcile(&el, 0u32, &mut None, &Config::default()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidElementType { tag } if tag == "bad tag"));
    }

    #[test]
    fn test_failed_diff_keeps_previous() {
        let first = diff(&list(&["a", "b"]), &mut None);
        let mut previous = Some(first.tree);

        let err = reconcile(&list(&["i", "no good"]), 0u32, &mut previous, &Config::default());
        assert!(err.is_err());

        let kept = previous.as_ref().unwrap();
        assert_eq!(kept.len(), 4);
        let b = kept.at_path(&[0, 1]).unwrap();
        assert_eq!(kept.fiber(b).effect_tag(), Some(EffectTag::Placement), "not marked deleted");

        let retry = diff(&list(&["a", "b"]), &mut previous);
        assert!(retry.effects().iter().all(|e| e.tag == EffectTag::Update));
    }

    #[test]
    fn test_depth_limit() {
        let config = Config { max_depth: 2, ..Config::default() };
        let deep = create_element("a", Props::new(), [create_element("b", Props::new(), ["c"])]);

        let err = reconcile(&deep, 0u32, &mut None, &config).unwrap_err();
        assert!(matches!(err, RenderError::DepthExceeded { limit: 2 }));
    }
}
