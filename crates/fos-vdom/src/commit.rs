//! Committer
//!
//! Applies the effect list of a [`WorkTree`] through a [`DomDriver`]. This is
//! the only place the document is mutated. A driver error stops the commit
//! where it happened; mutations already applied stay applied.

use std::mem;

use crate::driver::DomDriver;
use crate::error::RenderError;
use crate::fiber::{EffectTag, FiberId, FiberTree};
use crate::patch::update_dom;
use crate::reconciler::WorkTree;
use crate::{Config, ElementType, Props, RenderResult};

/// Commit a diffed tree, returning it as the new current tree
pub fn commit<D: DomDriver>(
    work: WorkTree<D::Node>,
    driver: &mut D,
    config: &Config,
) -> RenderResult<FiberTree<D::Node>> {
    let WorkTree { mut tree, previous } = work;
    let effects = mem::take(&mut tree.effects);

    for effect in &effects {
        tracing::trace!(
            tag = ?effect.tag,
            path = ?effect.path,
            label = %effect.label,
            "commit effect"
        );
        match effect.tag {
            EffectTag::Placement => commit_placement(&mut tree, effect.fiber, driver, config)?,
            EffectTag::Update => {
                commit_update(&tree, previous.as_ref(), effect.fiber, driver, config)?
            }
            EffectTag::Deletion => {
                if let Some(prev) = &previous {
                    commit_deletion(prev, effect.fiber, driver)?;
                }
            }
        }
    }

    tracing::debug!(effects = effects.len(), fibers = tree.len(), "committed");
    tree.effects = effects;
    Ok(tree)
}

fn commit_placement<D: DomDriver>(
    tree: &mut FiberTree<D::Node>,
    id: FiberId,
    driver: &mut D,
    config: &Config,
) -> RenderResult<()> {
    let fiber = tree.fiber(id);
    let node = match &fiber.element_type {
        Some(ElementType::Host(tag)) => driver.create_element_node(tag),
        Some(ElementType::Text) => driver.create_text_node(),
        // Components own no node; their children are placed on their own
        _ => return Ok(()),
    }
    .map_err(RenderError::driver)?;
    update_dom(driver, &node, &Props::new(), &fiber.props, config)?;

    let parent = host_parent(tree, id);
    let before = next_host_sibling(tree, id);
    driver
        .insert_before(&parent, &node, before.as_ref())
        .map_err(RenderError::driver)?;

    tree.fiber_mut(id).dom = Some(node);
    Ok(())
}

fn commit_update<D: DomDriver>(
    tree: &FiberTree<D::Node>,
    previous: Option<&FiberTree<D::Node>>,
    id: FiberId,
    driver: &mut D,
    config: &Config,
) -> RenderResult<()> {
    let fiber = tree.fiber(id);
    let Some(node) = fiber.dom.as_ref().filter(|_| !fiber.is_component()) else {
        return Ok(());
    };
    let prev_props = match (fiber.alternate, previous) {
        (Some(alt), Some(prev)) => prev.fiber(alt).props.clone(),
        _ => Default::default(),
    };
    update_dom(driver, node, &prev_props, &fiber.props, config)
}

fn commit_deletion<D: DomDriver>(
    previous: &FiberTree<D::Node>,
    id: FiberId,
    driver: &mut D,
) -> RenderResult<()> {
    remove_host_nodes(previous, id, &host_parent(previous, id), driver)
}

/// Remove the topmost host nodes of a subtree from `parent`
pub(crate) fn remove_host_nodes<D: DomDriver>(
    tree: &FiberTree<D::Node>,
    id: FiberId,
    parent: &D::Node,
    driver: &mut D,
) -> RenderResult<()> {
    let fiber = tree.fiber(id);
    if let Some(node) = fiber.dom.as_ref().filter(|_| !fiber.is_component() && !fiber.is_root()) {
        return driver.remove_child(parent, node).map_err(RenderError::driver);
    }
    for child in tree.children(id) {
        remove_host_nodes(tree, child, parent, driver)?;
    }
    Ok(())
}

/// DOM node of the nearest ancestor owning one, falling back to the container
fn host_parent<N: Clone>(tree: &FiberTree<N>, id: FiberId) -> N {
    let mut current = tree.fiber(id).parent;
    while let Some(parent) = current {
        let fiber = tree.fiber(parent);
        match &fiber.dom {
            Some(dom) if !fiber.is_component() => return dom.clone(),
            _ => current = fiber.parent,
        }
    }
    tree.container().clone()
}

/// First already-mounted host node after `id` under the same host parent
fn next_host_sibling<N: Clone>(tree: &FiberTree<N>, id: FiberId) -> Option<N> {
    let mut current = id;
    loop {
        let mut next = tree.fiber(current).sibling;
        while next.is_none() {
            // Climb out of component fibers, stopping at the host parent
            let parent = tree.fiber(current).parent?;
            if tree.fiber(parent).dom.is_some() {
                return None;
            }
            current = parent;
            next = tree.fiber(current).sibling;
        }
        let candidate = next?;
        if let Some(node) = first_mounted_host(tree, candidate) {
            return Some(node);
        }
        current = candidate;
    }
}

fn first_mounted_host<N: Clone>(tree: &FiberTree<N>, id: FiberId) -> Option<N> {
    let fiber = tree.fiber(id);
    if !fiber.is_component() {
        // Fibers placed later in this commit have no node yet
        return fiber.dom.clone();
    }
    tree.children(id)
        .into_iter()
        .find_map(|child| first_mounted_host(tree, child))
}
