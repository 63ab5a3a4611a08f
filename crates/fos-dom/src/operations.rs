//! DOM Node Operations
//!
//! Core node manipulation: appendChild, removeChild, insertBefore, replaceChild.

use crate::{DomTree, NodeId};

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NotFound(NodeId),
    /// Hierarchy error (e.g., inserting ancestor)
    #[error("Hierarchy request error")]
    HierarchyRequest,
    /// Invalid node type
    #[error("Invalid node type")]
    InvalidNodeType,
    /// Node is not a child
    #[error("Node is not a child")]
    NotAChild,
}

/// Node operations trait
pub trait NodeOperations {
    /// Append a child node
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId>;

    /// Remove a child node
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId>;

    /// Insert before a reference node (append when `ref_child` is `None`)
    fn insert_before(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        ref_child: Option<NodeId>,
    ) -> DomResult<NodeId>;

    /// Replace a child with another node
    fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> DomResult<NodeId>;
}

impl DomTree {
    /// Validate that `child` may be inserted under `parent`
    fn check_insert(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.get(parent).ok_or(DomError::NotFound(parent))?;
        self.get(child).ok_or(DomError::NotFound(child))?;

        if parent_node.is_text() {
            return Err(DomError::HierarchyRequest);
        }
        // A node cannot become its own descendant
        if parent == child || self.is_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        Ok(())
    }

    /// Unlink a node from its parent's child list
    fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }
}

impl NodeOperations for DomTree {
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.get(parent).ok_or(DomError::NotFound(parent))?;
        let node = self.get(child).ok_or(DomError::NotFound(child))?;
        if node.parent != parent {
            return Err(DomError::NotAChild);
        }

        self.detach(child);
        tracing::trace!(?parent, ?child, "removed child");
        Ok(child)
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        ref_child: Option<NodeId>,
    ) -> DomResult<NodeId> {
        self.check_insert(parent, new_child)?;
        if let Some(reference) = ref_child {
            let node = self.get(reference).ok_or(DomError::NotFound(reference))?;
            if node.parent != parent {
                return Err(DomError::NotAChild);
            }
            if reference == new_child {
                return Ok(new_child);
            }
        }

        // Moving an attached node first removes it from its old position
        self.detach(new_child);

        match ref_child {
            Some(reference) => {
                let prev = self.nodes[reference.index()].prev_sibling;
                {
                    let node = &mut self.nodes[new_child.index()];
                    node.parent = parent;
                    node.prev_sibling = prev;
                    node.next_sibling = reference;
                }
                self.nodes[reference.index()].prev_sibling = new_child;
                if prev.is_valid() {
                    self.nodes[prev.index()].next_sibling = new_child;
                } else {
                    self.nodes[parent.index()].first_child = new_child;
                }
            }
            None => {
                let last = self.nodes[parent.index()].last_child;
                {
                    let node = &mut self.nodes[new_child.index()];
                    node.parent = parent;
                    node.prev_sibling = last;
                }
                if last.is_valid() {
                    self.nodes[last.index()].next_sibling = new_child;
                } else {
                    self.nodes[parent.index()].first_child = new_child;
                }
                self.nodes[parent.index()].last_child = new_child;
            }
        }

        tracing::trace!(?parent, child = ?new_child, ?ref_child, "inserted child");
        Ok(new_child)
    }

    fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> DomResult<NodeId> {
        if new_child == old_child {
            return Ok(old_child);
        }
        self.insert_before(parent, new_child, Some(old_child))?;
        self.remove_child(parent, old_child)
    }
}
