//! fOS DOM - Document Object Model
//!
//! Memory-efficient, arena-backed DOM tree. This is the host document the
//! virtual DOM commits into when no browser is around: tests, headless
//! rendering and tooling.

mod node;
mod tree;
mod operations;
mod dom_events;

pub use node::{Node, NodeData, ElementData, TextData, Attribute, RegisteredListener};
pub use tree::{DomTree, Children};
pub use operations::{DomError, DomResult, NodeOperations};
pub use dom_events::{DomEvent, Listener};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this is not the sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena slot of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
