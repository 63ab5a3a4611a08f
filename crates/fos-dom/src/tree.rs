//! DOM Tree (arena-based allocation)
//!
//! Node 0 is always the document node. Removed nodes stay in the arena as
//! detached nodes; their ids remain valid.

use crate::{DomError, DomEvent, DomResult, Listener, Node, NodeData, NodeId};

/// Arena-based DOM tree for memory efficiency
#[derive(Debug)]
pub struct DomTree {
    pub(crate) nodes: Vec<Node>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self { nodes: vec![Node::document()] }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    /// Iterate over the children of a node
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        let next = self.get(parent).map_or(NodeId::NONE, |n| n.first_child);
        Children { tree: self, next }
    }

    /// Child ids of a node, in order
    pub fn child_ids(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent).map(|(id, _)| id).collect()
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Whether `ancestor` contains `node`
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    /// Value of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_text()
    }

    /// Replace the value of a text node
    pub fn set_text(&mut self, id: NodeId, content: &str) -> DomResult<()> {
        match &mut self.get_mut(id).ok_or(DomError::NotFound(id))?.data {
            NodeData::Text(t) => {
                t.content.clear();
                t.content.push_str(content);
                Ok(())
            }
            _ => Err(DomError::InvalidNodeType),
        }
    }

    /// Concatenated text of a subtree
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(text) = self.text(id) {
            out.push_str(text);
        }
        for (child, _) in self.children(id) {
            self.collect_text(child, out);
        }
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut crate::ElementData> {
        self.get_mut(id)
            .ok_or(DomError::NotFound(id))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)
    }

    /// Get an attribute of an element
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element_mut(id)?.set_attr(name, value.to_string());
        Ok(())
    }

    /// Remove an attribute from an element. Missing attributes are ignored.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        self.element_mut(id)?.remove_attr(name);
        Ok(())
    }

    /// Register an event listener on an element
    pub fn add_event_listener(
        &mut self,
        id: NodeId,
        event: &str,
        listener: Listener,
    ) -> DomResult<()> {
        self.element_mut(id)?.add_listener(event, listener);
        Ok(())
    }

    /// Unregister an event listener. Returns whether it was registered.
    pub fn remove_event_listener(
        &mut self,
        id: NodeId,
        event: &str,
        listener: &Listener,
    ) -> DomResult<bool> {
        Ok(self.element_mut(id)?.remove_listener(event, listener))
    }

    /// Number of listeners for an event type on a node
    pub fn listener_count(&self, id: NodeId, event: &str) -> usize {
        self.get(id)
            .and_then(Node::as_element)
            .map_or(0, |e| e.listeners_for(event).count())
    }

    /// Dispatch an event at `target`, bubbling through ancestors.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch_event(&self, mut event: DomEvent) -> DomResult<usize> {
        let target = event.target;
        self.get(target).ok_or(DomError::NotFound(target))?;

        let mut invoked = 0;
        let mut current = Some(target);
        while let Some(id) = current {
            event.current_target = id;
            // Snapshot so listeners see a stable list
            let listeners: Vec<Listener> = self.get(id)
                .and_then(Node::as_element)
                .map(|e| e.listeners_for(&event.event_type).cloned().collect())
                .unwrap_or_default();

            for listener in &listeners {
                listener.call(&mut event);
                invoked += 1;
            }

            if !event.bubbles || event.is_propagation_stopped() {
                break;
            }
            current = self.parent(id);
        }

        tracing::trace!(event = %event.event_type, ?target, invoked, "dispatched event");
        Ok(invoked)
    }

    /// Serialize a subtree to markup
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    /// Serialize the children of a node to markup
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for (child, _) in self.children(id) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else { return };
        match &node.data {
            NodeData::Document => {
                for (child, _) in self.children(id) {
                    self.write_html(child, out);
                }
            }
            NodeData::Text(t) => escape_into(&t.content, out),
            NodeData::Element(e) => {
                out.push('<');
                out.push_str(&e.tag);
                for attr in &e.attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    escape_into(&attr.value, out);
                    out.push('"');
                }
                out.push('>');
                for (child, _) in self.children(id) {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(&e.tag);
                out.push('>');
            }
        }
    }
}

fn escape_into(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Iterator over a node's children
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}
