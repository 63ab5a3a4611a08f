//! DOM Node - Compact representation
//!
//! Nodes live in the [`DomTree`](crate::DomTree) arena and reference each
//! other through [`NodeId`] instead of pointers, so a detached subtree is just
//! a set of nodes whose root has no parent.

use crate::{Listener, NodeId};

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub fn text(content: String) -> Self {
        Self::with_data(NodeData::Text(TextData { content }))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Whether this node is attached to a parent
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.parent.is_valid()
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Tag name
    pub tag: String,
    /// Attributes in insertion order
    pub attrs: Vec<Attribute>,
    /// Registered event listeners in registration order
    pub listeners: Vec<RegisteredListener>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: String) {
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            attr.value = value;
            return;
        }
        self.attrs.push(Attribute { name: name.to_string(), value });
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(pos).value)
    }

    /// Register a listener. The same listener is only registered once per event.
    pub fn add_listener(&mut self, event: &str, listener: Listener) -> bool {
        if self.listeners.iter().any(|l| l.event == event && l.listener == listener) {
            return false;
        }
        self.listeners.push(RegisteredListener { event: event.to_string(), listener });
        true
    }

    /// Unregister a listener by identity
    pub fn remove_listener(&mut self, event: &str, listener: &Listener) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !(l.event == event && &l.listener == listener));
        self.listeners.len() != before
    }

    /// Listeners registered for an event type
    pub fn listeners_for<'a>(&'a self, event: &'a str) -> impl Iterator<Item = &'a Listener> + 'a {
        self.listeners.iter()
            .filter(move |l| l.event == event)
            .map(|l| &l.listener)
    }
}

/// Text node data
#[derive(Debug)]
pub struct TextData {
    pub content: String,
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Listener bound to an event type
#[derive(Debug, Clone)]
pub struct RegisteredListener {
    pub event: String,
    pub listener: Listener,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attr_overwrites() {
        let mut elem = ElementData::new("div");
        elem.set_attr("id", "a".to_string());
        elem.set_attr("id", "b".to_string());

        assert_eq!(elem.attrs.len(), 1);
        assert_eq!(elem.get_attr("id"), Some("b"));
        assert_eq!(elem.remove_attr("id"), Some("b".to_string()));
        assert_eq!(elem.get_attr("id"), None);
    }

    #[test]
    fn test_listener_identity() {
        let mut elem = ElementData::new("button");
        let a = Listener::new(|_| {});
        let b = Listener::new(|_| {});

        assert!(elem.add_listener("click", a.clone()));
        assert!(!elem.add_listener("click", a.clone()));
        assert!(elem.add_listener("click", b.clone()));
        assert_eq!(elem.listeners_for("click").count(), 2);

        assert!(elem.remove_listener("click", &a));
        assert!(!elem.remove_listener("click", &a));
        assert_eq!(elem.listeners_for("click").count(), 1);
    }
}
