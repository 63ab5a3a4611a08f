//! DOM Driver
//!
//! The only surface through which the committer mutates a real document.

use std::error::Error;
use std::fmt;

use fos_dom::{DomError, DomTree, Listener, NodeId, NodeOperations};

use crate::element::NODE_VALUE;
use crate::PropValue;

/// Mutation primitives of a host document
pub trait DomDriver {
    /// Node handle
    type Node: Clone + PartialEq + fmt::Debug;
    /// Error raised by a failed mutation
    type Error: Error + Send + Sync + 'static;

    /// Create a detached element node
    fn create_element_node(&mut self, tag: &str) -> Result<Self::Node, Self::Error>;

    /// Create a detached, empty text node. Its value arrives through
    /// `set_attribute` with the `nodeValue` key.
    fn create_text_node(&mut self) -> Result<Self::Node, Self::Error>;

    fn set_attribute(
        &mut self,
        node: &Self::Node,
        key: &str,
        value: &PropValue,
    ) -> Result<(), Self::Error>;

    fn remove_attribute(&mut self, node: &Self::Node, key: &str) -> Result<(), Self::Error>;

    fn add_event_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        listener: &Listener,
    ) -> Result<(), Self::Error>;

    fn remove_event_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        listener: &Listener,
    ) -> Result<(), Self::Error>;

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

    /// Insert `child` before `reference`, or at the end without one.
    ///
    /// Drivers without positional insertion may keep this default, which
    /// always appends.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> Result<(), Self::Error> {
        let _ = reference;
        self.append_child(parent, child)
    }
}

impl DomDriver for DomTree {
    type Node = NodeId;
    type Error = DomError;

    fn create_element_node(&mut self, tag: &str) -> Result<NodeId, DomError> {
        Ok(self.create_element(tag))
    }

    fn create_text_node(&mut self) -> Result<NodeId, DomError> {
        Ok(self.create_text(""))
    }

    fn set_attribute(
        &mut self,
        node: &NodeId,
        key: &str,
        value: &PropValue,
    ) -> Result<(), DomError> {
        if key == NODE_VALUE && self.text(*node).is_some() {
            return self.set_text(*node, &value.to_string());
        }
        DomTree::set_attribute(self, *node, key, &value.to_string())
    }

    fn remove_attribute(&mut self, node: &NodeId, key: &str) -> Result<(), DomError> {
        if key == NODE_VALUE && self.text(*node).is_some() {
            return self.set_text(*node, "");
        }
        DomTree::remove_attribute(self, *node, key)
    }

    fn add_event_listener(
        &mut self,
        node: &NodeId,
        event: &str,
        listener: &Listener,
    ) -> Result<(), DomError> {
        DomTree::add_event_listener(self, *node, event, listener.clone())
    }

    fn remove_event_listener(
        &mut self,
        node: &NodeId,
        event: &str,
        listener: &Listener,
    ) -> Result<(), DomError> {
        DomTree::remove_event_listener(self, *node, event, listener).map(|_| ())
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        NodeOperations::append_child(self, *parent, *child).map(|_| ())
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        NodeOperations::remove_child(self, *parent, *child).map(|_| ())
    }

    fn insert_before(
        &mut self,
        parent: &NodeId,
        child: &NodeId,
        reference: Option<&NodeId>,
    ) -> Result<(), DomError> {
        NodeOperations::insert_before(self, *parent, *child, reference.copied()).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_value_goes_through_node_value() {
        let mut dom = DomTree::new();
        let text = dom.create_text_node().unwrap();

        DomDriver::set_attribute(&mut dom, &text, NODE_VALUE, &"hi".into()).unwrap();
        assert_eq!(dom.text(text), Some("hi"));

        DomDriver::remove_attribute(&mut dom, &text, NODE_VALUE).unwrap();
        assert_eq!(dom.text(text), Some(""));
    }

    #[test]
    fn test_attribute_values_are_stringified() {
        let mut dom = DomTree::new();
        let div = dom.create_element_node("div").unwrap();

        DomDriver::set_attribute(&mut dom, &div, "tabIndex", &PropValue::Int(2)).unwrap();
        assert_eq!(dom.attribute(div, "tabIndex"), Some("2"));
    }

    #[test]
    fn test_insert_before_reference() {
        let mut dom = DomTree::new();
        let root = dom.root();
        let a = dom.create_element_node("a").unwrap();
        let b = dom.create_element_node("b").unwrap();

        DomDriver::append_child(&mut dom, &root, &b).unwrap();
        DomDriver::insert_before(&mut dom, &root, &a, Some(&b)).unwrap();
        assert_eq!(dom.child_ids(root), vec![a, b]);
    }

    #[test]
    fn test_listener_on_text_node_fails() {
        let mut dom = DomTree::new();
        let text = dom.create_text_node().unwrap();
        let listener = Listener::new(|_| {});

        let err = DomDriver::add_event_listener(&mut dom, &text, "click", &listener).unwrap_err();
        assert_eq!(err, DomError::InvalidNodeType);
    }
}
