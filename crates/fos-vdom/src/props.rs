//! Element properties
//!
//! A prop map plus the reserved `children` sequence. Keys iterate in sorted
//! order so the DOM driver sees a reproducible call sequence.

use std::collections::BTreeMap;
use std::fmt;

use fos_dom::{DomEvent, Listener};

use crate::Element;

/// Reserved key holding an element's children
pub const CHILDREN: &str = "children";

/// Value of a single prop
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Event callback; compared by identity
    Listener(Listener),
}

impl PropValue {
    /// The listener, if this value is one
    pub fn as_listener(&self) -> Option<&Listener> {
        match self {
            Self::Listener(l) => Some(l),
            _ => None,
        }
    }

    /// The string, if this value is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Listener(_) => f.write_str("[listener]"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for PropValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for PropValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for PropValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Listener> for PropValue {
    fn from(l: Listener) -> Self {
        Self::Listener(l)
    }
}

/// Props of an element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    values: BTreeMap<String, PropValue>,
    children: Vec<Element>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, key: &str, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Bind an event callback under `key` (e.g. `onClick`)
    pub fn with_listener(self, key: &str, callback: impl Fn(&mut DomEvent) + 'static) -> Self {
        self.with(key, Listener::new(callback))
    }

    /// Set a prop. The reserved `children` key is ignored; children are
    /// given to [`create_element`](crate::create_element).
    pub fn insert(&mut self, key: &str, value: impl Into<PropValue>) {
        if key == CHILDREN {
            tracing::debug!("ignoring explicit `children` prop");
            return;
        }
        self.values.insert(key.to_string(), value.into());
    }

    /// Remove a prop
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.values.remove(key)
    }

    /// Get a prop
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Props other than `children`, in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of props, not counting `children`
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Children, always present (possibly empty)
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub(crate) fn set_children(&mut self, children: Vec<Element>) {
        self.children = children;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_key_is_reserved() {
        let props = Props::new()
            .with("id", "main")
            .with(CHILDREN, "ignored");

        assert_eq!(props.len(), 1);
        assert!(!props.contains_key(CHILDREN));
        assert!(props.children().is_empty());
    }

    #[test]
    fn test_sorted_iteration() {
        let props = Props::new()
            .with("title", "t")
            .with("className", "c")
            .with("id", 3);

        let keys: Vec<_> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["className", "id", "title"]);
    }

    #[test]
    fn test_remove() {
        let mut props = Props::new().with("id", "a").with("title", "t");

        assert_eq!(props.remove("id"), Some(PropValue::from("a")));
        assert_eq!(props.remove("id"), None);
        assert_eq!(props, Props::new().with("title", "t"));
    }

    #[test]
    fn test_display() {
        assert_eq!(PropValue::from("x").to_string(), "x");
        assert_eq!(PropValue::from(42).to_string(), "42");
        assert_eq!(PropValue::from(true).to_string(), "true");
        assert_eq!(PropValue::from(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_listener_values_compare_by_identity() {
        let listener = Listener::new(|_| {});
        let a = Props::new().with("onClick", listener.clone());
        let b = Props::new().with("onClick", listener);
        let c = Props::new().with_listener("onClick", |_| {});

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.get("onClick").and_then(PropValue::as_listener).is_some());
    }
}
