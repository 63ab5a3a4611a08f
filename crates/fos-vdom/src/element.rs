//! Element Model
//!
//! Immutable description of the UI: a type, props and children. Elements are
//! reference counted, so cloning one is cheap and never copies its subtree.

use std::fmt;
use std::rc::Rc;

use crate::{Component, Props, RenderError, RenderResult};

/// Tag name reserved for text elements
pub const TEXT_ELEMENT: &str = "TEXT_ELEMENT";

/// Prop holding the value of a text element
pub const NODE_VALUE: &str = "nodeValue";

/// What an element renders to
#[derive(Clone, PartialEq)]
pub enum ElementType {
    /// Host node created by the DOM driver (`div`, `span`, ...)
    Host(Rc<str>),
    /// Text node
    Text,
    /// User component, rendered into further elements
    Component(Component),
}

impl ElementType {
    /// Host tag type
    pub fn host(tag: &str) -> Self {
        Self::Host(Rc::from(tag))
    }

    /// Check that the driver can create this type
    pub fn validate(&self) -> RenderResult<()> {
        let Self::Host(tag) = self else { return Ok(()) };
        let invalid = tag.is_empty()
            || tag.as_ref() == TEXT_ELEMENT
            || tag.chars().any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '/' | '"' | '\''));
        if invalid {
            return Err(RenderError::InvalidElementType { tag: tag.to_string() });
        }
        Ok(())
    }

    /// Short name used in logs and effect records
    pub fn label(&self) -> &str {
        match self {
            Self::Host(tag) => tag,
            Self::Text => "#text",
            Self::Component(c) => c.name(),
        }
    }

    #[inline]
    pub fn is_component(&self) -> bool {
        matches!(self, Self::Component(_))
    }
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(tag) => write!(f, "Host({tag:?})"),
            Self::Text => f.write_str("Text"),
            Self::Component(c) => write!(f, "Component({})", c.name()),
        }
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        Self::host(tag)
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

impl From<&Component> for ElementType {
    fn from(component: &Component) -> Self {
        Self::Component(component.clone())
    }
}

/// Virtual element
#[derive(Clone, PartialEq)]
pub struct Element(Rc<ElementInner>);

#[derive(PartialEq)]
struct ElementInner {
    kind: ElementType,
    props: Rc<Props>,
}

impl Element {
    fn new(kind: ElementType, props: Props) -> Self {
        Self(Rc::new(ElementInner { kind, props: Rc::new(props) }))
    }

    /// Host element without props or children
    pub fn host(tag: &str) -> Self {
        Self::new(ElementType::host(tag), Props::new())
    }

    pub fn element_type(&self) -> &ElementType {
        &self.0.kind
    }

    pub fn props(&self) -> &Props {
        &self.0.props
    }

    pub(crate) fn shared_props(&self) -> Rc<Props> {
        self.0.props.clone()
    }

    pub fn children(&self) -> &[Element] {
        self.0.props.children()
    }

    /// Value of a text element
    pub fn text(&self) -> Option<&str> {
        match self.0.kind {
            ElementType::Text => self.props().get(NODE_VALUE)?.as_str(),
            _ => None,
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.text() {
            return write!(f, "{text:?}");
        }
        let mut s = f.debug_struct(self.element_type().label());
        for (key, value) in self.props().iter() {
            s.field(key, value);
        }
        if !self.children().is_empty() {
            s.field("children", &self.children());
        }
        s.finish()
    }
}

/// Create an element.
///
/// Anything convertible into an [`Element`] can be a child; strings and
/// numbers become text elements.
pub fn create_element<C: Into<Element>>(
    kind: impl Into<ElementType>,
    mut props: Props,
    children: impl IntoIterator<Item = C>,
) -> Element {
    props.set_children(children.into_iter().map(Into::into).collect());
    Element::new(kind.into(), props)
}

/// Create a text element holding `text`
pub fn create_text_element(text: impl Into<String>) -> Element {
    let text: String = text.into();
    Element::new(ElementType::Text, Props::new().with(NODE_VALUE, text))
}

impl From<&str> for Element {
    fn from(text: &str) -> Self {
        create_text_element(text)
    }
}

impl From<String> for Element {
    fn from(text: String) -> Self {
        create_text_element(text)
    }
}

impl From<&String> for Element {
    fn from(text: &String) -> Self {
        create_text_element(text.as_str())
    }
}

macro_rules! text_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Element {
                fn from(value: $ty) -> Self {
                    create_text_element(value.to_string())
                }
            }
        )*
    };
}

text_from_display!(i32, i64, u32, u64, usize, f64, bool, char);
