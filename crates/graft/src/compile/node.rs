//! Dynamic node values produced by compiled shapes.
//!
//! A [`Node`] is what a generated struct would be, minus the static types:
//! the concrete rule it was parsed as, and one [`Field`] per body item, in
//! declaration order.

use crate::runtime::Tree;

/// Field name of the single value a delegating rule wraps.
pub const INNER_FIELD: &str = "inner";

/// A typed node value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// The concrete (leaf) rule this node conforms to.
    pub rule: String,

    /// One field per item of the rule's body.
    pub fields: Vec<Field>,
}

impl Node {
    /// Creates a node.
    #[must_use]
    pub fn new(rule: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            rule: rule.into(),
            fields,
        }
    }

    /// Looks a field's value up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }
}

/// A named field of a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// The slot name.
    pub name: String,

    /// The slot's content.
    pub value: FieldValue,
}

impl Field {
    /// Creates a field.
    #[must_use]
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// The content of a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Nothing: an absent optional value (or an unset required one).
    Empty,

    /// A single value.
    One(Element),

    /// An ordered collection.
    Many(Vec<Element>),
}

impl FieldValue {
    /// Returns `true` for [`FieldValue::Empty`] and empty collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::One(_) => false,
            FieldValue::Many(elements) => elements.is_empty(),
        }
    }

    /// The single value, if this is one.
    #[must_use]
    pub fn as_one(&self) -> Option<&Element> {
        match self {
            FieldValue::One(element) => Some(element),
            FieldValue::Empty | FieldValue::Many(_) => None,
        }
    }

    /// The collection's elements (empty unless this is a collection).
    #[must_use]
    pub fn as_many(&self) -> &[Element] {
        match self {
            FieldValue::Many(elements) => elements,
            FieldValue::Empty | FieldValue::One(_) => &[],
        }
    }
}

impl From<Option<Element>> for FieldValue {
    fn from(element: Option<Element>) -> Self {
        element.map_or(FieldValue::Empty, FieldValue::One)
    }
}

impl From<Element> for FieldValue {
    fn from(element: Element) -> Self {
        FieldValue::One(element)
    }
}

impl From<Vec<Element>> for FieldValue {
    fn from(elements: Vec<Element>) -> Self {
        FieldValue::Many(elements)
    }
}

/// One captured value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// A sub-node parsed by a rule match.
    Node(Node),

    /// A child matched by token kind, kept as is.
    Token(Tree),

    /// The matched node's literal text.
    Text(String),
}

impl Element {
    /// The sub-node, if this is one.
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Element::Node(node) => Some(node),
            Element::Token(_) | Element::Text(_) => None,
        }
    }

    /// The token tree, if this is one.
    #[must_use]
    pub fn as_token(&self) -> Option<&Tree> {
        match self {
            Element::Token(tree) => Some(tree),
            Element::Node(_) | Element::Text(_) => None,
        }
    }

    /// The text, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Element::Text(text) => Some(text),
            Element::Node(_) | Element::Token(_) => None,
        }
    }
}

impl From<Node> for Element {
    fn from(node: Node) -> Self {
        Element::Node(node)
    }
}

impl From<Tree> for Element {
    fn from(tree: Tree) -> Self {
        Element::Token(tree)
    }
}
