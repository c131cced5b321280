//! The schema model: a hierarchy of node shapes.
//!
//! A [`Schema`] is an ordered list of [`Rule`]s. Each rule is either a leaf,
//! whose [`Body`] is an exact ordered grammar for the children of a generic
//! tree node, or a set of alternatives that may stand in for it. The model is
//! built once (usually from a JSON [`document`]) and never mutated afterwards.

pub mod document;

use crate::validate::ValidationError;

/// A complete shape schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Package path segments that generated units are scoped under.
    pub package: Vec<String>,

    /// Path segments of the module holding token-kind constants.
    pub token_vocab: Vec<String>,

    /// Module path generated code uses for runtime support.
    pub runtime: String,

    /// Rules in declaration order. Names are unique.
    pub rules: Vec<Rule>,
}

impl Schema {
    /// Looks a rule up by name.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }
}

/// A named shape description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// The rule's name; always lowercase-leading.
    pub name: String,

    /// Whether this is a leaf or an alternative rule.
    pub kind: RuleKind,
}

impl Rule {
    /// Creates a leaf rule.
    #[must_use]
    pub fn leaf(name: impl Into<String>, body: Body) -> Self {
        Self {
            name: name.into(),
            kind: RuleKind::Leaf(body),
        }
    }

    /// Creates an alternative rule.
    #[must_use]
    pub fn alternatives<S: Into<String>>(
        name: impl Into<String>,
        alternatives: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: RuleKind::Alternatives(alternatives.into_iter().map(Into::into).collect()),
        }
    }

    /// The body of a leaf rule.
    #[must_use]
    pub fn body(&self) -> Option<&Body> {
        match &self.kind {
            RuleKind::Leaf(body) => Some(body),
            RuleKind::Alternatives(_) => None,
        }
    }

    /// The alternatives of an alternative rule (empty for leaves).
    #[must_use]
    pub fn alternative_names(&self) -> &[String] {
        match &self.kind {
            RuleKind::Leaf(_) => &[],
            RuleKind::Alternatives(names) => names,
        }
    }
}

/// The two sorts of rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// A concrete shape.
    Leaf(Body),

    /// Rules that may stand in for this one, in dispatch order.
    Alternatives(Vec<String>),
}

/// A leaf rule's grammar: a root tag and the items matched against the
/// node's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    /// The kind a conforming node carries, or the rule it delegates to.
    pub root: String,

    /// Ordered items; together an exact grammar for the node's children.
    pub items: Vec<Item>,
}

impl Body {
    /// Creates a body from a root tag and items.
    #[must_use]
    pub fn new(root: impl Into<String>, items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            root: root.into(),
            items: items.into_iter().collect(),
        }
    }

    /// A lowercase-leading root names a rule to delegate to, not a node kind.
    #[must_use]
    pub fn is_delegate(&self) -> bool {
        !is_token_name(&self.root)
    }
}

/// A grammar position: where a value goes and what it is matched by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// The destination field.
    pub slot: Slot,

    /// What is matched, and how often.
    pub pattern: Match,
}

impl Item {
    /// Creates an item whose slot flags follow from the quantifier.
    #[must_use]
    pub fn new(field: impl Into<String>, target: Target, quantifier: Quantifier) -> Self {
        Self {
            slot: Slot {
                name: field.into(),
                optional: quantifier == Quantifier::Optional,
                repeated: quantifier.is_repeated(),
            },
            pattern: Match { target, quantifier },
        }
    }

    /// Creates a required text-capture item.
    #[must_use]
    pub fn text(field: impl Into<String>) -> Self {
        Self::new(field, Target::Text, Quantifier::One)
    }
}

/// The destination field of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Field name, unique within its body.
    pub name: String,

    /// The field may be absent.
    pub optional: bool,

    /// The field is an ordered collection.
    pub repeated: bool,
}

/// What an item matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The thing matched.
    pub target: Target,

    /// The repetition policy.
    pub quantifier: Quantifier,
}

/// The thing an item matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A child conforming to the named rule.
    Rule(String),

    /// A child whose kind equals the named token kind.
    Token(String),

    /// The literal text of the node being matched; consumes no child.
    Text,
}

impl Target {
    /// Classifies a reference by its leading character: uppercase names are
    /// token kinds, everything else is a rule.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        if is_token_name(&name) {
            Target::Token(name)
        } else {
            Target::Rule(name)
        }
    }
}

/// Repetition policy for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    /// Exactly one.
    One,
    /// Zero or one.
    Optional,
    /// Zero or more.
    ZeroOrMore,
    /// One or more.
    OneOrMore,
}

impl Quantifier {
    /// Returns `true` for the collection quantifiers.
    #[must_use]
    pub fn is_repeated(self) -> bool {
        matches!(self, Quantifier::ZeroOrMore | Quantifier::OneOrMore)
    }
}

/// Returns `true` if `name` starts with an uppercase letter.
#[must_use]
pub fn is_token_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Parse a JSON schema document into a [`Schema`].
///
/// The result is not validated; [`Shapes::compile`](crate::Shapes::compile)
/// validates before compiling.
///
/// # Errors
///
/// Returns [`SchemaError::JsonParse`] if the text is not a valid schema
/// document, or [`SchemaError::Malformed`] if a rule cannot be expressed in
/// the model.
pub fn parse_schema(json: &str) -> Result<Schema, SchemaError> {
    let doc: document::SchemaDocument =
        facet_json::from_str(json).map_err(|e| SchemaError::JsonParse(e.to_string()))?;
    doc.into_schema()
}

/// Possible errors raised while reading or validating a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The input JSON was syntactically invalid or structurally mismatched.
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// A rule entry cannot be mapped onto the schema model.
    #[error("malformed rule `{rule}`: {message}")]
    Malformed {
        /// The offending rule.
        rule: String,
        /// What is wrong with it.
        message: String,
    },

    /// Higher-level structural or semantic validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}
