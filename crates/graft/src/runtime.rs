//! Support code shared by compiled shapes and by generated Rust sources.
//!
//! Emitted modules depend on this module (by default as `graft::runtime`) for
//! the generic [`Tree`], the [`ShapeMismatch`] error, the [`Unparse`]
//! capability and the quantifier functions in [`quantifier`].

pub mod quantifier;
pub mod tree;

pub use quantifier::{
    capture_optional_text, capture_text, expect_token, finish, non_empty, take_at_least_one,
    take_many, take_one, take_optional,
};
pub use tree::Tree;

/// The single error raised when a node fails to conform to a rule.
///
/// It is raised during parse (wrong kind, a required child absent, trailing
/// children) and during serialize (a required value absent, an empty
/// one-or-more collection, a token of the wrong kind). It is never recovered
/// internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("shape mismatch in `{rule}`: {reason}")]
pub struct ShapeMismatch {
    /// The rule whose shape was violated.
    pub rule: String,

    /// What exactly did not conform.
    pub reason: Mismatch,
}

impl ShapeMismatch {
    /// Creates a mismatch for `rule`.
    #[must_use]
    pub fn new(rule: impl Into<String>, reason: Mismatch) -> Self {
        Self {
            rule: rule.into(),
            reason,
        }
    }
}

/// The reason carried by a [`ShapeMismatch`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Mismatch {
    /// The node's kind is not the rule's root tag.
    #[error("expected a `{expected}` node, found `{found}`")]
    WrongKind {
        /// The root tag of the rule.
        expected: String,
        /// The kind of the offending node.
        found: String,
    },

    /// None of an alternative rule's alternatives accepts the node.
    #[error("no alternative accepts a `{found}` node")]
    NoAlternative {
        /// The kind of the offending node.
        found: String,
    },

    /// A required item found no acceptable child at the cursor.
    #[error("required `{field}` is missing (found {})", .found.as_deref().unwrap_or("end of children"))]
    MissingChild {
        /// The slot that could not be filled.
        field: String,
        /// The kind of the child at the cursor, if there was one.
        found: Option<String>,
    },

    /// A required text capture met a node without text.
    #[error("required text for `{field}` is missing")]
    MissingText {
        /// The text-capture slot.
        field: String,
    },

    /// Children remained after every item was processed.
    #[error("{count} trailing child(ren) starting at `{first}`")]
    TrailingChildren {
        /// How many children were left.
        count: usize,
        /// The kind of the first leftover child.
        first: String,
    },

    /// A required slot held no value at serialization time.
    #[error("required `{field}` has no value")]
    MissingValue {
        /// The empty slot.
        field: String,
    },

    /// A one-or-more slot held an empty collection at serialization time.
    #[error("`{field}` needs at least one element")]
    EmptyCollection {
        /// The empty slot.
        field: String,
    },

    /// A slot held a value of the wrong sort.
    #[error("`{field}` expects {expected}")]
    WrongValue {
        /// The offending slot.
        field: String,
        /// A description of what the slot accepts.
        expected: String,
    },

    /// A node value has a different number of fields than its rule has items.
    #[error("expected {expected} field(s), found {found}")]
    Arity {
        /// The rule's item count.
        expected: usize,
        /// The node's field count.
        found: usize,
    },

    /// A node value's field is not the one its rule has at that position.
    #[error("expected field `{expected}`, found `{found}`")]
    UnexpectedField {
        /// The rule's field at that position.
        expected: String,
        /// The node's field name.
        found: String,
    },

    /// The node names a rule that has no concrete shape.
    #[error("rule has no concrete shape to serialize")]
    NotSerializable,
}

/// The capability every generated node type provides: turning itself back
/// into a generic [`Tree`].
///
/// Generated capability traits for alternative rules use this as their
/// supertrait.
pub trait Unparse: std::fmt::Debug {
    /// Serializes this value into a generic tree.
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeMismatch`] if a required value is absent.
    fn unparse(&self) -> Result<Tree, ShapeMismatch>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_display() {
        let err = ShapeMismatch::new(
            "ifStmt",
            Mismatch::MissingChild {
                field: "thenBranch".into(),
                found: None,
            },
        );
        assert_eq!(
            err.to_string(),
            "shape mismatch in `ifStmt`: required `thenBranch` is missing (found end of children)"
        );
    }
}
