//! The generic, untyped syntax-tree node that shapes are matched against.

/// A generic tree node: a kind tag, optional literal text and ordered children.
///
/// `Tree` is what an external parser hands to `graft`, and what serializers
/// hand back. Equality is structural over the kind, the text and every child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tree {
    kind: String,
    text: Option<String>,
    children: Vec<Tree>,
}

impl Tree {
    /// Creates a childless node of the given kind with no text.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Creates a childless node carrying literal text.
    #[must_use]
    pub fn with_text(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    /// Builder-style variant of [`Tree::push`].
    #[must_use]
    pub fn child(mut self, child: Tree) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child.
    pub fn push(&mut self, child: Tree) {
        self.children.push(child);
    }

    /// Replaces the literal text.
    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    /// The node-kind tag.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The literal text, if the node carries any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The ordered children.
    #[must_use]
    pub fn children(&self) -> &[Tree] {
        &self.children
    }

    /// Returns `true` if this node's kind equals `kind`.
    #[must_use]
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

impl std::fmt::Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.kind)?;
        if let Some(text) = &self.text {
            write!(f, "{text:?}")?;
        }
        if !self.children.is_empty() {
            f.write_str("(")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{child}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested() {
        let tree = Tree::new("IF")
            .child(Tree::with_text("IDENT", "x"))
            .child(Tree::new("BLOCK"));
        assert_eq!(tree.to_string(), r#"IF(IDENT"x", BLOCK)"#);
    }

    #[test]
    fn test_structural_equality_includes_text() {
        assert_ne!(Tree::new("IDENT"), Tree::with_text("IDENT", "x"));
        assert_eq!(
            Tree::new("A").child(Tree::new("B")),
            Tree::new("A").child(Tree::new("B"))
        );
    }
}
