//! The JSON schema document, as written by hand.
//!
//! This is the front end's view of a schema: a flat, permissive structure
//! deserialized with [`facet_json`]. [`SchemaDocument::into_schema`] lowers it
//! into the tagged [`Schema`](crate::schema::Schema) model, rejecting
//! documents that cannot be expressed there.

use facet::Facet;

use super::{Body, Item, Match, Quantifier, Rule, Schema, SchemaError, Slot, Target};

/// The default module path generated code uses for runtime support.
pub const DEFAULT_RUNTIME: &str = "graft::runtime";

/// A whole schema document.
#[derive(Debug, Clone, Facet)]
pub struct SchemaDocument {
    /// Package path segments the generated units live under.
    pub package: Vec<String>,

    /// Path segments of the module holding the token-kind constants.
    pub token_vocab: Vec<String>,

    /// Module path of the runtime support, if not [`DEFAULT_RUNTIME`].
    #[facet(default)]
    pub runtime: Option<String>,

    /// Rules in declaration order.
    pub rules: Vec<RuleDocument>,
}

/// One rule entry. Exactly one of `alternatives` or `root` must be given.
#[derive(Debug, Clone, Facet)]
pub struct RuleDocument {
    /// The rule's name.
    pub name: String,

    /// Root tag of a leaf rule (uppercase kind, or lowercase delegate).
    #[facet(default)]
    pub root: Option<String>,

    /// Items of a leaf rule.
    #[facet(default)]
    pub items: Vec<ItemDocument>,

    /// Alternatives of an alternative rule.
    #[facet(default)]
    pub alternatives: Option<Vec<String>>,
}

/// One item of a leaf rule's body.
#[derive(Debug, Clone, Facet)]
pub struct ItemDocument {
    /// Destination field name.
    pub field: String,

    /// Whether the field may be absent.
    #[facet(default)]
    pub optional: bool,

    /// Whether the field is a collection.
    #[facet(default)]
    pub repeated: bool,

    /// The rule or token kind to match.
    #[facet(rename = "match")]
    #[facet(default)]
    pub target: Option<String>,

    /// Capture the matched node's own text instead of a child.
    #[facet(default)]
    pub text: bool,

    /// Repetition policy, `"1"` when omitted.
    #[facet(default)]
    pub quantifier: Option<QuantifierSymbol>,
}

/// The quantifier as spelled in a document.
#[derive(Debug, Clone, Copy, Facet)]
#[repr(u8)]
pub enum QuantifierSymbol {
    /// Exactly one.
    #[facet(rename = "1")]
    One,
    /// Zero or one.
    #[facet(rename = "?")]
    Optional,
    /// Zero or more.
    #[facet(rename = "*")]
    ZeroOrMore,
    /// One or more.
    #[facet(rename = "+")]
    OneOrMore,
}

impl From<QuantifierSymbol> for Quantifier {
    fn from(symbol: QuantifierSymbol) -> Self {
        match symbol {
            QuantifierSymbol::One => Quantifier::One,
            QuantifierSymbol::Optional => Quantifier::Optional,
            QuantifierSymbol::ZeroOrMore => Quantifier::ZeroOrMore,
            QuantifierSymbol::OneOrMore => Quantifier::OneOrMore,
        }
    }
}

impl SchemaDocument {
    /// Lowers the document into the tagged schema model.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Malformed`] when a rule mixes `alternatives`
    /// with `root`/`items`, has neither, or an item names both a text capture
    /// and a match (or neither).
    pub fn into_schema(self) -> Result<Schema, SchemaError> {
        let rules = self
            .rules
            .into_iter()
            .map(RuleDocument::into_rule)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Schema {
            package: self.package,
            token_vocab: self.token_vocab,
            runtime: self.runtime.unwrap_or_else(|| DEFAULT_RUNTIME.to_owned()),
            rules,
        })
    }
}

impl RuleDocument {
    fn into_rule(self) -> Result<Rule, SchemaError> {
        let name = self.name;
        match (self.alternatives, self.root) {
            (Some(alternatives), None) if self.items.is_empty() => {
                Ok(Rule::alternatives(name, alternatives))
            }
            (Some(_), _) => Err(malformed(
                &name,
                "`alternatives` cannot be combined with `root` or `items`",
            )),
            (None, Some(root)) => {
                let items = self
                    .items
                    .into_iter()
                    .map(|item| item.into_item(&name))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Rule::leaf(name, Body { root, items }))
            }
            (None, None) => Err(malformed(&name, "rule needs `root` or `alternatives`")),
        }
    }
}

impl ItemDocument {
    fn into_item(self, rule: &str) -> Result<Item, SchemaError> {
        let target = match (self.text, self.target) {
            (true, None) => Target::Text,
            (false, Some(name)) => Target::named(name),
            (true, Some(_)) => {
                return Err(malformed(
                    rule,
                    format!("item `{}` has both `text` and `match`", self.field),
                ))
            }
            (false, None) => {
                return Err(malformed(
                    rule,
                    format!("item `{}` needs `text` or `match`", self.field),
                ))
            }
        };

        Ok(Item {
            slot: Slot {
                name: self.field,
                optional: self.optional,
                repeated: self.repeated,
            },
            pattern: Match {
                target,
                quantifier: self.quantifier.map_or(Quantifier::One, Quantifier::from),
            },
        })
    }
}

fn malformed(rule: &str, message: impl Into<String>) -> SchemaError {
    SchemaError::Malformed {
        rule: rule.to_owned(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RuleKind;

    #[test]
    fn test_document_defaults() {
        let json = r#"{
            "package": ["demo"],
            "token_vocab": ["tokens"],
            "rules": [
                {"name": "ident", "root": "IDENT", "items": [{"field": "name", "text": true}]}
            ]
        }"#;

        let doc: SchemaDocument = facet_json::from_str(json).unwrap();
        let schema = doc.into_schema().unwrap();
        assert_eq!(schema.runtime, DEFAULT_RUNTIME);

        let RuleKind::Leaf(body) = &schema.rules[0].kind else {
            panic!("expected a leaf rule");
        };
        assert_eq!(body.items[0].pattern.target, Target::Text);
        assert_eq!(body.items[0].pattern.quantifier, Quantifier::One);
    }

    #[test]
    fn test_quantifier_symbols() {
        let json = r#"{
            "field": "args",
            "repeated": true,
            "match": "expr",
            "quantifier": "*"
        }"#;

        let item: ItemDocument = facet_json::from_str(json).unwrap();
        let item = item.into_item("call").unwrap();
        assert_eq!(item.pattern.quantifier, Quantifier::ZeroOrMore);
        assert_eq!(item.pattern.target, Target::Rule("expr".into()));
    }

    #[test]
    fn test_mixed_rule_is_malformed() {
        let json = r#"{"name": "stmt", "root": "STMT", "alternatives": ["a"]}"#;
        let rule: RuleDocument = facet_json::from_str(json).unwrap();
        assert!(matches!(
            rule.into_rule(),
            Err(SchemaError::Malformed { .. })
        ));
    }
}
