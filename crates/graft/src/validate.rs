//! Validation routines for shape schemas.
//!
//! This module performs structural checks over a [`Schema`] before anything is
//! compiled or emitted: rule names are unique and well-formed, every reference
//! resolves, slot flags agree with quantifiers, and the alternative/delegation
//! graph is acyclic. Softer problems (empty alternative lists, alternatives
//! overlapping by root tag, rules nobody references) are logged as warnings.

use crate::schema::{is_token_name, Body, Quantifier, Rule, RuleKind, Schema, Target};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Represents a validation failure encountered when checking a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Two rules share a name.
    #[error("duplicate rule '{0}'")]
    DuplicateRule(String),

    /// A rule name is not an identifier, or starts with an uppercase letter,
    /// which would make references to it read as token kinds.
    #[error("invalid rule name '{0}': rule names must be identifiers starting with a lowercase letter")]
    InvalidRuleName(String),

    /// A field name is not an identifier.
    #[error("invalid field name '{field}' in rule '{rule}'")]
    InvalidFieldName {
        /// The rule.
        rule: String,
        /// The offending field name.
        field: String,
    },

    /// A root tag or matched token kind is not an identifier, so generated
    /// code could not name it in the token vocabulary.
    #[error("invalid token kind '{kind}' in rule '{rule}'")]
    InvalidTokenKind {
        /// The rule.
        rule: String,
        /// The offending kind.
        kind: String,
    },

    /// Two items of one body write the same field.
    #[error("duplicate field '{field}' in rule '{rule}'")]
    DuplicateField {
        /// The rule.
        rule: String,
        /// The repeated field name.
        field: String,
    },

    /// An alternative rule lists a name no rule has.
    #[error("undefined alternative '{name}' listed by rule '{rule}'")]
    UnknownAlternative {
        /// The alternative rule.
        rule: String,
        /// The unresolved name.
        name: String,
    },

    /// An item matches a rule that does not exist.
    #[error("undefined rule '{name}' referenced by field '{field}' of rule '{rule}'")]
    UnknownReference {
        /// The referencing rule.
        rule: String,
        /// The referencing field.
        field: String,
        /// The unresolved name.
        name: String,
    },

    /// A delegating body names a rule that does not exist.
    #[error("undefined rule '{name}' delegated to by rule '{rule}'")]
    UnknownDelegate {
        /// The delegating rule.
        rule: String,
        /// The unresolved name.
        name: String,
    },

    /// A delegating body also lists items.
    #[error("rule '{0}' delegates to another rule and cannot have items")]
    DelegateWithItems(String),

    /// More than one text-capture item in one body.
    #[error("rule '{0}' captures text more than once")]
    MultipleTextCaptures(String),

    /// A text capture with a repeating quantifier.
    #[error("text field '{field}' of rule '{rule}' cannot repeat")]
    InvalidTextQuantifier {
        /// The rule.
        rule: String,
        /// The text field.
        field: String,
    },

    /// The slot's presence/collection flags contradict the quantifier.
    #[error("field '{field}' of rule '{rule}' {reason}")]
    SlotMismatch {
        /// The rule.
        rule: String,
        /// The field.
        field: String,
        /// What disagrees.
        reason: String,
    },

    /// Alternatives and delegations loop back on themselves.
    #[error("rule cycle: {}", .path.join(" -> "))]
    Cycle {
        /// The rules on the cycle, first one repeated at the end.
        path: Vec<String>,
    },
}

/// Performs semantic validation of a [`Schema`].
///
/// This function runs several consistency passes over the schema:
///
/// - Checks rule names and their uniqueness.
/// - Checks every body: references, delegation, text captures and slot flags.
/// - Checks that every alternative is defined.
/// - Rejects cycles through alternatives and delegation.
/// - Warns about overlapping alternatives and unreferenced rules.
///
/// # Errors
///
/// Returns a [`ValidationError`] for the first violation found.
pub fn validate(schema: &Schema) -> Result<(), ValidationError> {
    let index = check_rule_names(schema)?;

    for rule in &schema.rules {
        match &rule.kind {
            RuleKind::Leaf(body) => check_body(&rule.name, body, &index)?,
            RuleKind::Alternatives(names) => check_alternatives(&rule.name, names, &index)?,
        }
    }

    check_cycles(schema, &index)?;

    // Only meaningful once the graph is known to be acyclic
    check_overlapping_alternatives(schema, &index);

    check_unreferenced_rules(schema);

    Ok(())
}

fn check_rule_names(schema: &Schema) -> Result<HashMap<&str, &Rule>, ValidationError> {
    let mut index = HashMap::with_capacity(schema.rules.len());

    for rule in &schema.rules {
        if !is_identifier(&rule.name) || is_token_name(&rule.name) {
            return Err(ValidationError::InvalidRuleName(rule.name.clone()));
        }
        if index.insert(rule.name.as_str(), rule).is_some() {
            return Err(ValidationError::DuplicateRule(rule.name.clone()));
        }
    }

    Ok(index)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Token kinds are referenced as `tokens::<KIND>` constants.
fn is_token_kind(kind: &str) -> bool {
    is_identifier(kind) && kind != "Self"
}

fn check_body(
    rule: &str,
    body: &Body,
    index: &HashMap<&str, &Rule>,
) -> Result<(), ValidationError> {
    let invalid_kind = |kind: &str| ValidationError::InvalidTokenKind {
        rule: rule.to_owned(),
        kind: kind.to_owned(),
    };

    if body.is_delegate() {
        if !index.contains_key(body.root.as_str()) {
            return Err(ValidationError::UnknownDelegate {
                rule: rule.to_owned(),
                name: body.root.clone(),
            });
        }
        if !body.items.is_empty() {
            return Err(ValidationError::DelegateWithItems(rule.to_owned()));
        }
        return Ok(());
    }
    if !is_token_kind(&body.root) {
        return Err(invalid_kind(body.root.as_str()));
    }

    let mut fields = HashSet::new();
    let mut text_captures = 0;

    for item in &body.items {
        let field = &item.slot.name;
        if !is_identifier(field) {
            return Err(ValidationError::InvalidFieldName {
                rule: rule.to_owned(),
                field: field.clone(),
            });
        }
        if !fields.insert(field.as_str()) {
            return Err(ValidationError::DuplicateField {
                rule: rule.to_owned(),
                field: field.clone(),
            });
        }

        match &item.pattern.target {
            Target::Rule(name) if !index.contains_key(name.as_str()) => {
                return Err(ValidationError::UnknownReference {
                    rule: rule.to_owned(),
                    field: field.clone(),
                    name: name.clone(),
                });
            }
            Target::Text => {
                text_captures += 1;
                if text_captures > 1 {
                    return Err(ValidationError::MultipleTextCaptures(rule.to_owned()));
                }
                if item.pattern.quantifier.is_repeated() {
                    return Err(ValidationError::InvalidTextQuantifier {
                        rule: rule.to_owned(),
                        field: field.clone(),
                    });
                }
            }
            Target::Token(kind) if !is_token_kind(kind) => {
                return Err(invalid_kind(kind.as_str()));
            }
            Target::Rule(_) | Target::Token(_) => {}
        }

        let quantifier = item.pattern.quantifier;
        let reason = if item.slot.repeated != quantifier.is_repeated() {
            Some(if item.slot.repeated {
                "is a collection but its quantifier does not repeat"
            } else {
                "is not a collection but its quantifier repeats"
            })
        } else if !item.slot.repeated
            && item.slot.optional != (quantifier == Quantifier::Optional)
        {
            Some(if item.slot.optional {
                "is optional but its quantifier is not '?'"
            } else {
                "is required but its quantifier is '?'"
            })
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(ValidationError::SlotMismatch {
                rule: rule.to_owned(),
                field: field.clone(),
                reason: reason.to_owned(),
            });
        }
    }

    Ok(())
}

fn check_alternatives(
    rule: &str,
    names: &[String],
    index: &HashMap<&str, &Rule>,
) -> Result<(), ValidationError> {
    if names.is_empty() {
        warn!("rule '{rule}' has no alternatives and will never match");
    }

    for name in names {
        if !index.contains_key(name.as_str()) {
            return Err(ValidationError::UnknownAlternative {
                rule: rule.to_owned(),
                name: name.clone(),
            });
        }
    }

    Ok(())
}

/// Rules reached through alternatives or delegation (not through items,
/// which always descend into a child).
fn successors(rule: &Rule) -> Vec<&str> {
    match &rule.kind {
        RuleKind::Alternatives(names) => names.iter().map(String::as_str).collect(),
        RuleKind::Leaf(body) if body.is_delegate() => vec![body.root.as_str()],
        RuleKind::Leaf(_) => Vec::new(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

fn check_cycles(schema: &Schema, index: &HashMap<&str, &Rule>) -> Result<(), ValidationError> {
    let mut marks = HashMap::new();
    let mut stack = Vec::new();

    for rule in &schema.rules {
        visit(&rule.name, index, &mut marks, &mut stack)?;
    }

    Ok(())
}

fn visit<'s>(
    name: &'s str,
    index: &HashMap<&'s str, &'s Rule>,
    marks: &mut HashMap<&'s str, Mark>,
    stack: &mut Vec<&'s str>,
) -> Result<(), ValidationError> {
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            let start = stack.iter().position(|n| *n == name).unwrap_or(0);
            let mut path: Vec<String> = stack[start..].iter().map(|n| (*n).to_owned()).collect();
            path.push(name.to_owned());
            return Err(ValidationError::Cycle { path });
        }
        None => {}
    }

    marks.insert(name, Mark::Visiting);
    stack.push(name);

    if let Some(&rule) = index.get(name) {
        for next in successors(rule) {
            visit(next, index, marks, stack)?;
        }
    }

    stack.pop();
    marks.insert(name, Mark::Done);
    Ok(())
}

/// Node kinds a rule's membership test can accept.
fn root_tags<'s>(name: &str, index: &HashMap<&str, &'s Rule>, tags: &mut Vec<&'s str>) {
    let Some(&rule) = index.get(name) else {
        return;
    };
    match &rule.kind {
        RuleKind::Leaf(body) if body.is_delegate() => root_tags(&body.root, index, tags),
        RuleKind::Leaf(body) => tags.push(body.root.as_str()),
        RuleKind::Alternatives(names) => {
            for alt in names {
                root_tags(alt, index, tags);
            }
        }
    }
}

fn check_overlapping_alternatives(schema: &Schema, index: &HashMap<&str, &Rule>) {
    for rule in &schema.rules {
        let mut claimed: HashMap<&str, &str> = HashMap::new();
        for alt in rule.alternative_names() {
            let mut tags = Vec::new();
            root_tags(alt, index, &mut tags);
            for tag in tags {
                if let Some(earlier) = claimed.get(tag) {
                    if *earlier != alt.as_str() {
                        warn!(
                            "rule '{}': alternatives '{earlier}' and '{alt}' both accept '{tag}'; '{earlier}' wins",
                            rule.name
                        );
                    }
                } else {
                    claimed.insert(tag, alt.as_str());
                }
            }
        }
    }
}

fn check_unreferenced_rules(schema: &Schema) {
    let mut referenced = HashSet::new();

    for rule in &schema.rules {
        match &rule.kind {
            RuleKind::Alternatives(names) => referenced.extend(names.iter().map(String::as_str)),
            RuleKind::Leaf(body) => {
                if body.is_delegate() {
                    referenced.insert(body.root.as_str());
                }
                for item in &body.items {
                    if let Target::Rule(name) = &item.pattern.target {
                        referenced.insert(name.as_str());
                    }
                }
            }
        }
    }

    // The first rule is the entry point by convention
    for rule in schema.rules.iter().skip(1) {
        if !referenced.contains(rule.name.as_str()) {
            warn!("unreferenced rule '{}'", rule.name);
        }
    }
}
