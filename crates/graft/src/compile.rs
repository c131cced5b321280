//! The pattern compiler.
//!
//! [`Shapes::compile`] validates a [`Schema`], resolves its ancestor map and
//! lowers every rule into a plan with references resolved to rule indices.
//! The plans are directly executable: each [`Shape`] offers the four
//! artifacts (membership test, parse, construct and serialize) over dynamic
//! [`Node`] values, using the same quantifier engine the emitted code calls.
//! The [`emit`](crate::emit) module renders the very same plans as Rust.

pub mod node;

pub use node::{Element, Field, FieldValue, Node, INNER_FIELD};

use crate::interfaces::Ancestors;
use crate::runtime::{
    capture_optional_text, capture_text, expect_token, finish, non_empty, take_at_least_one,
    take_many, take_one, take_optional, Mismatch, ShapeMismatch, Tree,
};
use crate::schema::{Quantifier, Rule, RuleKind, Schema, SchemaError, Target};
use crate::validate::{validate, ValidationError};
use std::collections::HashMap;
use tracing::{debug, info};

/// A compiled schema: one executable plan per rule plus the ancestor map.
#[derive(Debug, Clone)]
pub struct Shapes {
    schema: Schema,
    ancestors: Ancestors,
    index: HashMap<String, usize>,
    plans: Vec<Plan>,
}

/// How a rule matches.
#[derive(Debug, Clone)]
pub(crate) enum Plan {
    /// A concrete root tag and an exact item grammar for the children.
    Shape { root: String, steps: Vec<Step> },
    /// Delegates entirely to another rule and wraps its value.
    Delegate(usize),
    /// Dispatches to the first alternative whose test holds.
    Choice(Vec<usize>),
}

/// One item of a compiled body.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    /// Captures the matched node's own text.
    Text { field: String, optional: bool },
    /// Consumes children.
    Child {
        field: String,
        accept: Accept,
        quantifier: Quantifier,
    },
}

impl Step {
    pub(crate) fn field(&self) -> &str {
        match self {
            Step::Text { field, .. } | Step::Child { field, .. } => field,
        }
    }

    fn is_repeated(&self) -> bool {
        match self {
            Step::Text { .. } => false,
            Step::Child { quantifier, .. } => quantifier.is_repeated(),
        }
    }
}

/// The shallow test a child must pass to be consumed.
#[derive(Debug, Clone)]
pub(crate) enum Accept {
    Token(String),
    Rule(usize),
}

/// Errors raised by [`Shape::construct`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructError {
    /// Alternative rules describe a capability, not a value.
    #[error("rule '{0}' has alternatives and cannot be constructed directly")]
    NotConstructible(String),

    /// The number of values differs from the number of slots.
    #[error("rule '{rule}' takes {expected} value(s), got {found}")]
    Arity {
        /// The rule.
        rule: String,
        /// Its slot count.
        expected: usize,
        /// The number of values supplied.
        found: usize,
    },
}

impl Shapes {
    /// Validates `schema` and compiles every rule.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Validation`] if the schema is malformed.
    pub fn compile(schema: Schema) -> Result<Self, SchemaError> {
        validate(&schema)?;
        let ancestors = Ancestors::resolve(&schema.rules)?;

        let index: HashMap<String, usize> = schema
            .rules
            .iter()
            .enumerate()
            .map(|(id, rule)| (rule.name.clone(), id))
            .collect();

        let plans = schema
            .rules
            .iter()
            .map(|rule| {
                let plan = lower(rule, &index)?;
                debug!("compiled rule '{}'", rule.name);
                Ok(plan)
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        info!(
            "compiled {} rule(s) for package '{}'",
            plans.len(),
            schema.package.join(".")
        );

        Ok(Self {
            schema,
            ancestors,
            index,
            plans,
        })
    }

    /// The schema these shapes were compiled from.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The ancestor map.
    #[must_use]
    pub fn ancestors(&self) -> &Ancestors {
        &self.ancestors
    }

    /// The compiled shape of the rule called `name`.
    #[must_use]
    pub fn shape(&self, name: &str) -> Option<Shape<'_>> {
        self.index
            .get(name)
            .map(|&id| Shape { shapes: self, id })
    }

    /// Every compiled shape, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Shape<'_>> {
        (0..self.plans.len()).map(move |id| Shape { shapes: self, id })
    }

    /// Whether a `rule` value may stand where `capability` is expected.
    #[must_use]
    pub fn implements(&self, rule: &str, capability: &str) -> bool {
        self.ancestors.implements(rule, capability)
    }

    /// Serializes a node back into a generic tree, the inverse of
    /// [`Shape::parse`].
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeMismatch`] if the node's rule is unknown or an
    /// alternative rule, if its fields differ in number or name from the
    /// rule's slots, if a required value is absent or a one-or-more
    /// collection is empty, or if a value does not fit its slot.
    pub fn serialize(&self, node: &Node) -> Result<Tree, ShapeMismatch> {
        let rule = node.rule.as_str();
        let not_serializable = || ShapeMismatch::new(rule, Mismatch::NotSerializable);
        let id = *self.index.get(rule).ok_or_else(not_serializable)?;

        match &self.plans[id] {
            Plan::Choice(_) => Err(not_serializable()),
            Plan::Delegate(target) => {
                check_arity(rule, 1, node)?;
                check_field(rule, INNER_FIELD, &node.fields[0])?;
                match &node.fields[0].value {
                    FieldValue::One(element) => {
                        self.serialize_element(rule, INNER_FIELD, &Accept::Rule(*target), element)
                    }
                    FieldValue::Empty | FieldValue::Many(_) => {
                        Err(missing_value(rule, INNER_FIELD))
                    }
                }
            }
            Plan::Shape { root, steps } => {
                check_arity(rule, steps.len(), node)?;
                let mut tree = Tree::new(root.as_str());
                for (step, field) in steps.iter().zip(&node.fields) {
                    check_field(rule, step.field(), field)?;
                    self.serialize_step(rule, step, &field.value, &mut tree)?;
                }
                Ok(tree)
            }
        }
    }

    fn serialize_step(
        &self,
        rule: &str,
        step: &Step,
        value: &FieldValue,
        tree: &mut Tree,
    ) -> Result<(), ShapeMismatch> {
        match step {
            Step::Text { field, optional } => match value {
                FieldValue::One(Element::Text(text)) => tree.set_text(Some(text.clone())),
                FieldValue::Empty if *optional => {}
                FieldValue::Empty => return Err(missing_value(rule, field)),
                FieldValue::One(_) | FieldValue::Many(_) => {
                    return Err(wrong_value(rule, field, "text"));
                }
            },
            Step::Child {
                field,
                accept,
                quantifier,
            } => {
                let elements: &[Element] = match (value, quantifier) {
                    (FieldValue::Empty, Quantifier::One) => return Err(missing_value(rule, field)),
                    (FieldValue::Empty, Quantifier::OneOrMore) => {
                        return Err(ShapeMismatch::new(
                            rule,
                            Mismatch::EmptyCollection {
                                field: field.clone(),
                            },
                        ));
                    }
                    (FieldValue::Empty, Quantifier::Optional | Quantifier::ZeroOrMore) => &[],
                    (FieldValue::One(element), Quantifier::One | Quantifier::Optional) => {
                        std::slice::from_ref(element)
                    }
                    (FieldValue::Many(elements), Quantifier::ZeroOrMore) => elements,
                    (FieldValue::Many(elements), Quantifier::OneOrMore) => {
                        non_empty(rule, field, elements.as_slice())?
                    }
                    (FieldValue::One(_), _) => {
                        return Err(wrong_value(rule, field, "a collection"));
                    }
                    (FieldValue::Many(_), _) => {
                        return Err(wrong_value(rule, field, "a single value"));
                    }
                };
                for element in elements {
                    tree.push(self.serialize_element(rule, field, accept, element)?);
                }
            }
        }
        Ok(())
    }

    fn serialize_element(
        &self,
        rule: &str,
        field: &str,
        accept: &Accept,
        element: &Element,
    ) -> Result<Tree, ShapeMismatch> {
        match (accept, element) {
            (Accept::Token(kind), Element::Token(token)) => expect_token(rule, field, kind, token),
            (Accept::Rule(id), Element::Node(node))
                if self.implements(&node.rule, &self.schema.rules[*id].name) =>
            {
                self.serialize(node)
            }
            (Accept::Token(kind), _) => Err(wrong_value(rule, field, &format!("a `{kind}` token"))),
            (Accept::Rule(id), _) => Err(wrong_value(
                rule,
                field,
                &format!("a `{}` node", self.schema.rules[*id].name),
            )),
        }
    }

    fn can_parse(&self, id: usize, tree: &Tree) -> bool {
        match &self.plans[id] {
            Plan::Shape { root, .. } => tree.is(root),
            Plan::Delegate(target) => self.can_parse(*target, tree),
            Plan::Choice(alternatives) => alternatives.iter().any(|&alt| self.can_parse(alt, tree)),
        }
    }

    fn accepts(&self, accept: &Accept, child: &Tree) -> bool {
        match accept {
            Accept::Token(kind) => child.is(kind),
            Accept::Rule(id) => self.can_parse(*id, child),
        }
    }

    fn element(&self, accept: &Accept, child: &Tree) -> Result<Element, ShapeMismatch> {
        match accept {
            Accept::Token(_) => Ok(Element::Token(child.clone())),
            Accept::Rule(id) => self.parse(*id, child).map(Element::Node),
        }
    }

    fn parse(&self, id: usize, tree: &Tree) -> Result<Node, ShapeMismatch> {
        let rule = self.schema.rules[id].name.as_str();

        match &self.plans[id] {
            Plan::Shape { root, steps } => {
                if !tree.is(root) {
                    return Err(ShapeMismatch::new(
                        rule,
                        Mismatch::WrongKind {
                            expected: root.clone(),
                            found: tree.kind().to_owned(),
                        },
                    ));
                }

                let (fields, rest) = steps.iter().try_fold(
                    (Vec::with_capacity(steps.len()), tree.children()),
                    |(mut fields, rest), step| {
                        let (value, rest) = self.take(rule, step, tree, rest)?;
                        fields.push(Field::new(step.field(), value));
                        Ok::<_, ShapeMismatch>((fields, rest))
                    },
                )?;
                finish(rule, rest)?;

                Ok(Node::new(rule, fields))
            }
            Plan::Delegate(target) => {
                let inner = self.parse(*target, tree)?;
                Ok(Node::new(
                    rule,
                    vec![Field::new(INNER_FIELD, Element::Node(inner).into())],
                ))
            }
            Plan::Choice(alternatives) => match alternatives
                .iter()
                .find(|&&alt| self.can_parse(alt, tree))
            {
                Some(&alt) => self.parse(alt, tree),
                None => Err(ShapeMismatch::new(
                    rule,
                    Mismatch::NoAlternative {
                        found: tree.kind().to_owned(),
                    },
                )),
            },
        }
    }

    /// One step of the fold: consume what `step` matches from `rest`.
    fn take<'t>(
        &self,
        rule: &str,
        step: &Step,
        tree: &'t Tree,
        rest: &'t [Tree],
    ) -> Result<(FieldValue, &'t [Tree]), ShapeMismatch> {
        let (field, accept, quantifier) = match step {
            Step::Text {
                optional: true, ..
            } => {
                return Ok((capture_optional_text(tree).map(Element::Text).into(), rest));
            }
            Step::Text { field, .. } => {
                let text = capture_text(rule, field, tree)?;
                return Ok((Element::Text(text).into(), rest));
            }
            Step::Child {
                field,
                accept,
                quantifier,
            } => (field.as_str(), accept, *quantifier),
        };

        let accepts = |child: &Tree| self.accepts(accept, child);
        let consume = |child: &Tree| self.element(accept, child);

        match quantifier {
            Quantifier::One => take_one(rule, field, rest, accepts, consume)
                .map(|(element, rest)| (element.into(), rest)),
            Quantifier::Optional => take_optional(rest, accepts, consume)
                .map(|(element, rest)| (element.into(), rest)),
            Quantifier::ZeroOrMore => take_many(rest, accepts, consume)
                .map(|(elements, rest)| (elements.into(), rest)),
            Quantifier::OneOrMore => take_at_least_one(rule, field, rest, accepts, consume)
                .map(|(elements, rest)| (elements.into(), rest)),
        }
    }

    pub(crate) fn plan(&self, id: usize) -> &Plan {
        &self.plans[id]
    }

    pub(crate) fn rule(&self, id: usize) -> &Rule {
        &self.schema.rules[id]
    }
}

/// A handle on one compiled rule.
#[derive(Debug, Clone, Copy)]
pub struct Shape<'a> {
    shapes: &'a Shapes,
    id: usize,
}

impl<'a> Shape<'a> {
    /// The rule's name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.shapes.schema.rules[self.id].name
    }

    /// The rule's position in the schema.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Whether this is an alternative rule (a capability, not a value).
    #[must_use]
    pub fn is_alternative(&self) -> bool {
        matches!(self.shapes.plans[self.id], Plan::Choice(_))
    }

    /// The field names [`Shape::construct`] expects values for, in order.
    #[must_use]
    pub fn fields(&self) -> Vec<&'a str> {
        match &self.shapes.plans[self.id] {
            Plan::Shape { steps, .. } => steps.iter().map(Step::field).collect(),
            Plan::Delegate(_) => vec![INNER_FIELD],
            Plan::Choice(_) => Vec::new(),
        }
    }

    /// The membership test: does `tree` carry this rule's root tag (through
    /// delegation and alternatives, earliest-declared first)?
    ///
    /// This is a shallow test; children are only examined by [`Shape::parse`].
    #[must_use]
    pub fn can_parse(&self, tree: &Tree) -> bool {
        self.shapes.can_parse(self.id, tree)
    }

    /// Deep conformance: the tree passes the membership test and parses.
    #[must_use]
    pub fn conforms(&self, tree: &Tree) -> bool {
        self.parse(tree).is_ok()
    }

    /// Parses `tree` into a node.
    ///
    /// For an alternative rule, the node returned is that of the first
    /// alternative whose membership test accepts `tree`.
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeMismatch`] if the membership test fails or the
    /// children do not match the body exactly.
    pub fn parse(&self, tree: &Tree) -> Result<Node, ShapeMismatch> {
        self.shapes.parse(self.id, tree)
    }

    /// Builds a node from one value per slot, without checking the grammar.
    ///
    /// Repeated slots given [`FieldValue::Empty`] become empty collections.
    /// Values that break the grammar are only reported when serialized.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::NotConstructible`] for alternative rules and
    /// [`ConstructError::Arity`] if the number of values is wrong.
    pub fn construct(&self, values: Vec<FieldValue>) -> Result<Node, ConstructError> {
        let rule = self.name();
        let arity = |expected: usize| ConstructError::Arity {
            rule: rule.to_owned(),
            expected,
            found: values.len(),
        };

        let fields = match &self.shapes.plans[self.id] {
            Plan::Choice(_) => return Err(ConstructError::NotConstructible(rule.to_owned())),
            Plan::Delegate(_) if values.len() != 1 => return Err(arity(1)),
            Plan::Shape { steps, .. } if values.len() != steps.len() => {
                return Err(arity(steps.len()))
            }
            Plan::Delegate(_) => values
                .into_iter()
                .map(|value| Field::new(INNER_FIELD, value))
                .collect(),
            Plan::Shape { steps, .. } => steps
                .iter()
                .zip(values)
                .map(|(step, value)| {
                    let value = match value {
                        FieldValue::Empty if step.is_repeated() => FieldValue::Many(Vec::new()),
                        value => value,
                    };
                    Field::new(step.field(), value)
                })
                .collect(),
        };

        Ok(Node::new(rule, fields))
    }

    /// The alternative rules that list this one directly.
    #[must_use]
    pub fn ancestors(&self) -> &'a [String] {
        self.shapes.ancestors.direct(self.name())
    }
}

fn lower(rule: &Rule, index: &HashMap<String, usize>) -> Result<Plan, ValidationError> {
    let resolve = |name: &str, field: &str| {
        index
            .get(name)
            .copied()
            .ok_or_else(|| ValidationError::UnknownReference {
                rule: rule.name.clone(),
                field: field.to_owned(),
                name: name.to_owned(),
            })
    };

    match &rule.kind {
        RuleKind::Alternatives(names) => names
            .iter()
            .map(|name| {
                index
                    .get(name)
                    .copied()
                    .ok_or_else(|| ValidationError::UnknownAlternative {
                        rule: rule.name.clone(),
                        name: name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Plan::Choice),
        RuleKind::Leaf(body) if body.is_delegate() => {
            resolve(&body.root, INNER_FIELD).map(Plan::Delegate)
        }
        RuleKind::Leaf(body) => {
            let steps = body
                .items
                .iter()
                .map(|item| -> Result<Step, ValidationError> {
                    let field = item.slot.name.clone();
                    let quantifier = item.pattern.quantifier;
                    let accept = match &item.pattern.target {
                        Target::Text => {
                            return Ok(Step::Text {
                                field,
                                optional: quantifier == Quantifier::Optional,
                            })
                        }
                        Target::Token(kind) => Accept::Token(kind.clone()),
                        Target::Rule(name) => Accept::Rule(resolve(name, &field)?),
                    };
                    Ok(Step::Child {
                        field,
                        accept,
                        quantifier,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Plan::Shape {
                root: body.root.clone(),
                steps,
            })
        }
    }
}

fn check_arity(rule: &str, expected: usize, node: &Node) -> Result<(), ShapeMismatch> {
    if node.fields.len() == expected {
        return Ok(());
    }
    Err(ShapeMismatch::new(
        rule,
        Mismatch::Arity {
            expected,
            found: node.fields.len(),
        },
    ))
}

/// Fields are positional, but must still carry the name of their slot.
fn check_field(rule: &str, expected: &str, field: &Field) -> Result<(), ShapeMismatch> {
    if field.name == expected {
        return Ok(());
    }
    Err(ShapeMismatch::new(
        rule,
        Mismatch::UnexpectedField {
            expected: expected.to_owned(),
            found: field.name.clone(),
        },
    ))
}

fn missing_value(rule: &str, field: &str) -> ShapeMismatch {
    ShapeMismatch::new(
        rule,
        Mismatch::MissingValue {
            field: field.to_owned(),
        },
    )
}

fn wrong_value(rule: &str, field: &str, expected: &str) -> ShapeMismatch {
    ShapeMismatch::new(
        rule,
        Mismatch::WrongValue {
            field: field.to_owned(),
            expected: expected.to_owned(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Body, Item};

    fn shapes(rules: Vec<Rule>) -> Shapes {
        Shapes::compile(Schema {
            package: vec!["demo".into()],
            token_vocab: vec!["tokens".into()],
            runtime: "graft::runtime".into(),
            rules,
        })
        .unwrap()
    }

    fn call_shapes() -> Shapes {
        shapes(vec![
            Rule::leaf(
                "call",
                Body::new(
                    "CALL",
                    [
                        Item::text("callee"),
                        Item::new("args", Target::named("ARG"), Quantifier::ZeroOrMore),
                        Item::new("block", Target::named("BLOCK"), Quantifier::Optional),
                    ],
                ),
            ),
            Rule::leaf("paren", Body::new("call", [])),
        ])
    }

    #[test]
    fn test_text_capture_does_not_consume() {
        let shapes = call_shapes();
        let tree = Tree::with_text("CALL", "f")
            .child(Tree::new("ARG"))
            .child(Tree::new("ARG"));
        let node = shapes.shape("call").unwrap().parse(&tree).unwrap();

        assert_eq!(
            node.get("callee").and_then(FieldValue::as_one),
            Some(&Element::Text("f".into()))
        );
        assert_eq!(node.get("args").unwrap().as_many().len(), 2);
        assert_eq!(node.get("block"), Some(&FieldValue::Empty));
        assert_eq!(shapes.serialize(&node).unwrap(), tree);
    }

    #[test]
    fn test_trailing_children_rejected() {
        let shapes = call_shapes();
        let tree = Tree::with_text("CALL", "f")
            .child(Tree::new("BLOCK"))
            .child(Tree::new("ARG"));
        let err = shapes.shape("call").unwrap().parse(&tree).unwrap_err();
        assert_eq!(
            err.reason,
            Mismatch::TrailingChildren {
                count: 1,
                first: "ARG".into()
            }
        );
    }

    #[test]
    fn test_delegate_wraps_inner() {
        let shapes = call_shapes();
        let paren = shapes.shape("paren").unwrap();
        let tree = Tree::with_text("CALL", "g");

        assert!(paren.can_parse(&tree));
        let node = paren.parse(&tree).unwrap();
        assert_eq!(node.rule, "paren");
        assert_eq!(paren.fields(), [INNER_FIELD]);
        let inner = node.get(INNER_FIELD).and_then(FieldValue::as_one).unwrap();
        assert_eq!(inner.as_node().unwrap().rule, "call");
        assert_eq!(shapes.serialize(&node).unwrap(), tree);
    }

    #[test]
    fn test_construct_defaults_repeated_slots() {
        let shapes = call_shapes();
        let node = shapes
            .shape("call")
            .unwrap()
            .construct(vec![
                Element::Text("h".into()).into(),
                FieldValue::Empty,
                FieldValue::Empty,
            ])
            .unwrap();
        assert_eq!(node.get("args"), Some(&FieldValue::Many(Vec::new())));
        assert_eq!(node.get("block"), Some(&FieldValue::Empty));
    }

    #[test]
    fn test_construct_arity() {
        let shapes = call_shapes();
        let err = shapes
            .shape("call")
            .unwrap()
            .construct(vec![FieldValue::Empty])
            .unwrap_err();
        assert_eq!(
            err,
            ConstructError::Arity {
                rule: "call".into(),
                expected: 3,
                found: 1
            }
        );
    }

    #[test]
    fn test_serialize_rejects_missing_text() {
        let shapes = call_shapes();
        let node = shapes
            .shape("call")
            .unwrap()
            .construct(vec![FieldValue::Empty, FieldValue::Empty, FieldValue::Empty])
            .unwrap();
        let err = shapes.serialize(&node).unwrap_err();
        assert_eq!(
            err.reason,
            Mismatch::MissingValue {
                field: "callee".into()
            }
        );
    }

    #[test]
    fn test_serialize_checks_field_names() {
        let shapes = call_shapes();
        let mut node = shapes
            .shape("call")
            .unwrap()
            .parse(&Tree::with_text("CALL", "f"))
            .unwrap();
        node.fields.swap(1, 2);
        let err = shapes.serialize(&node).unwrap_err();
        assert_eq!(
            err.reason,
            Mismatch::UnexpectedField {
                expected: "args".into(),
                found: "block".into()
            }
        );
    }

    #[test]
    fn test_serialize_rejects_wrong_element_sort() {
        let shapes = call_shapes();
        let node = shapes
            .shape("paren")
            .unwrap()
            .construct(vec![Element::Token(Tree::new("CALL")).into()])
            .unwrap();
        let err = shapes.serialize(&node).unwrap_err();
        assert_eq!(
            err.reason,
            Mismatch::WrongValue {
                field: INNER_FIELD.into(),
                expected: "a `call` node".into()
            }
        );
    }
}
