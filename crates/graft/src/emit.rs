//! The emitter: renders compiled shapes as Rust source units.
//!
//! [`emit`] walks the plans of a [`Shapes`] and produces one [`Unit`] per
//! rule, a `parser` unit holding every rule's membership test, parser and
//! constructor, and a `mod` unit that ties the package together. Emitted code
//! calls the same quantifier engine the compiled shapes run on, through the
//! runtime path configured in the schema.
//!
//! Naming follows Rust conventions: rule `ifStmt` becomes type `IfStmt` in
//! module `if_stmt` with functions `can_parse_if_stmt`, `parse_if_stmt` and
//! `make_if_stmt`. Keywords are emitted as raw identifiers.

mod naming;
mod parser;
mod rules;
mod source;

use crate::compile::{Accept, Plan, Shapes, Step};
use crate::schema::{Quantifier, SchemaError};
use naming::{field_ident, type_ident};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the unit holding membership tests, parsers and constructors.
pub const PARSER_UNIT: &str = "parser";

/// Name of the unit declaring the package's modules.
pub const MOD_UNIT: &str = "mod";

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// File stem, written as `<name>.rs`.
    pub name: String,

    /// The Rust source.
    pub contents: String,
}

/// Errors raised while generating code.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The schema could not be read, validated or compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Two rules map onto the same generated identifier.
    #[error("rules `{first}` and `{second}` both generate `{name}`")]
    NameClash {
        /// The earlier rule.
        first: String,
        /// The later rule.
        second: String,
        /// The identifier both produce.
        name: String,
    },

    /// Two fields of one rule map onto the same generated identifier.
    #[error("fields `{first}` and `{second}` of rule `{rule}` both generate `{name}`")]
    FieldClash {
        /// The rule.
        rule: String,
        /// The earlier field.
        first: String,
        /// The later field.
        second: String,
        /// The identifier both produce.
        name: String,
    },

    /// A file could not be read or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Renders every unit for the compiled `shapes`, in rule declaration order,
/// followed by the `parser` and `mod` units.
///
/// # Errors
///
/// Returns [`GenerateError::NameClash`] if two rules (or a rule and one of
/// the package's own units) would produce the same module or type name, and
/// [`GenerateError::FieldClash`] if two fields of one rule would produce the
/// same field, accessor or local name.
pub fn emit(shapes: &Shapes) -> Result<Vec<Unit>, GenerateError> {
    check_names(shapes)?;
    let cx = Context::new(shapes);

    let mut units: Vec<Unit> = shapes
        .iter()
        .map(|shape| {
            let unit = Unit {
                name: unit_name(shape.name()),
                contents: rules::render(&cx, shape.id()),
            };
            debug!("rendered unit '{}' for rule '{}'", unit.name, shape.name());
            unit
        })
        .collect();

    units.push(Unit {
        name: PARSER_UNIT.to_owned(),
        contents: parser::render(&cx),
    });
    units.push(Unit {
        name: MOD_UNIT.to_owned(),
        contents: parser::render_mod(&cx),
    });

    Ok(units)
}

/// Writes `units` under `<out_root>/<package segments...>/`, creating
/// directories as needed, and returns the package directory.
///
/// # Errors
///
/// Returns [`GenerateError::Io`] if a directory or file cannot be written.
pub fn write_units(
    out_root: &Path,
    package: &[String],
    units: &[Unit],
) -> Result<PathBuf, GenerateError> {
    let dir = package.iter().fold(out_root.to_path_buf(), |dir, segment| dir.join(segment));

    std::fs::create_dir_all(&dir).map_err(|source| GenerateError::Io {
        path: dir.clone(),
        source,
    })?;

    for unit in units {
        let path = dir.join(format!("{}.rs", unit.name));
        std::fs::write(&path, &unit.contents).map_err(|source| GenerateError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("wrote {}", path.display());
    }

    info!("wrote {} unit(s) to {}", units.len(), dir.display());
    Ok(dir)
}

fn unit_name(rule: &str) -> String {
    field_ident(rule).trim_start_matches("r#").to_owned()
}

fn check_names(shapes: &Shapes) -> Result<(), GenerateError> {
    let mut modules: HashMap<String, &str> = HashMap::new();
    let mut types: HashMap<String, &str> = HashMap::new();

    for shape in shapes.iter() {
        let rule = shape.name();
        let module = unit_name(rule);
        if module == PARSER_UNIT || module == MOD_UNIT {
            return Err(GenerateError::NameClash {
                first: module.clone(),
                second: rule.to_owned(),
                name: format!("{module}.rs"),
            });
        }
        for (seen, name) in [(&mut modules, module), (&mut types, type_ident(rule))] {
            if let Some(first) = seen.insert(name.clone(), rule) {
                return Err(GenerateError::NameClash {
                    first: first.to_owned(),
                    second: rule.to_owned(),
                    name,
                });
            }
        }
        if let Plan::Shape { steps, .. } = shapes.plan(shape.id()) {
            check_field_names(rule, steps)?;
        }
    }

    Ok(())
}

/// Field names that differ in the schema may still meet once snake-cased,
/// either as struct fields (and so `has_*` accessors) or as parse locals.
fn check_field_names(rule: &str, steps: &[Step]) -> Result<(), GenerateError> {
    let mut idents: HashMap<String, &str> = HashMap::new();
    let mut locals: HashMap<String, &str> = HashMap::new();

    for step in steps {
        let field = step.field();
        for (seen, name) in [
            (&mut idents, field_ident(field)),
            (&mut locals, parser::local(field)),
        ] {
            if let Some(first) = seen.insert(name.clone(), field) {
                return Err(GenerateError::FieldClash {
                    rule: rule.to_owned(),
                    first: first.to_owned(),
                    second: field.to_owned(),
                    name,
                });
            }
        }
    }

    Ok(())
}

/// What both the rule units and the parser unit need to know.
struct Context<'a> {
    shapes: &'a Shapes,
    runtime: &'a str,
    tokens: String,
}

impl<'a> Context<'a> {
    fn new(shapes: &'a Shapes) -> Self {
        let schema = shapes.schema();
        // Without a vocabulary path the package is expected to hold `tokens`
        let tokens = if schema.token_vocab.is_empty() {
            "super::tokens".to_owned()
        } else {
            schema.token_vocab.join("::")
        };

        Self {
            shapes,
            runtime: &schema.runtime,
            tokens,
        }
    }

    fn rule_name(&self, id: usize) -> &'a str {
        &self.shapes.rule(id).name
    }

    fn type_name(&self, id: usize) -> String {
        type_ident(self.rule_name(id))
    }

    fn is_capability(&self, id: usize) -> bool {
        matches!(self.shapes.plan(id), Plan::Choice(_))
    }

    fn has_shapes(&self) -> bool {
        self.shapes
            .iter()
            .any(|shape| matches!(self.shapes.plan(shape.id()), Plan::Shape { .. }))
    }

    fn use_tokens(&self) -> String {
        if self.tokens.ends_with("::tokens") || self.tokens == "tokens" {
            format!("use {};", self.tokens)
        } else {
            format!("use {} as tokens;", self.tokens)
        }
    }

    /// The type of one rule's value where another rule holds it.
    fn rule_type(&self, id: usize) -> String {
        if self.is_capability(id) {
            format!("Box<dyn {}>", self.type_name(id))
        } else {
            format!("Box<{}>", self.type_name(id))
        }
    }

    fn value_type(&self, accept: &Accept) -> String {
        match accept {
            Accept::Token(_) => "rt::Tree".to_owned(),
            Accept::Rule(id) => self.rule_type(*id),
        }
    }

    fn field_type(&self, step: &Step) -> String {
        match step {
            Step::Text { optional: false, .. } => "String".to_owned(),
            Step::Text { optional: true, .. } => "Option<String>".to_owned(),
            Step::Child {
                accept, quantifier, ..
            } => {
                let value = self.value_type(accept);
                match quantifier {
                    Quantifier::One => value,
                    Quantifier::Optional => format!("Option<{value}>"),
                    Quantifier::ZeroOrMore | Quantifier::OneOrMore => format!("Vec<{value}>"),
                }
            }
        }
    }

    /// A short grammar description of a step, for doc comments.
    fn describe(&self, step: &Step) -> String {
        match step {
            Step::Text { optional: false, .. } => "the node's text".to_owned(),
            Step::Text { optional: true, .. } => "the node's text, if any".to_owned(),
            Step::Child {
                accept, quantifier, ..
            } => {
                let target = match accept {
                    Accept::Token(kind) => format!("`{kind}`"),
                    Accept::Rule(id) => format!("`{}`", self.rule_name(*id)),
                };
                match quantifier {
                    Quantifier::One => format!("one {target}"),
                    Quantifier::Optional => format!("an optional {target}"),
                    Quantifier::ZeroOrMore => format!("zero or more {target}"),
                    Quantifier::OneOrMore => format!("one or more {target}"),
                }
            }
        }
    }
}

fn token_ref(kind: &str) -> String {
    format!("tokens::{kind}")
}

/// A Rust string literal.
fn literal(text: &str) -> String {
    format!("{text:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema;

    fn shapes(json: &str) -> Shapes {
        Shapes::compile(parse_schema(json).unwrap()).unwrap()
    }

    #[test]
    fn test_unit_order() {
        let shapes = shapes(
            r#"{"package": ["demo"], "token_vocab": ["crate", "tokens"], "rules": [
                {"name": "expr", "alternatives": ["lit"]},
                {"name": "lit", "root": "LIT", "items": [{"field": "value", "text": true}]}
            ]}"#,
        );
        let names: Vec<String> = emit(&shapes).unwrap().into_iter().map(|u| u.name).collect();
        assert_eq!(names, ["expr", "lit", PARSER_UNIT, MOD_UNIT]);
    }

    #[test]
    fn test_reserved_unit_name_clash() {
        let shapes = shapes(
            r#"{"package": ["demo"], "token_vocab": ["tokens"], "rules": [
                {"name": "parser", "root": "PARSER"}
            ]}"#,
        );
        assert!(matches!(
            emit(&shapes),
            Err(GenerateError::NameClash { name, .. }) if name == "parser.rs"
        ));
    }

    #[test]
    fn test_case_variant_clash() {
        let shapes = shapes(
            r#"{"package": ["demo"], "token_vocab": ["tokens"], "rules": [
                {"name": "fooBar", "root": "A"},
                {"name": "foo_bar", "root": "B"}
            ]}"#,
        );
        assert!(matches!(
            emit(&shapes),
            Err(GenerateError::NameClash { first, second, .. })
                if first == "fooBar" && second == "foo_bar"
        ));
    }

    #[test]
    fn test_field_clash_after_snake_case() {
        let shapes = shapes(
            r#"{"package": ["demo"], "token_vocab": ["tokens"], "rules": [
                {"name": "pair", "root": "PAIR", "items": [
                    {"field": "fooBar", "match": "A"},
                    {"field": "foo_bar", "match": "B"}
                ]}
            ]}"#,
        );
        let err = emit(&shapes).unwrap_err();
        assert_eq!(
            err.to_string(),
            "fields `fooBar` and `foo_bar` of rule `pair` both generate `foo_bar`"
        );
    }

    #[test]
    fn test_field_clash_with_renamed_local() {
        let shapes = shapes(
            r#"{"package": ["demo"], "token_vocab": ["tokens"], "rules": [
                {"name": "call", "root": "CALL", "items": [
                    {"field": "rest", "match": "A"},
                    {"field": "restValue", "match": "B"}
                ]}
            ]}"#,
        );
        assert!(matches!(
            emit(&shapes),
            Err(GenerateError::FieldClash { first, second, name, .. })
                if first == "rest" && second == "restValue" && name == "rest_value"
        ));
    }

    #[test]
    fn test_write_units_creates_package_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let units = vec![Unit {
            name: "lit".into(),
            contents: "// lit\n".into(),
        }];
        let package = vec!["demo".to_owned(), "ast".to_owned()];

        let written = write_units(dir.path(), &package, &units).unwrap();
        assert_eq!(written, dir.path().join("demo").join("ast"));
        assert_eq!(
            std::fs::read_to_string(written.join("lit.rs")).unwrap(),
            "// lit\n"
        );
    }
}
