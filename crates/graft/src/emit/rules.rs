//! Per-rule units: node structs, their serializers and capability traits.

use super::naming::{field_ident, snake_case, type_ident};
use super::source::Source;
use super::{literal, token_ref, Context};
use crate::compile::{Accept, Plan, Step, INNER_FIELD};
use crate::schema::Quantifier;
use std::collections::BTreeSet;

pub(super) fn render(cx: &Context<'_>, id: usize) -> String {
    match cx.shapes.plan(id) {
        Plan::Shape { root, steps } => shape(cx, id, root, steps),
        Plan::Delegate(target) => delegate(cx, id, *target),
        Plan::Choice(alternatives) => capability(cx, id, alternatives),
    }
}

fn shape(cx: &Context<'_>, id: usize, root: &str, steps: &[Step]) -> String {
    let rule = cx.rule_name(id);
    let ty = cx.type_name(id);
    let ancestors = cx.shapes.ancestors().transitive(rule);

    let mut imports: BTreeSet<String> = steps
        .iter()
        .filter_map(|step| match step {
            Step::Child {
                accept: Accept::Rule(target),
                ..
            } if *target != id => Some(cx.type_name(*target)),
            Step::Text { .. } | Step::Child { .. } => None,
        })
        .collect();
    imports.extend(ancestors.iter().map(|name| type_ident(name)));

    let mut src = Source::default();
    src.header(&format!("Rule `{rule}`: `{root}` nodes."));
    use_runtime(&mut src, cx);
    src.line(cx.use_tokens());
    use_super(&mut src, &imports);
    src.blank();

    src.line(format!("/// A node of kind `{root}`."));
    src.line("#[derive(Debug)]");
    src.open(format!("pub struct {ty} {{"));
    for step in steps {
        src.line(format!("/// `{}`: {}.", step.field(), cx.describe(step)));
        src.line(format!(
            "pub {}: {},",
            field_ident(step.field()),
            cx.field_type(step)
        ));
    }
    src.close("}");

    accessors(&mut src, &ty, steps);

    src.blank();
    src.open(format!("impl rt::Unparse for {ty} {{"));
    src.open("fn unparse(&self) -> Result<rt::Tree, rt::ShapeMismatch> {");
    if steps.is_empty() {
        src.line(format!("Ok(rt::Tree::new({}))", token_ref(root)));
    } else {
        src.line(format!("let mut tree = rt::Tree::new({});", token_ref(root)));
        for step in steps {
            unparse_step(&mut src, rule, step);
        }
        src.line("Ok(tree)");
    }
    src.close("}");
    src.close("}");

    capability_impls(&mut src, &ty, &ancestors);
    src.finish()
}

/// `has_<field>()` for every slot that may be absent.
fn accessors(src: &mut Source, ty: &str, steps: &[Step]) {
    let optional: Vec<&str> = steps
        .iter()
        .filter(|step| {
            matches!(
                step,
                Step::Text { optional: true, .. }
                    | Step::Child {
                        quantifier: Quantifier::Optional,
                        ..
                    }
            )
        })
        .map(Step::field)
        .collect();

    if optional.is_empty() {
        return;
    }

    src.blank();
    src.open(format!("impl {ty} {{"));
    for (i, field) in optional.into_iter().enumerate() {
        if i > 0 {
            src.blank();
        }
        src.line(format!("/// Whether `{field}` is present."));
        src.line("#[must_use]");
        src.open(format!("pub fn has_{}(&self) -> bool {{", snake_case(field)));
        src.line(format!("self.{}.is_some()", field_ident(field)));
        src.close("}");
    }
    src.close("}");
}

fn unparse_step(src: &mut Source, rule: &str, step: &Step) {
    let field = field_ident(step.field());
    let (accept, quantifier) = match step {
        Step::Text { optional: false, .. } => {
            src.line(format!("tree.set_text(Some(self.{field}.clone()));"));
            return;
        }
        Step::Text { optional: true, .. } => {
            src.line(format!("tree.set_text(self.{field}.clone());"));
            return;
        }
        Step::Child {
            accept, quantifier, ..
        } => (accept, *quantifier),
    };

    // Loop and `if let` bindings already borrow the element
    let value = |element: &str, borrowed: bool| {
        let (token, node) = if borrowed {
            (element.to_owned(), format!("&**{element}"))
        } else {
            (format!("&{element}"), format!("&*{element}"))
        };
        match accept {
            Accept::Token(kind) => format!(
                "rt::expect_token({}, {}, {}, {token})?",
                literal(rule),
                literal(step.field()),
                token_ref(kind)
            ),
            Accept::Rule(_) => format!("rt::Unparse::unparse({node})?"),
        }
    };

    match quantifier {
        Quantifier::One => {
            src.line(format!("tree.push({});", value(&format!("self.{field}"), false)));
        }
        Quantifier::Optional => {
            src.open(format!("if let Some(value) = &self.{field} {{"));
            src.line(format!("tree.push({});", value("value", true)));
            src.close("}");
        }
        Quantifier::ZeroOrMore => {
            src.open(format!("for value in &self.{field} {{"));
            src.line(format!("tree.push({});", value("value", true)));
            src.close("}");
        }
        Quantifier::OneOrMore => {
            src.open(format!(
                "for value in rt::non_empty({}, {}, &self.{field})? {{",
                literal(rule),
                literal(step.field())
            ));
            src.line(format!("tree.push({});", value("value", true)));
            src.close("}");
        }
    }
}

fn delegate(cx: &Context<'_>, id: usize, target: usize) -> String {
    let rule = cx.rule_name(id);
    let ty = cx.type_name(id);
    let ancestors = cx.shapes.ancestors().transitive(rule);

    let mut imports: BTreeSet<String> = ancestors.iter().map(|name| type_ident(name)).collect();
    if target != id {
        imports.insert(cx.type_name(target));
    }

    let mut src = Source::default();
    src.header(&format!(
        "Rule `{rule}`: delegates to `{}`.",
        cx.rule_name(target)
    ));
    use_runtime(&mut src, cx);
    use_super(&mut src, &imports);
    src.blank();

    src.line(format!(
        "/// A `{}` value, seen as `{rule}`.",
        cx.rule_name(target)
    ));
    src.line("#[derive(Debug)]");
    src.open(format!("pub struct {ty} {{"));
    src.line(format!("/// The `{}` value.", cx.rule_name(target)));
    src.line(format!("pub {INNER_FIELD}: {},", cx.rule_type(target)));
    src.close("}");

    src.blank();
    src.open(format!("impl rt::Unparse for {ty} {{"));
    src.open("fn unparse(&self) -> Result<rt::Tree, rt::ShapeMismatch> {");
    src.line(format!("rt::Unparse::unparse(&*self.{INNER_FIELD})"));
    src.close("}");
    src.close("}");

    capability_impls(&mut src, &ty, &ancestors);
    src.finish()
}

fn capability(cx: &Context<'_>, id: usize, alternatives: &[usize]) -> String {
    let rule = cx.rule_name(id);
    let ty = cx.type_name(id);
    let direct = cx.shapes.ancestors().direct(rule);

    let imports: BTreeSet<String> = direct.iter().map(|name| type_ident(name)).collect();

    let mut src = Source::default();
    src.header(&format!("Rule `{rule}`: a capability shared by its alternatives."));
    use_runtime(&mut src, cx);
    use_super(&mut src, &imports);
    src.blank();

    src.line(format!("/// Anything that may stand where `{rule}` is expected."));
    if !alternatives.is_empty() {
        let names: Vec<String> = alternatives
            .iter()
            .map(|&alt| format!("`{}`", cx.rule_name(alt)))
            .collect();
        src.line("///");
        src.line(format!("/// Implemented by {}.", names.join(", ")));
    }
    let supertraits: Vec<&str> = std::iter::once("rt::Unparse")
        .chain(imports.iter().map(String::as_str))
        .collect();
    src.line(format!("pub trait {ty}: {} {{}}", supertraits.join(" + ")));
    src.finish()
}

fn capability_impls(src: &mut Source, ty: &str, ancestors: &[&str]) {
    if ancestors.is_empty() {
        return;
    }
    src.blank();
    for ancestor in ancestors {
        src.line(format!("impl {} for {ty} {{}}", type_ident(ancestor)));
    }
}

// Nested values are unparsed through the qualified path, so `Unparse` itself
// is never imported.
fn use_runtime(src: &mut Source, cx: &Context<'_>) {
    src.line(format!("use {} as rt;", cx.runtime));
}

fn use_super(src: &mut Source, imports: &BTreeSet<String>) {
    match imports.len() {
        0 => {}
        1 => {
            let name = imports.iter().next().map_or("", String::as_str);
            src.line(format!("use super::{name};"));
        }
        _ => {
            let names: Vec<&str> = imports.iter().map(String::as_str).collect();
            src.line(format!("use super::{{{}}};", names.join(", ")));
        }
    }
}
