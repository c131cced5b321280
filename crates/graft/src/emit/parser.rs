//! The package-level units: `parser` (membership tests, parsers and
//! constructors for every rule) and `mod`.

use super::naming::field_ident;
use super::source::Source;
use super::{literal, token_ref, unit_name, Context, PARSER_UNIT};
use crate::compile::{Accept, Plan, Step, INNER_FIELD};
use crate::schema::Quantifier;

/// Local names the generated parse functions use for themselves.
const LOCALS: &[&str] = &["tree", "rest"];

pub(super) fn render(cx: &Context<'_>) -> String {
    let package = cx.shapes.schema().package.join(".");
    let types: Vec<String> = cx.shapes.iter().map(|shape| cx.type_name(shape.id())).collect();

    let mut src = Source::default();
    src.header(&format!(
        "Membership tests, parsers and constructors for package `{package}`."
    ));
    src.line("#![allow(clippy::too_many_arguments)]");
    src.blank();
    src.line(format!("use {} as rt;", cx.runtime));
    if cx.has_shapes() {
        src.line(cx.use_tokens());
    }
    if !types.is_empty() {
        src.line(format!("use super::{{{}}};", types.join(", ")));
    }

    for shape in cx.shapes.iter() {
        let id = shape.id();
        src.blank();
        match cx.shapes.plan(id) {
            Plan::Shape { root, steps } => shape_fns(cx, &mut src, id, root, steps),
            Plan::Delegate(target) => delegate_fns(cx, &mut src, id, *target),
            Plan::Choice(alternatives) => choice_fns(cx, &mut src, id, alternatives),
        }
    }

    src.finish()
}

pub(super) fn render_mod(cx: &Context<'_>) -> String {
    let package = cx.shapes.schema().package.join(".");

    let mut src = Source::default();
    src.header(&format!("Package `{package}`."));

    for shape in cx.shapes.iter() {
        src.line(format!("mod {};", field_ident(shape.name())));
    }
    src.line(format!("pub mod {PARSER_UNIT};"));

    if cx.shapes.iter().next().is_some() {
        src.blank();
    }
    for shape in cx.shapes.iter() {
        src.line(format!(
            "pub use {}::{};",
            field_ident(shape.name()),
            cx.type_name(shape.id())
        ));
    }

    src.finish()
}

fn fn_suffix(cx: &Context<'_>, id: usize) -> String {
    unit_name(cx.rule_name(id))
}

fn can_parse_doc(src: &mut Source, rule: &str) {
    src.line(format!("/// Membership test for rule `{rule}`."));
    src.line("#[must_use]");
}

fn parse_doc(src: &mut Source, rule: &str, detail: Option<&str>) {
    src.line(format!("/// Parses rule `{rule}`."));
    src.line("///");
    if let Some(detail) = detail {
        src.line(format!("/// {detail}"));
        src.line("///");
    }
    src.line("/// # Errors");
    src.line("///");
    src.line("/// Returns a [`rt::ShapeMismatch`] if `tree` does not conform.");
}

/// The local a parsed field is bound to.
pub(super) fn local(field: &str) -> String {
    let ident = field_ident(field);
    if LOCALS.contains(&ident.as_str()) {
        format!("{ident}_value")
    } else {
        ident
    }
}

/// `name` or `name: local`, for struct literals.
fn field_init(field: &str) -> String {
    let ident = field_ident(field);
    let local = local(field);
    if ident == local {
        ident
    } else {
        format!("{ident}: {local}")
    }
}

fn shape_fns(cx: &Context<'_>, src: &mut Source, id: usize, root: &str, steps: &[Step]) {
    let rule = cx.rule_name(id);
    let suffix = fn_suffix(cx, id);
    let ty = cx.type_name(id);
    let kind = token_ref(root);

    can_parse_doc(src, rule);
    src.open(format!("pub fn can_parse_{suffix}(tree: &rt::Tree) -> bool {{"));
    src.line(format!("tree.is({kind})"));
    src.close("}");

    src.blank();
    parse_doc(src, rule, None);
    src.open(format!(
        "pub fn parse_{suffix}(tree: &rt::Tree) -> Result<{ty}, rt::ShapeMismatch> {{"
    ));
    src.line(format!("const RULE: &str = {};", literal(rule)));
    src.blank();
    src.open(format!("if !tree.is({kind}) {{"));
    src.open("return Err(rt::ShapeMismatch::new(");
    src.line("RULE,");
    src.open("rt::Mismatch::WrongKind {");
    src.line(format!("expected: {kind}.to_owned(),"));
    src.line("found: tree.kind().to_owned(),");
    src.close("},");
    src.close("));");
    src.close("}");
    src.blank();

    if steps.is_empty() {
        src.line("rt::finish(RULE, tree.children())?;");
    } else {
        src.line("let rest = tree.children();");
        for step in steps {
            take_step(cx, src, step);
        }
        src.line("rt::finish(RULE, rest)?;");
    }

    let inits: Vec<String> = steps.iter().map(|step| field_init(step.field())).collect();
    src.line(format!("Ok({})", struct_literal(&ty, &inits)));
    src.close("}");

    src.blank();
    src.line(format!("/// Builds a `{rule}` node from its field values."));
    src.line("#[must_use]");
    let params: Vec<String> = steps
        .iter()
        .map(|step| format!("{}: {}", field_ident(step.field()), cx.field_type(step)))
        .collect();
    src.open(format!(
        "pub fn make_{suffix}({}) -> {ty} {{",
        params.join(", ")
    ));
    let names: Vec<String> = steps.iter().map(|step| field_ident(step.field())).collect();
    src.line(struct_literal(&ty, &names));
    src.close("}");
}

fn struct_literal(ty: &str, inits: &[String]) -> String {
    if inits.is_empty() {
        format!("{ty} {{}}")
    } else {
        format!("{ty} {{ {} }}", inits.join(", "))
    }
}

fn take_step(cx: &Context<'_>, src: &mut Source, step: &Step) {
    let field = step.field();
    let local = local(field);

    let (accept, quantifier) = match step {
        Step::Text { optional: false, .. } => {
            src.line(format!(
                "let {local} = rt::capture_text(RULE, {}, tree)?;",
                literal(field)
            ));
            return;
        }
        Step::Text { optional: true, .. } => {
            src.line(format!("let {local} = rt::capture_optional_text(tree);"));
            return;
        }
        Step::Child {
            accept, quantifier, ..
        } => (accept, *quantifier),
    };

    let (accepts, consume) = match accept {
        Accept::Token(kind) => (
            format!("|t: &rt::Tree| t.is({})", token_ref(kind)),
            "|t: &rt::Tree| Ok(t.clone())".to_owned(),
        ),
        Accept::Rule(target) => {
            let suffix = fn_suffix(cx, *target);
            let consume = if cx.is_capability(*target) {
                format!("parse_{suffix}")
            } else {
                format!("|t: &rt::Tree| parse_{suffix}(t).map(Box::new)")
            };
            (format!("can_parse_{suffix}"), consume)
        }
    };

    let call = match quantifier {
        Quantifier::One => format!(
            "rt::take_one(RULE, {}, rest, {accepts}, {consume})",
            literal(field)
        ),
        Quantifier::Optional => format!("rt::take_optional(rest, {accepts}, {consume})"),
        Quantifier::ZeroOrMore => format!("rt::take_many(rest, {accepts}, {consume})"),
        Quantifier::OneOrMore => format!(
            "rt::take_at_least_one(RULE, {}, rest, {accepts}, {consume})",
            literal(field)
        ),
    };
    src.line(format!("let ({local}, rest) = {call}?;"));
}

fn delegate_fns(cx: &Context<'_>, src: &mut Source, id: usize, target: usize) {
    let rule = cx.rule_name(id);
    let suffix = fn_suffix(cx, id);
    let target_suffix = fn_suffix(cx, target);
    let ty = cx.type_name(id);

    can_parse_doc(src, rule);
    src.open(format!("pub fn can_parse_{suffix}(tree: &rt::Tree) -> bool {{"));
    src.line(format!("can_parse_{target_suffix}(tree)"));
    src.close("}");

    src.blank();
    parse_doc(src, rule, None);
    src.open(format!(
        "pub fn parse_{suffix}(tree: &rt::Tree) -> Result<{ty}, rt::ShapeMismatch> {{"
    ));
    let inner = if cx.is_capability(target) {
        format!("parse_{target_suffix}(tree)?")
    } else {
        format!("Box::new(parse_{target_suffix}(tree)?)")
    };
    src.line(format!("Ok({ty} {{ {INNER_FIELD}: {inner} }})"));
    src.close("}");

    src.blank();
    src.line(format!("/// Wraps a `{}` value as `{rule}`.", cx.rule_name(target)));
    src.line("#[must_use]");
    src.open(format!(
        "pub fn make_{suffix}({INNER_FIELD}: {}) -> {ty} {{",
        cx.rule_type(target)
    ));
    src.line(format!("{ty} {{ {INNER_FIELD} }}"));
    src.close("}");
}

fn choice_fns(cx: &Context<'_>, src: &mut Source, id: usize, alternatives: &[usize]) {
    let rule = cx.rule_name(id);
    let suffix = fn_suffix(cx, id);
    let ty = cx.type_name(id);

    can_parse_doc(src, rule);
    if alternatives.is_empty() {
        src.open(format!("pub fn can_parse_{suffix}(_tree: &rt::Tree) -> bool {{"));
        src.line("false");
    } else {
        src.open(format!("pub fn can_parse_{suffix}(tree: &rt::Tree) -> bool {{"));
        let tests: Vec<String> = alternatives
            .iter()
            .map(|&alt| format!("can_parse_{}(tree)", fn_suffix(cx, alt)))
            .collect();
        src.line(tests.join(" || "));
    }
    src.close("}");

    src.blank();
    parse_doc(
        src,
        rule,
        Some("The first alternative whose membership test holds is parsed."),
    );
    src.open(format!(
        "pub fn parse_{suffix}(tree: &rt::Tree) -> Result<Box<dyn {ty}>, rt::ShapeMismatch> {{"
    ));
    for &alt in alternatives {
        let alt_suffix = fn_suffix(cx, alt);
        src.open(format!("if can_parse_{alt_suffix}(tree) {{"));
        if cx.is_capability(alt) {
            src.line(format!("let node: Box<dyn {ty}> = parse_{alt_suffix}(tree)?;"));
        } else {
            src.line(format!(
                "let node: Box<dyn {ty}> = Box::new(parse_{alt_suffix}(tree)?);"
            ));
        }
        src.line("return Ok(node);");
        src.close("}");
    }
    src.open("Err(rt::ShapeMismatch::new(");
    src.line(format!("{},", literal(rule)));
    src.open("rt::Mismatch::NoAlternative {");
    src.line("found: tree.kind().to_owned(),");
    src.close("},");
    src.close("))");
    src.close("}");
}
