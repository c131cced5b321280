//! The quantifier engine.
//!
//! Matching a body against a node's children is a fold over the body's items.
//! Each function here takes the children that remain unconsumed and returns the
//! captured value together with the new remainder, so no cursor is ever held
//! as hidden state. Acceptance of a child is always the shallow membership
//! test (a kind comparison, or a rule's `can_parse`); consumption is where the
//! recursive parse happens.
//!
//! Generated parsers call these functions directly, and so do compiled
//! [`Shapes`](crate::Shapes), which keeps both paths on one algorithm.

use super::{Mismatch, ShapeMismatch, Tree};

/// Consumes exactly one accepted child.
///
/// # Errors
///
/// Returns [`Mismatch::MissingChild`] if there is no next child or it is not
/// accepted, or whatever `consume` fails with.
pub fn take_one<'t, T>(
    rule: &str,
    field: &str,
    rest: &'t [Tree],
    accepts: impl Fn(&Tree) -> bool,
    mut consume: impl FnMut(&'t Tree) -> Result<T, ShapeMismatch>,
) -> Result<(T, &'t [Tree]), ShapeMismatch> {
    match rest.split_first() {
        Some((child, tail)) if accepts(child) => Ok((consume(child)?, tail)),
        _ => Err(missing_child(rule, field, rest)),
    }
}

/// Consumes the next child if it is accepted, otherwise leaves `rest` as is.
///
/// # Errors
///
/// Only fails if `consume` fails.
pub fn take_optional<'t, T>(
    rest: &'t [Tree],
    accepts: impl Fn(&Tree) -> bool,
    mut consume: impl FnMut(&'t Tree) -> Result<T, ShapeMismatch>,
) -> Result<(Option<T>, &'t [Tree]), ShapeMismatch> {
    match rest.split_first() {
        Some((child, tail)) if accepts(child) => Ok((Some(consume(child)?), tail)),
        _ => Ok((None, rest)),
    }
}

/// Consumes the longest run of accepted children, possibly none.
///
/// # Errors
///
/// Only fails if `consume` fails for one of the accepted children.
pub fn take_many<'t, T>(
    rest: &'t [Tree],
    accepts: impl Fn(&Tree) -> bool,
    consume: impl FnMut(&'t Tree) -> Result<T, ShapeMismatch>,
) -> Result<(Vec<T>, &'t [Tree]), ShapeMismatch> {
    let run = rest.iter().take_while(|&child| accepts(child)).count();
    let (taken, tail) = rest.split_at(run);
    let values = taken.iter().map(consume).collect::<Result<Vec<_>, _>>()?;
    Ok((values, tail))
}

/// Like [`take_many`], but at least one child must be accepted.
///
/// # Errors
///
/// Returns [`Mismatch::MissingChild`] if the first remaining child is not
/// accepted, or whatever `consume` fails with.
pub fn take_at_least_one<'t, T>(
    rule: &str,
    field: &str,
    rest: &'t [Tree],
    accepts: impl Fn(&Tree) -> bool,
    consume: impl FnMut(&'t Tree) -> Result<T, ShapeMismatch>,
) -> Result<(Vec<T>, &'t [Tree]), ShapeMismatch> {
    let (values, tail) = take_many(rest, accepts, consume)?;
    if values.is_empty() {
        return Err(missing_child(rule, field, rest));
    }
    Ok((values, tail))
}

/// Captures the literal text of `node` itself. Never consumes a child.
///
/// # Errors
///
/// Returns [`Mismatch::MissingText`] if the node carries no text.
pub fn capture_text(rule: &str, field: &str, node: &Tree) -> Result<String, ShapeMismatch> {
    node.text().map(str::to_owned).ok_or_else(|| {
        ShapeMismatch::new(
            rule,
            Mismatch::MissingText {
                field: field.to_owned(),
            },
        )
    })
}

/// Captures the literal text of `node`, if any.
#[must_use]
pub fn capture_optional_text(node: &Tree) -> Option<String> {
    node.text().map(str::to_owned)
}

/// Closes the fold: every child must have been consumed.
///
/// # Errors
///
/// Returns [`Mismatch::TrailingChildren`] if `rest` is not empty.
pub fn finish(rule: &str, rest: &[Tree]) -> Result<(), ShapeMismatch> {
    match rest.first() {
        None => Ok(()),
        Some(first) => Err(ShapeMismatch::new(
            rule,
            Mismatch::TrailingChildren {
                count: rest.len(),
                first: first.kind().to_owned(),
            },
        )),
    }
}

/// Serializer guard for one-or-more slots.
///
/// # Errors
///
/// Returns [`Mismatch::EmptyCollection`] if `values` is empty.
pub fn non_empty<'v, T>(
    rule: &str,
    field: &str,
    values: &'v [T],
) -> Result<&'v [T], ShapeMismatch> {
    if values.is_empty() {
        return Err(ShapeMismatch::new(
            rule,
            Mismatch::EmptyCollection {
                field: field.to_owned(),
            },
        ));
    }
    Ok(values)
}

/// Serializer guard for token slots: `token` must be of the slot's `kind`.
///
/// # Errors
///
/// Returns [`Mismatch::WrongValue`] if `token` is of another kind.
pub fn expect_token(
    rule: &str,
    field: &str,
    kind: &str,
    token: &Tree,
) -> Result<Tree, ShapeMismatch> {
    if token.is(kind) {
        return Ok(token.clone());
    }
    Err(ShapeMismatch::new(
        rule,
        Mismatch::WrongValue {
            field: field.to_owned(),
            expected: format!("a `{kind}` token"),
        },
    ))
}

fn missing_child(rule: &str, field: &str, rest: &[Tree]) -> ShapeMismatch {
    ShapeMismatch::new(
        rule,
        Mismatch::MissingChild {
            field: field.to_owned(),
            found: rest.first().map(|child| child.kind().to_owned()),
        },
    )
}
