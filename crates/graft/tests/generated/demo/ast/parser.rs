//! Membership tests, parsers and constructors for package `demo.ast`.
//!
//! Generated by graft. Do not edit.

#![allow(clippy::too_many_arguments)]

use graft::runtime as rt;
use crate::tokens;
use super::{Stmt, IfStmt, Block, Expr, Ident, Paren};

/// Membership test for rule `stmt`.
#[must_use]
pub fn can_parse_stmt(tree: &rt::Tree) -> bool {
    can_parse_if_stmt(tree) || can_parse_block(tree)
}

/// Parses rule `stmt`.
///
/// The first alternative whose membership test holds is parsed.
///
/// # Errors
///
/// Returns a [`rt::ShapeMismatch`] if `tree` does not conform.
pub fn parse_stmt(tree: &rt::Tree) -> Result<Box<dyn Stmt>, rt::ShapeMismatch> {
    if can_parse_if_stmt(tree) {
        let node: Box<dyn Stmt> = Box::new(parse_if_stmt(tree)?);
        return Ok(node);
    }
    if can_parse_block(tree) {
        let node: Box<dyn Stmt> = Box::new(parse_block(tree)?);
        return Ok(node);
    }
    Err(rt::ShapeMismatch::new(
        "stmt",
        rt::Mismatch::NoAlternative {
            found: tree.kind().to_owned(),
        },
    ))
}

/// Membership test for rule `ifStmt`.
#[must_use]
pub fn can_parse_if_stmt(tree: &rt::Tree) -> bool {
    tree.is(tokens::IF)
}

/// Parses rule `ifStmt`.
///
/// # Errors
///
/// Returns a [`rt::ShapeMismatch`] if `tree` does not conform.
pub fn parse_if_stmt(tree: &rt::Tree) -> Result<IfStmt, rt::ShapeMismatch> {
    const RULE: &str = "ifStmt";

    if !tree.is(tokens::IF) {
        return Err(rt::ShapeMismatch::new(
            RULE,
            rt::Mismatch::WrongKind {
                expected: tokens::IF.to_owned(),
                found: tree.kind().to_owned(),
            },
        ));
    }

    let rest = tree.children();
    let (cond, rest) = rt::take_one(RULE, "cond", rest, can_parse_expr, parse_expr)?;
    let (then_branch, rest) = rt::take_one(RULE, "thenBranch", rest, can_parse_stmt, parse_stmt)?;
    let (else_branch, rest) = rt::take_optional(rest, can_parse_stmt, parse_stmt)?;
    rt::finish(RULE, rest)?;
    Ok(IfStmt { cond, then_branch, else_branch })
}

/// Builds a `ifStmt` node from its field values.
#[must_use]
pub fn make_if_stmt(cond: Box<dyn Expr>, then_branch: Box<dyn Stmt>, else_branch: Option<Box<dyn Stmt>>) -> IfStmt {
    IfStmt { cond, then_branch, else_branch }
}

/// Membership test for rule `block`.
#[must_use]
pub fn can_parse_block(tree: &rt::Tree) -> bool {
    tree.is(tokens::BLOCK)
}

/// Parses rule `block`.
///
/// # Errors
///
/// Returns a [`rt::ShapeMismatch`] if `tree` does not conform.
pub fn parse_block(tree: &rt::Tree) -> Result<Block, rt::ShapeMismatch> {
    const RULE: &str = "block";

    if !tree.is(tokens::BLOCK) {
        return Err(rt::ShapeMismatch::new(
            RULE,
            rt::Mismatch::WrongKind {
                expected: tokens::BLOCK.to_owned(),
                found: tree.kind().to_owned(),
            },
        ));
    }

    let rest = tree.children();
    let (stmts, rest) = rt::take_many(rest, can_parse_stmt, parse_stmt)?;
    rt::finish(RULE, rest)?;
    Ok(Block { stmts })
}

/// Builds a `block` node from its field values.
#[must_use]
pub fn make_block(stmts: Vec<Box<dyn Stmt>>) -> Block {
    Block { stmts }
}

/// Membership test for rule `expr`.
#[must_use]
pub fn can_parse_expr(tree: &rt::Tree) -> bool {
    can_parse_ident(tree) || can_parse_paren(tree)
}

/// Parses rule `expr`.
///
/// The first alternative whose membership test holds is parsed.
///
/// # Errors
///
/// Returns a [`rt::ShapeMismatch`] if `tree` does not conform.
pub fn parse_expr(tree: &rt::Tree) -> Result<Box<dyn Expr>, rt::ShapeMismatch> {
    if can_parse_ident(tree) {
        let node: Box<dyn Expr> = Box::new(parse_ident(tree)?);
        return Ok(node);
    }
    if can_parse_paren(tree) {
        let node: Box<dyn Expr> = Box::new(parse_paren(tree)?);
        return Ok(node);
    }
    Err(rt::ShapeMismatch::new(
        "expr",
        rt::Mismatch::NoAlternative {
            found: tree.kind().to_owned(),
        },
    ))
}

/// Membership test for rule `ident`.
#[must_use]
pub fn can_parse_ident(tree: &rt::Tree) -> bool {
    tree.is(tokens::IDENT)
}

/// Parses rule `ident`.
///
/// # Errors
///
/// Returns a [`rt::ShapeMismatch`] if `tree` does not conform.
pub fn parse_ident(tree: &rt::Tree) -> Result<Ident, rt::ShapeMismatch> {
    const RULE: &str = "ident";

    if !tree.is(tokens::IDENT) {
        return Err(rt::ShapeMismatch::new(
            RULE,
            rt::Mismatch::WrongKind {
                expected: tokens::IDENT.to_owned(),
                found: tree.kind().to_owned(),
            },
        ));
    }

    let rest = tree.children();
    let name = rt::capture_text(RULE, "name", tree)?;
    rt::finish(RULE, rest)?;
    Ok(Ident { name })
}

/// Builds a `ident` node from its field values.
#[must_use]
pub fn make_ident(name: String) -> Ident {
    Ident { name }
}

/// Membership test for rule `paren`.
#[must_use]
pub fn can_parse_paren(tree: &rt::Tree) -> bool {
    can_parse_ident(tree)
}

/// Parses rule `paren`.
///
/// # Errors
///
/// Returns a [`rt::ShapeMismatch`] if `tree` does not conform.
pub fn parse_paren(tree: &rt::Tree) -> Result<Paren, rt::ShapeMismatch> {
    Ok(Paren { inner: Box::new(parse_ident(tree)?) })
}

/// Wraps a `ident` value as `paren`.
#[must_use]
pub fn make_paren(inner: Box<Ident>) -> Paren {
    Paren { inner }
}
