//! Rule `ifStmt`: `IF` nodes.
//!
//! Generated by graft. Do not edit.

use graft::runtime as rt;
use crate::tokens;
use super::{Expr, Stmt};

/// A node of kind `IF`.
#[derive(Debug)]
pub struct IfStmt {
    /// `cond`: one `expr`.
    pub cond: Box<dyn Expr>,
    /// `thenBranch`: one `stmt`.
    pub then_branch: Box<dyn Stmt>,
    /// `elseBranch`: an optional `stmt`.
    pub else_branch: Option<Box<dyn Stmt>>,
}

impl IfStmt {
    /// Whether `elseBranch` is present.
    #[must_use]
    pub fn has_else_branch(&self) -> bool {
        self.else_branch.is_some()
    }
}

impl rt::Unparse for IfStmt {
    fn unparse(&self) -> Result<rt::Tree, rt::ShapeMismatch> {
        let mut tree = rt::Tree::new(tokens::IF);
        tree.push(rt::Unparse::unparse(&*self.cond)?);
        tree.push(rt::Unparse::unparse(&*self.then_branch)?);
        if let Some(value) = &self.else_branch {
            tree.push(rt::Unparse::unparse(&**value)?);
        }
        Ok(tree)
    }
}

impl Stmt for IfStmt {}
