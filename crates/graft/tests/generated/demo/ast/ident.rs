//! Rule `ident`: `IDENT` nodes.
//!
//! Generated by graft. Do not edit.

use graft::runtime as rt;
use crate::tokens;
use super::Expr;

/// A node of kind `IDENT`.
#[derive(Debug)]
pub struct Ident {
    /// `name`: the node's text.
    pub name: String,
}

impl rt::Unparse for Ident {
    fn unparse(&self) -> Result<rt::Tree, rt::ShapeMismatch> {
        let mut tree = rt::Tree::new(tokens::IDENT);
        tree.set_text(Some(self.name.clone()));
        Ok(tree)
    }
}

impl Expr for Ident {}
