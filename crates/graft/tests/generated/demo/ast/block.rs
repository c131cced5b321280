//! Rule `block`: `BLOCK` nodes.
//!
//! Generated by graft. Do not edit.

use graft::runtime as rt;
use crate::tokens;
use super::Stmt;

/// A node of kind `BLOCK`.
#[derive(Debug)]
pub struct Block {
    /// `stmts`: zero or more `stmt`.
    pub stmts: Vec<Box<dyn Stmt>>,
}

impl rt::Unparse for Block {
    fn unparse(&self) -> Result<rt::Tree, rt::ShapeMismatch> {
        let mut tree = rt::Tree::new(tokens::BLOCK);
        for value in &self.stmts {
            tree.push(rt::Unparse::unparse(&**value)?);
        }
        Ok(tree)
    }
}

impl Stmt for Block {}
