//! Rule `paren`: delegates to `ident`.
//!
//! Generated by graft. Do not edit.

use graft::runtime as rt;
use super::{Expr, Ident};

/// A `ident` value, seen as `paren`.
#[derive(Debug)]
pub struct Paren {
    /// The `ident` value.
    pub inner: Box<Ident>,
}

impl rt::Unparse for Paren {
    fn unparse(&self) -> Result<rt::Tree, rt::ShapeMismatch> {
        rt::Unparse::unparse(&*self.inner)
    }
}

impl Expr for Paren {}
