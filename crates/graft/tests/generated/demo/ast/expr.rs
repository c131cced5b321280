//! Rule `expr`: a capability shared by its alternatives.
//!
//! Generated by graft. Do not edit.

use graft::runtime as rt;

/// Anything that may stand where `expr` is expected.
///
/// Implemented by `ident`, `paren`.
pub trait Expr: rt::Unparse {}
