//! Rule `stmt`: a capability shared by its alternatives.
//!
//! Generated by graft. Do not edit.

use graft::runtime as rt;

/// Anything that may stand where `stmt` is expected.
///
/// Implemented by `ifStmt`, `block`.
pub trait Stmt: rt::Unparse {}
