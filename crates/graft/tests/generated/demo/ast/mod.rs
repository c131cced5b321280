//! Package `demo.ast`.
//!
//! Generated by graft. Do not edit.

mod stmt;
mod if_stmt;
mod block;
mod expr;
mod ident;
mod paren;
pub mod parser;

pub use stmt::Stmt;
pub use if_stmt::IfStmt;
pub use block::Block;
pub use expr::Expr;
pub use ident::Ident;
pub use paren::Paren;
