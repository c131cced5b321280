//! Schema-driven shapes over generic syntax trees.
//!
//! Given a schema of node shapes, graft compiles, for every rule, a membership
//! test, a parser into a typed value, a constructor and a serializer back into
//! a generic [`Tree`]. The compiled [`Shapes`] run directly, and [`emit`]
//! renders the same plans as Rust source.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::multiple_crate_versions)]

/// The shape schema model and its JSON front end.
///
/// A schema is the single source of truth for everything graft produces: the
/// rules, their root tags and the exact grammar each expects of a node's
/// children.
pub mod schema;

/// Schema validation and consistency checking.
///
/// Validation runs before any compilation or emission, so that later stages
/// can rely on every reference resolving and the rule graph being acyclic.
pub mod validate;

/// The ancestor map behind alternative rules.
pub mod interfaces;

/// Runtime support shared by compiled shapes and generated code: the generic
/// tree, the quantifier engine and the mismatch error.
pub mod runtime;

/// Lowering rules into executable plans.
pub mod compile;

/// Rendering compiled plans as Rust source.
pub mod emit;

pub use compile::{ConstructError, Element, Field, FieldValue, Node, Shape, Shapes};
pub use emit::{emit, write_units, GenerateError, Unit};
pub use interfaces::Ancestors;
pub use runtime::{Mismatch, ShapeMismatch, Tree, Unparse};
pub use schema::{parse_schema, Schema, SchemaError};
pub use validate::{validate, ValidationError};
