//! # The FIRRTL intermediate representation
//!
//! This library defines the in-memory representation of a FIRRTL circuit:
//! a tree of modules, ports, statements, expressions, and types rooted at a
//! [Circuit], together with the [traversal] framework that passes and
//! backends use to walk it.
//!
//! Every node is owned by its parent; references from expressions to
//! declarations are name lookups, not ownership. Nodes carry an optional
//! [Info] provenance annotation and an identifier that is non-empty exactly
//! when the node is a declaration.

mod common;
mod expr;
mod module;
mod stmt;
mod types;
pub mod traversal;

pub use common::{DeclId, Info};
pub use expr::{
    CondValid, ConstKind, Constant, Expr, Mux, Operation, PrimOp, Reference,
    SubAccess, SubField, SubIndex,
};
pub use module::{Circuit, Module, ModuleKind, ParamValue, Parameter, Port};
pub use stmt::{
    Conditional, ConditionalElse, Connect, Empty, Instance, Invalid, Memory,
    Node, Printf, Reg, RegReset, RuwFlag, Stmt, StmtGroup, Stop, Wire,
};
pub use types::{
    Direction, Field, Type, TypeBundle, TypeClock, TypeInt, TypeVector,
};
