//! Helpers for traversing circuits.
mod action;
mod visitor;

pub use action::{VisResult, Visit};
pub use visitor::{Visitable, Visitor};
