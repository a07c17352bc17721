//! Decisions that control the traversal of a circuit.
use firrtlator_utils::FirrtlatorResult;

/// Decision returned when entering a branch node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Descend into the node's children in declaration order.
    Descend,
    /// Prune the subtree. The matching leave hook still runs.
    Skip,
}

/// Result of entering a branch node.
pub type VisResult = FirrtlatorResult<Visit>;
