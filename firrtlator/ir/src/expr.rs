//! Expressions: references, constants, aggregate accessors, and the
//! primitive-operation algebra.
use crate::{DeclId, TypeInt};
use firrtlator_utils::{Error, FirrtlatorResult, Id};
use smallvec::SmallVec;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ref(Reference),
    Const(Constant),
    SubField(SubField),
    SubIndex(SubIndex),
    SubAccess(SubAccess),
    Mux(Mux),
    CondValid(CondValid),
    Prim(PrimOp),
}

/// A use of a declared name. `target` is a lookup relation, never ownership;
/// it stays `None` until a resolution pass populates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub id: Id,
    pub target: Option<DeclId>,
}

impl Reference {
    pub fn new<I: Into<Id>>(id: I) -> Self {
        Self {
            id: id.into(),
            target: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}

/// An integer constant such as `UInt<8>(42)` or `SInt("hF")`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub ty: TypeInt,
    pub value: ConstKind,
}

/// The literal form the constant was written in. Re-emission preserves it:
/// an integer literal prints as an integer, a bit/hex literal as a quoted
/// string.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstKind {
    Int(i64),
    Str(String),
}

/// `of.field`
#[derive(Debug, Clone, PartialEq)]
pub struct SubField {
    pub of: Box<Expr>,
    pub field: Id,
}

/// `of[3]`
#[derive(Debug, Clone, PartialEq)]
pub struct SubIndex {
    pub of: Box<Expr>,
    pub index: u64,
}

/// `of[expr]`
#[derive(Debug, Clone, PartialEq)]
pub struct SubAccess {
    pub of: Box<Expr>,
    pub index: Box<Expr>,
}

/// `mux(sel, a, b)`
#[derive(Debug, Clone, PartialEq)]
pub struct Mux {
    pub sel: Box<Expr>,
    pub a: Box<Expr>,
    pub b: Box<Expr>,
}

/// `validif(sel, a)`
#[derive(Debug, Clone, PartialEq)]
pub struct CondValid {
    pub sel: Box<Expr>,
    pub a: Box<Expr>,
}

/// The closed set of primitive operations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Leq,
    Gt,
    Geq,
    Eq,
    Neq,
    Pad,
    #[strum(serialize = "asUInt")]
    AsUInt,
    #[strum(serialize = "asSInt")]
    AsSInt,
    #[strum(serialize = "asClock")]
    AsClock,
    Shl,
    Shr,
    Dshl,
    Dshr,
    Cvt,
    Neg,
    Not,
    And,
    Or,
    Xor,
    Andr,
    Orr,
    Xorr,
    Cat,
    Bits,
    Head,
    Tail,
}

impl Operation {
    /// Fixed (operand count, integer-parameter count) of the operation.
    pub fn arity(self) -> (usize, usize) {
        use Operation::*;
        match self {
            Add | Sub | Mul | Div | Mod | Lt | Leq | Gt | Geq | Eq | Neq
            | Dshl | Dshr | And | Or | Xor | Cat => (2, 0),
            AsUInt | AsSInt | AsClock | Cvt | Neg | Not | Andr | Orr
            | Xorr => (1, 0),
            Pad | Shl | Shr | Head | Tail => (1, 1),
            Bits => (1, 2),
        }
    }

    pub fn num_operands(self) -> usize {
        self.arity().0
    }

    pub fn num_params(self) -> usize {
        self.arity().1
    }
}

/// A primitive operation applied to expression operands and integer
/// parameters, e.g. `add(a, b)` or `bits(x, 7, 4)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimOp {
    pub op: Operation,
    pub operands: Vec<Expr>,
    pub params: SmallVec<[u64; 2]>,
}

impl PrimOp {
    pub fn new(op: Operation) -> Self {
        Self {
            op,
            operands: Vec::new(),
            params: SmallVec::new(),
        }
    }

    /// Appends an operand. Exceeding the operation's declared operand count
    /// is rejected.
    pub fn push_operand(&mut self, operand: Expr) -> FirrtlatorResult<()> {
        if self.operands.len() == self.op.num_operands() {
            return Err(Error::semantic(format!(
                "too many operands for `{}'",
                self.op
            )));
        }
        self.operands.push(operand);
        Ok(())
    }

    /// Appends an integer parameter. Exceeding the operation's declared
    /// parameter count is rejected.
    pub fn push_param(&mut self, param: u64) -> FirrtlatorResult<()> {
        if self.params.len() == self.op.num_params() {
            return Err(Error::semantic(format!(
                "too many parameters for `{}'",
                self.op
            )));
        }
        self.params.push(param);
        Ok(())
    }

    /// True once operand and parameter counts both match the declared arity.
    /// Emission requires this.
    pub fn is_complete(&self) -> bool {
        self.operands.len() == self.op.num_operands()
            && self.params.len() == self.op.num_params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn operation_names_round_trip() {
        for op in Operation::iter() {
            assert_eq!(Operation::from_str(&op.to_string()).unwrap(), op);
        }
        assert_eq!(Operation::from_str("asUInt").unwrap(), Operation::AsUInt);
        assert_eq!(Operation::from_str("add").unwrap(), Operation::Add);
        assert!(Operation::from_str("frob").is_err());
    }

    #[test]
    fn arity_table() {
        assert_eq!(Operation::Add.arity(), (2, 0));
        assert_eq!(Operation::Pad.arity(), (1, 1));
        assert_eq!(Operation::Bits.arity(), (1, 2));
        assert_eq!(Operation::Xorr.arity(), (1, 0));
        assert_eq!(Operation::Cat.arity(), (2, 0));
        assert_eq!(Operation::iter().count(), 31);
    }

    #[test]
    fn operand_overflow_is_rejected() {
        let mut op = PrimOp::new(Operation::Neg);
        op.push_operand(Expr::Ref(Reference::new("a"))).unwrap();
        assert!(!op.is_complete() || op.op.num_params() == 0);
        let err = op
            .push_operand(Expr::Ref(Reference::new("b")))
            .unwrap_err();
        assert!(err.is_semantic());
    }

    #[test]
    fn param_overflow_is_rejected() {
        let mut op = PrimOp::new(Operation::Bits);
        op.push_operand(Expr::Ref(Reference::new("x"))).unwrap();
        op.push_param(7).unwrap();
        op.push_param(4).unwrap();
        assert!(op.is_complete());
        assert!(op.push_param(0).unwrap_err().is_semantic());
    }
}
