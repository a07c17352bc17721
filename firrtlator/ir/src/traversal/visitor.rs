//! Implements the visitor protocol for the IR tree.
//!
//! Branch nodes get an `enter_*`/`leave_*` pair: `enter_*` decides whether
//! the traversal descends into the node's children, and `leave_*` runs
//! afterwards regardless of that decision. Leaf nodes (integer and clock
//! types, references, constants, and `skip`) get a single `visit_*` hook.
//! Children are visited in declaration order; the order for each node is
//! fixed by the `Visitable` implementations below.
use super::{VisResult, Visit};
use crate::{
    Circuit, CondValid, Conditional, ConditionalElse, Connect, Constant,
    Empty, Expr, Field, Instance, Invalid, Memory, Module, ModuleKind, Mux,
    Node, Parameter, Port, PrimOp, Printf, Reference, Reg, Stmt, StmtGroup,
    Stop, SubAccess, SubField, SubIndex, Type, TypeBundle, TypeClock,
    TypeInt, TypeVector, Wire,
};
use firrtlator_utils::FirrtlatorResult;

/// The visiting interface for a [Circuit]. A visitor usually overrides a
/// handful of hooks and relies on the defaults to keep walking.
pub trait Visitor {
    fn enter_circuit(&mut self, _c: &mut Circuit) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_circuit(&mut self, _c: &mut Circuit) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_module(&mut self, _m: &mut Module) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_module(&mut self, _m: &mut Module) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_port(&mut self, _p: &mut Port) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_port(&mut self, _p: &mut Port) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_parameter(&mut self, _p: &mut Parameter) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_parameter(&mut self, _p: &mut Parameter) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_field(&mut self, _f: &mut Field) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_field(&mut self, _f: &mut Field) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_bundle(&mut self, _t: &mut TypeBundle) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_bundle(&mut self, _t: &mut TypeBundle) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_vector(&mut self, _t: &mut TypeVector) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_vector(&mut self, _t: &mut TypeVector) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn visit_type_int(&mut self, _t: &mut TypeInt) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn visit_type_clock(
        &mut self,
        _t: &mut TypeClock,
    ) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_group(&mut self, _g: &mut StmtGroup) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_group(&mut self, _g: &mut StmtGroup) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_wire(&mut self, _s: &mut Wire) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_wire(&mut self, _s: &mut Wire) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_reg(&mut self, _s: &mut Reg) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_reg(&mut self, _s: &mut Reg) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_memory(&mut self, _s: &mut Memory) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_memory(&mut self, _s: &mut Memory) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_instance(&mut self, _s: &mut Instance) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_instance(&mut self, _s: &mut Instance) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_node(&mut self, _s: &mut Node) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_node(&mut self, _s: &mut Node) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_connect(&mut self, _s: &mut Connect) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_connect(&mut self, _s: &mut Connect) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_invalid(&mut self, _s: &mut Invalid) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_invalid(&mut self, _s: &mut Invalid) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_conditional(&mut self, _s: &mut Conditional) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_conditional(
        &mut self,
        _s: &mut Conditional,
    ) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_conditional_else(
        &mut self,
        _s: &mut ConditionalElse,
    ) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_conditional_else(
        &mut self,
        _s: &mut ConditionalElse,
    ) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_stop(&mut self, _s: &mut Stop) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_stop(&mut self, _s: &mut Stop) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_printf(&mut self, _s: &mut Printf) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_printf(&mut self, _s: &mut Printf) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn visit_empty(&mut self, _s: &mut Empty) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn visit_reference(
        &mut self,
        _e: &mut Reference,
    ) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn visit_constant(&mut self, _e: &mut Constant) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_subfield(&mut self, _e: &mut SubField) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_subfield(&mut self, _e: &mut SubField) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_subindex(&mut self, _e: &mut SubIndex) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_subindex(&mut self, _e: &mut SubIndex) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_subaccess(&mut self, _e: &mut SubAccess) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_subaccess(
        &mut self,
        _e: &mut SubAccess,
    ) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_mux(&mut self, _e: &mut Mux) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_mux(&mut self, _e: &mut Mux) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_cond_valid(&mut self, _e: &mut CondValid) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_cond_valid(
        &mut self,
        _e: &mut CondValid,
    ) -> FirrtlatorResult<()> {
        Ok(())
    }

    fn enter_primop(&mut self, _e: &mut PrimOp) -> VisResult {
        Ok(Visit::Descend)
    }
    fn leave_primop(&mut self, _e: &mut PrimOp) -> FirrtlatorResult<()> {
        Ok(())
    }
}

/// Describes types that can be visited by things implementing [Visitor].
/// This performs a recursive walk of the tree: `enter_*` on the way down,
/// `leave_*` on the way up.
pub trait Visitable {
    /// Perform the traversal.
    fn visit(&mut self, visitor: &mut dyn Visitor) -> FirrtlatorResult<()>;
}

/// Blanket implementation for vectors of visitables.
impl<V: Visitable> Visitable for Vec<V> {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> FirrtlatorResult<()> {
        for v in self {
            v.visit(visitor)?;
        }
        Ok(())
    }
}

impl Visitable for Circuit {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> FirrtlatorResult<()> {
        if let Visit::Descend = visitor.enter_circuit(self)? {
            self.modules.visit(visitor)?;
        }
        visitor.leave_circuit(self)
    }
}

impl Visitable for Module {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> FirrtlatorResult<()> {
        if let Visit::Descend = visitor.enter_module(self)? {
            self.ports.visit(visitor)?;
            match &mut self.kind {
                ModuleKind::Internal { body } => body.visit(visitor)?,
                ModuleKind::External { parameters, .. } => {
                    parameters.visit(visitor)?
                }
            }
        }
        visitor.leave_module(self)
    }
}

impl Visitable for Port {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> FirrtlatorResult<()> {
        if let Visit::Descend = visitor.enter_port(self)? {
            self.ty.visit(visitor)?;
        }
        visitor.leave_port(self)
    }
}

impl Visitable for Parameter {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> FirrtlatorResult<()> {
        visitor.enter_parameter(self)?;
        visitor.leave_parameter(self)
    }
}

impl Visitable for Type {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> FirrtlatorResult<()> {
        match self {
            Type::Int(t) => visitor.visit_type_int(t),
            Type::Clock(t) => visitor.visit_type_clock(t),
            Type::Bundle(t) => {
                if let Visit::Descend = visitor.enter_bundle(t)? {
                    t.fields.visit(visitor)?;
                }
                visitor.leave_bundle(t)
            }
            Type::Vector(t) => {
                if let Visit::Descend = visitor.enter_vector(t)? {
                    t.ty.visit(visitor)?;
                }
                visitor.leave_vector(t)
            }
        }
    }
}

impl Visitable for Field {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> FirrtlatorResult<()> {
        if let Visit::Descend = visitor.enter_field(self)? {
            self.ty.visit(visitor)?;
        }
        visitor.leave_field(self)
    }
}

impl Visitable for StmtGroup {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> FirrtlatorResult<()> {
        if let Visit::Descend = visitor.enter_group(self)? {
            self.stmts.visit(visitor)?;
        }
        visitor.leave_group(self)
    }
}

impl Visitable for Stmt {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> FirrtlatorResult<()> {
        match self {
            Stmt::Wire(s) => {
                if let Visit::Descend = visitor.enter_wire(s)? {
                    s.ty.visit(visitor)?;
                }
                visitor.leave_wire(s)
            }
            Stmt::Reg(s) => {
                if let Visit::Descend = visitor.enter_reg(s)? {
                    s.ty.visit(visitor)?;
                    s.clock.visit(visitor)?;
                    if let Some(reset) = s.reset.as_mut() {
                        reset.trigger.visit(visitor)?;
                        reset.value.visit(visitor)?;
                    }
                }
                visitor.leave_reg(s)
            }
            Stmt::Memory(s) => {
                if let Visit::Descend = visitor.enter_memory(s)? {
                    if let Some(ty) = s.dtype_mut() {
                        ty.visit(visitor)?;
                    }
                }
                visitor.leave_memory(s)
            }
            Stmt::Instance(s) => {
                if let Visit::Descend = visitor.enter_instance(s)? {
                    visitor.visit_reference(&mut s.of)?;
                }
                visitor.leave_instance(s)
            }
            Stmt::Node(s) => {
                if let Visit::Descend = visitor.enter_node(s)? {
                    s.value.visit(visitor)?;
                }
                visitor.leave_node(s)
            }
            Stmt::Connect(s) => {
                if let Visit::Descend = visitor.enter_connect(s)? {
                    s.to.visit(visitor)?;
                    s.from.visit(visitor)?;
                }
                visitor.leave_connect(s)
            }
            Stmt::Invalid(s) => {
                if let Visit::Descend = visitor.enter_invalid(s)? {
                    s.expr.visit(visitor)?;
                }
                visitor.leave_invalid(s)
            }
            Stmt::Conditional(s) => {
                if let Visit::Descend = visitor.enter_conditional(s)? {
                    s.cond.visit(visitor)?;
                    s.then.visit(visitor)?;
                    if let Some(otherwise) = s.otherwise.as_mut() {
                        otherwise.visit(visitor)?;
                    }
                }
                visitor.leave_conditional(s)
            }
            Stmt::Stop(s) => {
                if let Visit::Descend = visitor.enter_stop(s)? {
                    s.clock.visit(visitor)?;
                    s.cond.visit(visitor)?;
                }
                visitor.leave_stop(s)
            }
            Stmt::Printf(s) => {
                if let Visit::Descend = visitor.enter_printf(s)? {
                    s.clock.visit(visitor)?;
                    s.cond.visit(visitor)?;
                    s.args.visit(visitor)?;
                }
                visitor.leave_printf(s)
            }
            Stmt::Empty(s) => visitor.visit_empty(s),
            Stmt::Group(g) => g.visit(visitor),
        }
    }
}

impl Visitable for ConditionalElse {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> FirrtlatorResult<()> {
        if let Visit::Descend = visitor.enter_conditional_else(self)? {
            self.body.visit(visitor)?;
        }
        visitor.leave_conditional_else(self)
    }
}

impl Visitable for Expr {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> FirrtlatorResult<()> {
        match self {
            Expr::Ref(e) => visitor.visit_reference(e),
            Expr::Const(e) => visitor.visit_constant(e),
            Expr::SubField(e) => {
                if let Visit::Descend = visitor.enter_subfield(e)? {
                    e.of.visit(visitor)?;
                }
                visitor.leave_subfield(e)
            }
            Expr::SubIndex(e) => {
                if let Visit::Descend = visitor.enter_subindex(e)? {
                    e.of.visit(visitor)?;
                }
                visitor.leave_subindex(e)
            }
            Expr::SubAccess(e) => {
                if let Visit::Descend = visitor.enter_subaccess(e)? {
                    e.of.visit(visitor)?;
                    e.index.visit(visitor)?;
                }
                visitor.leave_subaccess(e)
            }
            Expr::Mux(e) => {
                if let Visit::Descend = visitor.enter_mux(e)? {
                    e.sel.visit(visitor)?;
                    e.a.visit(visitor)?;
                    e.b.visit(visitor)?;
                }
                visitor.leave_mux(e)
            }
            Expr::CondValid(e) => {
                if let Visit::Descend = visitor.enter_cond_valid(e)? {
                    e.sel.visit(visitor)?;
                    e.a.visit(visitor)?;
                }
                visitor.leave_cond_valid(e)
            }
            Expr::Prim(e) => {
                if let Visit::Descend = visitor.enter_primop(e)? {
                    e.operands.visit(visitor)?;
                }
                visitor.leave_primop(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, TypeInt};

    /// Counts every hook invocation, pairing enters with leaves.
    #[derive(Default)]
    struct Counter {
        enters: usize,
        leaves: usize,
        leaves_after_skip: usize,
        skip_wires: bool,
    }

    impl Visitor for Counter {
        fn enter_circuit(&mut self, _: &mut Circuit) -> VisResult {
            self.enters += 1;
            Ok(Visit::Descend)
        }
        fn leave_circuit(&mut self, _: &mut Circuit) -> FirrtlatorResult<()> {
            self.leaves += 1;
            Ok(())
        }
        fn enter_module(&mut self, _: &mut Module) -> VisResult {
            self.enters += 1;
            Ok(Visit::Descend)
        }
        fn leave_module(&mut self, _: &mut Module) -> FirrtlatorResult<()> {
            self.leaves += 1;
            Ok(())
        }
        fn enter_wire(&mut self, _: &mut Wire) -> VisResult {
            self.enters += 1;
            if self.skip_wires {
                Ok(Visit::Skip)
            } else {
                Ok(Visit::Descend)
            }
        }
        fn leave_wire(&mut self, _: &mut Wire) -> FirrtlatorResult<()> {
            self.leaves_after_skip += 1;
            Ok(())
        }
        fn visit_type_int(
            &mut self,
            _: &mut TypeInt,
        ) -> FirrtlatorResult<()> {
            self.enters += 1;
            Ok(())
        }
    }

    fn sample() -> Circuit {
        let mut circuit = Circuit::new("top");
        let mut module = Module::internal("m");
        module.add_port(Port::new(
            "a",
            Direction::Input,
            Type::Int(TypeInt::with_width(false, 1)),
        ));
        module
            .add_stmt(Stmt::Wire(Wire {
                id: "w".into(),
                info: None,
                ty: Type::Int(TypeInt::with_width(false, 8)),
            }))
            .unwrap();
        circuit.add_module(module);
        circuit
    }

    #[test]
    fn enter_and_leave_pair_up() {
        let mut circuit = sample();
        let mut counter = Counter::default();
        circuit.visit(&mut counter).unwrap();
        // circuit, module, wire, and two int types (port + wire)
        assert_eq!(counter.enters, 5);
        assert_eq!(counter.leaves, 2);
        assert_eq!(counter.leaves_after_skip, 1);
    }

    #[test]
    fn skip_prunes_children_but_still_leaves() {
        let mut circuit = sample();
        let mut counter = Counter {
            skip_wires: true,
            ..Counter::default()
        };
        circuit.visit(&mut counter).unwrap();
        // the wire's int type is pruned, the port's is not
        assert_eq!(counter.enters, 4);
        assert_eq!(counter.leaves_after_skip, 1);
    }
}
