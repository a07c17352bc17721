//! Round-trip-faithful FIRRTL text emitter.
//!
//! Statements emit their whole line and prune the traversal; groups and
//! conditionals recurse manually so nesting tracks the indentation writer.
//! Parsing the emitted text yields an IR equal to the one emitted.
use crate::traits::Backend;
use firrtlator_ir as ir;
use firrtlator_ir::traversal::{VisResult, Visit, Visitable, Visitor};
use firrtlator_utils::{Error, FirrtlatorResult, IndentWriter};
use std::io::{self, Write};

#[derive(Default)]
pub struct FirrtlBackend;

impl Backend for FirrtlBackend {
    fn name() -> &'static str {
        "firrtl"
    }

    fn description() -> &'static str {
        "Generates FIRRTL files"
    }

    fn extensions() -> &'static [&'static str] {
        &["fir"]
    }

    fn run(
        &mut self,
        circuit: &mut ir::Circuit,
        out: &mut dyn io::Write,
    ) -> FirrtlatorResult<()> {
        let mut emitter = Emitter {
            w: IndentWriter::new(out),
        };
        circuit.visit(&mut emitter)?;
        emitter.w.flush()?;
        Ok(())
    }
}

struct Emitter<W: io::Write> {
    w: IndentWriter<W>,
}

impl<W: io::Write> Emitter<W> {
    fn info(&mut self, info: &Option<ir::Info>) -> FirrtlatorResult<()> {
        if let Some(info) = info {
            write!(self.w, " {}", info)?;
        }
        Ok(())
    }

    fn int_ty(&mut self, ty: &ir::TypeInt) -> FirrtlatorResult<()> {
        write!(self.w, "{}", if ty.signed { "SInt" } else { "UInt" })?;
        if let Some(width) = ty.width {
            write!(self.w, "<{}>", width)?;
        }
        Ok(())
    }

    fn ty(&mut self, ty: &ir::Type) -> FirrtlatorResult<()> {
        match ty {
            ir::Type::Int(t) => self.int_ty(t)?,
            ir::Type::Clock(_) => write!(self.w, "Clock")?,
            ir::Type::Bundle(bundle) => {
                write!(self.w, "{{ ")?;
                for (i, field) in bundle.fields.iter().enumerate() {
                    if i != 0 {
                        write!(self.w, ", ")?;
                    }
                    if field.flip {
                        write!(self.w, "flip ")?;
                    }
                    write!(self.w, "{} : ", field.id)?;
                    self.ty(&field.ty)?;
                }
                write!(self.w, " }}")?;
            }
            ir::Type::Vector(vec) => {
                self.ty(&vec.ty)?;
                write!(self.w, "[{}]", vec.size)?;
            }
        }
        Ok(())
    }

    fn expr(&mut self, expr: &ir::Expr) -> FirrtlatorResult<()> {
        match expr {
            ir::Expr::Ref(r) => write!(self.w, "{}", r.id)?,
            ir::Expr::Const(c) => {
                self.int_ty(&c.ty)?;
                match &c.value {
                    ir::ConstKind::Int(v) => write!(self.w, "({})", v)?,
                    ir::ConstKind::Str(s) => write!(
                        self.w,
                        "(\"{}\")",
                        s.replace('"', "\"\"")
                    )?,
                }
            }
            ir::Expr::SubField(s) => {
                self.expr(&s.of)?;
                write!(self.w, ".{}", s.field)?;
            }
            ir::Expr::SubIndex(s) => {
                self.expr(&s.of)?;
                write!(self.w, "[{}]", s.index)?;
            }
            ir::Expr::SubAccess(s) => {
                self.expr(&s.of)?;
                write!(self.w, "[")?;
                self.expr(&s.index)?;
                write!(self.w, "]")?;
            }
            ir::Expr::Mux(m) => {
                write!(self.w, "mux(")?;
                self.expr(&m.sel)?;
                write!(self.w, ", ")?;
                self.expr(&m.a)?;
                write!(self.w, ", ")?;
                self.expr(&m.b)?;
                write!(self.w, ")")?;
            }
            ir::Expr::CondValid(c) => {
                write!(self.w, "validif(")?;
                self.expr(&c.sel)?;
                write!(self.w, ", ")?;
                self.expr(&c.a)?;
                write!(self.w, ")")?;
            }
            ir::Expr::Prim(p) => self.primop(p)?,
        }
        Ok(())
    }

    fn primop(&mut self, prim: &ir::PrimOp) -> FirrtlatorResult<()> {
        if !prim.is_complete() {
            return Err(Error::assertion(format!(
                "primitive operation `{}' is missing operands or parameters",
                prim.op
            )));
        }
        write!(self.w, "{}(", prim.op)?;
        for (i, operand) in prim.operands.iter().enumerate() {
            if i != 0 {
                write!(self.w, ", ")?;
            }
            self.expr(operand)?;
        }
        for param in &prim.params {
            write!(self.w, ", {}", param)?;
        }
        write!(self.w, ")")?;
        Ok(())
    }
}

impl<W: io::Write> Visitor for Emitter<W> {
    fn enter_circuit(&mut self, c: &mut ir::Circuit) -> VisResult {
        write!(self.w, "circuit {} :", c.id)?;
        self.info(&c.info)?;
        writeln!(self.w)?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn leave_circuit(&mut self, _c: &mut ir::Circuit) -> FirrtlatorResult<()> {
        self.w.pop();
        Ok(())
    }

    fn enter_module(&mut self, m: &mut ir::Module) -> VisResult {
        let keyword = if m.is_external() { "extmodule" } else { "module" };
        write!(self.w, "{} {} :", keyword, m.id)?;
        self.info(&m.info)?;
        writeln!(self.w)?;
        self.w.push();
        for port in &m.ports {
            write!(self.w, "{} {} : ", port.direction, port.id)?;
            self.ty(&port.ty)?;
            self.info(&port.info)?;
            writeln!(self.w)?;
        }
        match &mut m.kind {
            ir::ModuleKind::Internal { body } => body.visit(self)?,
            ir::ModuleKind::External {
                defname,
                parameters,
            } => {
                if let Some(defname) = defname {
                    writeln!(self.w, "defname = {}", defname)?;
                }
                for param in parameters.iter() {
                    writeln!(
                        self.w,
                        "parameter {} = {}",
                        param.id, param.value
                    )?;
                }
            }
        }
        Ok(Visit::Skip)
    }

    fn leave_module(&mut self, _m: &mut ir::Module) -> FirrtlatorResult<()> {
        self.w.pop();
        Ok(())
    }

    fn enter_wire(&mut self, s: &mut ir::Wire) -> VisResult {
        write!(self.w, "wire {} : ", s.id)?;
        self.ty(&s.ty)?;
        self.info(&s.info)?;
        writeln!(self.w)?;
        Ok(Visit::Skip)
    }

    fn enter_reg(&mut self, s: &mut ir::Reg) -> VisResult {
        write!(self.w, "reg {} : ", s.id)?;
        self.ty(&s.ty)?;
        write!(self.w, " ")?;
        self.expr(&s.clock)?;
        if let Some(reset) = &s.reset {
            write!(self.w, " with : ( reset => ( ")?;
            self.expr(&reset.trigger)?;
            write!(self.w, ", ")?;
            self.expr(&reset.value)?;
            write!(self.w, " ) )")?;
        }
        self.info(&s.info)?;
        writeln!(self.w)?;
        Ok(Visit::Skip)
    }

    fn enter_memory(&mut self, s: &mut ir::Memory) -> VisResult {
        write!(self.w, "mem {} :", s.id)?;
        self.info(&s.info)?;
        writeln!(self.w)?;
        self.w.push();
        if let Some(ty) = s.dtype() {
            write!(self.w, "datatype => ")?;
            self.ty(ty)?;
            writeln!(self.w)?;
        }
        if let Some(depth) = s.depth() {
            writeln!(self.w, "depth => {}", depth)?;
        }
        if let Some(latency) = s.read_latency() {
            writeln!(self.w, "read-latency => {}", latency)?;
        }
        if let Some(latency) = s.write_latency() {
            writeln!(self.w, "write-latency => {}", latency)?;
        }
        if let Some(ruw) = s.ruw() {
            writeln!(self.w, "read-under-write => {}", ruw)?;
        }
        for reader in s.readers() {
            writeln!(self.w, "reader => {}", reader)?;
        }
        for writer in s.writers() {
            writeln!(self.w, "writer => {}", writer)?;
        }
        for rw in s.read_writers() {
            writeln!(self.w, "readwriter => {}", rw)?;
        }
        self.w.pop();
        Ok(Visit::Skip)
    }

    fn enter_instance(&mut self, s: &mut ir::Instance) -> VisResult {
        write!(self.w, "inst {} of {}", s.id, s.of.id)?;
        self.info(&s.info)?;
        writeln!(self.w)?;
        Ok(Visit::Skip)
    }

    fn enter_node(&mut self, s: &mut ir::Node) -> VisResult {
        write!(self.w, "node {} = ", s.id)?;
        self.expr(&s.value)?;
        self.info(&s.info)?;
        writeln!(self.w)?;
        Ok(Visit::Skip)
    }

    fn enter_connect(&mut self, s: &mut ir::Connect) -> VisResult {
        self.expr(&s.to)?;
        write!(self.w, "{}", if s.partial { " <- " } else { " <= " })?;
        self.expr(&s.from)?;
        self.info(&s.info)?;
        writeln!(self.w)?;
        Ok(Visit::Skip)
    }

    fn enter_invalid(&mut self, s: &mut ir::Invalid) -> VisResult {
        self.expr(&s.expr)?;
        write!(self.w, " is invalid")?;
        self.info(&s.info)?;
        writeln!(self.w)?;
        Ok(Visit::Skip)
    }

    fn enter_conditional(&mut self, s: &mut ir::Conditional) -> VisResult {
        write!(self.w, "when ")?;
        self.expr(&s.cond)?;
        write!(self.w, " :")?;
        self.info(&s.info)?;
        writeln!(self.w)?;
        self.w.push();
        s.then.visit(self)?;
        self.w.pop();
        if let Some(otherwise) = s.otherwise.as_mut() {
            // `else when` chains continue on the same line
            let chains = otherwise.info.is_none()
                && otherwise.body.len() == 1
                && matches!(
                    otherwise.body.stmts[0],
                    ir::Stmt::Conditional(_)
                );
            if chains {
                write!(self.w, "else ")?;
                otherwise.body.stmts[0].visit(self)?;
            } else {
                write!(self.w, "else :")?;
                self.info(&otherwise.info)?;
                writeln!(self.w)?;
                self.w.push();
                otherwise.body.visit(self)?;
                self.w.pop();
            }
        }
        Ok(Visit::Skip)
    }

    fn enter_stop(&mut self, s: &mut ir::Stop) -> VisResult {
        write!(self.w, "stop(")?;
        self.expr(&s.clock)?;
        write!(self.w, ", ")?;
        self.expr(&s.cond)?;
        write!(self.w, ", {})", s.code)?;
        self.info(&s.info)?;
        writeln!(self.w)?;
        Ok(Visit::Skip)
    }

    fn enter_printf(&mut self, s: &mut ir::Printf) -> VisResult {
        write!(self.w, "printf(")?;
        self.expr(&s.clock)?;
        write!(self.w, ", ")?;
        self.expr(&s.cond)?;
        write!(self.w, ", \"{}\"", s.format.replace('"', "\"\""))?;
        for arg in &s.args {
            write!(self.w, ", ")?;
            self.expr(arg)?;
        }
        write!(self.w, ")")?;
        self.info(&s.info)?;
        writeln!(self.w)?;
        Ok(Visit::Skip)
    }

    fn visit_empty(&mut self, s: &mut ir::Empty) -> FirrtlatorResult<()> {
        write!(self.w, "skip")?;
        self.info(&s.info)?;
        writeln!(self.w)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firrtlator_frontend::{FirrtlFrontend, Frontend};

    fn parse(src: &str) -> ir::Circuit {
        FirrtlFrontend::default().parse("test.fir", src).unwrap()
    }

    fn emit(circuit: &mut ir::Circuit) -> String {
        let mut buf = Vec::new();
        FirrtlBackend.run(circuit, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn round_trip(src: &str) {
        let mut circuit = parse(src);
        let emitted = emit(&mut circuit);
        let reparsed = parse(&emitted);
        assert_eq!(circuit, reparsed, "emitted text:\n{}", emitted);
    }

    #[test]
    fn minimal_circuit_emits_itself() {
        let mut circuit = parse("circuit top :\n");
        assert_eq!(emit(&mut circuit), "circuit top :\n");
    }

    #[test]
    fn round_trips_a_when_else() {
        round_trip(
            "circuit c :\n\
             \x20 module m :\n\
             \x20   input a : UInt<1>\n\
             \x20   output b : UInt<1>\n\
             \x20   when a :\n\
             \x20     b <= UInt<1>(1)\n\
             \x20   else :\n\
             \x20     b <= UInt<1>(0)\n",
        );
    }

    #[test]
    fn round_trips_else_when_chains() {
        round_trip(
            "circuit c :\n\
             \x20 module m :\n\
             \x20   input a : UInt<1>\n\
             \x20   input b : UInt<1>\n\
             \x20   output o : UInt<1>\n\
             \x20   when a :\n\
             \x20     o <= UInt<1>(0)\n\
             \x20   else when b :\n\
             \x20     o <= UInt<1>(1)\n\
             \x20   else :\n\
             \x20     o <= UInt<1>(0)\n",
        );
    }

    #[test]
    fn round_trips_memories() {
        round_trip(
            "circuit c :\n\
             \x20 module m :\n\
             \x20   mem M :\n\
             \x20     datatype => UInt<8>\n\
             \x20     depth => 16\n\
             \x20     read-latency => 1\n\
             \x20     write-latency => 1\n\
             \x20     read-under-write => old\n\
             \x20     reader => r0\n\
             \x20     writer => w0\n",
        );
    }

    #[test]
    fn round_trips_expressions() {
        round_trip(
            "circuit c :\n\
             \x20 module m :\n\
             \x20   input v : { x : UInt<4> }[2]\n\
             \x20   node n = add(v[0].x, v[1].x)\n\
             \x20   node s = bits(shl(n, 2), 3, 1)\n\
             \x20   node t = mux(orr(n), n, s)\n\
             \x20   node u = validif(orr(n), t)\n",
        );
    }

    #[test]
    fn round_trips_extmodules() {
        round_trip(
            "circuit c :\n\
             \x20 extmodule m :\n\
             \x20   input clk : Clock\n\
             \x20   defname = foo\n\
             \x20   parameter WIDTH = 8\n\
             \x20   parameter NAME = \"mem\"\n",
        );
    }

    #[test]
    fn round_trips_regs_and_prints() {
        round_trip(
            "circuit c :\n\
             \x20 module m :\n\
             \x20   input clk : Clock\n\
             \x20   input rst : UInt<1>\n\
             \x20   reg r : UInt<8> clk with : ( reset => ( rst, UInt<8>(0) ) )\n\
             \x20   r is invalid\n\
             \x20   stop(clk, rst, 1)\n\
             \x20   printf(clk, rst, \"r = %d\", r)\n\
             \x20   skip\n",
        );
    }

    #[test]
    fn round_trips_infos() {
        round_trip(
            "circuit c : @[c.fir 1:1]\n\
             \x20 module m : @[c.fir 2:1]\n\
             \x20   input a : UInt<1> @[c.fir 3:1]\n\
             \x20   wire w : UInt<2> @[c.fir 4:1]\n\
             \x20   w <= a @[c.fir 5:1]\n",
        );
    }

    #[test]
    fn round_trips_a_composite_design() {
        round_trip(
            "circuit top : @[top.fir 1:1]\n\
             \x20 extmodule blackbox :\n\
             \x20   input clk : Clock\n\
             \x20   output q : UInt<8>\n\
             \x20   defname = BB\n\
             \x20   parameter WIDTH = 8\n\
             \x20 module top :\n\
             \x20   input clk : Clock\n\
             \x20   input sel : UInt<2>\n\
             \x20   input vec : { flip ready : UInt<1>, data : UInt<8> }[4]\n\
             \x20   output out : UInt<8>\n\
             \x20   inst bb of blackbox @[top.fir 9:1]\n\
             \x20   wire chosen : UInt<8>\n\
             \x20   chosen <= vec[sel].data\n\
             \x20   mem scratch :\n\
             \x20     datatype => UInt<8>\n\
             \x20     depth => 32\n\
             \x20     read-latency => 0\n\
             \x20     write-latency => 1\n\
             \x20     read-under-write => undefined\n\
             \x20     reader => r0\n\
             \x20     readwriter => rw0\n\
             \x20   node low = tail(chosen, 4)\n\
             \x20   when eq(sel, UInt<2>(0)) :\n\
             \x20     out <= bb.q\n\
             \x20   else when eq(sel, UInt<2>(1)) :\n\
             \x20     out <- chosen\n\
             \x20   else :\n\
             \x20     out <= pad(low, 8)\n",
        );
    }

    #[test]
    fn constants_preserve_their_written_form() {
        let mut circuit = parse(
            "circuit c :\n\
             \x20 module m :\n\
             \x20   node a = UInt<8>(42)\n\
             \x20   node b = UInt<8>(\"hF\")\n",
        );
        let emitted = emit(&mut circuit);
        assert!(emitted.contains("UInt<8>(42)"));
        assert!(emitted.contains("UInt<8>(\"hF\")"));
    }

    #[test]
    fn partial_connects_use_their_own_arrow() {
        let mut circuit = parse(
            "circuit c :\n\
             \x20 module m :\n\
             \x20   output o : { a : UInt<1> }\n\
             \x20   input i : { a : UInt<1> }\n\
             \x20   o <- i\n",
        );
        let emitted = emit(&mut circuit);
        assert!(emitted.contains("o <- i"));
        round_trip(&emitted);
    }

    #[test]
    fn incomplete_primop_fails_emission() {
        let mut circuit = ir::Circuit::new("c");
        let mut module = ir::Module::internal("m");
        module
            .add_stmt(ir::Stmt::Node(ir::Node {
                id: "n".into(),
                info: None,
                value: ir::Expr::Prim(ir::PrimOp::new(ir::Operation::Add)),
            }))
            .unwrap();
        circuit.add_module(module);
        let mut buf = Vec::new();
        assert!(FirrtlBackend.run(&mut circuit, &mut buf).is_err());
    }
}
