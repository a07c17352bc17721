//! ASCII dump of the IR tree: one node per line, children one level deeper.
use crate::traits::Backend;
use firrtlator_ir as ir;
use firrtlator_ir::traversal::{VisResult, Visit, Visitable, Visitor};
use firrtlator_utils::{FirrtlatorResult, IndentWriter};
use itertools::Itertools;
use std::io::{self, Write};

#[derive(Default)]
pub struct TreeBackend;

impl Backend for TreeBackend {
    fn name() -> &'static str {
        "tree"
    }

    fn description() -> &'static str {
        "Dumps the IR tree in ASCII"
    }

    fn extensions() -> &'static [&'static str] {
        &["tree"]
    }

    fn run(
        &mut self,
        circuit: &mut ir::Circuit,
        out: &mut dyn io::Write,
    ) -> FirrtlatorResult<()> {
        let mut printer = Printer {
            w: IndentWriter::new(out),
        };
        circuit.visit(&mut printer)?;
        printer.w.flush()?;
        Ok(())
    }
}

fn info_suffix(info: &Option<ir::Info>) -> String {
    info.as_ref().map(|i| format!(" {}", i)).unwrap_or_default()
}

fn width_str(width: Option<u64>) -> String {
    width.map(|w| w.to_string()).unwrap_or_else(|| "?".to_string())
}

fn const_str(c: &ir::Constant) -> String {
    let base = if c.ty.signed { "SInt" } else { "UInt" };
    let width = c
        .ty
        .width
        .map(|w| format!("<{}>", w))
        .unwrap_or_default();
    match &c.value {
        ir::ConstKind::Int(v) => format!("{}{}({})", base, width, v),
        ir::ConstKind::Str(s) => format!("{}{}(\"{}\")", base, width, s),
    }
}

struct Printer<W: io::Write> {
    w: IndentWriter<W>,
}

macro_rules! dedent_on_leave {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            fn $name(&mut self, _: &mut $ty) -> FirrtlatorResult<()> {
                self.w.pop();
                Ok(())
            }
        )*
    };
}

impl<W: io::Write> Visitor for Printer<W> {
    fn enter_circuit(&mut self, c: &mut ir::Circuit) -> VisResult {
        writeln!(self.w, "(circuit) id={}{}", c.id, info_suffix(&c.info))?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_module(&mut self, m: &mut ir::Module) -> VisResult {
        writeln!(
            self.w,
            "(module) id={} external={}{}",
            m.id,
            m.is_external(),
            info_suffix(&m.info)
        )?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_port(&mut self, p: &mut ir::Port) -> VisResult {
        writeln!(
            self.w,
            "(port) id={}, dir={}{}",
            p.id,
            p.direction,
            info_suffix(&p.info)
        )?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_parameter(&mut self, p: &mut ir::Parameter) -> VisResult {
        writeln!(self.w, "(parameter) id={} value={}", p.id, p.value)?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_field(&mut self, f: &mut ir::Field) -> VisResult {
        writeln!(self.w, "(field) id={}, flipped={}", f.id, f.flip)?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_bundle(&mut self, _t: &mut ir::TypeBundle) -> VisResult {
        writeln!(self.w, "(type bundle)")?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_vector(&mut self, t: &mut ir::TypeVector) -> VisResult {
        writeln!(self.w, "(type vector) size={}", t.size)?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn visit_type_int(
        &mut self,
        t: &mut ir::TypeInt,
    ) -> FirrtlatorResult<()> {
        writeln!(
            self.w,
            "(type int) signed={}, width={}",
            t.signed,
            width_str(t.width)
        )?;
        Ok(())
    }

    fn visit_type_clock(
        &mut self,
        _t: &mut ir::TypeClock,
    ) -> FirrtlatorResult<()> {
        writeln!(self.w, "(type clock)")?;
        Ok(())
    }

    fn enter_group(&mut self, _g: &mut ir::StmtGroup) -> VisResult {
        writeln!(self.w, "(stmt group)")?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_wire(&mut self, s: &mut ir::Wire) -> VisResult {
        writeln!(self.w, "(wire) id={}{}", s.id, info_suffix(&s.info))?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_reg(&mut self, s: &mut ir::Reg) -> VisResult {
        writeln!(self.w, "(reg) id={}{}", s.id, info_suffix(&s.info))?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_memory(&mut self, s: &mut ir::Memory) -> VisResult {
        let mut attrs = String::new();
        if let Some(depth) = s.depth() {
            attrs.push_str(&format!(" depth={}", depth));
        }
        if let Some(latency) = s.read_latency() {
            attrs.push_str(&format!(" read-latency={}", latency));
        }
        if let Some(latency) = s.write_latency() {
            attrs.push_str(&format!(" write-latency={}", latency));
        }
        if let Some(ruw) = s.ruw() {
            attrs.push_str(&format!(" ruw={}", ruw));
        }
        if !s.readers().is_empty() {
            attrs.push_str(&format!(
                " readers={}",
                s.readers().iter().join(",")
            ));
        }
        if !s.writers().is_empty() {
            attrs.push_str(&format!(
                " writers={}",
                s.writers().iter().join(",")
            ));
        }
        if !s.read_writers().is_empty() {
            attrs.push_str(&format!(
                " readwriters={}",
                s.read_writers().iter().join(",")
            ));
        }
        writeln!(
            self.w,
            "(memory) id={}{}{}",
            s.id,
            attrs,
            info_suffix(&s.info)
        )?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_instance(&mut self, s: &mut ir::Instance) -> VisResult {
        writeln!(self.w, "(inst) id={}{}", s.id, info_suffix(&s.info))?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_node(&mut self, s: &mut ir::Node) -> VisResult {
        writeln!(self.w, "(node) id={}{}", s.id, info_suffix(&s.info))?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_connect(&mut self, s: &mut ir::Connect) -> VisResult {
        writeln!(self.w, "(connect) partial={}", s.partial)?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_invalid(&mut self, _s: &mut ir::Invalid) -> VisResult {
        writeln!(self.w, "(invalid)")?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_conditional(&mut self, _s: &mut ir::Conditional) -> VisResult {
        writeln!(self.w, "(when)")?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_conditional_else(
        &mut self,
        _s: &mut ir::ConditionalElse,
    ) -> VisResult {
        writeln!(self.w, "(else)")?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_stop(&mut self, s: &mut ir::Stop) -> VisResult {
        writeln!(self.w, "(stop) code={}", s.code)?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_printf(&mut self, s: &mut ir::Printf) -> VisResult {
        writeln!(self.w, "(printf) format=\"{}\"", s.format)?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn visit_empty(&mut self, _s: &mut ir::Empty) -> FirrtlatorResult<()> {
        writeln!(self.w, "(skip)")?;
        Ok(())
    }

    fn visit_reference(
        &mut self,
        e: &mut ir::Reference,
    ) -> FirrtlatorResult<()> {
        writeln!(self.w, "(ref) to={}", e.id)?;
        Ok(())
    }

    fn visit_constant(
        &mut self,
        e: &mut ir::Constant,
    ) -> FirrtlatorResult<()> {
        writeln!(self.w, "(const) value={}", const_str(e))?;
        Ok(())
    }

    fn enter_subfield(&mut self, e: &mut ir::SubField) -> VisResult {
        writeln!(self.w, "(subfield) field={}", e.field)?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_subindex(&mut self, e: &mut ir::SubIndex) -> VisResult {
        writeln!(self.w, "(subindex) index={}", e.index)?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_subaccess(&mut self, _e: &mut ir::SubAccess) -> VisResult {
        writeln!(self.w, "(subaccess)")?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_mux(&mut self, _e: &mut ir::Mux) -> VisResult {
        writeln!(self.w, "(mux)")?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_cond_valid(&mut self, _e: &mut ir::CondValid) -> VisResult {
        writeln!(self.w, "(condvalid)")?;
        self.w.push();
        Ok(Visit::Descend)
    }

    fn enter_primop(&mut self, e: &mut ir::PrimOp) -> VisResult {
        writeln!(self.w, "({})", e.op)?;
        self.w.push();
        Ok(Visit::Descend)
    }

    dedent_on_leave! {
        leave_circuit: ir::Circuit,
        leave_module: ir::Module,
        leave_port: ir::Port,
        leave_parameter: ir::Parameter,
        leave_field: ir::Field,
        leave_bundle: ir::TypeBundle,
        leave_vector: ir::TypeVector,
        leave_group: ir::StmtGroup,
        leave_wire: ir::Wire,
        leave_reg: ir::Reg,
        leave_memory: ir::Memory,
        leave_instance: ir::Instance,
        leave_node: ir::Node,
        leave_connect: ir::Connect,
        leave_invalid: ir::Invalid,
        leave_conditional: ir::Conditional,
        leave_conditional_else: ir::ConditionalElse,
        leave_stop: ir::Stop,
        leave_printf: ir::Printf,
        leave_subfield: ir::SubField,
        leave_subindex: ir::SubIndex,
        leave_subaccess: ir::SubAccess,
        leave_mux: ir::Mux,
        leave_cond_valid: ir::CondValid,
        leave_primop: ir::PrimOp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firrtlator_frontend::{FirrtlFrontend, Frontend};

    #[test]
    fn dumps_one_node_per_line() {
        let mut circuit = FirrtlFrontend::default()
            .parse(
                "test.fir",
                "circuit c :\n\
                 \x20 module m :\n\
                 \x20   input a : UInt<1>\n\
                 \x20   when a :\n\
                 \x20     skip\n",
            )
            .unwrap();
        let mut buf = Vec::new();
        TreeBackend.run(&mut circuit, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(
            out,
            "(circuit) id=c\n\
             \x20 (module) id=m external=false\n\
             \x20   (port) id=a, dir=input\n\
             \x20     (type int) signed=false, width=1\n\
             \x20   (stmt group)\n\
             \x20     (when)\n\
             \x20       (ref) to=a\n\
             \x20       (stmt group)\n\
             \x20         (skip)\n"
        );
    }

    #[test]
    fn memory_attributes_are_inline() {
        let mut circuit = FirrtlFrontend::default()
            .parse(
                "test.fir",
                "circuit c :\n\
                 \x20 module m :\n\
                 \x20   mem M :\n\
                 \x20     datatype => UInt<8>\n\
                 \x20     depth => 16\n\
                 \x20     reader => r0\n",
            )
            .unwrap();
        let mut buf = Vec::new();
        TreeBackend.run(&mut circuit, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("(memory) id=M depth=16 readers=r0"));
        assert!(out.contains("(type int) signed=false, width=8"));
    }
}
