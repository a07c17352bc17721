//! Graphviz dot rendering of the IR tree.
//!
//! The circuit is walked once into a directed graph whose node indices are
//! allocated in visit order; edges carry the role the child plays for its
//! parent (`cond`, `then`, `else`, `to`, `from`, `[i]`, ...). Building the
//! graph needs the parent at hand when an edge is labeled, which the
//! enter/leave protocol does not carry, so this backend recurses directly
//! instead of implementing the visitor hooks.
use crate::traits::Backend;
use firrtlator_ir as ir;
use firrtlator_utils::{FirrtlatorResult, IndentWriter};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::io::{self, Write};

#[derive(Default)]
pub struct DotBackend;

impl Backend for DotBackend {
    fn name() -> &'static str {
        "dot"
    }

    fn description() -> &'static str {
        "Generates graphviz dot files"
    }

    fn extensions() -> &'static [&'static str] {
        &["dot"]
    }

    fn run(
        &mut self,
        circuit: &mut ir::Circuit,
        out: &mut dyn io::Write,
    ) -> FirrtlatorResult<()> {
        let mut grapher = Grapher {
            graph: DiGraph::new(),
        };
        grapher.circuit(circuit);

        let mut w = IndentWriter::new(out);
        writeln!(w, "digraph {} {{", circuit.id)?;
        w.push();
        for idx in grapher.graph.node_indices() {
            writeln!(
                w,
                "{} [label=\"{}\"];",
                idx.index(),
                grapher.graph[idx]
            )?;
        }
        for edge in grapher.graph.edge_references() {
            write!(
                w,
                "{}->{}",
                edge.source().index(),
                edge.target().index()
            )?;
            if !edge.weight().is_empty() {
                write!(w, "[label=\"{}\"]", edge.weight())?;
            }
            writeln!(w, ";")?;
        }
        w.pop();
        writeln!(w, "}}")?;
        w.flush()?;
        Ok(())
    }
}

struct Grapher {
    graph: DiGraph<String, String>,
}

impl Grapher {
    fn node<S: ToString>(&mut self, label: S) -> NodeIndex {
        self.graph.add_node(label.to_string())
    }

    fn edge<S: ToString>(&mut self, from: NodeIndex, to: NodeIndex, role: S) {
        self.graph.add_edge(from, to, role.to_string());
    }

    fn circuit(&mut self, c: &ir::Circuit) {
        let node = self.node(format!("circuit\\n{}", c.id));
        for module in &c.modules {
            let child = self.module(module);
            self.edge(node, child, "");
        }
    }

    fn module(&mut self, m: &ir::Module) -> NodeIndex {
        let keyword = if m.is_external() { "extmodule" } else { "module" };
        let node = self.node(format!("{}\\n{}", keyword, m.id));
        for port in &m.ports {
            let child = self.node(format!("port\\n{}", port.id));
            self.edge(node, child, "");
        }
        match &m.kind {
            ir::ModuleKind::Internal { body } => {
                let child = self.group(body);
                self.edge(node, child, "");
            }
            ir::ModuleKind::External { parameters, .. } => {
                for param in parameters {
                    let child =
                        self.node(format!("parameter\\n{}", param.id));
                    self.edge(node, child, "");
                }
            }
        }
        node
    }

    fn group(&mut self, g: &ir::StmtGroup) -> NodeIndex {
        let node = self.node("stmt_group");
        for (i, stmt) in g.stmts.iter().enumerate() {
            let child = self.stmt(stmt);
            self.edge(node, child, format!("[{}]", i));
        }
        node
    }

    fn stmt(&mut self, stmt: &ir::Stmt) -> NodeIndex {
        match stmt {
            ir::Stmt::Wire(s) => self.node(format!("wire\\n{}", s.id)),
            ir::Stmt::Reg(s) => {
                let node = self.node(format!("reg\\n{}", s.id));
                let clock = self.expr(&s.clock);
                self.edge(node, clock, "clk");
                if let Some(reset) = &s.reset {
                    let trigger = self.expr(&reset.trigger);
                    self.edge(node, trigger, "reset");
                    let value = self.expr(&reset.value);
                    self.edge(node, value, "init");
                }
                node
            }
            ir::Stmt::Memory(s) => self.node(format!("memory\\n{}", s.id)),
            ir::Stmt::Instance(s) => {
                let node = self.node(format!("inst\\n{}", s.id));
                let of = self.node(format!("ref\\n{}", s.of.id));
                self.edge(node, of, "of");
                node
            }
            ir::Stmt::Node(s) => {
                let node = self.node(format!("node\\n{}", s.id));
                let value = self.expr(&s.value);
                self.edge(node, value, "");
                node
            }
            ir::Stmt::Connect(s) => {
                let node = self.node(if s.partial {
                    "partial connect"
                } else {
                    "connect"
                });
                let to = self.expr(&s.to);
                self.edge(node, to, "to");
                let from = self.expr(&s.from);
                self.edge(node, from, "from");
                node
            }
            ir::Stmt::Invalid(s) => {
                let node = self.node("invalid");
                let expr = self.expr(&s.expr);
                self.edge(node, expr, "");
                node
            }
            ir::Stmt::Conditional(s) => self.conditional(s),
            ir::Stmt::Stop(s) => {
                let node = self.node("stop");
                let clock = self.expr(&s.clock);
                self.edge(node, clock, "clk");
                let cond = self.expr(&s.cond);
                self.edge(node, cond, "cond");
                node
            }
            ir::Stmt::Printf(s) => {
                let node = self.node("printf");
                let clock = self.expr(&s.clock);
                self.edge(node, clock, "clk");
                let cond = self.expr(&s.cond);
                self.edge(node, cond, "cond");
                for (i, arg) in s.args.iter().enumerate() {
                    let child = self.expr(arg);
                    self.edge(node, child, format!("[{}]", i));
                }
                node
            }
            ir::Stmt::Empty(_) => self.node("skip"),
            ir::Stmt::Group(g) => self.group(g),
        }
    }

    fn conditional(&mut self, c: &ir::Conditional) -> NodeIndex {
        let node = self.node("conditional");
        let cond = self.expr(&c.cond);
        self.edge(node, cond, "cond");
        let then = self.group(&c.then);
        self.edge(node, then, "then");
        if let Some(otherwise) = &c.otherwise {
            let else_node = self.node("else");
            self.edge(node, else_node, "else");
            let body = self.group(&otherwise.body);
            self.edge(else_node, body, "");
        }
        node
    }

    fn expr(&mut self, expr: &ir::Expr) -> NodeIndex {
        match expr {
            ir::Expr::Ref(e) => self.node(format!("ref\\n{}", e.id)),
            ir::Expr::Const(_) => self.node("const"),
            ir::Expr::SubField(e) => {
                let node = self.node(format!("subfield\\n{}", e.field));
                let of = self.expr(&e.of);
                self.edge(node, of, "");
                node
            }
            ir::Expr::SubIndex(e) => {
                let node = self.node(format!("subindex\\n[{}]", e.index));
                let of = self.expr(&e.of);
                self.edge(node, of, "");
                node
            }
            ir::Expr::SubAccess(e) => {
                let node = self.node("subaccess");
                let of = self.expr(&e.of);
                self.edge(node, of, "");
                let index = self.expr(&e.index);
                self.edge(node, index, "index");
                node
            }
            ir::Expr::Mux(e) => {
                let node = self.node("mux");
                let sel = self.expr(&e.sel);
                self.edge(node, sel, "sel");
                let a = self.expr(&e.a);
                self.edge(node, a, "a");
                let b = self.expr(&e.b);
                self.edge(node, b, "b");
                node
            }
            ir::Expr::CondValid(e) => {
                let node = self.node("condvalid");
                let sel = self.expr(&e.sel);
                self.edge(node, sel, "sel");
                let a = self.expr(&e.a);
                self.edge(node, a, "a");
                node
            }
            ir::Expr::Prim(e) => {
                let node = self.node(e.op.to_string());
                for (i, operand) in e.operands.iter().enumerate() {
                    let child = self.expr(operand);
                    self.edge(node, child, format!("[{}]", i));
                }
                node
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firrtlator_frontend::{FirrtlFrontend, Frontend};

    #[test]
    fn emits_nodes_and_labeled_edges() {
        let mut circuit = FirrtlFrontend::default()
            .parse(
                "test.fir",
                "circuit c :\n\
                 \x20 module m :\n\
                 \x20   input a : UInt<1>\n\
                 \x20   output b : UInt<1>\n\
                 \x20   when a :\n\
                 \x20     b <= UInt<1>(1)\n",
            )
            .unwrap();
        let mut buf = Vec::new();
        DotBackend.run(&mut circuit, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.starts_with("digraph c {\n"));
        assert!(out.ends_with("}\n"));
        assert!(out.contains("0 [label=\"circuit\\nc\"];"));
        assert!(out.contains("[label=\"cond\"];"));
        assert!(out.contains("[label=\"then\"];"));
        assert!(out.contains("[label=\"to\"];"));
        assert!(out.contains("[label=\"from\"];"));
        assert!(out.contains("[label=\"[0]\"];"));
    }

    #[test]
    fn node_ids_are_sequential() {
        let mut circuit = FirrtlFrontend::default()
            .parse("test.fir", "circuit c :\n\x20 module m :\n\x20   skip\n")
            .unwrap();
        let mut buf = Vec::new();
        DotBackend.run(&mut circuit, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        for (i, line) in out
            .lines()
            .filter(|l| l.contains("[label=") && !l.contains("->"))
            .enumerate()
        {
            assert!(line.trim_start().starts_with(&i.to_string()));
        }
    }
}
