//! Removes the `@[...]` provenance annotation from every node.
use crate::traversal::Named;
use firrtlator_ir as ir;
use firrtlator_ir::traversal::{VisResult, Visit, Visitor};
use firrtlator_utils::FirrtlatorResult;

/// Clears the info annotation on every node that can carry one. Running the
/// pass twice is a no-op.
#[derive(Default)]
pub struct StripInfo;

impl Named for StripInfo {
    fn name() -> &'static str {
        "stripinfo"
    }

    fn description() -> &'static str {
        "Remove all info annotations"
    }
}

impl Visitor for StripInfo {
    fn enter_circuit(&mut self, c: &mut ir::Circuit) -> VisResult {
        c.info = None;
        Ok(Visit::Descend)
    }

    fn enter_module(&mut self, m: &mut ir::Module) -> VisResult {
        m.info = None;
        Ok(Visit::Descend)
    }

    fn enter_port(&mut self, p: &mut ir::Port) -> VisResult {
        p.info = None;
        Ok(Visit::Descend)
    }

    fn enter_wire(&mut self, s: &mut ir::Wire) -> VisResult {
        s.info = None;
        Ok(Visit::Descend)
    }

    fn enter_reg(&mut self, s: &mut ir::Reg) -> VisResult {
        s.info = None;
        Ok(Visit::Descend)
    }

    fn enter_memory(&mut self, s: &mut ir::Memory) -> VisResult {
        s.info = None;
        Ok(Visit::Descend)
    }

    fn enter_instance(&mut self, s: &mut ir::Instance) -> VisResult {
        s.info = None;
        Ok(Visit::Descend)
    }

    fn enter_node(&mut self, s: &mut ir::Node) -> VisResult {
        s.info = None;
        Ok(Visit::Descend)
    }

    fn enter_connect(&mut self, s: &mut ir::Connect) -> VisResult {
        s.info = None;
        Ok(Visit::Descend)
    }

    fn enter_invalid(&mut self, s: &mut ir::Invalid) -> VisResult {
        s.info = None;
        Ok(Visit::Descend)
    }

    fn enter_conditional(&mut self, s: &mut ir::Conditional) -> VisResult {
        s.info = None;
        Ok(Visit::Descend)
    }

    fn enter_conditional_else(
        &mut self,
        s: &mut ir::ConditionalElse,
    ) -> VisResult {
        s.info = None;
        Ok(Visit::Descend)
    }

    fn enter_stop(&mut self, s: &mut ir::Stop) -> VisResult {
        s.info = None;
        Ok(Visit::Descend)
    }

    fn enter_printf(&mut self, s: &mut ir::Printf) -> VisResult {
        s.info = None;
        Ok(Visit::Descend)
    }

    fn visit_empty(&mut self, s: &mut ir::Empty) -> FirrtlatorResult<()> {
        s.info = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firrtlator_frontend::{Frontend, FirrtlFrontend};
    use firrtlator_ir::traversal::Visitable;

    const SOURCE: &str = "circuit c : @[c.fir 1:1]\n\
                          \x20 module m : @[c.fir 2:1]\n\
                          \x20   input a : UInt<1> @[c.fir 3:1]\n\
                          \x20   when a : @[c.fir 4:1]\n\
                          \x20     skip @[c.fir 5:1]\n\
                          \x20   else : @[c.fir 6:1]\n\
                          \x20     skip @[c.fir 7:1]\n";

    /// Fails the traversal if any node still carries an info annotation.
    #[derive(Default)]
    struct InfoCensus {
        seen: usize,
    }

    impl Visitor for InfoCensus {
        fn enter_circuit(&mut self, c: &mut ir::Circuit) -> VisResult {
            self.seen += c.info.is_some() as usize;
            Ok(Visit::Descend)
        }
        fn enter_module(&mut self, m: &mut ir::Module) -> VisResult {
            self.seen += m.info.is_some() as usize;
            Ok(Visit::Descend)
        }
        fn enter_port(&mut self, p: &mut ir::Port) -> VisResult {
            self.seen += p.info.is_some() as usize;
            Ok(Visit::Descend)
        }
        fn enter_conditional(
            &mut self,
            s: &mut ir::Conditional,
        ) -> VisResult {
            self.seen += s.info.is_some() as usize;
            Ok(Visit::Descend)
        }
        fn enter_conditional_else(
            &mut self,
            s: &mut ir::ConditionalElse,
        ) -> VisResult {
            self.seen += s.info.is_some() as usize;
            Ok(Visit::Descend)
        }
        fn visit_empty(
            &mut self,
            s: &mut ir::Empty,
        ) -> FirrtlatorResult<()> {
            self.seen += s.info.is_some() as usize;
            Ok(())
        }
    }

    fn count_infos(circuit: &mut ir::Circuit) -> usize {
        let mut census = InfoCensus::default();
        circuit.visit(&mut census).unwrap();
        census.seen
    }

    #[test]
    fn strips_every_info() {
        let mut circuit =
            FirrtlFrontend::default().parse("test.fir", SOURCE).unwrap();
        assert_eq!(count_infos(&mut circuit), 7);
        circuit.visit(&mut StripInfo).unwrap();
        assert_eq!(count_infos(&mut circuit), 0);
    }

    #[test]
    fn stripping_twice_is_idempotent() {
        let mut circuit =
            FirrtlFrontend::default().parse("test.fir", SOURCE).unwrap();
        circuit.visit(&mut StripInfo).unwrap();
        let once = circuit.clone();
        circuit.visit(&mut StripInfo).unwrap();
        assert_eq!(circuit, once);
    }
}
