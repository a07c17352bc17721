//! Define the PassManager structure that is used to register and run
//! passes.
use crate::traversal::Named;
use firrtlator_ir as ir;
use firrtlator_ir::traversal::{Visitable, Visitor};
use firrtlator_utils::{Error, FirrtlatorResult};
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Instant;

/// Top-level type for all passes that transform an [ir::Circuit].
pub type PassClosure = Box<dyn Fn(&mut ir::Circuit) -> FirrtlatorResult<()>>;

/// Structure that tracks all registered passes for the compiler.
#[derive(Default)]
pub struct PassManager {
    /// All registered passes
    passes: HashMap<String, PassClosure>,
    /// Help information for passes
    help: HashMap<String, String>,
}

impl PassManager {
    /// Register a new pass and return an error if another pass with the
    /// same name has already been registered.
    pub fn register_pass<Pass>(&mut self) -> FirrtlatorResult<()>
    where
        Pass: Visitor + Named + Default + 'static,
    {
        let name = Pass::name().to_string();
        if self.passes.contains_key(&name) {
            return Err(Error::registry(format!(
                "pass with name '{}' is already registered",
                name
            )));
        }
        let pass_closure: PassClosure = Box::new(|circuit| {
            let mut pass = Pass::default();
            circuit.visit(&mut pass)
        });
        self.passes.insert(name.clone(), pass_closure);
        self.help
            .insert(name.clone(), format!("- {}: {}", name, Pass::description()));
        Ok(())
    }

    /// Runs the named pass over the circuit in place.
    pub fn run(
        &self,
        name: &str,
        circuit: &mut ir::Circuit,
    ) -> FirrtlatorResult<()> {
        let pass = self.passes.get(name).ok_or_else(|| {
            Error::registry(format!("unknown pass: {}", name))
        })?;
        let start = Instant::now();
        pass(circuit)?;
        let elapsed = start.elapsed();
        // Warn if a pass takes suspiciously long.
        if elapsed.as_secs() > 5 {
            log::warn!("{name}: {}ms", elapsed.as_millis());
        } else {
            log::info!("{name}: {}ms", elapsed.as_millis());
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.passes.contains_key(name)
    }

    /// Return a string representation of all available passes. Appropriate
    /// for help text.
    pub fn complete_help(&self) -> String {
        let mut ret = String::new();
        for name in self.passes.keys().sorted() {
            writeln!(ret, "{}", self.help[name]).unwrap();
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::StripInfo;

    #[test]
    fn duplicate_pass_registration_is_rejected() {
        let mut pm = PassManager::default_passes().unwrap();
        assert!(pm.register_pass::<StripInfo>().unwrap_err().is_registry());
    }

    #[test]
    fn unknown_pass_is_an_error() {
        let pm = PassManager::default_passes().unwrap();
        let mut circuit = ir::Circuit::new("top");
        assert!(pm.run("lowerall", &mut circuit).unwrap_err().is_registry());
        assert!(pm.contains("stripinfo"));
        assert!(pm.complete_help().contains("stripinfo"));
    }
}
