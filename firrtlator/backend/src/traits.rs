//! The backend trait and the name/extension-indexed backend registry.
use firrtlator_ir as ir;
use firrtlator_utils::{Error, FirrtlatorResult};
use linked_hash_map::LinkedHashMap;
use std::io;

/// A code generator fed with the circuit to emit. Backends traverse the IR
/// but must not change it.
pub trait Backend {
    fn name() -> &'static str
    where
        Self: Sized;
    fn description() -> &'static str
    where
        Self: Sized;
    /// File extensions this backend claims.
    fn extensions() -> &'static [&'static str]
    where
        Self: Sized;
    fn run(
        &mut self,
        circuit: &mut ir::Circuit,
        out: &mut dyn io::Write,
    ) -> FirrtlatorResult<()>;
}

/// Catalogue entry describing a registered backend.
#[derive(Debug, Clone)]
pub struct BackendDescriptor {
    pub name: String,
    pub description: String,
    pub extensions: Vec<String>,
}

type EmitFn =
    Box<dyn Fn(&mut ir::Circuit, &mut dyn io::Write) -> FirrtlatorResult<()>>;

struct BackendEntry {
    descriptor: BackendDescriptor,
    emit: EmitFn,
}

/// Registry of backends, keyed by name. Registration order is preserved for
/// catalogue output; duplicate names are rejected.
#[derive(Default)]
pub struct BackendRegistry {
    entries: LinkedHashMap<String, BackendEntry>,
}

impl BackendRegistry {
    /// Registers every built-in backend.
    pub fn with_builtins() -> FirrtlatorResult<Self> {
        let mut registry = Self::default();
        registry.register::<crate::FirrtlBackend>()?;
        registry.register::<crate::TreeBackend>()?;
        registry.register::<crate::DotBackend>()?;
        Ok(registry)
    }

    pub fn register<B>(&mut self) -> FirrtlatorResult<()>
    where
        B: Backend + Default + 'static,
    {
        let name = B::name().to_string();
        if self.entries.contains_key(&name) {
            return Err(Error::registry(format!(
                "backend `{}' is already registered",
                name
            )));
        }
        let descriptor = BackendDescriptor {
            name: name.clone(),
            description: B::description().to_string(),
            extensions: B::extensions()
                .iter()
                .map(|e| e.to_string())
                .collect(),
        };
        let emit: EmitFn = Box::new(|circuit, out| {
            let mut backend = B::default();
            backend.run(circuit, out)
        });
        self.entries.insert(name, BackendEntry { descriptor, emit });
        Ok(())
    }

    /// Runs the named backend, writing its artifact to `out`.
    pub fn emit(
        &self,
        name: &str,
        circuit: &mut ir::Circuit,
        out: &mut dyn io::Write,
    ) -> FirrtlatorResult<()> {
        let entry = self.entries.get(name).ok_or_else(|| {
            Error::registry(format!("unknown backend: {}", name))
        })?;
        log::debug!("emitting circuit `{}' with backend `{}'", circuit.id, name);
        (entry.emit)(circuit, out)
    }

    pub fn descriptors(&self) -> Vec<BackendDescriptor> {
        self.entries
            .values()
            .map(|e| e.descriptor.clone())
            .collect()
    }

    /// Maps a file extension to the name of the backend claiming it.
    pub fn find_by_extension(&self, ext: &str) -> FirrtlatorResult<String> {
        self.entries
            .values()
            .find(|e| e.descriptor.extensions.iter().any(|x| x == ext))
            .map(|e| e.descriptor.name.clone())
            .ok_or_else(|| {
                Error::registry(format!(
                    "cannot find a backend for `{}' files",
                    ext
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_and_extension_dispatch() {
        let registry = BackendRegistry::with_builtins().unwrap();
        let names: Vec<String> = registry
            .descriptors()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, ["firrtl", "tree", "dot"]);
        assert_eq!(registry.find_by_extension("fir").unwrap(), "firrtl");
        assert_eq!(registry.find_by_extension("tree").unwrap(), "tree");
        assert_eq!(registry.find_by_extension("dot").unwrap(), "dot");
        assert!(registry.find_by_extension("v").unwrap_err().is_registry());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = BackendRegistry::with_builtins().unwrap();
        assert!(registry
            .register::<crate::FirrtlBackend>()
            .unwrap_err()
            .is_registry());
    }
}
