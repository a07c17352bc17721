//! Name- and extension-indexed catalogue of frontends.
use crate::FirrtlFrontend;
use firrtlator_ir as ir;
use firrtlator_utils::{Error, FirrtlatorResult};
use linked_hash_map::LinkedHashMap;

/// A frontend turns source text into a circuit.
pub trait Frontend {
    fn name() -> &'static str
    where
        Self: Sized;
    fn description() -> &'static str
    where
        Self: Sized;
    /// File extensions this frontend claims.
    fn extensions() -> &'static [&'static str]
    where
        Self: Sized;
    fn parse(
        &mut self,
        name: &str,
        source: &str,
    ) -> FirrtlatorResult<ir::Circuit>;
}

/// Catalogue entry describing a registered frontend.
#[derive(Debug, Clone)]
pub struct FrontendDescriptor {
    pub name: String,
    pub description: String,
    pub extensions: Vec<String>,
}

type ParseFn = Box<dyn Fn(&str, &str) -> FirrtlatorResult<ir::Circuit>>;

struct FrontendEntry {
    descriptor: FrontendDescriptor,
    parse: ParseFn,
}

/// Registry of frontends, keyed by name. Registration order is preserved
/// for catalogue output; duplicate names are rejected.
#[derive(Default)]
pub struct FrontendRegistry {
    entries: LinkedHashMap<String, FrontendEntry>,
}

impl FrontendRegistry {
    /// Registers every built-in frontend.
    pub fn with_builtins() -> FirrtlatorResult<Self> {
        let mut registry = Self::default();
        registry.register::<FirrtlFrontend>()?;
        Ok(registry)
    }

    pub fn register<F>(&mut self) -> FirrtlatorResult<()>
    where
        F: Frontend + Default + 'static,
    {
        let name = F::name().to_string();
        if self.entries.contains_key(&name) {
            return Err(Error::registry(format!(
                "frontend `{}' is already registered",
                name
            )));
        }
        let descriptor = FrontendDescriptor {
            name: name.clone(),
            description: F::description().to_string(),
            extensions: F::extensions()
                .iter()
                .map(|e| e.to_string())
                .collect(),
        };
        let parse: ParseFn = Box::new(|file, source| {
            let mut frontend = F::default();
            frontend.parse(file, source)
        });
        self.entries
            .insert(name, FrontendEntry { descriptor, parse });
        Ok(())
    }

    /// Runs the named frontend over `source`.
    pub fn parse(
        &self,
        name: &str,
        file: &str,
        source: &str,
    ) -> FirrtlatorResult<ir::Circuit> {
        let entry = self.entries.get(name).ok_or_else(|| {
            Error::registry(format!("unknown frontend: {}", name))
        })?;
        (entry.parse)(file, source)
    }

    pub fn descriptors(&self) -> Vec<FrontendDescriptor> {
        self.entries
            .values()
            .map(|e| e.descriptor.clone())
            .collect()
    }

    /// Maps a file extension to the name of the frontend claiming it.
    pub fn find_by_extension(&self, ext: &str) -> FirrtlatorResult<String> {
        self.entries
            .values()
            .find(|e| e.descriptor.extensions.iter().any(|x| x == ext))
            .map(|e| e.descriptor.name.clone())
            .ok_or_else(|| {
                Error::registry(format!(
                    "cannot find a frontend for `{}' files",
                    ext
                ))
            })
    }
}
