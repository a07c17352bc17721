//! # Firrtlator
//!
//! Compiler infrastructure for FIRRTL, a hardware intermediate
//! representation for synchronous digital circuits. The pipeline is a
//! linear data flow with plugin boundaries at each stage:
//!
//! ```text
//! source text -> [frontend] -> Circuit -> [pass]* -> Circuit -> [backend] -> output
//! ```
//!
//! The [Firrtlator] driver owns the circuit between stages and resolves
//! frontends, passes, and backends by name or by file extension:
//!
//! ```no_run
//! use firrtlator::Firrtlator;
//!
//! fn main() -> firrtlator::FirrtlatorResult<()> {
//!     let mut firrtlator = Firrtlator::new()?;
//!     firrtlator.parse_file(std::path::Path::new("adder.fir"), None)?;
//!     firrtlator.pass("stripinfo")?;
//!     firrtlator.generate(std::path::Path::new("adder.dot"), None)?;
//!     Ok(())
//! }
//! ```
use firrtlator_backend::{BackendDescriptor, BackendRegistry};
use firrtlator_frontend::{FrontendDescriptor, FrontendRegistry};
use firrtlator_ir as ir;
use firrtlator_opt::PassManager;
use firrtlator_utils::OutputFile;
use std::io;
use std::path::Path;

pub use firrtlator_utils::{Error, FirrtlatorResult};

/// Drives the frontend -> passes -> backend pipeline and owns the circuit
/// in between. A failed parse leaves no circuit behind; `pass` and
/// `generate` fail loudly until the next successful parse.
pub struct Firrtlator {
    frontends: FrontendRegistry,
    passes: PassManager,
    backends: BackendRegistry,
    ir: Option<ir::Circuit>,
}

impl Firrtlator {
    /// Creates a driver with all built-in frontends, passes, and backends
    /// registered.
    pub fn new() -> FirrtlatorResult<Self> {
        Ok(Self {
            frontends: FrontendRegistry::with_builtins()?,
            passes: PassManager::default_passes()?,
            backends: BackendRegistry::with_builtins()?,
            ir: None,
        })
    }

    /// Parses `source` with the named frontend and stores the resulting
    /// circuit. `name` labels the source in positions and diagnostics.
    pub fn parse_str(
        &mut self,
        name: &str,
        source: &str,
        frontend: &str,
    ) -> FirrtlatorResult<()> {
        self.ir = None;
        let circuit = self.frontends.parse(frontend, name, source)?;
        log::debug!(
            "parsed circuit `{}' with frontend `{}'",
            circuit.id,
            frontend
        );
        self.ir = Some(circuit);
        Ok(())
    }

    /// Reads and parses a file. Without an explicit frontend name the
    /// file's extension selects one.
    pub fn parse_file(
        &mut self,
        path: &Path,
        frontend: Option<&str>,
    ) -> FirrtlatorResult<()> {
        let frontend = match frontend {
            Some(name) => name.to_string(),
            None => self.frontend_for(path)?,
        };
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::io_error(format!("cannot read {}: {}", path.display(), e))
        })?;
        self.parse_str(&path.display().to_string(), &source, &frontend)
    }

    /// Runs the named pass on the stored circuit in place.
    pub fn pass(&mut self, name: &str) -> FirrtlatorResult<()> {
        let circuit = self.ir.as_mut().ok_or_else(|| {
            Error::misc("no circuit loaded; parse an input first")
        })?;
        self.passes.run(name, circuit)
    }

    /// Runs the named backend, writing its artifact to `out`.
    pub fn generate_to(
        &mut self,
        backend: &str,
        out: &mut dyn io::Write,
    ) -> FirrtlatorResult<()> {
        let circuit = self.ir.as_mut().ok_or_else(|| {
            Error::misc("no circuit loaded; parse an input first")
        })?;
        self.backends.emit(backend, circuit, out)
    }

    /// Opens `path` and runs a backend over the stored circuit. Without an
    /// explicit backend name the path's extension selects one.
    pub fn generate(
        &mut self,
        path: &Path,
        backend: Option<&str>,
    ) -> FirrtlatorResult<()> {
        let backend = match backend {
            Some(name) => name.to_string(),
            None => self.backend_for(path)?,
        };
        log::debug!("generating {} with backend `{}'", path.display(), backend);
        let mut out = OutputFile::file(path.to_path_buf());
        let mut sink = out.get_write()?;
        self.generate_to(&backend, &mut sink)
    }

    /// Maps an input path's extension to a registered frontend name.
    pub fn frontend_for(&self, path: &Path) -> FirrtlatorResult<String> {
        self.frontends.find_by_extension(&extension(path)?)
    }

    /// Maps an output path's extension to a registered backend name.
    pub fn backend_for(&self, path: &Path) -> FirrtlatorResult<String> {
        self.backends.find_by_extension(&extension(path)?)
    }

    /// The circuit produced by the last successful parse, if any.
    pub fn circuit(&self) -> Option<&ir::Circuit> {
        self.ir.as_ref()
    }

    pub fn frontends(&self) -> Vec<FrontendDescriptor> {
        self.frontends.descriptors()
    }

    pub fn backends(&self) -> Vec<BackendDescriptor> {
        self.backends.descriptors()
    }

    pub fn passes_help(&self) -> String {
        self.passes.complete_help()
    }
}

fn extension(path: &Path) -> FirrtlatorResult<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_string())
        .ok_or_else(|| {
            Error::registry(format!(
                "cannot determine the file type of {}",
                path.display()
            ))
        })
}
