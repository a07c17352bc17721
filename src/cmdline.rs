//! Command-line argument definition for the `firrtlator` binary.
use argh::FromArgs;
use std::path::PathBuf;

#[derive(FromArgs)]
/// FIRRTL compiler infrastructure: parses FIRRTL sources, runs
/// transformation passes, and re-emits the circuit with the backend
/// selected by the output file's extension.
pub struct Opts {
    /// input file; its extension selects the frontend
    #[argh(option, short = 'i')]
    pub input: Vec<PathBuf>,

    /// pass to run on the circuit; repeat to run several in order
    #[argh(option, short = 'p', long = "pass")]
    pub passes: Vec<String>,

    /// list the registered frontends, passes, and backends
    #[argh(switch)]
    pub plugins: bool,

    /// output file; its extension selects the backend
    #[argh(positional)]
    pub output: Option<PathBuf>,
}
