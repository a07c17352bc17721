//! Shared utilities for the firrtlator compiler.
mod errors;
mod id;
mod indent;
mod out_file;
mod position;

pub use errors::{Error, FirrtlatorResult};
pub use id::Id;
pub use indent::IndentWriter;
pub use out_file::OutputFile;
pub use position::{
    FileIdx, GPosIdx, GlobalPositionTable, PosIdx, PositionTable, WithPos,
};
