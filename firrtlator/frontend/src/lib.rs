//! Frontends for the firrtlator compiler.
//!
//! The built-in [FirrtlFrontend] lexes and parses textual FIRRTL into a
//! [ir::Circuit]; the [FrontendRegistry] catalogues frontends by name and by
//! the file extensions they claim.
mod lexer;
mod parser;
mod registry;
mod token;

pub use lexer::Lexer;
pub use parser::Parser;
pub use registry::{Frontend, FrontendDescriptor, FrontendRegistry};
pub use token::{Keyword, Token, TokenKind};

use firrtlator_ir as ir;
use firrtlator_utils::{FirrtlatorResult, GlobalPositionTable};

/// The textual FIRRTL frontend.
#[derive(Default)]
pub struct FirrtlFrontend;

impl Frontend for FirrtlFrontend {
    fn name() -> &'static str {
        "firrtl"
    }

    fn description() -> &'static str {
        "Parses textual FIRRTL"
    }

    fn extensions() -> &'static [&'static str] {
        &["fir"]
    }

    fn parse(
        &mut self,
        name: &str,
        source: &str,
    ) -> FirrtlatorResult<ir::Circuit> {
        let file = GlobalPositionTable::add_file(
            name.to_string(),
            source.to_string(),
        );
        let tokens = Lexer::new(source, file).tokenize()?;
        log::debug!("lexed {} tokens from {}", tokens.len(), name);
        Parser::new(tokens).parse_circuit()
    }
}
