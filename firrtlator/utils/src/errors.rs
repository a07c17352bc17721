//! Errors generated by the compiler.
use crate::{GPosIdx, WithPos};

/// Convenience wrapper to represent success or a meaningful compiler error.
pub type FirrtlatorResult<T> = std::result::Result<T, Error>;

/// Errors generated by the compiler. Errors carry a source position when one
/// is known; the `Debug` rendering shows the offending line with a caret.
#[derive(Clone)]
pub struct Error {
    kind: Box<ErrorKind>,
    pos: GPosIdx,
    post_msg: Option<String>,
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.pos == GPosIdx::UNKNOWN {
            write!(f, "{}", self.kind)?
        } else {
            write!(f, "{}", self.pos.format(self.kind.to_string()))?
        }
        if let Some(post) = &self.post_msg {
            write!(f, "\n{}", post)?;
        }
        Ok(())
    }
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
            pos: GPosIdx::UNKNOWN,
            post_msg: None,
        }
    }

    pub fn with_pos<T: WithPos>(mut self, pos: &T) -> Self {
        self.pos = pos.copy_span();
        self
    }

    pub fn with_post_msg(mut self, msg: Option<String>) -> Self {
        self.post_msg = msg;
        self
    }

    /// Malformed token stream: bad indentation, literal, string, or info.
    pub fn lex<S: ToString>(msg: S) -> Self {
        Self::new(ErrorKind::Lex(msg.to_string()))
    }

    /// The token stream does not match the grammar.
    pub fn parse<S: ToString>(msg: S) -> Self {
        Self::new(ErrorKind::Parse(msg.to_string()))
    }

    /// Structurally valid input that violates an IR invariant.
    pub fn semantic<S: ToString>(msg: S) -> Self {
        Self::new(ErrorKind::Semantic(msg.to_string()))
    }

    /// Unknown or duplicate frontend/pass/backend.
    pub fn registry<S: ToString>(msg: S) -> Self {
        Self::new(ErrorKind::Registry(msg.to_string()))
    }

    /// Unreadable source or unwritable sink.
    pub fn io_error<S: ToString>(msg: S) -> Self {
        Self::new(ErrorKind::Io(msg.to_string()))
    }

    /// An invariant violation in core code; indicates a bug.
    pub fn assertion<S: ToString>(msg: S) -> Self {
        Self::new(ErrorKind::Assertion(msg.to_string()))
    }

    /// Miscellaneous error message
    pub fn misc<S: ToString>(msg: S) -> Self {
        Self::new(ErrorKind::Misc(msg.to_string()))
    }

    pub fn location(&self) -> (String, usize, usize) {
        self.pos.get_location()
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn is_lex(&self) -> bool {
        matches!(*self.kind, ErrorKind::Lex(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(*self.kind, ErrorKind::Parse(_))
    }

    pub fn is_semantic(&self) -> bool {
        matches!(*self.kind, ErrorKind::Semantic(_))
    }

    pub fn is_registry(&self) -> bool {
        matches!(*self.kind, ErrorKind::Registry(_))
    }
}

/// Standard error kinds for firrtlator errors.
#[derive(Clone, Debug, thiserror::Error)]
enum ErrorKind {
    /// Errors found while tokenizing the input.
    #[error("Lexical error: {0}")]
    Lex(String),
    /// The token stream does not match the grammar.
    #[error("Parse error: {0}")]
    Parse(String),
    /// Well-formed syntax with an invalid meaning.
    #[error("Semantic error: {0}")]
    Semantic(String),
    /// Plugin lookup or registration failure.
    #[error("Registry error: {0}")]
    Registry(String),
    /// The input could not be read or the output could not be written.
    #[error("IO error: {0}")]
    Io(String),
    /// An internal invariant does not hold; surfaced rather than swallowed.
    #[error("Internal assertion failed: {0}")]
    Assertion(String),
    /// Miscellaneous error message
    #[error("{0}")]
    Misc(String),
}

// Conversions from other error types to our error type so that
// we can use `?` in all the places.
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io_error(e.to_string())
    }
}

impl From<std::fmt::Error> for Error {
    fn from(e: std::fmt::Error) -> Self {
        Error::io_error(e.to_string())
    }
}
