//! Tokens produced by the [crate::Lexer].
use firrtlator_ir::Operation;
use firrtlator_utils::GPosIdx;
use std::fmt;
use strum_macros::{Display, EnumString};

/// A single lexical token with its source position. `Indent` and `Dedent`
/// are zero-width.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: GPosIdx,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Zero-width indentation increase at the start of a logical line.
    Indent,
    /// Zero-width indentation decrease; one per popped level.
    Dedent,
    Kw(Keyword),
    /// A primitive-operation name fused with its opening paren, `add(`.
    PrimOp(Operation),
    Ident(String),
    Int(i64),
    Double(f64),
    Str(String),
    /// `@[...]`; the payload is the interior text.
    Info(String),
    /// `<=`
    Connect,
    /// `<-`
    PartialConnect,
    /// `=>`
    Assign,
    Colon,
    Lt,
    Gt,
    LParen,
    RParen,
    Equal,
    LBrace,
    RBrace,
    Dot,
    LBracket,
    RBracket,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Indent => write!(f, "INDENT"),
            TokenKind::Dedent => write!(f, "DEDENT"),
            TokenKind::Kw(kw) => write!(f, "`{}'", kw),
            TokenKind::PrimOp(op) => write!(f, "`{}('", op),
            TokenKind::Ident(id) => write!(f, "identifier `{}'", id),
            TokenKind::Int(v) => write!(f, "integer `{}'", v),
            TokenKind::Double(v) => write!(f, "number `{}'", v),
            TokenKind::Str(s) => write!(f, "string \"{}\"", s),
            TokenKind::Info(i) => write!(f, "info `@[{}]'", i),
            TokenKind::Connect => write!(f, "`<='"),
            TokenKind::PartialConnect => write!(f, "`<-'"),
            TokenKind::Assign => write!(f, "`=>'"),
            TokenKind::Colon => write!(f, "`:'"),
            TokenKind::Lt => write!(f, "`<'"),
            TokenKind::Gt => write!(f, "`>'"),
            TokenKind::LParen => write!(f, "`('"),
            TokenKind::RParen => write!(f, "`)'"),
            TokenKind::Equal => write!(f, "`='"),
            TokenKind::LBrace => write!(f, "`{{'"),
            TokenKind::RBrace => write!(f, "`}}'"),
            TokenKind::Dot => write!(f, "`.'"),
            TokenKind::LBracket => write!(f, "`['"),
            TokenKind::RBracket => write!(f, "`]'"),
        }
    }
}

/// Reserved words of the FIRRTL grammar. `reset` is deliberately absent: the
/// register reset clause compares a plain identifier against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    Circuit,
    Module,
    Extmodule,
    Input,
    Output,
    Defname,
    Parameter,
    #[strum(serialize = "UInt")]
    UInt,
    #[strum(serialize = "SInt")]
    SInt,
    #[strum(serialize = "Clock")]
    Clock,
    Wire,
    Reg,
    Mem,
    Inst,
    Of,
    Node,
    Flip,
    With,
    Is,
    Invalid,
    When,
    Else,
    Stop,
    Printf,
    Skip,
    Datatype,
    Depth,
    #[strum(serialize = "read-latency")]
    ReadLatency,
    #[strum(serialize = "write-latency")]
    WriteLatency,
    #[strum(serialize = "read-under-write")]
    ReadUnderWrite,
    Reader,
    Writer,
    ReadWriter,
    Old,
    New,
    Undefined,
    Mux,
    Validif,
}
