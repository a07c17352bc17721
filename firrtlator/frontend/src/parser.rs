//! Recursive-descent parser over the FIRRTL token stream.
//!
//! Every rule builds its IR node bottom-up and fails fast: the first
//! mismatch aborts the parse with the offending token's position. There is
//! no error recovery; a compilation is a whole-file transaction.
use crate::token::{Keyword, Token, TokenKind};
use firrtlator_ir as ir;
use firrtlator_utils::{Error, FirrtlatorResult, GPosIdx, Id};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parses a whole circuit and requires the token stream to be fully
    /// consumed.
    pub fn parse_circuit(mut self) -> FirrtlatorResult<ir::Circuit> {
        let circuit = self.circuit()?;
        if let Some(kind) = self.peek() {
            return Err(Error::parse(format!(
                "expected end of input, found {}",
                kind
            ))
            .with_pos(&self.peek_pos()));
        }
        Ok(circuit)
    }

    /* ============================= cursor ============================= */

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_pos(&self) -> GPosIdx {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.pos)
            .unwrap_or(GPosIdx::UNKNOWN)
    }

    fn bump_kind(&mut self) -> Option<TokenKind> {
        let kind = self.tokens.get(self.pos).map(|t| t.kind.clone());
        if kind.is_some() {
            self.pos += 1;
        }
        kind
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> FirrtlatorResult<GPosIdx> {
        let pos = self.peek_pos();
        match self.peek() {
            Some(k) if k == kind => {
                self.pos += 1;
                Ok(pos)
            }
            Some(k) => Err(Error::parse(format!(
                "expected {}, found {}",
                kind, k
            ))
            .with_pos(&pos)),
            None => Err(Error::parse(format!(
                "expected {}, found end of input",
                kind
            ))
            .with_pos(&pos)),
        }
    }

    fn at_kw(&self, kw: Keyword) -> bool {
        matches!(self.peek(), Some(TokenKind::Kw(k)) if *k == kw)
    }

    fn eat_kw(&mut self, kw: Keyword) -> bool {
        if self.at_kw(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_kw(&mut self, kw: Keyword) -> FirrtlatorResult<GPosIdx> {
        self.expect(&TokenKind::Kw(kw))
    }

    fn expect_ident(&mut self) -> FirrtlatorResult<(Id, GPosIdx)> {
        let pos = self.peek_pos();
        match self.bump_kind() {
            Some(TokenKind::Ident(s)) => Ok((Id::new(s), pos)),
            Some(k) => Err(Error::parse(format!(
                "expected identifier, found {}",
                k
            ))
            .with_pos(&pos)),
            None => Err(Error::parse(
                "expected identifier, found end of input",
            )
            .with_pos(&pos)),
        }
    }

    fn expect_int(&mut self) -> FirrtlatorResult<(i64, GPosIdx)> {
        let pos = self.peek_pos();
        match self.bump_kind() {
            Some(TokenKind::Int(v)) => Ok((v, pos)),
            Some(k) => Err(Error::parse(format!(
                "expected integer, found {}",
                k
            ))
            .with_pos(&pos)),
            None => Err(Error::parse(
                "expected integer, found end of input",
            )
            .with_pos(&pos)),
        }
    }

    fn expect_uint(&mut self, what: &str) -> FirrtlatorResult<u64> {
        let (value, pos) = self.expect_int()?;
        if value < 0 {
            return Err(Error::parse(format!(
                "{} must be non-negative",
                what
            ))
            .with_pos(&pos));
        }
        Ok(value as u64)
    }

    fn opt_info(&mut self) -> Option<ir::Info> {
        if let Some(TokenKind::Info(_)) = self.peek() {
            match self.bump_kind() {
                Some(TokenKind::Info(s)) => Some(ir::Info::new(s)),
                _ => None,
            }
        } else {
            None
        }
    }

    fn starts_exp(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                TokenKind::Ident(_)
                    | TokenKind::PrimOp(_)
                    | TokenKind::Kw(
                        Keyword::UInt
                            | Keyword::SInt
                            | Keyword::Mux
                            | Keyword::Validif
                    )
            )
        )
    }

    fn starts_stmt(&self) -> bool {
        self.starts_exp()
            || matches!(
                self.peek(),
                Some(TokenKind::Kw(
                    Keyword::Wire
                        | Keyword::Reg
                        | Keyword::Mem
                        | Keyword::Inst
                        | Keyword::Node
                        | Keyword::When
                        | Keyword::Stop
                        | Keyword::Printf
                        | Keyword::Skip
                ))
            )
    }

    /* ============================ circuits ============================ */

    fn circuit(&mut self) -> FirrtlatorResult<ir::Circuit> {
        self.expect_kw(Keyword::Circuit)?;
        let (id, _) = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let mut circuit = ir::Circuit::new(id);
        circuit.info = self.opt_info();
        if self.eat(&TokenKind::Indent) {
            while matches!(
                self.peek(),
                Some(TokenKind::Kw(Keyword::Module | Keyword::Extmodule))
            ) {
                let module = self.module()?;
                circuit.add_module(module);
            }
            self.expect(&TokenKind::Dedent)?;
        }
        Ok(circuit)
    }

    fn module(&mut self) -> FirrtlatorResult<ir::Module> {
        if self.at_kw(Keyword::Module) {
            self.intmodule()
        } else {
            self.extmodule()
        }
    }

    fn intmodule(&mut self) -> FirrtlatorResult<ir::Module> {
        self.expect_kw(Keyword::Module)?;
        let (id, _) = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let mut module = ir::Module::internal(id);
        module.info = self.opt_info();
        if self.eat(&TokenKind::Indent) {
            self.ports(&mut module)?;
            let body = self.stmt_group()?;
            module.set_body(body)?;
            self.expect(&TokenKind::Dedent)?;
        }
        Ok(module)
    }

    fn extmodule(&mut self) -> FirrtlatorResult<ir::Module> {
        self.expect_kw(Keyword::Extmodule)?;
        let (id, _) = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let mut module = ir::Module::external(id);
        module.info = self.opt_info();
        if self.eat(&TokenKind::Indent) {
            self.ports(&mut module)?;
            if self.eat_kw(Keyword::Defname) {
                self.expect(&TokenKind::Equal)?;
                let (defname, _) = self.expect_ident()?;
                module.set_defname(defname)?;
            }
            while self.at_kw(Keyword::Parameter) {
                let param = self.parameter()?;
                module.add_parameter(param)?;
            }
            self.expect(&TokenKind::Dedent)?;
        }
        Ok(module)
    }

    fn ports(&mut self, module: &mut ir::Module) -> FirrtlatorResult<()> {
        while matches!(
            self.peek(),
            Some(TokenKind::Kw(Keyword::Input | Keyword::Output))
        ) {
            let port = self.port()?;
            module.add_port(port);
        }
        Ok(())
    }

    fn port(&mut self) -> FirrtlatorResult<ir::Port> {
        let direction = if self.eat_kw(Keyword::Input) {
            ir::Direction::Input
        } else {
            self.expect_kw(Keyword::Output)?;
            ir::Direction::Output
        };
        let (id, _) = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let mut port = ir::Port::new(id, direction, ty);
        port.info = self.opt_info();
        Ok(port)
    }

    fn parameter(&mut self) -> FirrtlatorResult<ir::Parameter> {
        self.expect_kw(Keyword::Parameter)?;
        let (id, _) = self.expect_ident()?;
        self.expect(&TokenKind::Equal)?;
        let pos = self.peek_pos();
        let value = match self.bump_kind() {
            Some(TokenKind::Int(v)) => ir::ParamValue::Int(v),
            Some(TokenKind::Double(v)) => ir::ParamValue::Double(v),
            Some(TokenKind::Str(s)) => ir::ParamValue::String(s),
            Some(k) => {
                return Err(Error::parse(format!(
                    "expected parameter value, found {}",
                    k
                ))
                .with_pos(&pos));
            }
            None => {
                return Err(Error::parse(
                    "expected parameter value, found end of input",
                )
                .with_pos(&pos));
            }
        };
        Ok(ir::Parameter { id, value })
    }

    /* ============================= types ============================== */

    fn parse_type(&mut self) -> FirrtlatorResult<ir::Type> {
        let mut ty = self.base_type()?;
        while self.eat(&TokenKind::LBracket) {
            let size = self.expect_uint("vector size")?;
            self.expect(&TokenKind::RBracket)?;
            ty = ir::Type::Vector(ir::TypeVector {
                ty: Box::new(ty),
                size,
            });
        }
        Ok(ty)
    }

    fn base_type(&mut self) -> FirrtlatorResult<ir::Type> {
        match self.peek() {
            Some(TokenKind::Kw(Keyword::UInt | Keyword::SInt)) => {
                Ok(ir::Type::Int(self.int_type()?))
            }
            Some(TokenKind::Kw(Keyword::Clock)) => {
                self.pos += 1;
                Ok(ir::Type::Clock(ir::TypeClock))
            }
            Some(TokenKind::LBrace) => self.bundle_type(),
            Some(k) => Err(Error::parse(format!(
                "expected type, found {}",
                k
            ))
            .with_pos(&self.peek_pos())),
            None => Err(Error::parse("expected type, found end of input")
                .with_pos(&self.peek_pos())),
        }
    }

    fn int_type(&mut self) -> FirrtlatorResult<ir::TypeInt> {
        let signed = self.eat_kw(Keyword::SInt);
        if !signed {
            self.expect_kw(Keyword::UInt)?;
        }
        let width = if self.eat(&TokenKind::Lt) {
            let width = self.expect_uint("integer width")?;
            self.expect(&TokenKind::Gt)?;
            Some(width)
        } else {
            None
        };
        Ok(ir::TypeInt { signed, width })
    }

    fn bundle_type(&mut self) -> FirrtlatorResult<ir::Type> {
        self.expect(&TokenKind::LBrace)?;
        let mut bundle = ir::TypeBundle::default();
        while !self.at(&TokenKind::RBrace) {
            let flip = self.eat_kw(Keyword::Flip);
            let (id, _) = self.expect_ident()?;
            self.expect(&TokenKind::Colon)?;
            let ty = self.parse_type()?;
            bundle.add_field(ir::Field { id, flip, ty });
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(ir::Type::Bundle(bundle))
    }

    /* =========================== statements =========================== */

    fn stmt_group(&mut self) -> FirrtlatorResult<ir::StmtGroup> {
        let mut group = ir::StmtGroup::default();
        group.push(self.stmt()?);
        while self.starts_stmt() {
            group.push(self.stmt()?);
        }
        Ok(group)
    }

    /// A statement group, either inline or as an indented suite.
    fn stmt_group_or_suite(&mut self) -> FirrtlatorResult<ir::StmtGroup> {
        if self.eat(&TokenKind::Indent) {
            let group = self.stmt_group()?;
            self.expect(&TokenKind::Dedent)?;
            Ok(group)
        } else if self.starts_stmt() {
            self.stmt_group()
        } else {
            Ok(ir::StmtGroup::default())
        }
    }

    fn stmt(&mut self) -> FirrtlatorResult<ir::Stmt> {
        match self.peek() {
            Some(TokenKind::Kw(Keyword::Wire)) => self.wire(),
            Some(TokenKind::Kw(Keyword::Reg)) => self.reg(),
            Some(TokenKind::Kw(Keyword::Mem)) => self.mem(),
            Some(TokenKind::Kw(Keyword::Inst)) => self.inst(),
            Some(TokenKind::Kw(Keyword::Node)) => self.node(),
            Some(TokenKind::Kw(Keyword::When)) => {
                Ok(ir::Stmt::Conditional(self.conditional()?))
            }
            Some(TokenKind::Kw(Keyword::Stop)) => self.stop(),
            Some(TokenKind::Kw(Keyword::Printf)) => self.printf(),
            Some(TokenKind::Kw(Keyword::Skip)) => {
                self.pos += 1;
                Ok(ir::Stmt::Empty(ir::Empty {
                    info: self.opt_info(),
                }))
            }
            _ => self.connect_or_invalidate(),
        }
    }

    fn wire(&mut self) -> FirrtlatorResult<ir::Stmt> {
        self.expect_kw(Keyword::Wire)?;
        let (id, _) = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let info = self.opt_info();
        Ok(ir::Stmt::Wire(ir::Wire { id, info, ty }))
    }

    fn reg(&mut self) -> FirrtlatorResult<ir::Stmt> {
        self.expect_kw(Keyword::Reg)?;
        let (id, _) = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let clock = self.exp()?;
        let reset = if self.eat_kw(Keyword::With) {
            self.expect(&TokenKind::Colon)?;
            self.expect(&TokenKind::LParen)?;
            // only `reset` may introduce the clause
            let (name, name_pos) = self.expect_ident()?;
            if name != "reset" {
                return Err(Error::semantic(format!(
                    "expected `reset' in register with-clause, found `{}'",
                    name
                ))
                .with_pos(&name_pos));
            }
            self.expect(&TokenKind::Assign)?;
            self.expect(&TokenKind::LParen)?;
            let trigger = self.exp()?;
            let value = self.exp()?;
            self.expect(&TokenKind::RParen)?;
            self.expect(&TokenKind::RParen)?;
            Some(ir::RegReset { trigger, value })
        } else {
            None
        };
        let info = self.opt_info();
        Ok(ir::Stmt::Reg(ir::Reg {
            id,
            info,
            ty,
            clock,
            reset,
        }))
    }

    fn mem(&mut self) -> FirrtlatorResult<ir::Stmt> {
        self.expect_kw(Keyword::Mem)?;
        let (id, _) = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let mut mem = ir::Memory::new(id);
        mem.info = self.opt_info();
        if self.eat(&TokenKind::Indent) {
            loop {
                let kw = match self.peek() {
                    Some(TokenKind::Kw(k)) => *k,
                    _ => break,
                };
                let key_pos = self.peek_pos();
                match kw {
                    Keyword::Datatype => {
                        self.pos += 1;
                        self.expect(&TokenKind::Assign)?;
                        let ty = self.parse_type()?;
                        mem.set_dtype(ty)
                            .map_err(|e| e.with_pos(&key_pos))?;
                    }
                    Keyword::Depth => {
                        self.pos += 1;
                        self.expect(&TokenKind::Assign)?;
                        let depth = self.expect_uint("memory depth")?;
                        mem.set_depth(depth)
                            .map_err(|e| e.with_pos(&key_pos))?;
                    }
                    Keyword::ReadLatency => {
                        self.pos += 1;
                        self.expect(&TokenKind::Assign)?;
                        let latency =
                            self.expect_uint("memory read latency")?;
                        mem.set_read_latency(latency)
                            .map_err(|e| e.with_pos(&key_pos))?;
                    }
                    Keyword::WriteLatency => {
                        self.pos += 1;
                        self.expect(&TokenKind::Assign)?;
                        let latency =
                            self.expect_uint("memory write latency")?;
                        mem.set_write_latency(latency)
                            .map_err(|e| e.with_pos(&key_pos))?;
                    }
                    Keyword::ReadUnderWrite => {
                        self.pos += 1;
                        self.expect(&TokenKind::Assign)?;
                        let flag = if self.eat_kw(Keyword::Old) {
                            ir::RuwFlag::Old
                        } else if self.eat_kw(Keyword::New) {
                            ir::RuwFlag::New
                        } else {
                            self.expect_kw(Keyword::Undefined)?;
                            ir::RuwFlag::Undefined
                        };
                        mem.set_ruw(flag)
                            .map_err(|e| e.with_pos(&key_pos))?;
                    }
                    Keyword::Reader => {
                        self.pos += 1;
                        self.expect(&TokenKind::Assign)?;
                        let (reader, pos) = self.expect_ident()?;
                        mem.add_reader(reader)
                            .map_err(|e| e.with_pos(&pos))?;
                    }
                    Keyword::Writer => {
                        self.pos += 1;
                        self.expect(&TokenKind::Assign)?;
                        let (writer, pos) = self.expect_ident()?;
                        mem.add_writer(writer)
                            .map_err(|e| e.with_pos(&pos))?;
                    }
                    Keyword::ReadWriter => {
                        self.pos += 1;
                        self.expect(&TokenKind::Assign)?;
                        let (rw, pos) = self.expect_ident()?;
                        mem.add_read_writer(rw)
                            .map_err(|e| e.with_pos(&pos))?;
                    }
                    _ => break,
                }
            }
            self.expect(&TokenKind::Dedent)?;
        }
        Ok(ir::Stmt::Memory(mem))
    }

    fn inst(&mut self) -> FirrtlatorResult<ir::Stmt> {
        self.expect_kw(Keyword::Inst)?;
        let (id, _) = self.expect_ident()?;
        self.expect_kw(Keyword::Of)?;
        let (of, _) = self.expect_ident()?;
        let info = self.opt_info();
        Ok(ir::Stmt::Instance(ir::Instance {
            id,
            info,
            of: ir::Reference::new(of),
        }))
    }

    fn node(&mut self) -> FirrtlatorResult<ir::Stmt> {
        self.expect_kw(Keyword::Node)?;
        let (id, _) = self.expect_ident()?;
        self.expect(&TokenKind::Equal)?;
        let value = self.exp()?;
        let info = self.opt_info();
        Ok(ir::Stmt::Node(ir::Node { id, info, value }))
    }

    fn conditional(&mut self) -> FirrtlatorResult<ir::Conditional> {
        self.expect_kw(Keyword::When)?;
        let cond = self.exp()?;
        self.expect(&TokenKind::Colon)?;
        let info = self.opt_info();
        let then = self.stmt_group_or_suite()?;
        let otherwise = if self.eat_kw(Keyword::Else) {
            Some(self.conditional_else()?)
        } else {
            None
        };
        Ok(ir::Conditional {
            info,
            cond,
            then,
            otherwise,
        })
    }

    fn conditional_else(&mut self) -> FirrtlatorResult<ir::ConditionalElse> {
        if self.at_kw(Keyword::When) {
            // `else when ...` nests the next conditional as the whole body
            let nested = self.conditional()?;
            Ok(ir::ConditionalElse {
                info: None,
                body: ir::StmtGroup::new(vec![ir::Stmt::Conditional(
                    nested,
                )]),
            })
        } else {
            self.expect(&TokenKind::Colon)?;
            let info = self.opt_info();
            let body = self.stmt_group_or_suite()?;
            Ok(ir::ConditionalElse { info, body })
        }
    }

    fn stop(&mut self) -> FirrtlatorResult<ir::Stmt> {
        self.expect_kw(Keyword::Stop)?;
        self.expect(&TokenKind::LParen)?;
        let clock = self.exp()?;
        let cond = self.exp()?;
        let (code, _) = self.expect_int()?;
        self.expect(&TokenKind::RParen)?;
        let info = self.opt_info();
        Ok(ir::Stmt::Stop(ir::Stop {
            info,
            clock,
            cond,
            code,
        }))
    }

    fn printf(&mut self) -> FirrtlatorResult<ir::Stmt> {
        self.expect_kw(Keyword::Printf)?;
        self.expect(&TokenKind::LParen)?;
        let clock = self.exp()?;
        let cond = self.exp()?;
        let pos = self.peek_pos();
        let format = match self.bump_kind() {
            Some(TokenKind::Str(s)) => s,
            Some(k) => {
                return Err(Error::parse(format!(
                    "expected format string, found {}",
                    k
                ))
                .with_pos(&pos));
            }
            None => {
                return Err(Error::parse(
                    "expected format string, found end of input",
                )
                .with_pos(&pos));
            }
        };
        let mut args = Vec::new();
        while self.starts_exp() {
            args.push(self.exp()?);
        }
        self.expect(&TokenKind::RParen)?;
        let info = self.opt_info();
        Ok(ir::Stmt::Printf(ir::Printf {
            info,
            clock,
            cond,
            format,
            args,
        }))
    }

    fn connect_or_invalidate(&mut self) -> FirrtlatorResult<ir::Stmt> {
        let to = self.exp()?;
        let pos = self.peek_pos();
        match self.peek() {
            Some(TokenKind::Connect) => {
                self.pos += 1;
                let from = self.exp()?;
                let info = self.opt_info();
                Ok(ir::Stmt::Connect(ir::Connect {
                    info,
                    to,
                    from,
                    partial: false,
                }))
            }
            Some(TokenKind::PartialConnect) => {
                self.pos += 1;
                let from = self.exp()?;
                let info = self.opt_info();
                Ok(ir::Stmt::Connect(ir::Connect {
                    info,
                    to,
                    from,
                    partial: true,
                }))
            }
            Some(TokenKind::Kw(Keyword::Is)) => {
                self.pos += 1;
                self.expect_kw(Keyword::Invalid)?;
                let info = self.opt_info();
                Ok(ir::Stmt::Invalid(ir::Invalid { info, expr: to }))
            }
            Some(k) => Err(Error::parse(format!(
                "expected `<=', `<-', or `is invalid', found {}",
                k
            ))
            .with_pos(&pos)),
            None => Err(Error::parse(
                "expected `<=', `<-', or `is invalid', found end of input",
            )
            .with_pos(&pos)),
        }
    }

    /* ========================== expressions =========================== */

    /// Parses a primary expression, then threads `.field`, `[index]`, and
    /// `[expr]` tails left-to-right, so `a.b[3].c` becomes
    /// `SubField(SubIndex(SubField(Ref a, b), 3), c)`.
    fn exp(&mut self) -> FirrtlatorResult<ir::Expr> {
        let mut e = self.exp_primary()?;
        loop {
            if self.eat(&TokenKind::Dot) {
                let (field, _) = self.expect_ident()?;
                e = ir::Expr::SubField(ir::SubField {
                    of: Box::new(e),
                    field,
                });
            } else if self.eat(&TokenKind::LBracket) {
                if matches!(self.peek(), Some(TokenKind::Int(_))) {
                    let index = self.expect_uint("subindex")?;
                    self.expect(&TokenKind::RBracket)?;
                    e = ir::Expr::SubIndex(ir::SubIndex {
                        of: Box::new(e),
                        index,
                    });
                } else {
                    let index = self.exp()?;
                    self.expect(&TokenKind::RBracket)?;
                    e = ir::Expr::SubAccess(ir::SubAccess {
                        of: Box::new(e),
                        index: Box::new(index),
                    });
                }
            } else {
                break;
            }
        }
        Ok(e)
    }

    fn exp_primary(&mut self) -> FirrtlatorResult<ir::Expr> {
        let pos = self.peek_pos();
        match self.peek() {
            Some(TokenKind::Ident(_)) => {
                let (id, _) = self.expect_ident()?;
                Ok(ir::Expr::Ref(ir::Reference::new(id)))
            }
            Some(TokenKind::Kw(Keyword::UInt | Keyword::SInt)) => {
                self.exp_int()
            }
            Some(TokenKind::Kw(Keyword::Mux)) => {
                self.pos += 1;
                self.expect(&TokenKind::LParen)?;
                let sel = self.exp()?;
                let a = self.exp()?;
                let b = self.exp()?;
                self.expect(&TokenKind::RParen)?;
                Ok(ir::Expr::Mux(ir::Mux {
                    sel: Box::new(sel),
                    a: Box::new(a),
                    b: Box::new(b),
                }))
            }
            Some(TokenKind::Kw(Keyword::Validif)) => {
                self.pos += 1;
                self.expect(&TokenKind::LParen)?;
                let sel = self.exp()?;
                let a = self.exp()?;
                self.expect(&TokenKind::RParen)?;
                Ok(ir::Expr::CondValid(ir::CondValid {
                    sel: Box::new(sel),
                    a: Box::new(a),
                }))
            }
            Some(TokenKind::PrimOp(op)) => {
                let op = *op;
                self.primop(op)
            }
            Some(k) => Err(Error::parse(format!(
                "expected expression, found {}",
                k
            ))
            .with_pos(&pos)),
            None => {
                Err(Error::parse("expected expression, found end of input")
                    .with_pos(&pos))
            }
        }
    }

    fn exp_int(&mut self) -> FirrtlatorResult<ir::Expr> {
        let ty = self.int_type()?;
        self.expect(&TokenKind::LParen)?;
        let pos = self.peek_pos();
        let value = match self.bump_kind() {
            Some(TokenKind::Int(v)) => ir::ConstKind::Int(v),
            Some(TokenKind::Str(s)) => ir::ConstKind::Str(s),
            Some(k) => {
                return Err(Error::parse(format!(
                    "expected integer or string literal, found {}",
                    k
                ))
                .with_pos(&pos));
            }
            None => {
                return Err(Error::parse(
                    "expected integer or string literal, found end of input",
                )
                .with_pos(&pos));
            }
        };
        self.expect(&TokenKind::RParen)?;
        Ok(ir::Expr::Const(ir::Constant { ty, value }))
    }

    /// The opening paren is part of the primop token; operands are fed
    /// until something that is not an expression shows up, then integer
    /// parameters until `)`. Exceeding the declared counts fails
    /// immediately; falling short fails at the closing paren.
    fn primop(&mut self, op: ir::Operation) -> FirrtlatorResult<ir::Expr> {
        self.pos += 1;
        let mut prim = ir::PrimOp::new(op);
        while self.starts_exp() {
            let pos = self.peek_pos();
            if prim.operands.len() == op.num_operands() {
                return Err(Error::parse(format!(
                    "excess operand for `{}'",
                    op
                ))
                .with_pos(&pos));
            }
            let operand = self.exp()?;
            prim.operands.push(operand);
        }
        while matches!(self.peek(), Some(TokenKind::Int(_))) {
            let pos = self.peek_pos();
            if prim.params.len() == op.num_params() {
                return Err(Error::parse(format!(
                    "excess parameter for `{}'",
                    op
                ))
                .with_pos(&pos));
            }
            let param =
                self.expect_uint("primitive-operation parameter")?;
            prim.params.push(param);
        }
        let close = self.peek_pos();
        self.expect(&TokenKind::RParen)?;
        if !prim.is_complete() {
            let (operands, params) = op.arity();
            return Err(Error::parse(format!(
                "`{}' expects {} operand(s) and {} parameter(s), \
                 found {} and {}",
                op,
                operands,
                params,
                prim.operands.len(),
                prim.params.len()
            ))
            .with_pos(&close));
        }
        Ok(ir::Expr::Prim(prim))
    }
}
