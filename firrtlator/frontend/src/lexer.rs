//! Indentation-sensitive tokenizer for textual FIRRTL.
//!
//! The lexer is line oriented. Every logical line's leading space/tab prefix
//! is measured against a stack of open indentation levels: a longer prefix
//! pushes a level and emits `INDENT`, a shorter prefix pops levels emitting
//! one `DEDENT` each, and a prefix that matches no open level is a lexical
//! error. Blank lines and comment-only lines leave the stack untouched, and
//! end of input closes every open level.
use crate::token::{Keyword, Token, TokenKind};
use firrtlator_ir::Operation;
use firrtlator_utils::{
    Error, FileIdx, FirrtlatorResult, GPosIdx, GlobalPositionTable,
};
use std::str::FromStr;

pub struct Lexer<'a> {
    src: &'a str,
    file: FileIdx,
    /// Open indentation levels; never empty, bottom is 0.
    levels: Vec<usize>,
    tokens: Vec<Token>,
}

fn peek_char(s: &str, at: usize) -> Option<char> {
    s[at..].chars().next()
}

fn scan(s: &str, from: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut at = from;
    while let Some(c) = peek_char(s, at) {
        if pred(c) {
            at += c.len_utf8();
        } else {
            break;
        }
    }
    at
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, file: FileIdx) -> Self {
        Self {
            src,
            file,
            levels: vec![0],
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> FirrtlatorResult<Vec<Token>> {
        let src = self.src;
        let mut line_start = 0;
        for line in src.split('\n') {
            self.line(line, line_start)?;
            line_start += line.len() + 1;
        }
        // close any indentation left open at end of input
        let end = self.span(src.len(), src.len());
        while self.levels.len() > 1 {
            self.levels.pop();
            self.tokens.push(Token {
                kind: TokenKind::Dedent,
                pos: end,
            });
        }
        Ok(self.tokens)
    }

    fn span(&self, start: usize, end: usize) -> GPosIdx {
        GlobalPositionTable::add_pos(self.file, start, end)
    }

    fn push(
        &self,
        out: &mut Vec<Token>,
        start: usize,
        end: usize,
        kind: TokenKind,
    ) {
        out.push(Token {
            kind,
            pos: self.span(start, end),
        });
    }

    fn line(
        &mut self,
        line: &str,
        line_start: usize,
    ) -> FirrtlatorResult<()> {
        let indent = scan(line, 0, |c| c == ' ' || c == '\t');
        let mut toks = Vec::new();
        self.content(&line[indent..], line_start + indent, &mut toks)?;
        if toks.is_empty() {
            // blank or comment-only line; the indentation stack is untouched
            return Ok(());
        }
        self.indentation(indent, line_start)?;
        self.tokens.append(&mut toks);
        Ok(())
    }

    fn indentation(
        &mut self,
        level: usize,
        line_start: usize,
    ) -> FirrtlatorResult<()> {
        let pos = self.span(line_start + level, line_start + level);
        let mut current = self.levels.last().copied().unwrap_or(0);
        if level > current {
            self.levels.push(level);
            self.tokens.push(Token {
                kind: TokenKind::Indent,
                pos,
            });
        } else {
            while level < current {
                self.levels.pop();
                self.tokens.push(Token {
                    kind: TokenKind::Dedent,
                    pos,
                });
                current = self.levels.last().copied().unwrap_or(0);
            }
            if current != level {
                return Err(Error::lex(
                    "unindent does not match any outer indentation level",
                )
                .with_pos(&pos));
            }
        }
        Ok(())
    }

    /// Tokenizes a line's content past its indentation. `base` is the byte
    /// offset of `s` within the file.
    fn content(
        &self,
        s: &str,
        base: usize,
        out: &mut Vec<Token>,
    ) -> FirrtlatorResult<()> {
        let mut i = 0;
        while let Some(c) = peek_char(s, i) {
            match c {
                ' ' | '\t' | '\r' | ',' => i += 1,
                ';' => break,
                ':' => self.punct(out, base, &mut i, TokenKind::Colon),
                '(' => self.punct(out, base, &mut i, TokenKind::LParen),
                ')' => self.punct(out, base, &mut i, TokenKind::RParen),
                '{' => self.punct(out, base, &mut i, TokenKind::LBrace),
                '}' => self.punct(out, base, &mut i, TokenKind::RBrace),
                '.' => self.punct(out, base, &mut i, TokenKind::Dot),
                '[' => self.punct(out, base, &mut i, TokenKind::LBracket),
                ']' => self.punct(out, base, &mut i, TokenKind::RBracket),
                '>' => self.punct(out, base, &mut i, TokenKind::Gt),
                '<' => match peek_char(s, i + 1) {
                    Some('=') => {
                        self.push(out, base + i, base + i + 2, TokenKind::Connect);
                        i += 2;
                    }
                    Some('-') => {
                        self.push(
                            out,
                            base + i,
                            base + i + 2,
                            TokenKind::PartialConnect,
                        );
                        i += 2;
                    }
                    _ => self.punct(out, base, &mut i, TokenKind::Lt),
                },
                '=' => match peek_char(s, i + 1) {
                    Some('>') => {
                        self.push(out, base + i, base + i + 2, TokenKind::Assign);
                        i += 2;
                    }
                    _ => self.punct(out, base, &mut i, TokenKind::Equal),
                },
                '@' => self.info(s, &mut i, base, out)?,
                '"' | '\'' => self.string(s, &mut i, base, c, out)?,
                '0'..='9' => self.number(s, &mut i, base, out)?,
                '-' => {
                    if peek_char(s, i + 1).is_some_and(|c| c.is_ascii_digit()) {
                        self.number(s, &mut i, base, out)?;
                    } else {
                        return Err(Error::lex("unexpected character `-'")
                            .with_pos(&self.span(base + i, base + i + 1)));
                    }
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    self.word(s, &mut i, base, out)
                }
                c => {
                    return Err(Error::lex(format!(
                        "unexpected character `{}'",
                        c
                    ))
                    .with_pos(&self.span(base + i, base + i + c.len_utf8())));
                }
            }
        }
        Ok(())
    }

    fn punct(
        &self,
        out: &mut Vec<Token>,
        base: usize,
        i: &mut usize,
        kind: TokenKind,
    ) {
        self.push(out, base + *i, base + *i + 1, kind);
        *i += 1;
    }

    fn info(
        &self,
        s: &str,
        i: &mut usize,
        base: usize,
        out: &mut Vec<Token>,
    ) -> FirrtlatorResult<()> {
        let start = *i;
        if peek_char(s, start + 1) != Some('[') {
            return Err(Error::lex("malformed info annotation")
                .with_pos(&self.span(base + start, base + start + 1)));
        }
        match s[start + 2..].find(']') {
            Some(off) => {
                let payload = &s[start + 2..start + 2 + off];
                let end = start + 2 + off + 1;
                self.push(
                    out,
                    base + start,
                    base + end,
                    TokenKind::Info(payload.to_string()),
                );
                *i = end;
                Ok(())
            }
            None => Err(Error::lex("unterminated info annotation")
                .with_pos(&self.span(base + start, base + s.len()))),
        }
    }

    fn string(
        &self,
        s: &str,
        i: &mut usize,
        base: usize,
        quote: char,
        out: &mut Vec<Token>,
    ) -> FirrtlatorResult<()> {
        let start = *i;
        let mut at = start + 1;
        let mut value = String::new();
        loop {
            match peek_char(s, at) {
                None => {
                    return Err(Error::lex("unterminated string literal")
                        .with_pos(&self.span(base + start, base + at)));
                }
                Some(c) if c == quote => {
                    // a doubled quote is an escaped quote
                    if peek_char(s, at + 1) == Some(quote) {
                        value.push(quote);
                        at += 2;
                    } else {
                        at += 1;
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    at += c.len_utf8();
                }
            }
        }
        self.push(out, base + start, base + at, TokenKind::Str(value));
        *i = at;
        Ok(())
    }

    fn number(
        &self,
        s: &str,
        i: &mut usize,
        base: usize,
        out: &mut Vec<Token>,
    ) -> FirrtlatorResult<()> {
        let start = *i;
        let mut at = start;
        let negative = peek_char(s, at) == Some('-');
        if negative {
            at += 1;
        }

        let value: i64;
        if !negative && s[at..].starts_with("0x") {
            let end =
                scan(s, at + 2, |c| c.is_ascii_hexdigit() || c == '_');
            value =
                self.parse_radix(&s[at + 2..end], 16, base + start, base + end)?;
            at = end;
        } else if !negative && s[at..].starts_with("0o") {
            let end = scan(s, at + 2, |c| ('0'..='7').contains(&c));
            value =
                self.parse_radix(&s[at + 2..end], 8, base + start, base + end)?;
            at = end;
        } else if !negative && s[at..].starts_with("0b") {
            let end = scan(s, at + 2, |c| c == '0' || c == '1');
            value =
                self.parse_radix(&s[at + 2..end], 2, base + start, base + end)?;
            at = end;
        } else {
            let end = scan(s, at, |c| c.is_ascii_digit());
            // `1.5` is a decimal literal; `x[1]` indexes with an integer
            if peek_char(s, end) == Some('.')
                && peek_char(s, end + 1).is_some_and(|c| c.is_ascii_digit())
            {
                let fend = scan(s, end + 1, |c| c.is_ascii_digit());
                let text = &s[start..fend];
                let v: f64 = text.parse().map_err(|_| {
                    self.malformed(text, base + start, base + fend)
                })?;
                self.push(out, base + start, base + fend, TokenKind::Double(v));
                *i = fend;
                return Ok(());
            }
            let text = &s[start..end];
            value = text.parse().map_err(|_| {
                self.malformed(text, base + start, base + end)
            })?;
            at = end;
        }
        self.push(out, base + start, base + at, TokenKind::Int(value));
        *i = at;
        Ok(())
    }

    fn parse_radix(
        &self,
        digits: &str,
        radix: u32,
        start: usize,
        end: usize,
    ) -> FirrtlatorResult<i64> {
        let clean: String = digits.chars().filter(|c| *c != '_').collect();
        if clean.is_empty() {
            return Err(self.malformed(digits, start, end));
        }
        i64::from_str_radix(&clean, radix)
            .map_err(|_| self.malformed(digits, start, end))
    }

    fn malformed(&self, text: &str, start: usize, end: usize) -> Error {
        Error::lex(format!("malformed integer literal `{}'", text))
            .with_pos(&self.span(start, end))
    }

    fn word(
        &self,
        s: &str,
        i: &mut usize,
        base: usize,
        out: &mut Vec<Token>,
    ) {
        let start = *i;
        let end = scan(s, start, |c| c.is_ascii_alphanumeric() || c == '_');
        let mut word = &s[start..end];
        let mut word_end = end;

        // `read-latency', `write-latency', and `read-under-write' are the
        // only words containing a hyphen
        if (word == "read" || word == "write")
            && peek_char(s, end) == Some('-')
        {
            let ext_end = scan(s, end, |c| {
                c.is_ascii_alphanumeric() || c == '-' || c == '_'
            });
            if Keyword::from_str(&s[start..ext_end]).is_ok() {
                word = &s[start..ext_end];
                word_end = ext_end;
            }
        }

        // a primitive-operation name directly followed by `(` is one token
        if peek_char(s, word_end) == Some('(') {
            if let Ok(op) = Operation::from_str(word) {
                self.push(
                    out,
                    base + start,
                    base + word_end + 1,
                    TokenKind::PrimOp(op),
                );
                *i = word_end + 1;
                return;
            }
        }

        let kind = match Keyword::from_str(word) {
            Ok(kw) => TokenKind::Kw(kw),
            Err(_) => TokenKind::Ident(word.to_string()),
        };
        self.push(out, base + start, base + word_end, kind);
        *i = word_end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> FirrtlatorResult<Vec<TokenKind>> {
        let file = GlobalPositionTable::add_file(
            "test.fir".to_string(),
            src.to_string(),
        );
        Ok(Lexer::new(src, file)
            .tokenize()?
            .into_iter()
            .map(|t| t.kind)
            .collect())
    }

    #[test]
    fn indent_and_dedent_balance() {
        let toks = lex("circuit c :\n  module m :\n    skip\n  module n :\n    skip\n")
            .unwrap();
        let indents = toks
            .iter()
            .filter(|t| **t == TokenKind::Indent)
            .count();
        let dedents = toks
            .iter()
            .filter(|t| **t == TokenKind::Dedent)
            .count();
        assert_eq!(indents, 3);
        assert_eq!(indents, dedents);
    }

    #[test]
    fn end_of_input_closes_open_levels() {
        let toks = lex("circuit c :\n  module m :\n    skip").unwrap();
        assert_eq!(
            toks.iter().filter(|t| **t == TokenKind::Dedent).count(),
            2
        );
    }

    #[test]
    fn indent_and_dedent_are_zero_width() {
        let src = "circuit c :\n  skip\n";
        let file = GlobalPositionTable::add_file(
            "test.fir".to_string(),
            src.to_string(),
        );
        let tokens = Lexer::new(src, file).tokenize().unwrap();
        for token in tokens {
            if matches!(token.kind, TokenKind::Indent | TokenKind::Dedent) {
                let (_, start, end) = token.pos.get_location();
                assert_eq!(start, end);
            }
        }
    }

    #[test]
    fn unknown_dedent_level_fails() {
        let err = lex("circuit c :\n    skip\n  skip\n").unwrap_err();
        assert!(err.is_lex());
    }

    #[test]
    fn blank_and_comment_lines_are_transparent() {
        let toks = lex("circuit c :\n  wire a : UInt\n\n  ; comment only\n  wire b : UInt\n")
            .unwrap();
        assert_eq!(
            toks.iter().filter(|t| **t == TokenKind::Indent).count(),
            1
        );
        assert_eq!(
            toks.iter().filter(|t| **t == TokenKind::Dedent).count(),
            1
        );
    }

    #[test]
    fn commas_are_whitespace() {
        let toks = lex("mux(a, b, c)").unwrap();
        assert_eq!(
            toks,
            vec![
                TokenKind::Kw(Keyword::Mux),
                TokenKind::LParen,
                TokenKind::Ident("a".to_string()),
                TokenKind::Ident("b".to_string()),
                TokenKind::Ident("c".to_string()),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn integer_literal_radices() {
        assert_eq!(lex("42").unwrap(), vec![TokenKind::Int(42)]);
        assert_eq!(lex("-42").unwrap(), vec![TokenKind::Int(-42)]);
        assert_eq!(lex("0x1F_f").unwrap(), vec![TokenKind::Int(0x1ff)]);
        assert_eq!(lex("0o17").unwrap(), vec![TokenKind::Int(15)]);
        assert_eq!(lex("0b101").unwrap(), vec![TokenKind::Int(5)]);
        assert_eq!(lex("1.5").unwrap(), vec![TokenKind::Double(1.5)]);
        assert!(lex("0x").unwrap_err().is_lex());
    }

    #[test]
    fn strings_escape_by_doubling() {
        assert_eq!(
            lex(r#""say ""hi""""#).unwrap(),
            vec![TokenKind::Str("say \"hi\"".to_string())]
        );
        assert_eq!(
            lex("'it''s'").unwrap(),
            vec![TokenKind::Str("it's".to_string())]
        );
        assert!(lex("\"open").unwrap_err().is_lex());
    }

    #[test]
    fn info_annotation() {
        assert_eq!(
            lex("@[source.fir 3:1]").unwrap(),
            vec![TokenKind::Info("source.fir 3:1".to_string())]
        );
        assert!(lex("@[open").unwrap_err().is_lex());
    }

    #[test]
    fn primop_names_fuse_with_paren() {
        assert_eq!(
            lex("add(a b)").unwrap(),
            vec![
                TokenKind::PrimOp(Operation::Add),
                TokenKind::Ident("a".to_string()),
                TokenKind::Ident("b".to_string()),
                TokenKind::RParen,
            ]
        );
        // `add` alone is a plain identifier
        assert_eq!(
            lex("add").unwrap(),
            vec![TokenKind::Ident("add".to_string())]
        );
    }

    #[test]
    fn hyphenated_memory_keywords() {
        assert_eq!(
            lex("read-latency => 1").unwrap(),
            vec![
                TokenKind::Kw(Keyword::ReadLatency),
                TokenKind::Assign,
                TokenKind::Int(1),
            ]
        );
        assert_eq!(
            lex("read-under-write => old").unwrap(),
            vec![
                TokenKind::Kw(Keyword::ReadUnderWrite),
                TokenKind::Assign,
                TokenKind::Kw(Keyword::Old),
            ]
        );
    }

    #[test]
    fn reset_is_not_a_keyword() {
        assert_eq!(
            lex("reset").unwrap(),
            vec![TokenKind::Ident("reset".to_string())]
        );
    }

    #[test]
    fn compound_operators() {
        assert_eq!(
            lex("a <= b <- c => d < e").unwrap(),
            vec![
                TokenKind::Ident("a".to_string()),
                TokenKind::Connect,
                TokenKind::Ident("b".to_string()),
                TokenKind::PartialConnect,
                TokenKind::Ident("c".to_string()),
                TokenKind::Assign,
                TokenKind::Ident("d".to_string()),
                TokenKind::Lt,
                TokenKind::Ident("e".to_string()),
            ]
        );
    }
}
