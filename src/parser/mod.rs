// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Parser integration (spec.md §4.6, SPEC_FULL.md §4.6): a small
//! recursive-descent grammar over the PL/SQL subset this core rewrites.
//!
//! The hard constraint from spec.md §4.6 — "a full package body or type
//! body is never parsed whole" — is enforced at the type level: the only
//! public entry point is [`parse`], which takes a [`ParseInput`] that can
//! only be constructed as `Stub`, `ReducedBody`, or `SingleRoutine`. There
//! is no function here that accepts a raw, untagged `&str`.

mod expr;
mod stmt;

use crate::ast::{Block, Decl, RoutineSig};
use crate::error::{SourcePos, TransformError};
use crate::tokenizer::{Token, Tokenizer};

/// Tags the three, and only three, shapes of text this parser is allowed to
/// see (spec.md §4.6): a stub (signature extraction), a reduced package
/// body (package-level declarations), or a single routine's full source
/// (transformation). Never a whole package/type body.
pub enum ParseInput<'a> {
    Stub(&'a str),
    ReducedBody(&'a str),
    SingleRoutine(&'a str),
}

pub enum ParseOutput {
    Sig(RoutineSig),
    Decls(Vec<Decl>),
    Routine(RoutineSig, Block),
}

pub fn parse(input: ParseInput<'_>) -> Result<ParseOutput, TransformError> {
    match input {
        ParseInput::Stub(src) => {
            let mut p = Parser::new(src)?;
            let sig = p.parse_routine_sig()?;
            Ok(ParseOutput::Sig(sig))
        }
        ParseInput::ReducedBody(src) => {
            let mut p = Parser::new(src)?;
            let decls = p.parse_decl_section_top_level()?;
            Ok(ParseOutput::Decls(decls))
        }
        ParseInput::SingleRoutine(src) => {
            let mut p = Parser::new(src)?;
            let sig = p.parse_routine_sig()?;
            let block = p.parse_block()?;
            Ok(ParseOutput::Routine(sig, block))
        }
    }
}

pub(crate) struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    tokens: Vec<(Token, SourcePos)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Result<Self, TransformError> {
        let mut tokenizer = Tokenizer::new(src);
        let tokens = tokenizer.tokenize()?;
        Ok(Parser {
            tokenizer,
            tokens,
            pos: 0,
        })
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].0
    }

    pub(crate) fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].0
    }

    pub(crate) fn current_pos(&self) -> SourcePos {
        self.tokens[self.pos.min(self.tokens.len() - 1)].1
    }

    pub(crate) fn bump(&mut self) -> Token {
        let t = self.tokens[self.pos.min(self.tokens.len() - 1)].0.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    /// Case-insensitively matches a keyword-shaped identifier, consuming it.
    pub(crate) fn eat_keyword(&mut self, kw: &str) -> bool {
        if let Token::Ident(s) = self.peek() {
            if s.eq_ignore_ascii_case(kw) {
                self.bump();
                return true;
            }
        }
        false
    }

    pub(crate) fn eat_any_keyword(&mut self, kws: &[&str]) -> Option<String> {
        for kw in kws {
            if self.eat_keyword(kw) {
                return Some(kw.to_uppercase());
            }
        }
        None
    }

    pub(crate) fn peek_is_keyword(&self, kw: &str) -> bool {
        matches!(self.peek(), Token::Ident(s) if s.eq_ignore_ascii_case(kw))
    }

    pub(crate) fn peek_is_any_keyword(&self, kws: &[&str]) -> bool {
        kws.iter().any(|kw| self.peek_is_keyword(kw))
    }

    pub(crate) fn eat_punct(&mut self, c: char) -> bool {
        if matches!(self.peek(), Token::Punct(p) if *p == c) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_punct(&mut self, c: char, ctx: &str) -> Result<(), TransformError> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.err(format!("expected '{c}' {ctx}")))
        }
    }

    pub(crate) fn eat_op(&mut self, op: &str) -> bool {
        if matches!(self.peek(), Token::Op(o) if *o == op) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn read_ident(&mut self) -> Result<String, TransformError> {
        match self.peek().clone() {
            Token::Ident(s) => {
                self.bump();
                Ok(s)
            }
            _ => Err(self.err("expected identifier".to_string())),
        }
    }

    pub(crate) fn err(&self, message: impl Into<String>) -> TransformError {
        let pos = self.current_pos();
        TransformError::ParseError {
            routine: crate::qualified_name::QualifiedName::new("", ""),
            pos,
            message: message.into(),
        }
    }

    fn byte_offset_of_current(&self) -> usize {
        self.tokenizer.byte_offset(self.current_pos().offset)
    }

    // ---- signature parsing (spec.md §4.3) ----

    pub(crate) fn parse_routine_sig(&mut self) -> Result<RoutineSig, TransformError> {
        // Skip any leading type-method modifiers; they carry no signature
        // information the caller needs (kind comes from the scanner).
        loop {
            if self
                .eat_any_keyword(&["MEMBER", "STATIC", "MAP", "ORDER", "CONSTRUCTOR"])
                .is_none()
            {
                break;
            }
        }
        self.eat_any_keyword(&["FUNCTION", "PROCEDURE"]);
        let name = self.read_ident()?;

        let mut params = Vec::new();
        if self.eat_punct('(') {
            if !self.eat_punct(')') {
                loop {
                    let pname = self.read_ident()?;
                    let mode = if self.eat_keyword("IN") {
                        if self.eat_keyword("OUT") {
                            crate::ast::ParamMode::InOut
                        } else {
                            crate::ast::ParamMode::In
                        }
                    } else if self.eat_keyword("OUT") {
                        crate::ast::ParamMode::Out
                    } else if self.eat_keyword("INOUT") {
                        crate::ast::ParamMode::InOut
                    } else {
                        crate::ast::ParamMode::In
                    };
                    let type_name = self.read_type_name()?;
                    if self.eat_op(":=") || self.eat_keyword("DEFAULT") {
                        // default expression value is not needed for the
                        // signature; consume tokens up to ',' or ')'.
                        self.skip_until_any(&[',', ')']);
                    }
                    params.push(crate::ast::Param {
                        name: pname,
                        mode,
                        type_name,
                    });
                    if self.eat_punct(',') {
                        continue;
                    }
                    self.expect_punct(')', "to close parameter list")?;
                    break;
                }
            }
        }

        let mut return_type = None;
        let mut is_self_as_result = false;
        if self.eat_keyword("RETURN") {
            if self.eat_keyword("SELF") {
                self.eat_keyword("AS");
                self.eat_keyword("RESULT");
                is_self_as_result = true;
            } else {
                return_type = Some(self.read_type_name()?);
            }
        }

        Ok(RoutineSig {
            name,
            params,
            return_type,
            is_self_as_result,
        })
    }

    fn read_type_name(&mut self) -> Result<String, TransformError> {
        let mut name = self.read_ident()?;
        if self.eat_punct('.') {
            name.push('.');
            name.push_str(&self.read_ident()?);
        }
        if self.eat_punct('(') {
            // precision/scale, e.g. NUMBER(10,2)
            self.skip_balanced_parens();
        }
        Ok(name)
    }

    fn skip_until_any(&mut self, stops: &[char]) {
        let mut depth = 0i32;
        loop {
            match self.peek() {
                Token::Eof => break,
                Token::Punct('(') => {
                    depth += 1;
                    self.bump();
                }
                Token::Punct(')') if depth > 0 => {
                    depth -= 1;
                    self.bump();
                }
                Token::Punct(c) if depth == 0 && stops.contains(c) => break,
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn skip_balanced_parens(&mut self) {
        let mut depth = 1i32;
        while depth > 0 {
            match self.peek() {
                Token::Eof => break,
                Token::Punct('(') => {
                    depth += 1;
                    self.bump();
                }
                Token::Punct(')') => {
                    depth -= 1;
                    self.bump();
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    // ---- declare-section parsing, shared by single-routine and
    // reduced-body parsing ----

    /// Parses `IS`/`AS` then the declare section up to `BEGIN`, for a
    /// single routine (sig already consumed by the caller).
    pub(crate) fn parse_block(&mut self) -> Result<Block, TransformError> {
        self.eat_any_keyword(&["IS", "AS"]);
        let declares = self.parse_decls_until_begin()?;
        self.eat_keyword("BEGIN");
        let (body, exception_handlers) = stmt::parse_stmt_list_with_exceptions(self)?;
        self.eat_keyword("END");
        // optional trailing routine name label
        let _ = self.read_ident();
        self.eat_punct(';');
        Ok(Block {
            declares,
            body,
            exception_handlers,
        })
    }

    /// For a reduced package body (no `IS`/`BEGIN` wrapper — just a flat
    /// declare section at top level, per spec.md §4.4).
    fn parse_decl_section_top_level(&mut self) -> Result<Vec<Decl>, TransformError> {
        self.eat_any_keyword(&["PACKAGE", "BODY"]);
        // possible `schema.pkg IS`/`AS` header left over from excising
        // routines out of a package body; tolerate and skip to IS/AS.
        while !self.at_eof() && !self.peek_is_any_keyword(&["IS", "AS"]) {
            self.bump();
        }
        self.eat_any_keyword(&["IS", "AS"]);
        self.parse_decls_until_begin()
    }

    fn parse_decls_until_begin(&mut self) -> Result<Vec<Decl>, TransformError> {
        let mut decls = Vec::new();
        while !self.at_eof()
            && !self.peek_is_keyword("BEGIN")
            && !self.peek_is_keyword("END")
        {
            if self.peek_is_keyword("PRAGMA") {
                self.bump();
                self.eat_keyword("EXCEPTION_INIT");
                self.expect_punct('(', "after EXCEPTION_INIT")?;
                let name = self.read_ident()?;
                self.expect_punct(',', "between EXCEPTION_INIT args")?;
                let negate = self.eat_punct('-');
                let code_tok = self.bump();
                let code: i32 = match code_tok {
                    Token::Number(n) => n.parse().unwrap_or(0),
                    _ => return Err(self.err("expected numeric error code in EXCEPTION_INIT")),
                };
                let oracle_code = if negate { -code } else { code };
                self.expect_punct(')', "to close EXCEPTION_INIT")?;
                self.eat_punct(';');
                decls.push(Decl::PragmaExceptionInit { name, oracle_code });
                continue;
            }

            let name = match self.peek().clone() {
                Token::Ident(s) => {
                    self.bump();
                    s
                }
                _ => {
                    // unrecognized declaration token shape; skip to next ';'
                    self.skip_to_semicolon();
                    continue;
                }
            };

            if self.eat_keyword("EXCEPTION") {
                self.eat_punct(';');
                decls.push(Decl::Exception { name });
                continue;
            }
            if self.eat_keyword("CURSOR") {
                if self.eat_punct('(') {
                    self.skip_balanced_parens();
                }
                self.eat_keyword("IS");
                let start_byte = self.byte_offset_of_current();
                self.skip_to_semicolon();
                let end_byte = self.byte_offset_of_current();
                let query = self
                    .tokenizer_src()
                    .get(start_byte..end_byte)
                    .unwrap_or("")
                    .trim()
                    .trim_end_matches(';')
                    .to_string();
                decls.push(Decl::Cursor { name, query });
                continue;
            }

            // ordinary variable/constant declaration: name type [:= expr];
            self.eat_keyword("CONSTANT");
            let type_name = self.read_type_name().unwrap_or_default();
            let default = if self.eat_op(":=") || self.eat_keyword("DEFAULT") {
                Some(expr::parse_expr(self)?)
            } else {
                None
            };
            self.eat_punct(';');
            decls.push(Decl::Variable {
                name,
                type_name,
                default,
            });
        }
        Ok(decls)
    }

    fn tokenizer_src(&self) -> &str {
        // Safety net only used to slice a cursor query's raw text; the
        // tokenizer retains the original &str for this purpose.
        self.tokenizer.source()
    }

    pub(crate) fn skip_to_semicolon(&mut self) {
        while !self.at_eof() && !matches!(self.peek(), Token::Punct(';')) {
            self.bump();
        }
        self.eat_punct(';');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ParamMode;

    #[test]
    fn parses_function_signature() {
        let out = parse(ParseInput::Stub(
            "FUNCTION get_salary(emp_id NUMBER) RETURN NUMBER IS BEGIN RETURN NULL; END;",
        ))
        .unwrap();
        let ParseOutput::Sig(sig) = out else {
            panic!("expected Sig")
        };
        assert_eq!(sig.name, "get_salary");
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0].mode, ParamMode::In);
        assert_eq!(sig.return_type.as_deref(), Some("NUMBER"));
    }

    #[test]
    fn parses_self_as_result_constructor_signature() {
        let out = parse(ParseInput::Stub(
            "CONSTRUCTOR FUNCTION employee_type(id NUMBER) RETURN SELF AS RESULT IS BEGIN RETURN; END;",
        ))
        .unwrap();
        let ParseOutput::Sig(sig) = out else {
            panic!("expected Sig")
        };
        assert!(sig.is_self_as_result);
        assert_eq!(sig.name, "employee_type");
    }

    #[test]
    fn parses_procedure_with_out_param() {
        let out = parse(ParseInput::Stub(
            "PROCEDURE set_salary(emp_id IN NUMBER, new_salary OUT NUMBER) IS BEGIN NULL; END;",
        ))
        .unwrap();
        let ParseOutput::Sig(sig) = out else {
            panic!("expected Sig")
        };
        assert_eq!(sig.params[1].mode, ParamMode::Out);
        assert!(sig.return_type.is_none());
    }
}
