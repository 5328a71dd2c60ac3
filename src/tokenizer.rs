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

//! Tokenizer feeding [`crate::parser`]. Operates on already-cleaned source
//! (comments stripped by [`crate::cleaner`]) — it has no comment handling
//! of its own.

use crate::error::{SourcePos, TransformError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    Number(String),
    /// A `'...'` string literal, already unescaped (`''` -> `'`).
    StringLit(String),
    /// One of `%FOUND`, `%NOTFOUND`, `%ROWCOUNT`, `%ISOPEN`, `%TYPE`,
    /// `%ROWTYPE` — the `%word` suffix attached to an identifier.
    PercentAttr(String),
    Punct(char),
    /// Multi-char operators: `:=`, `<>`, `!=`, `<=`, `>=`, `||`, `..`.
    Op(&'static str),
    Eof,
}

pub struct Tokenizer<'a> {
    chars: Vec<char>,
    src: &'a str,
    pos: usize,
    line: usize,
    col: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '#'
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        Tokenizer {
            chars: src.chars().collect(),
            src,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn current_pos(&self) -> SourcePos {
        SourcePos {
            offset: self.pos,
            line: self.line,
            column: self.col,
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Tokenizes the entire input, returning one token per element plus a
    /// trailing [`Token::Eof`], each paired with its starting position for
    /// diagnostics.
    pub fn tokenize(&mut self) -> Result<Vec<(Token, SourcePos)>, TransformError> {
        let mut out = Vec::new();
        loop {
            self.skip_ws();
            let pos = self.current_pos();
            let Some(c) = self.peek() else {
                out.push((Token::Eof, pos));
                break;
            };

            if c == '\'' {
                out.push((Token::StringLit(self.read_string()?), pos));
                continue;
            }
            if c.is_ascii_digit() {
                out.push((Token::Number(self.read_number()), pos));
                continue;
            }
            if is_ident_start(c) {
                out.push((Token::Ident(self.read_ident()), pos));
                continue;
            }
            if c == '%' {
                self.bump();
                let word = self.read_ident();
                out.push((Token::PercentAttr(word), pos));
                continue;
            }

            // multi-char operators, longest match first
            if c == ':' && self.peek_at(1) == Some('=') {
                self.bump();
                self.bump();
                out.push((Token::Op(":="), pos));
                continue;
            }
            if c == '<' && self.peek_at(1) == Some('>') {
                self.bump();
                self.bump();
                out.push((Token::Op("<>"), pos));
                continue;
            }
            if c == '!' && self.peek_at(1) == Some('=') {
                self.bump();
                self.bump();
                out.push((Token::Op("!="), pos));
                continue;
            }
            if c == '<' && self.peek_at(1) == Some('=') {
                self.bump();
                self.bump();
                out.push((Token::Op("<="), pos));
                continue;
            }
            if c == '>' && self.peek_at(1) == Some('=') {
                self.bump();
                self.bump();
                out.push((Token::Op(">="), pos));
                continue;
            }
            if c == '|' && self.peek_at(1) == Some('|') {
                self.bump();
                self.bump();
                out.push((Token::Op("||"), pos));
                continue;
            }
            if c == '.' && self.peek_at(1) == Some('.') {
                self.bump();
                self.bump();
                out.push((Token::Op(".."), pos));
                continue;
            }

            self.bump();
            out.push((Token::Punct(c), pos));
        }
        Ok(out)
    }

    fn read_ident(&mut self) -> String {
        let start = self.pos;
        while self.peek().map(is_ident_char).unwrap_or(false) {
            self.bump();
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn read_number(&mut self) -> String {
        let start = self.pos;
        while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.bump();
        }
        if self.peek() == Some('.') && self.peek_at(1).map(|c| c.is_ascii_digit()).unwrap_or(false)
        {
            self.bump();
            while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                self.bump();
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn read_string(&mut self) -> Result<String, TransformError> {
        debug_assert_eq!(self.peek(), Some('\''));
        self.bump();
        let mut out = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(TransformError::MalformedSource {
                        pos: self.current_pos(),
                        reason: "unterminated string literal".to_string(),
                    })
                }
                Some('\'') => {
                    self.bump();
                    if self.peek() == Some('\'') {
                        out.push('\'');
                        self.bump();
                    } else {
                        break;
                    }
                }
                Some(c) => {
                    out.push(c);
                    self.bump();
                }
            }
        }
        Ok(out)
    }

    /// The original source text, for callers that need to slice out a raw
    /// sub-range (e.g. a cursor's SELECT text) rather than reconstruct it
    /// from tokens.
    pub fn source(&self) -> &'a str {
        self.src
    }

    /// Byte offset of `char_idx` in the original `&str`, for error messages
    /// that want to slice the original text.
    pub fn byte_offset(&self, char_idx: usize) -> usize {
        self.src
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.src.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(src: &str) -> Vec<Token> {
        Tokenizer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn tokenizes_assignment() {
        let t = toks("x := 1 + 2;");
        assert_eq!(
            t,
            vec![
                Token::Ident("x".into()),
                Token::Op(":="),
                Token::Number("1".into()),
                Token::Punct('+'),
                Token::Number("2".into()),
                Token::Punct(';'),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn tokenizes_cursor_attribute() {
        let t = toks("SQL%ROWCOUNT");
        assert_eq!(
            t,
            vec![
                Token::Ident("SQL".into()),
                Token::PercentAttr("ROWCOUNT".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn tokenizes_string_with_escaped_quote() {
        let t = toks("'it''s fine'");
        assert_eq!(t, vec![Token::StringLit("it's fine".into()), Token::Eof]);
    }
}
