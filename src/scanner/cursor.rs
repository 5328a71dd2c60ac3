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

//! A minimal, keyword-aware cursor over already-comment-stripped source,
//! shared by both [`super::routine`] and [`super::type_body`] scanners.
//!
//! This is deliberately not a full tokenizer: the boundary scanners only
//! need to recognize a handful of reserved words at word boundaries, track
//! parenthesis/BEGIN-END depth, and skip over string literals. Anything
//! resembling real SQL/PL-SQL grammar belongs in `crate::parser`, which
//! only ever runs on an already-isolated stub or single routine.

pub struct Cursor<'a> {
    chars: Vec<char>,
    src: &'a str,
    pos: usize,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '#'
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Cursor {
            chars: src.chars().collect(),
            src,
            pos: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Converts a char index (as used by this cursor) to a byte offset into
    /// the original `&str`, for slicing.
    pub fn byte_offset(&self, char_idx: usize) -> usize {
        self.src
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.src.len())
    }

    /// If positioned on a `'`, consumes the whole string literal (handling
    /// `''` as an embedded quote) and returns `true`. Otherwise leaves the
    /// cursor untouched and returns `false`.
    ///
    /// This implements the "Any state: `'` -> InString" transition from
    /// spec.md §4.2 uniformly, since a string literal can appear while the
    /// scanner is in any of its other states.
    pub fn skip_string_if_present(&mut self) -> bool {
        if self.peek() != Some('\'') {
            return false;
        }
        self.pos += 1;
        loop {
            match self.peek() {
                None => break, // SourceCleaner already rejects unterminated strings
                Some('\'') => {
                    self.pos += 1;
                    if self.peek() == Some('\'') {
                        self.pos += 1; // escaped quote, stay inside
                    } else {
                        break;
                    }
                }
                Some(_) => {
                    self.pos += 1;
                }
            }
        }
        true
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Advances past exactly one character, used when nothing more specific
    /// matched at the current position.
    pub fn advance_one(&mut self) {
        self.advance();
    }

    /// Repositions the cursor to an arbitrary (already-visited or ahead)
    /// char index. Used to recover forward progress after a dead-end match
    /// (e.g. a modifier sequence not followed by FUNCTION/PROCEDURE).
    pub fn seek(&mut self, char_idx: usize) {
        self.pos = char_idx.min(self.chars.len());
    }

    pub fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Tries to match `keyword` case-insensitively at the current position
    /// with identifier-boundary checks on both sides. On success, advances
    /// past the keyword (but not past trailing whitespace) and returns
    /// `true`.
    pub fn match_keyword(&mut self, keyword: &str) -> bool {
        let kw_len = keyword.chars().count();
        if self.pos + kw_len > self.chars.len() {
            return false;
        }
        let slice: String = self.chars[self.pos..self.pos + kw_len].iter().collect();
        if !slice.eq_ignore_ascii_case(keyword) {
            return false;
        }
        // boundary before
        if self.pos > 0 && is_ident_char(self.chars[self.pos - 1]) {
            return false;
        }
        // boundary after
        if let Some(next) = self.chars.get(self.pos + kw_len) {
            if is_ident_char(*next) {
                return false;
            }
        }
        self.pos += kw_len;
        true
    }

    /// Like [`Self::match_keyword`] but tries each candidate in order,
    /// returning the one that matched.
    pub fn match_any_keyword(&mut self, keywords: &[&'static str]) -> Option<&'static str> {
        for kw in keywords {
            if self.match_keyword(kw) {
                return Some(kw);
            }
        }
        None
    }

    /// Reads a (possibly dotted, e.g. `schema.pkg`) identifier, advancing
    /// past it. Returns `None` without advancing if not positioned on an
    /// identifier character.
    pub fn read_ident(&mut self) -> Option<String> {
        if !self.peek().map(is_ident_char).unwrap_or(false) {
            return None;
        }
        let start = self.pos;
        while self.peek().map(is_ident_char).unwrap_or(false) {
            self.advance();
        }
        Some(self.chars[start..self.pos].iter().collect())
    }
}
