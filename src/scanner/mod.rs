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

//! BoundaryScanner (spec.md §4.2): segments a cleaned package body or type
//! body into [`RoutineSegment`]s without invoking a grammar parser on the
//! whole unit.
//!
//! Both scanner variants share one state-machine engine (SPEC_FULL.md's
//! `ScannerProfile` factoring): the type-body variant differs from the
//! routine (package-body) variant only in (a) accepting a leading modifier
//! sequence (`MEMBER`, `STATIC`, `MAP`, `ORDER`, `CONSTRUCTOR`) before
//! `FUNCTION`/`PROCEDURE`, and (b) naming constructors after the owning
//! type. Forward-declaration handling, parenthesis depth, and
//! `BEGIN`/`END` body depth are identical between the two and live here
//! once.

mod cursor;

use crate::error::{SourcePos, TransformError};
use crate::segment::{RoutineKind, RoutineSegment};
use cursor::Cursor;

/// Distinguishes the package-body scanner from the type-body scanner.
/// `spec.md` §4.2 treats them as two profiles of one engine.
pub enum ScannerProfile {
    PackageBody,
    TypeBody { owning_type_name: String },
}

#[derive(Default)]
struct Modifiers {
    member: bool,
    r#static: bool,
    map: bool,
    order: bool,
    constructor: bool,
}

impl Modifiers {
    fn any(&self) -> bool {
        self.member || self.r#static || self.map || self.order || self.constructor
    }

    fn record(&mut self, kw: &str) {
        match kw.to_ascii_uppercase().as_str() {
            "MEMBER" => self.member = true,
            "STATIC" => self.r#static = true,
            "MAP" => self.map = true,
            "ORDER" => self.order = true,
            "CONSTRUCTOR" => self.constructor = true,
            _ => unreachable!("match_any_keyword only returns known modifiers"),
        }
    }

    fn resolve_kind(&self, is_function: bool) -> RoutineKind {
        if self.constructor {
            return RoutineKind::Constructor;
        }
        if self.map {
            return RoutineKind::MapFunction;
        }
        if self.order {
            return RoutineKind::OrderFunction;
        }
        if self.r#static {
            return if is_function {
                RoutineKind::StaticFunction
            } else {
                RoutineKind::StaticProcedure
            };
        }
        if self.member {
            return if is_function {
                RoutineKind::MemberFunction
            } else {
                RoutineKind::MemberProcedure
            };
        }
        if is_function {
            RoutineKind::Function
        } else {
            RoutineKind::Procedure
        }
    }
}

enum SignatureOutcome {
    Body,
    ForwardDecl,
}

/// Scans a cleaned package body, producing one segment per top-level
/// `FUNCTION`/`PROCEDURE` body (forward declarations yield no segment,
/// spec.md §8 scenario S5).
pub fn scan_package_body(cleaned: &str) -> Result<Vec<RoutineSegment>, TransformError> {
    scan(cleaned, &ScannerProfile::PackageBody)
}

/// Scans a cleaned type body, additionally recognizing the
/// `MEMBER`/`STATIC`/`MAP`/`ORDER`/`CONSTRUCTOR` modifiers and naming
/// constructors after `owning_type_name`.
pub fn scan_type_body(
    cleaned: &str,
    owning_type_name: &str,
) -> Result<Vec<RoutineSegment>, TransformError> {
    scan(
        cleaned,
        &ScannerProfile::TypeBody {
            owning_type_name: owning_type_name.to_string(),
        },
    )
}

fn pos_of(cleaned: &str, byte_offset: usize) -> SourcePos {
    let mut line = 1usize;
    let mut col = 1usize;
    for (i, c) in cleaned.char_indices() {
        if i >= byte_offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    SourcePos {
        offset: byte_offset,
        line,
        column: col,
    }
}

fn scan(cleaned: &str, profile: &ScannerProfile) -> Result<Vec<RoutineSegment>, TransformError> {
    let mut cursor = Cursor::new(cleaned);
    let mut segments = Vec::new();

    loop {
        cursor.skip_ws();
        if cursor.at_end() {
            break;
        }
        if cursor.skip_string_if_present() {
            continue;
        }

        let decl_start = cursor.pos();
        let mut modifiers = Modifiers::default();

        if matches!(profile, ScannerProfile::TypeBody { .. }) {
            loop {
                cursor.skip_ws();
                match cursor.match_any_keyword(&["MEMBER", "STATIC", "MAP", "ORDER", "CONSTRUCTOR"]) {
                    Some(kw) => modifiers.record(kw),
                    None => break,
                }
            }
        }

        cursor.skip_ws();
        let kind_kw = cursor.match_any_keyword(&["FUNCTION", "PROCEDURE"]);

        let Some(kind_kw) = kind_kw else {
            if modifiers.any() {
                // A modifier sequence not followed by FUNCTION/PROCEDURE is
                // not valid PL/SQL; treat as non-routine text rather than
                // fail the whole unit, and resume scanning right after the
                // declaration start to guarantee forward progress.
                cursor.seek(decl_start + 1);
                continue;
            }
            if cursor.read_ident().is_none() {
                cursor.advance_one();
            }
            continue;
        };

        let is_function = kind_kw == "FUNCTION";
        cursor.skip_ws();

        let name = if modifiers.constructor {
            // CONSTRUCTOR FUNCTION <typename>(...) RETURN SELF AS RESULT:
            // the identifier here is always the owning type's own name.
            cursor.read_ident();
            match profile {
                ScannerProfile::TypeBody { owning_type_name } => owning_type_name.clone(),
                ScannerProfile::PackageBody => {
                    return Err(TransformError::MalformedSource {
                        pos: pos_of(cleaned, cursor.byte_offset(decl_start)),
                        reason: "CONSTRUCTOR is only valid in a type body".to_string(),
                    })
                }
            }
        } else {
            match cursor.read_ident() {
                Some(n) => n,
                None => {
                    return Err(TransformError::MalformedSource {
                        pos: pos_of(cleaned, cursor.byte_offset(decl_start)),
                        reason: "expected routine name after FUNCTION/PROCEDURE".to_string(),
                    })
                }
            }
        };

        let kind = modifiers.resolve_kind(is_function);

        match scan_signature(&mut cursor, &name)? {
            SignatureOutcome::ForwardDecl => continue,
            SignatureOutcome::Body => {
                let body_start = cursor.pos();
                let body_end_and_end = scan_body(&mut cursor, cleaned, &name)?;
                let segment = RoutineSegment {
                    name,
                    kind,
                    start: cursor.byte_offset(decl_start),
                    body_start: cursor.byte_offset(body_start),
                    body_end: cursor.byte_offset(body_end_and_end.0),
                    end: cursor.byte_offset(body_end_and_end.1),
                };
                debug_assert!(segment.check_invariant());
                segments.push(segment);
            }
        }
    }

    Ok(segments)
}

/// Consumes the parameter list (if any) and the trailing
/// `RETURN <type>` / `RETURN SELF AS RESULT` clause, stopping at the real
/// `IS`/`AS` that opens the body, or at a bare `;` (forward declaration).
fn scan_signature(cursor: &mut Cursor, name: &str) -> Result<SignatureOutcome, TransformError> {
    cursor.skip_ws();
    if cursor.peek() == Some('(') {
        skip_balanced_parens(cursor, name)?;
    }

    loop {
        cursor.skip_ws();
        if cursor.at_end() {
            return Err(unterminated(cursor, name));
        }
        if cursor.skip_string_if_present() {
            continue;
        }
        if cursor.match_keyword("RETURN") {
            cursor.skip_ws();
            if cursor.match_keyword("SELF") {
                cursor.skip_ws();
                cursor.match_keyword("AS");
                cursor.skip_ws();
                cursor.match_keyword("RESULT");
            } else {
                cursor.read_ident();
                cursor.skip_ws();
                if cursor.peek() == Some('(') {
                    skip_balanced_parens(cursor, name)?;
                }
            }
            continue;
        }
        if cursor.match_any_keyword(&["IS", "AS"]).is_some() {
            return Ok(SignatureOutcome::Body);
        }
        if cursor.peek() == Some(';') {
            cursor.advance_one();
            return Ok(SignatureOutcome::ForwardDecl);
        }
        if cursor.read_ident().is_none() {
            cursor.advance_one();
        }
    }
}

fn skip_balanced_parens(cursor: &mut Cursor, name: &str) -> Result<(), TransformError> {
    debug_assert_eq!(cursor.peek(), Some('('));
    cursor.advance_one();
    let mut depth = 1i32;
    while depth > 0 {
        if cursor.at_end() {
            return Err(unterminated(cursor, name));
        }
        if cursor.skip_string_if_present() {
            continue;
        }
        match cursor.peek() {
            Some('(') => {
                depth += 1;
                cursor.advance_one();
            }
            Some(')') => {
                depth -= 1;
                cursor.advance_one();
            }
            _ => cursor.advance_one(),
        }
    }
    Ok(())
}

/// Scans from just after the opening `IS`/`AS` to the routine-closing
/// `END;` at `BEGIN`/`END` depth 0, returning `(body_end, end)` cursor
/// positions: `body_end` is where the closing `END` keyword starts,
/// `end` is one past the terminating `;`.
///
/// `END IF;` / `END LOOP;` / `END CASE;` are construct terminators, not
/// `BEGIN`/`END` pairs, and do not affect depth (spec.md §4.2's `InBody(d)`
/// transitions only name bare `BEGIN`/`END`). A `CASE` *expression*
/// (`CASE WHEN ... END`, no `CASE` after `END`) is indistinguishable from a
/// routine-closing bare `END` at this lexical level; like the rest of this
/// scanner it trades that sliver of grammar precision for never running a
/// full parser over whole bodies (spec.md §4.2, "Scanner does not validate
/// PL/SQL grammar").
fn scan_body(
    cursor: &mut Cursor,
    cleaned: &str,
    name: &str,
) -> Result<(usize, usize), TransformError> {
    let mut depth: i32 = 0;
    loop {
        cursor.skip_ws();
        if cursor.at_end() {
            return Err(unterminated(cursor, name));
        }
        if cursor.skip_string_if_present() {
            continue;
        }
        if cursor.match_keyword("BEGIN") {
            depth += 1;
            continue;
        }
        let end_start = cursor.pos();
        if cursor.match_keyword("END") {
            cursor.skip_ws();
            if cursor
                .match_any_keyword(&["IF", "LOOP", "CASE"])
                .is_some()
            {
                // construct terminator: does not affect BEGIN/END depth
                continue;
            }
            depth -= 1;
            if depth == 0 {
                cursor.skip_ws();
                // optional trailing routine/block label before the ';'
                cursor.read_ident();
                cursor.skip_ws();
                if cursor.peek() != Some(';') {
                    let pos = pos_of(cleaned, cursor.byte_offset(cursor.pos()));
                    return Err(TransformError::MalformedSource {
                        pos,
                        reason: "expected ';' after closing END".to_string(),
                    });
                }
                cursor.advance_one();
                return Ok((end_start, cursor.pos()));
            }
            continue;
        }
        if cursor.read_ident().is_none() {
            cursor.advance_one();
        }
    }
}

fn unterminated(cursor: &Cursor, name: &str) -> TransformError {
    TransformError::UnterminatedRoutine {
        name: name.to_string(),
        pos: SourcePos {
            offset: cursor.pos(),
            line: 0,
            column: 0,
        },
    }
}
