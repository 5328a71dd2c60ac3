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

//! [`TransformContext`] (spec.md §3, §5): the per-routine scope — current
//! schema, alias bindings, the exception-name-to-SQLSTATE map, the cursor
//! attribute tracker, and the accumulated warning report. Lives for the
//! duration of exactly one routine's transformation (spec.md §5); never
//! shared across routines.

use crate::ast::{Block, Decl, Expr, Stmt};
use crate::config::TransformConfig;
use crate::error::{SourcePos, Warning};
use crate::qualified_name::QualifiedName;
use std::collections::{HashMap, HashSet};

/// Per-routine cursor attribute usage (spec.md §3's `CursorAttrTracker`,
/// §4.7.3). `SQL` (case-insensitive) denotes the implicit cursor and is
/// tracked through the same set via [`Self::mark_sql_cursor_used`] rather
/// than a special-cased name, since the declaration/injection shape is
/// identical except for the variable name prefix.
#[derive(Debug, Default)]
pub struct CursorAttrTracker {
    tracked: HashSet<String>,
    uses_sql_cursor: bool,
}

impl CursorAttrTracker {
    pub fn mark_used(&mut self, cursor_name: &str) {
        if cursor_name.eq_ignore_ascii_case("SQL") {
            self.uses_sql_cursor = true;
        } else {
            self.tracked.insert(cursor_name.to_uppercase());
        }
    }

    pub fn is_tracked(&self, cursor_name: &str) -> bool {
        self.tracked.contains(&cursor_name.to_uppercase())
    }

    pub fn uses_sql_cursor(&self) -> bool {
        self.uses_sql_cursor
    }

    /// The explicit cursors seen, in a deterministic (sorted) order so
    /// declaration-injection output is stable across runs.
    pub fn tracked_cursors(&self) -> Vec<String> {
        let mut v: Vec<String> = self.tracked.iter().cloned().collect();
        v.sort();
        v
    }
}

/// Walks a routine's block once, ahead of rendering, to record every
/// cursor (`SQL` and explicit) it ever references. The statement visitor
/// is a single linear pass (spec.md §4.7), so without this a `GET
/// DIAGNOSTICS ... = ROW_COUNT` injection after an early `UPDATE`/`INSERT`/
/// `DELETE` would miss a `SQL%ROWCOUNT` reference that only appears in a
/// later statement of the same routine (spec.md §8 scenario S1).
pub fn prescan_cursor_usage(block: &Block, tracker: &mut CursorAttrTracker) {
    for decl in &block.declares {
        if let Decl::Variable { default: Some(expr), .. } = decl {
            prescan_expr(expr, tracker);
        }
    }
    prescan_stmts(&block.body, tracker);
    for handler in &block.exception_handlers {
        prescan_stmts(&handler.body, tracker);
    }
}

fn prescan_stmts(stmts: &[Stmt], tracker: &mut CursorAttrTracker) {
    for stmt in stmts {
        prescan_stmt(stmt, tracker);
    }
}

fn prescan_stmt(stmt: &Stmt, tracker: &mut CursorAttrTracker) {
    match stmt {
        Stmt::Block(b) => prescan_cursor_usage(b, tracker),
        Stmt::If { cond, then_body, elsifs, else_body } => {
            prescan_expr(cond, tracker);
            prescan_stmts(then_body, tracker);
            for (econd, ebody) in elsifs {
                prescan_expr(econd, tracker);
                prescan_stmts(ebody, tracker);
            }
            if let Some(eb) = else_body {
                prescan_stmts(eb, tracker);
            }
        }
        Stmt::Loop { body, .. } => prescan_stmts(body, tracker),
        Stmt::WhileLoop { cond, body } => {
            prescan_expr(cond, tracker);
            prescan_stmts(body, tracker);
        }
        Stmt::ForRangeLoop { lower, upper, body, .. } => {
            prescan_expr(lower, tracker);
            prescan_expr(upper, tracker);
            prescan_stmts(body, tracker);
        }
        Stmt::ForCursorLoop { cursor, body, .. } => {
            tracker.mark_used(cursor);
            prescan_stmts(body, tracker);
        }
        Stmt::Open { cursor } | Stmt::Fetch { cursor, .. } | Stmt::Close { cursor } => {
            tracker.mark_used(cursor);
        }
        Stmt::Assign { target, value } => {
            prescan_expr(target, tracker);
            prescan_expr(value, tracker);
        }
        Stmt::Insert(s) => match &s.source {
            crate::ast::InsertSource::Values(rows) => {
                for row in rows {
                    for e in row {
                        prescan_expr(e, tracker);
                    }
                }
            }
            crate::ast::InsertSource::Select(sel) => prescan_select(sel, tracker),
            crate::ast::InsertSource::Record(e) => prescan_expr(e, tracker),
        },
        Stmt::Update(s) => {
            for a in &s.set {
                prescan_expr(&a.value, tracker);
            }
            if let Some(w) = &s.where_clause {
                prescan_expr(w, tracker);
            }
        }
        Stmt::Delete(s) => {
            if let Some(w) = &s.where_clause {
                prescan_expr(w, tracker);
            }
        }
        Stmt::SelectInto(s) => prescan_select(&s.select, tracker),
        Stmt::Raise(r) => {
            if let crate::ast::RaiseStmt::ApplicationError { message, .. } = r {
                prescan_expr(message, tracker);
            }
        }
        Stmt::Call { target } => prescan_expr(target, tracker),
        Stmt::Return(Some(e)) => prescan_expr(e, tracker),
        Stmt::Return(None) | Stmt::Null | Stmt::Raw(_) => {}
        Stmt::Exit { when, .. } => {
            if let Some(w) = when {
                prescan_expr(w, tracker);
            }
        }
    }
}

fn prescan_select(select: &crate::ast::SelectStmt, tracker: &mut CursorAttrTracker) {
    for item in &select.items {
        prescan_expr(&item.expr, tracker);
    }
    if let Some(w) = &select.where_clause {
        prescan_expr(w, tracker);
    }
}

fn prescan_expr(expr: &Expr, tracker: &mut CursorAttrTracker) {
    match expr {
        Expr::CursorAttr { cursor, .. } => tracker.mark_used(cursor),
        Expr::Dotted(_) | Expr::Ident(_) | Expr::Literal(_) | Expr::Raw(_) => {}
        Expr::BinaryOp { left, right, .. } => {
            prescan_expr(left, tracker);
            prescan_expr(right, tracker);
        }
        Expr::UnaryOp { expr, .. } => prescan_expr(expr, tracker),
        Expr::FuncCall { args, .. } => {
            for a in args {
                prescan_expr(a, tracker);
            }
        }
        Expr::MethodCall { target, args, .. } => {
            prescan_expr(target, tracker);
            for a in args {
                prescan_expr(a, tracker);
            }
        }
        Expr::Paren(inner) => prescan_expr(inner, tracker),
    }
}

/// Per-routine exception-name -> Pnnnn SQLSTATE map (spec.md §3's
/// `ExceptionMap`, §4.7.4). Populated from `PRAGMA EXCEPTION_INIT`
/// declarations during the declare-section visit, consumed by `RAISE name`
/// and `WHEN name` handlers during the statement visit.
#[derive(Debug, Default)]
pub struct ExceptionMap {
    codes: HashMap<String, String>,
}

impl ExceptionMap {
    /// Registers `name -> 'Pxxx'` from `PRAGMA EXCEPTION_INIT(name, -20N)`,
    /// where `xxx` is `20000 + N` zero-padded to 4 digits (spec.md §3, §8
    /// property 6; e.g. `-20001 -> P0001`).
    pub fn register(&mut self, name: &str, oracle_code: i32) {
        self.codes
            .insert(name.to_uppercase(), oracle_code_to_sqlstate(oracle_code));
    }

    pub fn sqlstate_for(&self, name: &str) -> Option<&str> {
        self.codes.get(&name.to_uppercase()).map(|s| s.as_str())
    }
}

/// `-20N -> Pxxx` (xxx = `20000 + N` zero-padded to 4 digits), shared by
/// `PRAGMA EXCEPTION_INIT` registration and bare `RAISE_APPLICATION_ERROR`
/// call sites (spec.md §3, §8 property 6), which need the same formula
/// without necessarily having a named exception behind it.
pub fn oracle_code_to_sqlstate(oracle_code: i32) -> String {
    let n = oracle_code.unsigned_abs() as i64 - 20000;
    format!("P{:04}", n.max(0))
}

/// Standard Oracle exception names mapped to their PostgreSQL condition
/// names (spec.md §4.7.4). `OTHERS` is preserved verbatim by the caller and
/// is therefore not in this table.
pub fn standard_exception_pg_name(oracle_name: &str) -> Option<&'static str> {
    match oracle_name.to_uppercase().as_str() {
        "NO_DATA_FOUND" => Some("no_data_found"),
        "TOO_MANY_ROWS" => Some("too_many_rows"),
        "ZERO_DIVIDE" => Some("division_by_zero"),
        "DUP_VAL_ON_INDEX" => Some("unique_violation"),
        "VALUE_ERROR" | "INVALID_NUMBER" => Some("invalid_text_representation"),
        "CURSOR_ALREADY_OPEN" => Some("duplicate_cursor"),
        "INVALID_CURSOR" => Some("invalid_cursor_state"),
        "LOGIN_DENIED" => Some("invalid_password"),
        "NOT_LOGGED_ON" => Some("connection_does_not_exist"),
        "STORAGE_ERROR" => Some("out_of_memory"),
        "TIMEOUT_ON_RESOURCE" => Some("lock_not_available"),
        _ => None,
    }
}

/// One stack frame of table-alias bindings (spec.md §3's `AliasEnv`),
/// pushed on entering a SELECT/DML statement scope and popped on exit.
#[derive(Debug, Default)]
pub struct AliasEnv {
    frames: Vec<HashMap<String, QualifiedName>>,
}

impl AliasEnv {
    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    pub fn bind(&mut self, alias: &str, table: QualifiedName) {
        if let Some(top) = self.frames.last_mut() {
            top.insert(alias.to_uppercase(), table);
        }
    }

    /// `resolve_alias(alias) -> table_q`, searching innermost frame first.
    pub fn resolve(&self, alias: &str) -> Option<&QualifiedName> {
        let upper = alias.to_uppercase();
        self.frames.iter().rev().find_map(|f| f.get(&upper))
    }
}

/// The per-routine transformation scope (spec.md §3, §5).
pub struct TransformContext<'a> {
    pub config: &'a TransformConfig,
    pub routine: QualifiedName,
    pub cursors: CursorAttrTracker,
    pub exceptions: ExceptionMap,
    pub aliases: AliasEnv,
    pub warnings: Vec<Warning>,
}

impl<'a> TransformContext<'a> {
    pub fn new(config: &'a TransformConfig, routine: QualifiedName) -> Self {
        TransformContext {
            config,
            routine,
            cursors: CursorAttrTracker::default(),
            exceptions: ExceptionMap::default(),
            aliases: AliasEnv::default(),
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(Warning {
            routine: self.routine.clone(),
            pos: SourcePos::default(),
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exception_map_pads_to_four_digits() {
        let mut map = ExceptionMap::default();
        map.register("invalid_salary", -20001);
        assert_eq!(map.sqlstate_for("INVALID_SALARY"), Some("P0001"));
        assert_eq!(map.sqlstate_for("invalid_salary"), Some("P0001"));
    }

    #[test]
    fn exception_map_handles_larger_codes() {
        let mut map = ExceptionMap::default();
        map.register("x", -20999);
        assert_eq!(map.sqlstate_for("x"), Some("P0999"));
    }

    #[test]
    fn alias_env_resolves_innermost_first() {
        let mut env = AliasEnv::default();
        env.push_frame();
        env.bind("l", QualifiedName::new("hr", "langtable"));
        env.push_frame();
        env.bind("l", QualifiedName::new("hr", "other"));
        assert_eq!(env.resolve("l"), Some(&QualifiedName::new("hr", "other")));
        env.pop_frame();
        assert_eq!(env.resolve("l"), Some(&QualifiedName::new("hr", "langtable")));
    }

    #[test]
    fn cursor_tracker_distinguishes_sql_cursor_from_named() {
        let mut tracker = CursorAttrTracker::default();
        tracker.mark_used("SQL");
        tracker.mark_used("c");
        assert!(tracker.uses_sql_cursor());
        assert!(tracker.is_tracked("c"));
        assert!(!tracker.is_tracked("SQL"));
    }

    #[test]
    fn prescan_finds_sql_rowcount_referenced_only_in_a_later_statement() {
        use crate::ast::{CursorAttr, Stmt, UpdateStmt};

        let block = Block {
            declares: vec![],
            body: vec![
                Stmt::Update(UpdateStmt {
                    table: "emp".to_string(),
                    alias: None,
                    set: vec![],
                    where_clause: None,
                }),
                Stmt::If {
                    cond: Expr::CursorAttr { cursor: "SQL".to_string(), attr: CursorAttr::Found },
                    then_body: vec![Stmt::Null],
                    elsifs: vec![],
                    else_body: None,
                },
            ],
            exception_handlers: vec![],
        };
        let mut tracker = CursorAttrTracker::default();
        prescan_cursor_usage(&block, &mut tracker);
        assert!(tracker.uses_sql_cursor());
    }
}
