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

//! Statement and block rendering (spec.md §4.7): drives the expression and
//! DML visitors over a parsed `Block`, maintains the declare-section ->
//! `ExceptionMap`/`LocalTypes` bookkeeping, and injects the cursor
//! state-maintenance statements spec.md §4.7.3 requires around
//! `OPEN`/`FETCH`/`CLOSE`.

use super::dml::{render_delete, render_insert, render_select_into, render_update};
use super::expr::{render_expr, LocalTypes};
use super::methods::MethodRenderCtx;
use crate::ast::{Block, Decl, ExceptionCond, RaiseStmt, Stmt};
use crate::context::{oracle_code_to_sqlstate, standard_exception_pg_name, TransformContext};
use crate::error::{Result, TransformError};
use crate::metadata::MetadataIndex;

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Maps a declared Oracle scalar type to its PostgreSQL spelling. This is
/// deliberately small: anything not named here (an already-valid PostgreSQL
/// type, a `%TYPE`/`%ROWTYPE` anchor, a user object type) passes through
/// unchanged, matching spec.md §3's "everything else is a direct scalar
/// mapping".
fn map_scalar_type(oracle_type: &str) -> String {
    let upper = oracle_type.to_uppercase();
    match upper.as_str() {
        "VARCHAR2" | "NVARCHAR2" | "LONG" => "text".to_string(),
        "NUMBER" => "numeric".to_string(),
        "PLS_INTEGER" | "BINARY_INTEGER" | "SIMPLE_INTEGER" => "integer".to_string(),
        "DATE" => "timestamp".to_string(),
        "BOOLEAN" => "boolean".to_string(),
        "BLOB" | "CLOB" | "NCLOB" => "oid".to_string(),
        "LONG RAW" => "bytea".to_string(),
        _ => oracle_type.to_lowercase(),
    }
}

struct DeclSection {
    lines: Vec<String>,
    locals: LocalTypes,
}

fn render_decl_section(
    declares: &[Decl],
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    method_ctx: Option<&MethodRenderCtx>,
    depth: usize,
) -> Result<DeclSection> {
    let mut lines = Vec::new();
    let mut locals = LocalTypes::new();
    let ind = indent(depth);
    for decl in declares {
        match decl {
            Decl::Variable { name, type_name, default } => {
                locals.insert(name.to_uppercase(), type_name.clone());
                let pg_type = map_scalar_type(type_name);
                match default {
                    Some(expr) => {
                        let mut extra = Vec::new();
                        let rendered = render_expr(expr, ctx, idx, &locals, method_ctx, &mut extra);
                        lines.extend(extra.into_iter().map(|l| format!("{ind}{l}")));
                        lines.push(format!("{ind}{} {pg_type} := {rendered};", name.to_lowercase()));
                    }
                    None => lines.push(format!("{ind}{} {pg_type};", name.to_lowercase())),
                }
            }
            // Consumed into the exception map by the following
            // PragmaExceptionInit, never itself emitted (spec.md §4.7.4).
            Decl::Exception { .. } => {}
            Decl::PragmaExceptionInit { name, oracle_code } => {
                ctx.exceptions.register(name, *oracle_code);
            }
            Decl::Cursor { name, query } => {
                lines.push(format!("{ind}{} CURSOR FOR {};", name.to_lowercase(), query));
            }
        }
    }
    Ok(DeclSection { lines, locals })
}

/// Renders a full `Block` (spec.md §4.7): `DECLARE`/`BEGIN`/`EXCEPTION`/`END`
/// with every cursor this block tracks getting its state-maintenance
/// variables declared here, since that's the innermost scope that can see
/// every `OPEN`/`FETCH`/`CLOSE` on it.
pub fn render_block(
    block: &Block,
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    outer_locals: &LocalTypes,
    method_ctx: Option<&MethodRenderCtx>,
    depth: usize,
) -> Result<Vec<String>> {
    let decl_section = render_decl_section(block.declares.as_slice(), ctx, idx, method_ctx, depth + 1)?;
    let mut locals = outer_locals.clone();
    locals.extend(decl_section.locals);

    let mut body_lines = Vec::new();
    for stmt in &block.body {
        body_lines.extend(render_stmt(stmt, ctx, idx, &locals, method_ctx, depth + 1)?);
    }

    let mut exception_lines = Vec::new();
    if !block.exception_handlers.is_empty() {
        exception_lines.push(format!("{}EXCEPTION", indent(depth)));
        for handler in &block.exception_handlers {
            let conds: Vec<String> = handler
                .conditions
                .iter()
                .map(|c| render_exception_cond(c, ctx))
                .collect();
            exception_lines.push(format!("{}WHEN {} THEN", indent(depth + 1), conds.join(" OR ")));
            for s in &handler.body {
                exception_lines.extend(render_stmt(s, ctx, idx, &locals, method_ctx, depth + 2)?);
            }
        }
    }

    let mut out = Vec::new();
    if !decl_section.lines.is_empty() {
        out.push(format!("{}DECLARE", indent(depth)));
        out.extend(decl_section.lines);
    }
    out.push(format!("{}BEGIN", indent(depth)));
    out.extend(body_lines);
    out.extend(exception_lines);
    out.push(format!("{}END;", indent(depth)));
    Ok(out)
}

fn render_exception_cond(cond: &ExceptionCond, ctx: &TransformContext<'_>) -> String {
    match cond {
        ExceptionCond::Others => "OTHERS".to_string(),
        ExceptionCond::Named(name) => {
            if let Some(pg) = standard_exception_pg_name(name) {
                pg.to_string()
            } else if let Some(code) = ctx.exceptions.sqlstate_for(name) {
                format!("SQLSTATE '{code}'")
            } else {
                // Unregistered, non-standard name: no mapping exists (spec.md
                // §7 NonFatal); OTHERS is the closest behavior-preserving
                // catch-all, and the miss is already in ctx.warnings from
                // whichever RAISE/WHEN site first looked it up.
                "OTHERS".to_string()
            }
        }
    }
}

fn render_stmt(
    stmt: &Stmt,
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    locals: &LocalTypes,
    method_ctx: Option<&MethodRenderCtx>,
    depth: usize,
) -> Result<Vec<String>> {
    let ind = indent(depth);
    match stmt {
        Stmt::Block(b) => render_block(b, ctx, idx, locals, method_ctx, depth),
        Stmt::If { cond, then_body, elsifs, else_body } => {
            let mut extra = Vec::new();
            let rendered_cond = render_expr(cond, ctx, idx, locals, method_ctx, &mut extra);
            let mut out: Vec<String> = extra.into_iter().map(|l| format!("{ind}{l}")).collect();
            out.push(format!("{ind}IF {rendered_cond} THEN"));
            for s in then_body {
                out.extend(render_stmt(s, ctx, idx, locals, method_ctx, depth + 1)?);
            }
            for (econd, ebody) in elsifs {
                let mut extra2 = Vec::new();
                let rendered = render_expr(econd, ctx, idx, locals, method_ctx, &mut extra2);
                out.extend(extra2.into_iter().map(|l| format!("{ind}{l}")));
                out.push(format!("{ind}ELSIF {rendered} THEN"));
                for s in ebody {
                    out.extend(render_stmt(s, ctx, idx, locals, method_ctx, depth + 1)?);
                }
            }
            if let Some(eb) = else_body {
                out.push(format!("{ind}ELSE"));
                for s in eb {
                    out.extend(render_stmt(s, ctx, idx, locals, method_ctx, depth + 1)?);
                }
            }
            out.push(format!("{ind}END IF;"));
            Ok(out)
        }
        Stmt::Loop { label, body } => {
            let mut out = Vec::new();
            let prefix = label.as_ref().map(|l| format!("{}: ", l.to_lowercase())).unwrap_or_default();
            out.push(format!("{ind}{prefix}LOOP"));
            for s in body {
                out.extend(render_stmt(s, ctx, idx, locals, method_ctx, depth + 1)?);
            }
            out.push(format!("{ind}END LOOP;"));
            Ok(out)
        }
        Stmt::WhileLoop { cond, body } => {
            let mut extra = Vec::new();
            let rendered_cond = render_expr(cond, ctx, idx, locals, method_ctx, &mut extra);
            let mut out: Vec<String> = extra.into_iter().map(|l| format!("{ind}{l}")).collect();
            out.push(format!("{ind}WHILE {rendered_cond} LOOP"));
            for s in body {
                out.extend(render_stmt(s, ctx, idx, locals, method_ctx, depth + 1)?);
            }
            out.push(format!("{ind}END LOOP;"));
            Ok(out)
        }
        Stmt::ForRangeLoop { var, lower, upper, reverse, body } => {
            let mut extra = Vec::new();
            let rendered_lower = render_expr(lower, ctx, idx, locals, method_ctx, &mut extra);
            let rendered_upper = render_expr(upper, ctx, idx, locals, method_ctx, &mut extra);
            let mut out: Vec<String> = extra.into_iter().map(|l| format!("{ind}{l}")).collect();
            let rev = if *reverse { "REVERSE " } else { "" };
            out.push(format!(
                "{ind}FOR {} IN {rev}{rendered_lower}..{rendered_upper} LOOP",
                var.to_lowercase()
            ));
            let mut inner_locals = locals.clone();
            inner_locals.insert(var.to_uppercase(), "PLS_INTEGER".to_string());
            for s in body {
                out.extend(render_stmt(s, ctx, idx, &inner_locals, method_ctx, depth + 1)?);
            }
            out.push(format!("{ind}END LOOP;"));
            Ok(out)
        }
        Stmt::ForCursorLoop { var, cursor, body } => {
            ctx.cursors.mark_used(cursor);
            let mut out = vec![format!(
                "{ind}FOR {} IN {} LOOP",
                var.to_lowercase(),
                cursor.to_lowercase()
            )];
            for s in body {
                out.extend(render_stmt(s, ctx, idx, locals, method_ctx, depth + 1)?);
            }
            out.push(format!("{ind}END LOOP;"));
            Ok(out)
        }
        Stmt::Open { cursor } => {
            ctx.cursors.mark_used(cursor);
            let name = cursor.to_lowercase();
            Ok(vec![
                format!("{ind}OPEN {name};"),
                format!("{ind}{name}__isopen := TRUE;"),
            ])
        }
        Stmt::Fetch { cursor, into } => {
            ctx.cursors.mark_used(cursor);
            let name = cursor.to_lowercase();
            let into_list = into.iter().map(|v| v.to_lowercase()).collect::<Vec<_>>().join(", ");
            Ok(vec![
                format!("{ind}FETCH {name} INTO {into_list};"),
                format!("{ind}{name}__found := FOUND;"),
                format!("{ind}IF {name}__found THEN"),
                format!("{ind}  {name}__rowcount := {name}__rowcount + 1;"),
                format!("{ind}END IF;"),
            ])
        }
        Stmt::Close { cursor } => {
            ctx.cursors.mark_used(cursor);
            let name = cursor.to_lowercase();
            Ok(vec![
                format!("{ind}CLOSE {name};"),
                format!("{ind}{name}__isopen := FALSE;"),
            ])
        }
        Stmt::Assign { target, value } => {
            let mut extra = Vec::new();
            let rendered_target = render_expr(target, ctx, idx, locals, method_ctx, &mut extra);
            let rendered_value = render_expr(value, ctx, idx, locals, method_ctx, &mut extra);
            let mut out: Vec<String> = extra.into_iter().map(|l| format!("{ind}{l}")).collect();
            out.push(format!("{ind}{rendered_target} := {rendered_value};"));
            Ok(out)
        }
        Stmt::Insert(s) => Ok(render_insert(s, ctx, idx, locals, method_ctx)?
            .into_iter()
            .map(|l| format!("{ind}{l}"))
            .collect()),
        Stmt::Update(s) => Ok(render_update(s, ctx, idx, locals, method_ctx)?
            .into_iter()
            .map(|l| format!("{ind}{l}"))
            .collect()),
        Stmt::Delete(s) => Ok(render_delete(s, ctx, idx, locals, method_ctx)
            .into_iter()
            .map(|l| format!("{ind}{l}"))
            .collect()),
        Stmt::SelectInto(s) => Ok(render_select_into(s, ctx, idx, locals, method_ctx)
            .into_iter()
            .map(|l| format!("{ind}{l}"))
            .collect()),
        Stmt::Raise(r) => render_raise(r, ctx, idx, locals, method_ctx, depth),
        Stmt::Call { target } => {
            let mut extra = Vec::new();
            let rendered = render_expr(target, ctx, idx, locals, method_ctx, &mut extra);
            let mut out: Vec<String> = extra.into_iter().map(|l| format!("{ind}{l}")).collect();
            out.push(format!("{ind}PERFORM {rendered};"));
            Ok(out)
        }
        Stmt::Null => Ok(vec![format!("{ind}NULL;")]),
        Stmt::Return(expr) => {
            let mut extra = Vec::new();
            let rendered = expr
                .as_ref()
                .map(|e| render_expr(e, ctx, idx, locals, method_ctx, &mut extra));
            let mut out: Vec<String> = extra.into_iter().map(|l| format!("{ind}{l}")).collect();
            match rendered {
                Some(r) => out.push(format!("{ind}RETURN {r};")),
                None => match method_ctx.and_then(|mc| mc.bare_return_name.as_ref()) {
                    Some(name) => out.push(format!("{ind}RETURN {name};")),
                    None => out.push(format!("{ind}RETURN;")),
                },
            }
            Ok(out)
        }
        Stmt::Exit { label, when } => {
            let mut extra = Vec::new();
            let rendered_when = when
                .as_ref()
                .map(|e| render_expr(e, ctx, idx, locals, method_ctx, &mut extra));
            let mut out: Vec<String> = extra.into_iter().map(|l| format!("{ind}{l}")).collect();
            let target = label.as_ref().map(|l| format!(" {}", l.to_lowercase())).unwrap_or_default();
            match rendered_when {
                Some(w) => out.push(format!("{ind}EXIT{target} WHEN {w};")),
                None => out.push(format!("{ind}EXIT{target};")),
            }
            Ok(out)
        }
        Stmt::Raw(text) => Ok(vec![format!("{ind}{text}")]),
    }
}

fn render_raise(
    raise: &RaiseStmt,
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    locals: &LocalTypes,
    method_ctx: Option<&MethodRenderCtx>,
    depth: usize,
) -> Result<Vec<String>> {
    let ind = indent(depth);
    match raise {
        RaiseStmt::Reraise => Ok(vec![format!("{ind}RAISE;")]),
        RaiseStmt::Named(name) => {
            if let Some(pg) = standard_exception_pg_name(name) {
                Ok(vec![format!("{ind}RAISE {pg};")])
            } else if let Some(code) = ctx.exceptions.sqlstate_for(name) {
                Ok(vec![format!(
                    "{ind}RAISE EXCEPTION '{}' USING ERRCODE = '{code}';",
                    name.to_lowercase()
                )])
            } else {
                ctx.warn(format!(
                    "RAISE {name} has no PRAGMA EXCEPTION_INIT or standard mapping; emitted as a generic exception"
                ));
                Ok(vec![format!(
                    "{ind}RAISE EXCEPTION '{}'; -- unmapped exception name {name}",
                    name.to_lowercase()
                )])
            }
        }
        RaiseStmt::ApplicationError { oracle_code, message } => {
            let mut extra = Vec::new();
            let rendered_msg = render_expr(message, ctx, idx, locals, method_ctx, &mut extra);
            let code = oracle_code_to_sqlstate(*oracle_code);
            let mut out: Vec<String> = extra.into_iter().map(|l| format!("{ind}{l}")).collect();
            out.push(format!(
                "{ind}RAISE EXCEPTION {rendered_msg} USING ERRCODE = '{code}';"
            ));
            Ok(out)
        }
    }
}

/// Surfaces the §7 `UnsupportedConstruct` rejection path for constructs this
/// statement visitor doesn't attempt at all (multi-table `INSERT ALL`,
/// `RETURNING ... INTO`, collection expressions as a DML source) — the
/// parser tags these as `Stmt::Raw` or rejects them upstream; this function
/// exists so `emit.rs` has one place to surface the policy rather than
/// duplicating the error construction at each call site.
pub fn unsupported(ctx: &TransformContext<'_>, construct: &str, hint: &str) -> TransformError {
    TransformError::UnsupportedConstruct {
        routine: ctx.routine.clone(),
        construct: construct.to_string(),
        hint: hint.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Literal};
    use crate::config::TransformConfig;
    use crate::qualified_name::QualifiedName;

    #[test]
    fn open_fetch_close_inject_state_maintenance() {
        let config = TransformConfig::new("hr");
        let mut ctx = TransformContext::new(&config, QualifiedName::new("hr", "p"));
        let idx = MetadataIndex::default();
        let locals = LocalTypes::new();
        let open = render_stmt(&Stmt::Open { cursor: "c".to_string() }, &mut ctx, &idx, &locals, None, 0).unwrap();
        assert!(open.iter().any(|l| l.contains("c__isopen := TRUE;")));
        let fetch = render_stmt(
            &Stmt::Fetch { cursor: "c".to_string(), into: vec!["v_x".to_string()] },
            &mut ctx,
            &idx,
            &locals,
            None,
            0,
        )
        .unwrap();
        assert!(fetch.iter().any(|l| l.contains("c__found := FOUND;")));
        let close = render_stmt(&Stmt::Close { cursor: "c".to_string() }, &mut ctx, &idx, &locals, None, 0).unwrap();
        assert!(close.iter().any(|l| l.contains("c__isopen := FALSE;")));
        assert!(ctx.cursors.is_tracked("c"));
    }

    #[test]
    fn raise_named_standard_exception() {
        let config = TransformConfig::new("hr");
        let mut ctx = TransformContext::new(&config, QualifiedName::new("hr", "p"));
        let idx = MetadataIndex::default();
        let locals = LocalTypes::new();
        let out = render_raise(
            &RaiseStmt::Named("NO_DATA_FOUND".to_string()),
            &mut ctx,
            &idx,
            &locals,
            None,
            0,
        )
        .unwrap();
        assert_eq!(out, vec!["RAISE no_data_found;".to_string()]);
    }

    #[test]
    fn raise_application_error_computes_sqlstate() {
        let config = TransformConfig::new("hr");
        let mut ctx = TransformContext::new(&config, QualifiedName::new("hr", "p"));
        let idx = MetadataIndex::default();
        let locals = LocalTypes::new();
        let out = render_raise(
            &RaiseStmt::ApplicationError {
                oracle_code: -20001,
                message: Expr::Literal(Literal::String("bad salary".to_string())),
            },
            &mut ctx,
            &idx,
            &locals,
            None,
            0,
        )
        .unwrap();
        assert_eq!(
            out,
            vec!["RAISE EXCEPTION 'bad salary' USING ERRCODE = 'P0001';".to_string()]
        );
    }

    #[test]
    fn declared_exception_raises_via_registered_sqlstate() {
        let config = TransformConfig::new("hr");
        let mut ctx = TransformContext::new(&config, QualifiedName::new("hr", "p"));
        ctx.exceptions.register("invalid_salary", -20001);
        let idx = MetadataIndex::default();
        let locals = LocalTypes::new();
        let out = render_raise(
            &RaiseStmt::Named("invalid_salary".to_string()),
            &mut ctx,
            &idx,
            &locals,
            None,
            0,
        )
        .unwrap();
        assert_eq!(out, vec!["RAISE EXCEPTION 'invalid_salary' USING ERRCODE = 'P0001';".to_string()]);
    }
}
