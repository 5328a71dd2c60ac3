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

//! DML rendering (spec.md §4.7.1, §4.7.3): bare-table schema qualification,
//! `DELETE target` -> `DELETE FROM target` normalization, and the implicit
//! `SQL%` cursor's `GET DIAGNOSTICS ... = ROW_COUNT` injection after every
//! INSERT/UPDATE/DELETE/SELECT INTO that uses it.

use super::expr::{render_expr, LocalTypes};
use super::methods::MethodRenderCtx;
use crate::ast::{DeleteStmt, InsertSource, InsertStmt, SelectIntoStmt, SelectStmt, UpdateStmt};
use crate::context::TransformContext;
use crate::error::{Severity, TransformError};
use crate::metadata::MetadataIndex;
use crate::qualified_name::QualifiedName;

/// Schema-qualifies a bare table name (spec.md §4.7.1): already-qualified
/// names pass through, then synonym resolution, then `current_schema`.
fn qualify_table(name: &str, ctx: &TransformContext<'_>, idx: &MetadataIndex) -> String {
    if name.contains('.') {
        return name.to_lowercase();
    }
    if let Some(target) = idx.resolve_synonym(name, &ctx.config.current_schema) {
        return format!(
            "{}.{}",
            target.schema.to_lowercase(),
            target.object_name.to_lowercase()
        );
    }
    format!("{}.{}", ctx.config.current_schema.to_lowercase(), name.to_lowercase())
}

fn rowcount_injection(ctx: &TransformContext<'_>) -> Option<String> {
    if ctx.cursors.uses_sql_cursor() {
        Some("GET DIAGNOSTICS sql__rowcount = ROW_COUNT;".to_string())
    } else {
        None
    }
}

fn render_select_core(
    select: &SelectStmt,
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    locals: &LocalTypes,
    method_ctx: Option<&MethodRenderCtx>,
    extra_stmts: &mut Vec<String>,
) -> String {
    ctx.aliases.push_frame();
    for t in &select.from {
        let q = QualifiedName::new(ctx.config.current_schema.clone(), &t.name);
        if let Some(alias) = &t.alias {
            ctx.aliases.bind(alias, q);
        }
    }
    let items: Vec<String> = select
        .items
        .iter()
        .map(|item| {
            let rendered = render_expr(&item.expr, ctx, idx, locals, method_ctx, extra_stmts);
            match &item.alias {
                Some(a) => format!("{rendered} AS {}", a.to_lowercase()),
                None => rendered,
            }
        })
        .collect();
    let from: Vec<String> = select
        .from
        .iter()
        .map(|t| {
            let qualified = qualify_table(&t.name, ctx, idx);
            match &t.alias {
                Some(a) => format!("{qualified} {}", a.to_lowercase()),
                None => qualified,
            }
        })
        .collect();
    let mut out = format!("SELECT {} FROM {}", items.join(", "), from.join(", "));
    if let Some(w) = &select.where_clause {
        out.push_str(&format!(" WHERE {}", render_expr(w, ctx, idx, locals, method_ctx, extra_stmts)));
    }
    ctx.aliases.pop_frame();
    out
}

pub fn render_select_into(
    stmt: &SelectIntoStmt,
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    locals: &LocalTypes,
    method_ctx: Option<&MethodRenderCtx>,
) -> Vec<String> {
    let mut extra_stmts = Vec::new();
    let core = render_select_core(&stmt.select, ctx, idx, locals, method_ctx, &mut extra_stmts);
    let into: Vec<String> = stmt.into.iter().map(|v| v.to_lowercase()).collect();
    extra_stmts.push(format!("{core} INTO {};", into.join(", ")));
    if let Some(inject) = rowcount_injection(ctx) {
        extra_stmts.push(inject);
    }
    extra_stmts
}

fn render_value_row(
    row: &[crate::ast::Expr],
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    locals: &LocalTypes,
    method_ctx: Option<&MethodRenderCtx>,
    extra_stmts: &mut Vec<String>,
) -> String {
    let rendered: Vec<String> = row
        .iter()
        .map(|e| render_expr(e, ctx, idx, locals, method_ctx, extra_stmts))
        .collect();
    format!("({})", rendered.join(", "))
}

pub fn render_insert(
    stmt: &InsertStmt,
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    locals: &LocalTypes,
    method_ctx: Option<&MethodRenderCtx>,
) -> crate::error::Result<Vec<String>> {
    let mut extra_stmts = Vec::new();
    let table = qualify_table(&stmt.table, ctx, idx);
    let columns = if stmt.columns.is_empty() {
        String::new()
    } else {
        format!(
            " ({})",
            stmt.columns.iter().map(|c| c.to_lowercase()).collect::<Vec<_>>().join(", ")
        )
    };
    let core = match &stmt.source {
        InsertSource::Values(rows) => {
            let rendered_rows: Vec<String> = rows
                .iter()
                .map(|r| render_value_row(r, ctx, idx, locals, method_ctx, &mut extra_stmts))
                .collect();
            format!("INSERT INTO {table}{columns} VALUES {}", rendered_rows.join(", "))
        }
        InsertSource::Select(select) => {
            let core = render_select_core(select, ctx, idx, locals, method_ctx, &mut extra_stmts);
            format!("INSERT INTO {table}{columns} {core}")
        }
        InsertSource::Record(expr) => {
            let rendered = render_expr(expr, ctx, idx, locals, method_ctx, &mut extra_stmts);
            format!("INSERT INTO {table}{columns} SELECT ({rendered}).*")
        }
    };
    extra_stmts.push(format!("{core};"));
    if let Some(inject) = rowcount_injection(ctx) {
        extra_stmts.push(inject);
    }
    Ok(extra_stmts)
}

pub fn render_update(
    stmt: &UpdateStmt,
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    locals: &LocalTypes,
    method_ctx: Option<&MethodRenderCtx>,
) -> crate::error::Result<Vec<String>> {
    let mut extra_stmts = Vec::new();
    let table = qualify_table(&stmt.table, ctx, idx);
    ctx.aliases.push_frame();
    if let Some(alias) = &stmt.alias {
        ctx.aliases
            .bind(alias, QualifiedName::new(ctx.config.current_schema.clone(), &stmt.table));
    }
    let mut set_clauses = Vec::with_capacity(stmt.set.len());
    for assignment in &stmt.set {
        if assignment.column.to_uppercase().starts_with("VALUE(") {
            return Err(TransformError::UnsupportedConstruct {
                routine: ctx.routine.clone(),
                construct: "SET VALUE(alias) = object_expr".to_string(),
                hint: "whole-row object assignment via VALUE() has no core rewrite; rewrite the \
                       UPDATE into per-field assignments upstream"
                    .to_string(),
            });
        }
        let rendered = render_expr(&assignment.value, ctx, idx, locals, method_ctx, &mut extra_stmts);
        set_clauses.push(format!("{} = {rendered}", assignment.column.to_lowercase()));
    }
    let mut core = format!("UPDATE {table}");
    if let Some(alias) = &stmt.alias {
        core.push(' ');
        core.push_str(&alias.to_lowercase());
    }
    core.push_str(&format!(" SET {}", set_clauses.join(", ")));
    if let Some(w) = &stmt.where_clause {
        core.push_str(&format!(" WHERE {}", render_expr(w, ctx, idx, locals, method_ctx, &mut extra_stmts)));
    }
    ctx.aliases.pop_frame();
    extra_stmts.push(format!("{core};"));
    if let Some(inject) = rowcount_injection(ctx) {
        extra_stmts.push(inject);
    }
    Ok(extra_stmts)
}

pub fn render_delete(
    stmt: &DeleteStmt,
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    locals: &LocalTypes,
    method_ctx: Option<&MethodRenderCtx>,
) -> Vec<String> {
    let mut extra_stmts = Vec::new();
    let table = qualify_table(&stmt.table, ctx, idx);
    ctx.aliases.push_frame();
    if let Some(alias) = &stmt.alias {
        ctx.aliases
            .bind(alias, QualifiedName::new(ctx.config.current_schema.clone(), &stmt.table));
    }
    // `DELETE target` and `DELETE FROM target` are equivalent in Oracle;
    // PostgreSQL requires the FROM keyword (spec.md §4.7.2), so
    // `had_explicit_from` only affects whether this normalization is a
    // no-op or an actual rewrite, never the semantics.
    let _ = stmt.had_explicit_from;
    let mut core = format!("DELETE FROM {table}");
    if let Some(alias) = &stmt.alias {
        core.push(' ');
        core.push_str(&alias.to_lowercase());
    }
    if let Some(w) = &stmt.where_clause {
        core.push_str(&format!(" WHERE {}", render_expr(w, ctx, idx, locals, method_ctx, &mut extra_stmts)));
    }
    ctx.aliases.pop_frame();
    extra_stmts.push(format!("{core};"));
    if let Some(inject) = rowcount_injection(ctx) {
        extra_stmts.push(inject);
    }
    extra_stmts
}

/// Policy-classified per spec.md §7: a rejected `UPDATE ... SET VALUE(...)`
/// is `FatalForRoutine`, matching `UnsupportedConstruct`'s table entry.
pub fn rejection_severity() -> Severity {
    Severity::FatalForRoutine
}
