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

//! Expression visitor: Oracle -> PostgreSQL function renames (spec.md
//! §4.7.2), cursor attribute rewrites (§4.7.3), object field access
//! (§4.7.5), and type-method dispatch (§4.7.6). This is the one visitor
//! every other statement-level visitor (DML, assignment, RAISE) calls
//! through for its sub-expressions.

use super::methods::{render_method_call, MethodRenderCtx};
use super::object_access::try_object_field_rewrite;
use crate::ast::{CursorAttr, Expr, Literal};
use crate::context::TransformContext;
use crate::metadata::types::MethodKind;
use crate::metadata::MetadataIndex;
use std::collections::HashMap;

/// The local variable name -> declared type map built from a routine's
/// `DECLARE` section, used by the method visitor to know a receiver's
/// static type (spec.md §4.7.6 needs this since there is no general
/// expression type-checker in this core).
pub type LocalTypes = HashMap<String, String>;

/// Renders `expr` to PostgreSQL text, mutating `ctx` for cursor-attribute
/// tracking (spec.md §4.7.3) and warning/exception bookkeeping as needed.
/// `extra_stmts` accumulates any statements a rewrite must hoist before the
/// one containing this expression (method-chain temporaries, spec.md
/// §4.7.6).
pub fn render_expr(
    expr: &Expr,
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    locals: &LocalTypes,
    method_ctx: Option<&MethodRenderCtx>,
    extra_stmts: &mut Vec<String>,
) -> String {
    match expr {
        Expr::Ident(name) => render_ident(name, method_ctx),
        Expr::Dotted(parts) => render_dotted(parts, ctx, idx, method_ctx),
        Expr::CursorAttr { cursor, attr } => render_cursor_attr(cursor, attr.clone(), ctx),
        Expr::Literal(lit) => render_literal(lit),
        Expr::BinaryOp { left, op, right } => {
            let l = render_expr(left, ctx, idx, locals, method_ctx, extra_stmts);
            let r = render_expr(right, ctx, idx, locals, method_ctx, extra_stmts);
            if op == "IS NULL" || op == "IS NOT NULL" {
                format!("{l} {op}")
            } else {
                format!("{l} {op} {r}")
            }
        }
        Expr::UnaryOp { op, expr } => {
            let e = render_expr(expr, ctx, idx, locals, method_ctx, extra_stmts);
            format!("{op} {e}")
        }
        Expr::FuncCall { name, args } => render_func_call(name, args, ctx, idx, locals, method_ctx, extra_stmts),
        Expr::MethodCall { .. } => {
            render_method_call(expr, ctx, idx, locals, method_ctx, extra_stmts)
        }
        Expr::Paren(inner) => {
            format!("({})", render_expr(inner, ctx, idx, locals, method_ctx, extra_stmts))
        }
        Expr::Raw(text) => text.clone(),
    }
}

fn render_literal(lit: &Literal) -> String {
    match lit {
        Literal::Number(n) => n.clone(),
        Literal::String(s) => format!("'{}'", s.replace('\'', "''")),
        Literal::Null => "NULL".to_string(),
    }
}

/// Oracle identifier rewrites that don't need parens: `SYSDATE`,
/// `SYSTIMESTAMP`, `SQLCODE`/`SQLERRM` pseudo-columns, and `self` inside a
/// type method body.
fn render_ident(name: &str, method_ctx: Option<&MethodRenderCtx>) -> String {
    if let Some(mc) = method_ctx {
        if name.eq_ignore_ascii_case(&mc.receiver_source_name) {
            return mc.receiver_pg_name.clone();
        }
    }
    match name.to_uppercase().as_str() {
        "SYSDATE" | "SYSTIMESTAMP" => "current_timestamp".to_string(),
        "USER" => "current_user".to_string(),
        "SQLCODE" => "oracle_compat.sqlcode()".to_string(),
        "SQLERRM" => "SQLERRM".to_string(),
        _ => name.to_lowercase(),
    }
}

fn render_dotted(
    parts: &[String],
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    method_ctx: Option<&MethodRenderCtx>,
) -> String {
    if let Some(mc) = method_ctx {
        if parts[0].eq_ignore_ascii_case(&mc.receiver_source_name) {
            return render_field_chain_from(&mc.receiver_pg_name, &parts[1..]);
        }
    }
    if let Some(rewritten) = try_object_field_rewrite(parts, ctx, idx) {
        return rewritten;
    }
    parts
        .iter()
        .map(|p| p.to_lowercase())
        .collect::<Vec<_>>()
        .join(".")
}

/// Builds `(base).f1` / `((base).f1).f2[.tail...]` off an already-resolved
/// `base` (spec.md §4.7.6's `self.field -> (self).field`, generalized to
/// the same multi-level rule as §4.7.5 since a member method's `self` can
/// itself have nested-object-type fields).
pub(super) fn render_field_chain_from(base: &str, fields: &[String]) -> String {
    if fields.is_empty() {
        return base.to_string();
    }
    let mut result = format!("({base}).{}", fields[0].to_lowercase());
    for f in &fields[1..] {
        result = format!("({result}).{}", f.to_lowercase());
    }
    result
}

fn render_cursor_attr(cursor: &str, attr: CursorAttr, ctx: &mut TransformContext<'_>) -> String {
    ctx.cursors.mark_used(cursor);
    let is_sql = cursor.eq_ignore_ascii_case("SQL");
    let var_prefix = if is_sql {
        "sql__".to_string()
    } else {
        format!("{}__", cursor.to_lowercase())
    };
    match attr {
        CursorAttr::Found if is_sql => "(sql__rowcount > 0)".to_string(),
        CursorAttr::NotFound if is_sql => "(sql__rowcount = 0)".to_string(),
        CursorAttr::RowCount if is_sql => "sql__rowcount".to_string(),
        CursorAttr::IsOpen if is_sql => "FALSE".to_string(),
        CursorAttr::Found => format!("{var_prefix}found"),
        CursorAttr::NotFound => format!("NOT {var_prefix}found"),
        CursorAttr::RowCount => format!("{var_prefix}rowcount"),
        CursorAttr::IsOpen => format!("{var_prefix}isopen"),
    }
}

fn render_func_call(
    name: &str,
    args: &[Expr],
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    locals: &LocalTypes,
    method_ctx: Option<&MethodRenderCtx>,
    extra_stmts: &mut Vec<String>,
) -> String {
    let rendered_args: Vec<String> = args
        .iter()
        .map(|a| render_expr(a, ctx, idx, locals, method_ctx, extra_stmts))
        .collect();
    match name.to_uppercase().as_str() {
        "NVL" => format!("coalesce({})", rendered_args.join(", ")),
        "NVL2" if rendered_args.len() == 3 => format!(
            "(CASE WHEN {} IS NOT NULL THEN {} ELSE {} END)",
            rendered_args[0], rendered_args[1], rendered_args[2]
        ),
        "SQLERRM" if rendered_args.is_empty() => "SQLERRM".to_string(),
        "SQLERRM" => {
            // SQLERRM(code) is not representable (spec.md §4.7.4,
            // Non-goals); warn and pass through as a comment so the
            // generated text still compiles as a no-op expression rather
            // than silently producing a wrong value.
            ctx.warn("SQLERRM(code) is not representable in PostgreSQL; passed through verbatim");
            format!("SQLERRM /* unsupported: SQLERRM({}) */", rendered_args.join(", "))
        }
        "DBMS_OUTPUT.PUT_LINE" => {
            format!("oracle_compat.dbms_output__put_line({})", rendered_args.join(", "))
        }
        other => {
            // A bare `typename(args)` call invokes that type's constructor
            // (spec.md §4.7.6) when `name` resolves to a registered object
            // type with a constructor of that name.
            let type_q = idx.qualify_type_name(other, ctx.config);
            if let Some(sig) = idx.lookup_unique_method(&type_q, other) {
                if sig.kind == MethodKind::Constructor {
                    let fname = sig.pg_function_name(idx.method_is_overloaded(&type_q, other));
                    return format!("{fname}({})", rendered_args.join(", "));
                }
            }
            format!("{}({})", other.to_lowercase(), rendered_args.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransformConfig;
    use crate::metadata::types::{MethodKind, TypeMethodSig};
    use crate::qualified_name::QualifiedName;

    #[test]
    fn constructor_invocation_rewrites_to_new() {
        let mut idx = MetadataIndex::default();
        idx.add_private_method(
            QualifiedName::new("HR", "LANGY_TYPE"),
            "LANGY_TYPE".to_string(),
            MethodKind::Constructor,
            vec!["VARCHAR2".to_string()],
            Some("LANGY_TYPE".to_string()),
        );
        let config = TransformConfig::new("hr");
        let mut ctx = TransformContext::new(&config, QualifiedName::new("hr", "p"));
        let locals: LocalTypes = HashMap::new();
        let args = vec![Expr::Literal(Literal::String("Ada".to_string()))];
        let mut extra = Vec::new();
        let out = render_func_call("LANGY_TYPE", &args, &mut ctx, &idx, &locals, None, &mut extra);
        assert_eq!(out, "langy_type__new('Ada')");
    }

    #[test]
    fn unrelated_func_call_still_lowercased_and_passed_through() {
        let idx = MetadataIndex::default();
        let config = TransformConfig::new("hr");
        let mut ctx = TransformContext::new(&config, QualifiedName::new("hr", "p"));
        let locals: LocalTypes = HashMap::new();
        let args = vec![Expr::Literal(Literal::Number("1".to_string()))];
        let mut extra = Vec::new();
        let out = render_func_call("SOME_FUNC", &args, &mut ctx, &idx, &locals, None, &mut extra);
        assert_eq!(out, "some_func(1)");
    }

    #[test]
    fn pg_function_name_is_unused_directly_but_kind_gates_dispatch() {
        // Sanity check that a non-constructor method on the same name never
        // trips the constructor branch in `render_func_call`.
        let sig = TypeMethodSig {
            owning_type: QualifiedName::new("HR", "LANGY_TYPE"),
            method_name: "LANGY_TYPE".to_string(),
            kind: MethodKind::Static,
            param_types: vec![],
            return_type: None,
        };
        assert_ne!(sig.kind, MethodKind::Constructor);
    }
}
