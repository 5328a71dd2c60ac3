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

//! Type-method dispatch (spec.md §4.7.6): `receiver.method(args)` ->
//! `typename__methodname(receiver, args)`, with method chaining
//! (`a.m1().m2()`) flattened into intermediate temporaries since PostgreSQL
//! has no method-call syntax to chain off of a function's own result.

use super::expr::{render_expr, LocalTypes};
use crate::ast::Expr;
use crate::context::TransformContext;
use crate::metadata::MetadataIndex;
use crate::qualified_name::QualifiedName;

/// Carries the identity of `self` while rendering a member method's own
/// body (spec.md §4.7.6: `self` dispatches on the owning type without a
/// declared-variable lookup).
pub struct MethodRenderCtx {
    pub receiver_source_name: String,
    pub receiver_pg_name: String,
    pub receiver_type: QualifiedName,
    /// `Some(name)` inside a `CONSTRUCTOR FUNCTION typename` body (spec.md
    /// §4.7.6): a bare `RETURN;` becomes `RETURN name;` instead of a
    /// no-value return, since a constructor always yields its composite
    /// result variable.
    pub bare_return_name: Option<String>,
}

/// Resolves the static type of a receiver expression, when it's one of the
/// shapes spec.md §4.7.6 requires support for: a declared local variable, or
/// `self`/`SELF` inside a member method body. Anything else (a dotted object
/// field, a function-call result) is out of scope for this core's
/// type-checker and reported non-fatally by the caller.
fn receiver_type(
    expr: &Expr,
    locals: &LocalTypes,
    ctx: &TransformContext<'_>,
    idx: &MetadataIndex,
    method_ctx: Option<&MethodRenderCtx>,
) -> Option<QualifiedName> {
    match expr {
        Expr::Ident(name) => {
            if let Some(mc) = method_ctx {
                if name.eq_ignore_ascii_case(&mc.receiver_source_name) {
                    return Some(mc.receiver_type.clone());
                }
            }
            locals
                .get(&name.to_uppercase())
                .map(|ty| idx.qualify_type_name(ty, ctx.config))
        }
        _ => None,
    }
}

/// Renders a (possibly chained) `MethodCall` expression. `expr` must be
/// `Expr::MethodCall`; anything else is a caller bug.
pub fn render_method_call(
    expr: &Expr,
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    locals: &LocalTypes,
    method_ctx: Option<&MethodRenderCtx>,
    extra_stmts: &mut Vec<String>,
) -> String {
    let (target, method, args) = match expr {
        Expr::MethodCall { target, method, args } => (target.as_ref(), method, args),
        other => {
            ctx.warn("render_method_call called on a non-MethodCall expression");
            return render_expr(other, ctx, idx, locals, method_ctx, extra_stmts);
        }
    };

    // Chained call: `target` is itself a method call. Render it into a
    // temporary first so the outer call dispatches off a plain variable
    // (spec.md §4.7.6: method chaining via intermediate temporaries).
    if let Expr::MethodCall { .. } = target {
        let inner_rendered = render_method_call(target, ctx, idx, locals, method_ctx, extra_stmts);
        let inner_type = chained_call_return_type(target, locals, ctx, idx, method_ctx);
        let temp_name = format!("tmp__chain_{}", extra_stmts.len());
        extra_stmts.push(format!("{temp_name} := {inner_rendered};"));
        return match inner_type {
            Some(ty) => render_dispatch(&ty, method, args, ctx, idx, locals, method_ctx, extra_stmts, &temp_name),
            None => {
                ctx.warn(format!(
                    "cannot statically type the result of a chained method call before `.{method}`; pass-through emitted"
                ));
                format!(
                    "{temp_name}.{}({})",
                    method.to_lowercase(),
                    render_args(args, ctx, idx, locals, method_ctx, extra_stmts)
                )
            }
        };
    }

    let rendered_target = render_expr(target, ctx, idx, locals, method_ctx, extra_stmts);
    match receiver_type(target, locals, ctx, idx, method_ctx) {
        Some(type_q) => render_dispatch(&type_q, method, args, ctx, idx, locals, method_ctx, extra_stmts, &rendered_target),
        None => {
            ctx.warn(format!(
                "cannot statically type the receiver of `.{method}(...)`; pass-through emitted"
            ));
            format!(
                "{rendered_target}.{}({})",
                method.to_lowercase(),
                render_args(args, ctx, idx, locals, method_ctx, extra_stmts)
            )
        }
    }
}

/// The return type of a (possibly further-nested) chained call, needed only
/// to know how to dispatch the *next* link in the chain.
fn chained_call_return_type(
    expr: &Expr,
    locals: &LocalTypes,
    ctx: &TransformContext<'_>,
    idx: &MetadataIndex,
    method_ctx: Option<&MethodRenderCtx>,
) -> Option<QualifiedName> {
    let Expr::MethodCall { target, method, .. } = expr else {
        return None;
    };
    let recv_type = match target.as_ref() {
        Expr::MethodCall { .. } => chained_call_return_type(target, locals, ctx, idx, method_ctx)?,
        other => receiver_type(other, locals, ctx, idx, method_ctx)?,
    };
    let sig = idx.lookup_unique_method(&recv_type, method)?;
    let return_type = sig.return_type.as_ref()?;
    Some(idx.qualify_type_name(return_type, ctx.config))
}

#[allow(clippy::too_many_arguments)]
fn render_dispatch(
    type_q: &QualifiedName,
    method: &str,
    args: &[Expr],
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    locals: &LocalTypes,
    method_ctx: Option<&MethodRenderCtx>,
    extra_stmts: &mut Vec<String>,
    rendered_receiver: &str,
) -> String {
    let rendered_args = render_args(args, ctx, idx, locals, method_ctx, extra_stmts);
    match idx.lookup_unique_method(type_q, method) {
        Some(sig) => {
            let fname = sig.pg_function_name(idx.method_is_overloaded(type_q, method));
            if rendered_args.is_empty() {
                format!("{fname}({rendered_receiver})")
            } else {
                format!("{fname}({rendered_receiver}, {rendered_args})")
            }
        }
        None => {
            ctx.warn(format!(
                "method `{method}` on type {type_q:?} is overloaded or unknown; call passed through unrewritten"
            ));
            if rendered_args.is_empty() {
                format!("{rendered_receiver}.{}()", method.to_lowercase())
            } else {
                format!("{rendered_receiver}.{}({rendered_args})", method.to_lowercase())
            }
        }
    }
}

fn render_args(
    args: &[Expr],
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    locals: &LocalTypes,
    method_ctx: Option<&MethodRenderCtx>,
    extra_stmts: &mut Vec<String>,
) -> String {
    args.iter()
        .map(|a| render_expr(a, ctx, idx, locals, method_ctx, extra_stmts))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use crate::config::TransformConfig;
    use crate::metadata::types::MethodKind;
    use std::collections::HashMap;

    fn make_index() -> MetadataIndex {
        let mut idx = MetadataIndex::default();
        idx.add_private_method(
            QualifiedName::new("HR", "LANGY_TYPE"),
            "GREET".to_string(),
            MethodKind::Member,
            vec![],
            Some("VARCHAR2".to_string()),
        );
        idx
    }

    #[test]
    fn dispatches_simple_call_on_declared_local() {
        let idx = make_index();
        let config = TransformConfig::new("hr");
        let mut ctx = TransformContext::new(&config, QualifiedName::new("hr", "p"));
        let mut locals: LocalTypes = HashMap::new();
        locals.insert("L".to_string(), "LANGY_TYPE".to_string());
        let expr = Expr::MethodCall {
            target: Box::new(Expr::Ident("l".to_string())),
            method: "greet".to_string(),
            args: vec![],
        };
        let mut extra = Vec::new();
        let out = render_method_call(&expr, &mut ctx, &idx, &locals, None, &mut extra);
        assert_eq!(out, "langy_type__greet(l)");
        assert!(extra.is_empty());
    }

    #[test]
    fn unresolvable_receiver_passes_through_with_warning() {
        let idx = MetadataIndex::default();
        let config = TransformConfig::new("hr");
        let mut ctx = TransformContext::new(&config, QualifiedName::new("hr", "p"));
        let locals: LocalTypes = HashMap::new();
        let expr = Expr::MethodCall {
            target: Box::new(Expr::Ident("unknown".to_string())),
            method: "greet".to_string(),
            args: vec![],
        };
        let mut extra = Vec::new();
        let out = render_method_call(&expr, &mut ctx, &idx, &locals, None, &mut extra);
        assert_eq!(out, "unknown.greet()");
        assert_eq!(ctx.warnings.len(), 1);
    }
}
