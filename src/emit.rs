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

//! ImplementationEmitter (spec.md §4.7, §6): assembles one routine's
//! rewritten body (via `crate::visitor`) into a complete
//! `CREATE OR REPLACE FUNCTION/PROCEDURE` statement, injecting the per-
//! cursor state-maintenance variables (spec.md §4.7.3) the statement
//! visitor's `OPEN`/`FETCH`/`CLOSE` rewrites assume exist.

use crate::ast::{Block, ParamMode, RoutineSig};
use crate::context::{prescan_cursor_usage, TransformContext};
use crate::error::{Result, Warning};
use crate::metadata::MetadataIndex;
use crate::qualified_name::QualifiedName;
use crate::visitor::{render_block, LocalTypes, MethodRenderCtx};

pub struct EmitResult {
    pub sql: String,
    pub warnings: Vec<Warning>,
}

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

fn render_param_list(sig: &RoutineSig, owning_type: Option<&QualifiedName>) -> (String, LocalTypes) {
    let mut parts = Vec::new();
    let mut locals = LocalTypes::new();
    // A constructor (spec.md §4.7.6) builds its own result rather than
    // dispatching on a `self` received from the caller, so it takes no
    // implicit receiver parameter.
    if let Some(type_q) = owning_type.filter(|_| !sig.is_self_as_result) {
        parts.push(format!("self {}", type_q.object_name.to_lowercase()));
        locals.insert("SELF".to_string(), type_q.object_name.clone());
    }
    for p in &sig.params {
        let mode = match p.mode {
            ParamMode::In => "",
            ParamMode::Out => "OUT ",
            ParamMode::InOut => "INOUT ",
        };
        parts.push(format!("{mode}{} {}", p.name.to_lowercase(), map_scalar_type(&p.type_name)));
        locals.insert(p.name.to_uppercase(), p.type_name.clone());
    }
    (parts.join(", "), locals)
}

fn cursor_decl_lines(ctx: &TransformContext<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    for name in ctx.cursors.tracked_cursors() {
        let lower = name.to_lowercase();
        lines.push(format!("  {lower}__found BOOLEAN;"));
        lines.push(format!("  {lower}__rowcount INT := 0;"));
        lines.push(format!("  {lower}__isopen BOOLEAN := FALSE;"));
    }
    if ctx.cursors.uses_sql_cursor() {
        lines.push("  sql__rowcount INT := 0;".to_string());
    }
    lines
}

/// Splices `cursor_lines` into an already-rendered block's text: right after
/// an existing `DECLARE` line if the block emitted one, otherwise by
/// inserting a fresh `DECLARE` line before `BEGIN`.
fn splice_declare(body_lines: Vec<String>, cursor_lines: Vec<String>) -> Vec<String> {
    if cursor_lines.is_empty() {
        return body_lines;
    }
    let mut out = Vec::with_capacity(body_lines.len() + cursor_lines.len() + 1);
    let mut spliced = false;
    for line in body_lines {
        let is_declare = line.trim_start() == "DECLARE";
        if is_declare && !spliced {
            out.push(line);
            out.extend(cursor_lines.iter().cloned());
            spliced = true;
            continue;
        }
        if line.trim_start() == "BEGIN" && !spliced {
            out.push("DECLARE".to_string());
            out.extend(cursor_lines.iter().cloned());
            spliced = true;
        }
        out.push(line);
    }
    out
}

/// Renders one routine (spec.md §6's `transform_routine`) into a complete
/// `CREATE OR REPLACE FUNCTION`/`PROCEDURE` statement.
pub fn emit_routine(
    name: &QualifiedName,
    sig: &RoutineSig,
    block: &Block,
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
    owning_type: Option<&QualifiedName>,
) -> Result<EmitResult> {
    let (param_list, param_locals) = render_param_list(sig, owning_type);

    let method_ctx = owning_type.map(|type_q| {
        if sig.is_self_as_result {
            MethodRenderCtx {
                receiver_source_name: "SELF".to_string(),
                receiver_pg_name: "result".to_string(),
                receiver_type: type_q.clone(),
                bare_return_name: Some("result".to_string()),
            }
        } else {
            MethodRenderCtx {
                receiver_source_name: "SELF".to_string(),
                receiver_pg_name: "self".to_string(),
                receiver_type: type_q.clone(),
                bare_return_name: None,
            }
        }
    });

    prescan_cursor_usage(block, &mut ctx.cursors);
    let body_lines = render_block(block, ctx, idx, &param_locals, method_ctx.as_ref(), 0)?;
    let mut decl_lines = cursor_decl_lines(ctx);
    if let Some(type_q) = owning_type.filter(|_| sig.is_self_as_result) {
        decl_lines.push(format!("  result {};", type_q.object_name.to_lowercase()));
    }
    let body_lines = splice_declare(body_lines, decl_lines);

    let pg_name = match owning_type {
        // CONSTRUCTOR FUNCTION typename is always emitted as typename__new
        // (spec.md §4.7.6), not typename__typename.
        Some(type_q) if sig.is_self_as_result => {
            format!("{}.{}__new", type_q.schema.to_lowercase(), type_q.object_name.to_lowercase())
        }
        Some(type_q) => format!(
            "{}.{}__{}",
            type_q.schema.to_lowercase(),
            type_q.object_name.to_lowercase(),
            sig.name.to_lowercase()
        ),
        None => format!("{}.{}", name.schema.to_lowercase(), sig.name.to_lowercase()),
    };

    let is_function = sig.return_type.is_some();
    let kind = if is_function { "FUNCTION" } else { "PROCEDURE" };
    let mut header = format!("CREATE OR REPLACE {kind} {pg_name}({param_list})");
    if let Some(ret) = &sig.return_type {
        let ret_type = if sig.is_self_as_result {
            owning_type
                .map(|t| t.object_name.to_lowercase())
                .unwrap_or_else(|| ret.to_lowercase())
        } else {
            map_scalar_type(ret)
        };
        header.push_str(&format!(" RETURNS {ret_type}"));
    }

    let mut sql = String::new();
    sql.push_str(&header);
    sql.push_str("\nAS $body$\n");
    sql.push_str(&body_lines.join("\n"));
    sql.push_str("\n$body$ LANGUAGE plpgsql;");

    Ok(EmitResult {
        sql,
        warnings: std::mem::take(&mut ctx.warnings),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Param, Stmt};
    use crate::config::TransformConfig;

    #[test]
    fn emits_function_header_with_params_and_return_type() {
        let config = TransformConfig::new("hr");
        let name = QualifiedName::new("hr", "emp_pkg").with_sub_name("get_salary");
        let mut ctx = TransformContext::new(&config, name.clone());
        let idx = MetadataIndex::default();
        let sig = RoutineSig {
            name: "get_salary".to_string(),
            params: vec![Param {
                name: "emp_id".to_string(),
                mode: ParamMode::In,
                type_name: "NUMBER".to_string(),
            }],
            return_type: Some("NUMBER".to_string()),
            is_self_as_result: false,
        };
        let block = Block {
            declares: vec![],
            body: vec![Stmt::Return(Some(crate::ast::Expr::Literal(crate::ast::Literal::Number(
                "1".to_string(),
            ))))],
            exception_handlers: vec![],
        };
        let result = emit_routine(&name, &sig, &block, &mut ctx, &idx, None).unwrap();
        assert!(result.sql.starts_with("CREATE OR REPLACE FUNCTION hr.get_salary(emp_id numeric)"));
        assert!(result.sql.contains("RETURNS numeric"));
        assert!(result.sql.contains("LANGUAGE plpgsql;"));
    }

    #[test]
    fn tracked_cursor_gets_state_variables_declared() {
        let config = TransformConfig::new("hr");
        let name = QualifiedName::new("hr", "emp_pkg").with_sub_name("p");
        let mut ctx = TransformContext::new(&config, name.clone());
        let idx = MetadataIndex::default();
        let sig = RoutineSig {
            name: "p".to_string(),
            params: vec![],
            return_type: None,
            is_self_as_result: false,
        };
        let block = Block {
            declares: vec![],
            body: vec![
                Stmt::Open { cursor: "c".to_string() },
                Stmt::Close { cursor: "c".to_string() },
            ],
            exception_handlers: vec![],
        };
        let result = emit_routine(&name, &sig, &block, &mut ctx, &idx, None).unwrap();
        assert!(result.sql.contains("c__found BOOLEAN;"));
        assert!(result.sql.contains("c__rowcount INT := 0;"));
        assert!(result.sql.contains("c__isopen BOOLEAN := FALSE;"));
    }

    #[test]
    fn constructor_emits_new_with_result_decl_and_no_self_param() {
        let config = TransformConfig::new("hr");
        let type_q = QualifiedName::new("hr", "langy_type");
        let name = type_q.clone().with_sub_name("langy_type");
        let mut ctx = TransformContext::new(&config, name.clone());
        let idx = MetadataIndex::default();
        let sig = RoutineSig {
            name: "langy_type".to_string(),
            params: vec![Param {
                name: "p_name".to_string(),
                mode: ParamMode::In,
                type_name: "VARCHAR2".to_string(),
            }],
            return_type: Some("LANGY_TYPE".to_string()),
            is_self_as_result: true,
        };
        let block = Block {
            declares: vec![],
            body: vec![
                Stmt::Assign {
                    target: crate::ast::Expr::Dotted(vec!["SELF".to_string(), "NAME".to_string()]),
                    value: crate::ast::Expr::Ident("p_name".to_string()),
                },
                Stmt::Return(None),
            ],
            exception_handlers: vec![],
        };
        let result = emit_routine(&name, &sig, &block, &mut ctx, &idx, Some(&type_q)).unwrap();
        assert!(result.sql.starts_with("CREATE OR REPLACE FUNCTION hr.langy_type__new(p_name text)"));
        assert!(!result.sql.contains("self langy_type"));
        assert!(result.sql.contains("result langy_type;"));
        assert!(result.sql.contains("(result).name := p_name;"));
        assert!(result.sql.contains("RETURN result;"));
    }
}
