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

//! Object field access (spec.md §4.7.5): `a.b.c[.d]` where `a` resolves to
//! a table (via alias, synonym, or bare name) and `b` is a column whose
//! type is an object type.
//!
//! The root-resolution order implemented here is the single-identifier
//! case spec.md §4.7.5 names first: current alias -> synonym -> bare table
//! in current schema. A `schema.table.field...` root (the "`schema.table`"
//! leg of that same order, where the root itself is two identifiers) is
//! not attempted — see DESIGN.md's note on this simplification — so a
//! fully schema-qualified object-column reference passes through
//! unrewritten rather than raising an error, consistent with spec.md
//! §4.7.5's "If none, do not transform."

use crate::context::TransformContext;
use crate::metadata::MetadataIndex;
use crate::qualified_name::QualifiedName;

fn resolve_single_root(
    name: &str,
    ctx: &TransformContext<'_>,
    idx: &MetadataIndex,
) -> Option<QualifiedName> {
    if let Some(t) = ctx.aliases.resolve(name) {
        return Some(t.clone());
    }
    if let Some(t) = idx.resolve_synonym(name, &ctx.config.current_schema) {
        return Some(t);
    }
    if idx.is_table_in_schema(&ctx.config.current_schema, name) {
        return Some(QualifiedName::new(ctx.config.current_schema.clone(), name));
    }
    None
}

/// Attempts the spec.md §4.7.5 rewrite on a dotted chain of length >= 3.
/// Returns `None` (pass through verbatim) if the root doesn't resolve, the
/// column is unknown, or the column's type is not an object type.
pub fn try_object_field_rewrite(
    parts: &[String],
    ctx: &mut TransformContext<'_>,
    idx: &MetadataIndex,
) -> Option<String> {
    if parts.len() < 3 {
        return None;
    }
    let table = resolve_single_root(&parts[0], ctx, idx)?;
    let column = &parts[1];
    let raw_type = idx.get_column_type(&table, column)?;
    let type_q = idx.qualify_type_name(raw_type, ctx.config);
    if !idx.is_object_type(&type_q) {
        return None;
    }

    let a = parts[0].to_lowercase();
    let b = parts[1].to_lowercase();
    let c = parts[2].to_lowercase();
    let mut result = format!("({a}.{b}).{c}");
    if parts.len() >= 4 {
        result = format!("({result}).{}", parts[3].to_lowercase());
    }
    if parts.len() > 4 {
        for tail in &parts[4..] {
            result.push('.');
            result.push_str(&tail.to_lowercase());
        }
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransformConfig;
    use crate::metadata::{ObjectTypeDef, TypeMethodSig};
    use crate::metadata::types::MethodKind;

    fn make_index() -> MetadataIndex {
        let mut idx = MetadataIndex::default();
        idx.add_table_column(&QualifiedName::new("HR", "LANGTABLE"), "NR", "NUMBER");
        idx.add_table_column(&QualifiedName::new("HR", "LANGTABLE"), "LANGY", "LANGY_TYPE");
        idx.add_object_type(ObjectTypeDef {
            name: QualifiedName::new("HR", "LANGY_TYPE"),
            fields: vec![
                ("DE".to_string(), "VARCHAR2".to_string()),
                ("EN".to_string(), "VARCHAR2".to_string()),
            ],
        });
        let _ = TypeMethodSig {
            owning_type: QualifiedName::new("HR", "LANGY_TYPE"),
            method_name: "unused".to_string(),
            kind: MethodKind::Member,
            param_types: vec![],
            return_type: None,
        };
        idx
    }

    #[test]
    fn rewrites_depth_one_object_field_access() {
        let idx = make_index();
        let config = TransformConfig::new("hr");
        let mut ctx = TransformContext::new(&config, QualifiedName::new("hr", "p"));
        ctx.aliases.push_frame();
        ctx.aliases.bind("l", QualifiedName::new("hr", "langtable"));
        let parts = vec!["l".to_string(), "langy".to_string(), "de".to_string()];
        let out = try_object_field_rewrite(&parts, &mut ctx, &idx).unwrap();
        assert_eq!(out, "(l.langy).de");
    }

    #[test]
    fn passes_through_when_column_is_not_object_type() {
        let idx = make_index();
        let config = TransformConfig::new("hr");
        let mut ctx = TransformContext::new(&config, QualifiedName::new("hr", "p"));
        ctx.aliases.push_frame();
        ctx.aliases.bind("l", QualifiedName::new("hr", "langtable"));
        let parts = vec!["l".to_string(), "nr".to_string(), "x".to_string()];
        assert!(try_object_field_rewrite(&parts, &mut ctx, &idx).is_none());
    }

    #[test]
    fn passes_through_when_root_unresolved() {
        let idx = make_index();
        let config = TransformConfig::new("hr");
        let mut ctx = TransformContext::new(&config, QualifiedName::new("hr", "p"));
        let parts = vec!["unknown".to_string(), "langy".to_string(), "de".to_string()];
        assert!(try_object_field_rewrite(&parts, &mut ctx, &idx).is_none());
    }
}
