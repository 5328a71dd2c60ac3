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

//! [`MetadataIndex`] (spec.md §3, §4.5): unifies Oracle dictionary rows
//! with source-scanned information (private package routines, private
//! type methods) into the lookups the visitor pipeline needs.
//!
//! Built once per migration and immutable afterwards (spec.md §5: "shareable
//! freely"), which is why every lookup takes `&self`.

use super::dictionary::{DictionaryRows, ObjectKind};
use super::types::{MethodKind, ObjectTypeDef, TypeMethodSig};
use crate::config::TransformConfig;
use crate::digest::param_type_digest;
use crate::qualified_name::{QualifiedName, QUALIFY_PROBE_ORDER_TAIL};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MetadataIndex {
    /// (schema, table) -> (column -> raw dictionary type)
    columns: HashMap<(String, String), HashMap<String, String>>,
    /// (schema, synonym) -> target qualified name
    synonyms: HashMap<(String, String), QualifiedName>,
    /// schema -> set of known table names
    tables_by_schema: HashMap<String, std::collections::HashSet<String>>,
    /// qualified object-type name -> its field list
    object_types: HashMap<QualifiedName, ObjectTypeDef>,
    /// method lookup key: (owning type, method name, arg digest) -> sig
    methods: HashMap<(QualifiedName, String, String), TypeMethodSig>,
    /// method name -> count of distinct overloads, to decide whether the
    /// digest suffix is needed on emission (spec.md §4.7.6).
    method_overload_counts: HashMap<(QualifiedName, String), usize>,
}

impl MetadataIndex {
    pub fn get_column_type(&self, table: &QualifiedName, column: &str) -> Option<&str> {
        self.columns
            .get(&(table.schema.clone(), table.object_name.clone()))
            .and_then(|cols| {
                cols.iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(column))
                    .map(|(_, ty)| ty.as_str())
            })
    }

    pub fn is_table_in_schema(&self, schema: &str, table: &str) -> bool {
        self.tables_by_schema
            .get(&schema.to_uppercase())
            .map(|set| set.contains(&table.to_uppercase()))
            .unwrap_or(false)
    }

    /// `resolve_synonym(name, current_schema)` (spec.md §4.5): looks in
    /// `current_schema` first, falling back to `PUBLIC`.
    pub fn resolve_synonym(&self, name: &str, current_schema: &str) -> Option<QualifiedName> {
        let upper = name.to_uppercase();
        self.synonyms
            .get(&(current_schema.to_uppercase(), upper.clone()))
            .or_else(|| self.synonyms.get(&("PUBLIC".to_string(), upper)))
            .cloned()
    }

    pub fn is_object_type(&self, type_q: &QualifiedName) -> bool {
        self.object_types.contains_key(type_q)
    }

    pub fn get_field_type(&self, type_q: &QualifiedName, field: &str) -> Option<&str> {
        self.object_types.get(type_q).and_then(|t| t.field_type(field))
    }

    /// `qualify_type_name(name)` (spec.md §3): probes `current_schema`,
    /// `PUBLIC`, `SYS` in order; returns the first qualified form known as
    /// an object type, else the upper-cased bare name.
    pub fn qualify_type_name(&self, name: &str, config: &TransformConfig) -> QualifiedName {
        let mut probe_schemas = vec![config.current_schema.clone()];
        probe_schemas.extend(QUALIFY_PROBE_ORDER_TAIL.iter().map(|s| s.to_string()));
        for schema in probe_schemas {
            let candidate = QualifiedName::new(schema, name);
            if self.is_object_type(&candidate) {
                return candidate;
            }
        }
        QualifiedName::new(config.current_schema.clone(), name)
    }

    /// `lookup_method(type_q, name, arg_digest)` (spec.md §4.5).
    pub fn lookup_method(
        &self,
        type_q: &QualifiedName,
        name: &str,
        arg_digest: &str,
    ) -> Option<&TypeMethodSig> {
        self.methods
            .get(&(type_q.clone(), name.to_uppercase(), arg_digest.to_string()))
    }

    /// Whether `name` has more than one overload on `type_q`, i.e. whether
    /// the digest suffix is required in the emitted function name.
    pub fn method_is_overloaded(&self, type_q: &QualifiedName, name: &str) -> bool {
        self.method_overload_counts
            .get(&(type_q.clone(), name.to_uppercase()))
            .copied()
            .unwrap_or(0)
            > 1
    }

    /// Resolves `name` on `type_q` when exactly one overload exists,
    /// without needing a call site's argument-type digest. Used by the
    /// method-call visitor (spec.md §4.7.6), which does not run a full
    /// expression type-checker — an overloaded call site it can't
    /// disambiguate is reported non-fatally instead (spec.md §4.7.6:
    /// "if a step cannot be typed, the chain is reported").
    pub fn lookup_unique_method(&self, type_q: &QualifiedName, name: &str) -> Option<&TypeMethodSig> {
        if self.method_is_overloaded(type_q, name) {
            return None;
        }
        self.methods
            .values()
            .find(|m| &m.owning_type == type_q && m.method_name.eq_ignore_ascii_case(name))
    }

    fn add_method(&mut self, sig: TypeMethodSig) {
        let digest = param_type_digest(&sig.param_types);
        let key = (sig.owning_type.clone(), sig.method_name.to_uppercase());
        *self.method_overload_counts.entry(key.clone()).or_insert(0) += 1;
        self.methods
            .insert((sig.owning_type.clone(), sig.method_name.to_uppercase(), digest), sig);
    }

    /// Registers a private type method recovered by scanning a type body
    /// (spec.md §4.2/§4.7.6's "private methods are recovered by §4.2/§4.4
    /// of the type-body segmentation plus stub parsing").
    pub fn add_private_method(
        &mut self,
        owning_type: QualifiedName,
        method_name: String,
        kind: MethodKind,
        param_types: Vec<String>,
        return_type: Option<String>,
    ) {
        self.add_method(TypeMethodSig {
            owning_type,
            method_name,
            kind,
            param_types,
            return_type,
        });
    }

    /// Registers an object type discovered on the fly (e.g. referenced by
    /// a table column whose type wasn't present in `all_objects`, or in
    /// test fixtures that build an index by hand rather than from full
    /// dictionary rows).
    pub fn add_object_type(&mut self, def: ObjectTypeDef) {
        self.object_types.insert(def.name.clone(), def);
    }

    pub fn add_synonym(&mut self, schema: &str, name: &str, target: QualifiedName) {
        self.synonyms
            .insert((schema.to_uppercase(), name.to_uppercase()), target);
    }

    pub fn add_table_column(&mut self, table: &QualifiedName, column: &str, raw_type: &str) {
        self.tables_by_schema
            .entry(table.schema.clone())
            .or_default()
            .insert(table.object_name.clone());
        self.columns
            .entry((table.schema.clone(), table.object_name.clone()))
            .or_default()
            .insert(column.to_uppercase(), raw_type.to_string());
    }
}

/// Builds a [`MetadataIndex`] from dictionary rows (spec.md §6's
/// `build_indices(metadata_rows)`). Source-scanned private routines/methods
/// are added afterwards via [`MetadataIndex::add_private_method`] as each
/// type body is segmented — this function only covers what the dictionary
/// itself reports.
pub fn build_indices(rows: &DictionaryRows) -> MetadataIndex {
    let mut idx = MetadataIndex::default();

    for row in &rows.all_tab_columns {
        let table = QualifiedName::new(row.owner.clone(), row.table_name.clone());
        idx.add_table_column(&table, &row.column_name, &row.data_type);
    }

    for row in &rows.all_synonyms {
        let target = QualifiedName::new(row.table_owner.clone(), row.table_name.clone());
        idx.add_synonym(&row.owner, &row.synonym_name, target);
    }

    for row in &rows.all_objects {
        if row.object_type == ObjectKind::ObjectType {
            let q = QualifiedName::new(row.owner.clone(), row.object_name.clone());
            idx.object_types.entry(q.clone()).or_insert(ObjectTypeDef {
                name: q,
                fields: Vec::new(),
            });
        }
    }

    // ALL_TAB_COLUMNS rows whose owning "table" is actually a registered
    // object type populate that type's field list (Oracle reports object
    // type attributes through the same column metadata shape when the
    // type is used as a table's column type definition source).
    for row in &rows.all_tab_columns {
        let q = QualifiedName::new(row.owner.clone(), row.table_name.clone());
        if let Some(def) = idx.object_types.get_mut(&q) {
            def.fields.push((row.column_name.clone(), row.data_type.clone()));
        }
    }

    let mut params_by_method: HashMap<(String, String, String, u32), Vec<(u32, String)>> =
        HashMap::new();
    for p in &rows.all_method_params {
        params_by_method
            .entry((
                p.owner.clone(),
                p.type_name.clone(),
                p.method_name.clone(),
                p.method_no,
            ))
            .or_default()
            .push((p.param_no, p.param_type_name.clone()));
    }
    let mut result_by_method: HashMap<(String, String, String, u32), String> = HashMap::new();
    for r in &rows.all_method_results {
        result_by_method.insert(
            (r.owner.clone(), r.type_name.clone(), r.method_name.clone(), r.method_no),
            r.result_type_name.clone(),
        );
    }

    for m in &rows.all_type_methods {
        let owning_type = QualifiedName::new(m.owner.clone(), m.type_name.clone());
        let key = (m.owner.clone(), m.type_name.clone(), m.method_name.clone(), m.method_no);
        let mut params = params_by_method.remove(&key).unwrap_or_default();
        params.sort_by_key(|(no, _)| *no);
        let param_types: Vec<String> = params.into_iter().map(|(_, ty)| ty).collect();
        let return_type = result_by_method.remove(&key);
        let kind = match m.method_type.to_uppercase().as_str() {
            "MAP" => MethodKind::Map,
            "ORDER" => MethodKind::Order,
            "STATIC" => MethodKind::Static,
            "CONSTRUCTOR" => MethodKind::Constructor,
            _ => MethodKind::Member,
        };
        idx.add_method(TypeMethodSig {
            owning_type,
            method_name: m.method_name.clone(),
            kind,
            param_types,
            return_type,
        });
    }

    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualify_type_name_probes_current_then_public_then_sys() {
        let mut idx = MetadataIndex::default();
        idx.add_object_type(ObjectTypeDef {
            name: QualifiedName::new("SYS", "LANGY_TYPE"),
            fields: vec![],
        });
        let config = TransformConfig::new("hr");
        let q = idx.qualify_type_name("langy_type", &config);
        assert_eq!(q, QualifiedName::new("SYS", "LANGY_TYPE"));
    }

    #[test]
    fn qualify_type_name_falls_back_to_current_schema_upper_cased() {
        let idx = MetadataIndex::default();
        let config = TransformConfig::new("hr");
        let q = idx.qualify_type_name("unknown_type", &config);
        assert_eq!(q, QualifiedName::new("HR", "UNKNOWN_TYPE"));
    }

    #[test]
    fn field_lookup_is_case_insensitive() {
        let mut idx = MetadataIndex::default();
        idx.add_object_type(ObjectTypeDef {
            name: QualifiedName::new("HR", "LANGY_TYPE"),
            fields: vec![("DE".to_string(), "VARCHAR2".to_string())],
        });
        assert_eq!(
            idx.get_field_type(&QualifiedName::new("HR", "LANGY_TYPE"), "de"),
            Some("VARCHAR2")
        );
    }
}
