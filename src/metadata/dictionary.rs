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

//! Metadata input records (spec.md §6): plain Rust structs mirroring the
//! Oracle dictionary views the host's catalog-extraction collaborator
//! yields. This module treats them as already-typed values — no SQL/JDBC
//! code lives in this core (spec.md §1's "Out of scope: ... the catalog
//! extraction SQL").

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceObjectType {
    Package,
    PackageBody,
    Type,
    TypeBody,
    Function,
    Procedure,
    View,
}

/// A row of `ALL_SOURCE` (spec.md §6): one line of a compilation unit's
/// source text, keyed by `(owner, name, type)` with an ordinal `line`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct AllSourceRow {
    pub owner: String,
    pub name: String,
    pub r#type: SourceObjectType,
    pub line: u32,
    pub text: String,
}

/// A row of `ALL_TYPE_METHODS` (public object-type method signatures).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct AllTypeMethodRow {
    pub owner: String,
    pub type_name: String,
    pub method_name: String,
    pub method_no: u32,
    pub method_type: String, // "MAP" | "ORDER" | "PUBLIC" etc. as Oracle reports it
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct AllMethodParamRow {
    pub owner: String,
    pub type_name: String,
    pub method_name: String,
    pub method_no: u32,
    pub param_name: String,
    pub param_type_name: String,
    pub param_no: u32,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct AllMethodResultRow {
    pub owner: String,
    pub type_name: String,
    pub method_name: String,
    pub method_no: u32,
    pub result_type_name: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct AllColCommentRow {
    pub owner: String,
    pub table_name: String,
    pub column_name: String,
    pub comments: String,
}

/// A row of `ALL_TAB_COLUMNS`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct AllTabColumnRow {
    pub owner: String,
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct AllSynonymRow {
    pub owner: String,
    pub synonym_name: String,
    pub table_owner: String,
    pub table_name: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Table,
    View,
    ObjectType,
    Synonym,
    Package,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct AllObjectRow {
    pub owner: String,
    pub object_name: String,
    pub object_type: ObjectKind,
}

/// The full set of typed dictionary rows handed to [`super::index::build_indices`]
/// (spec.md §6's `build_indices(metadata_rows)`).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct DictionaryRows {
    pub all_source: Vec<AllSourceRow>,
    pub all_type_methods: Vec<AllTypeMethodRow>,
    pub all_method_params: Vec<AllMethodParamRow>,
    pub all_method_results: Vec<AllMethodResultRow>,
    pub all_col_comments: Vec<AllColCommentRow>,
    pub all_tab_columns: Vec<AllTabColumnRow>,
    pub all_synonyms: Vec<AllSynonymRow>,
    pub all_objects: Vec<AllObjectRow>,
}
