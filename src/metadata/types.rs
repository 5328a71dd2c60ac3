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

//! Shared metadata value types (spec.md §3): [`ColumnType`] (the Oracle ->
//! PostgreSQL scalar/LOB mapping), [`ObjectTypeDef`], and [`TypeMethodSig`].

use crate::qualified_name::QualifiedName;
use crate::segment::RoutineKind;
use core::fmt;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// A scalar type carried through verbatim (already valid PostgreSQL,
    /// or resolved 1:1 by the host's dictionary-to-PostgreSQL type table).
    Scalar(String),
    /// `BLOB`/`CLOB`/`NCLOB` (spec.md §3 LOB policy).
    Oid,
    Text,
    Bytea,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Scalar(s) => write!(f, "{s}"),
            ColumnType::Oid => write!(f, "oid"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Bytea => write!(f, "bytea"),
        }
    }
}

impl ColumnType {
    /// Applies spec.md §3's LOB policy to an Oracle type name. Returns
    /// `None` for anything not in the LOB family; callers fall back to a
    /// direct scalar mapping for those (spec.md §3: "Everything else is a
    /// direct scalar mapping").
    pub fn from_oracle_lob_name(oracle_type: &str) -> Option<ColumnType> {
        match oracle_type.to_uppercase().as_str() {
            "BLOB" | "CLOB" | "NCLOB" => Some(ColumnType::Oid),
            "BFILE" | "LONG" => Some(ColumnType::Text),
            "LONG RAW" => Some(ColumnType::Bytea),
            _ => None,
        }
    }
}

/// An object type's field list (spec.md §3's `ObjectType`). Field lookup is
/// case-insensitive; `QualifiedName`'s own upper-casing on construction
/// already gives that for free as long as lookups fold the same way.
#[derive(Debug, Clone)]
pub struct ObjectTypeDef {
    pub name: QualifiedName,
    pub fields: Vec<(String, String)>,
}

impl ObjectTypeDef {
    /// Raw (unqualified) field type as recorded by the dictionary; callers
    /// must `qualify_type_name` the result before a further field lookup
    /// (spec.md §3).
    pub fn field_type(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
            .map(|(_, ty)| ty.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Member,
    Static,
    Map,
    Order,
    Constructor,
}

impl From<RoutineKind> for MethodKind {
    fn from(k: RoutineKind) -> Self {
        match k {
            RoutineKind::MemberFunction | RoutineKind::MemberProcedure => MethodKind::Member,
            RoutineKind::StaticFunction | RoutineKind::StaticProcedure => MethodKind::Static,
            RoutineKind::MapFunction => MethodKind::Map,
            RoutineKind::OrderFunction => MethodKind::Order,
            RoutineKind::Constructor => MethodKind::Constructor,
            RoutineKind::Function | RoutineKind::Procedure => MethodKind::Static,
        }
    }
}

/// A type method's signature (spec.md §3's `TypeMethodSig`), sourced either
/// from the dictionary (public methods) or from scanning a type body
/// (private methods — spec.md §4.2/§4.7.6).
#[derive(Debug, Clone)]
pub struct TypeMethodSig {
    pub owning_type: QualifiedName,
    pub method_name: String,
    pub kind: MethodKind,
    pub param_types: Vec<String>,
    pub return_type: Option<String>,
}

impl TypeMethodSig {
    /// The generated PostgreSQL function name: `typename__methodname`,
    /// with an overload digest suffix when more than one signature shares
    /// the same name (spec.md §4.7.6, §6). A `CONSTRUCTOR FUNCTION
    /// typename` is named after the type itself in Oracle, so its
    /// `method_name` equals `owning_type.object_name`; it always emits as
    /// `typename__new` rather than `typename__typename`.
    pub fn pg_function_name(&self, needs_digest: bool) -> String {
        let method_component = if self.kind == MethodKind::Constructor {
            "new".to_string()
        } else {
            self.method_name.to_lowercase()
        };
        let base = format!(
            "{}__{}",
            self.owning_type.object_name.to_lowercase(),
            method_component
        );
        if needs_digest {
            format!(
                "{base}_{}",
                crate::digest::param_type_digest(&self.param_types)
            )
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_emits_new_instead_of_its_own_type_name() {
        let sig = TypeMethodSig {
            owning_type: QualifiedName::new("HR", "LANGY_TYPE"),
            method_name: "LANGY_TYPE".to_string(),
            kind: MethodKind::Constructor,
            param_types: vec!["VARCHAR2".to_string()],
            return_type: Some("LANGY_TYPE".to_string()),
        };
        assert_eq!(sig.pg_function_name(false), "langy_type__new");
    }

    #[test]
    fn member_method_keeps_its_own_name() {
        let sig = TypeMethodSig {
            owning_type: QualifiedName::new("HR", "LANGY_TYPE"),
            method_name: "GREET".to_string(),
            kind: MethodKind::Member,
            param_types: vec![],
            return_type: Some("VARCHAR2".to_string()),
        };
        assert_eq!(sig.pg_function_name(false), "langy_type__greet");
    }
}
