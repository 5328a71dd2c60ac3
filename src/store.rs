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

//! [`RoutineStore`] (spec.md §3, §4.5): the process-lifetime, per-migration
//! map from qualified routine name to `{full, stub, reduced body}` source.
//! Append-only during extraction; cleared exactly once after emission
//! (spec.md §5).

use crate::error::TransformError;
use std::collections::HashMap;

/// Owns the three source strings extracted for one routine (spec.md §3's
/// `RoutineRecord`). `method_key` is `name + '_' + param_type_digest`, used
/// to distinguish overloads without relying on parser-internal identity
/// (spec.md §9).
#[derive(Debug, Clone)]
pub struct RoutineRecord {
    pub full: String,
    pub stub: String,
    pub method_key: String,
}

#[derive(Debug, Default)]
pub struct RoutineStore {
    /// (schema, container, method_key) -> record. `container` is the
    /// package or type name; for a standalone routine it equals the
    /// routine name itself.
    routines: HashMap<(String, String, String), RoutineRecord>,
    /// (schema, package) -> reduced body text (packages only, spec.md §4.4).
    reduced_bodies: HashMap<(String, String), String>,
}

impl RoutineStore {
    pub fn put(
        &mut self,
        schema: &str,
        container: &str,
        record: RoutineRecord,
    ) {
        let key = (
            schema.to_uppercase(),
            container.to_uppercase(),
            record.method_key.to_uppercase(),
        );
        self.routines.insert(key, record);
    }

    pub fn get(&self, schema: &str, container: &str, method_key: &str) -> Option<&RoutineRecord> {
        self.routines.get(&(
            schema.to_uppercase(),
            container.to_uppercase(),
            method_key.to_uppercase(),
        ))
    }

    /// Like [`Self::get`] but surfaces spec.md §7's `StorageMiss` error
    /// directly, for call sites that require the source to exist
    /// (out-of-order invocation is a fatal-for-unit bug, not a recoverable
    /// condition).
    pub fn require(
        &self,
        schema: &str,
        container: &str,
        method_key: &str,
    ) -> Result<&RoutineRecord, TransformError> {
        self.get(schema, container, method_key).ok_or_else(|| {
            TransformError::StorageMiss {
                name: crate::qualified_name::QualifiedName::new(schema, container)
                    .with_sub_name(method_key),
            }
        })
    }

    /// All stubs stored under `(schema, container)`, for batched signature
    /// extraction (spec.md §4.5's `stubs_for`).
    pub fn stubs_for(&self, schema: &str, container: &str) -> Vec<&RoutineRecord> {
        let schema = schema.to_uppercase();
        let container = container.to_uppercase();
        self.routines
            .iter()
            .filter(|((s, c, _), _)| *s == schema && *c == container)
            .map(|(_, r)| r)
            .collect()
    }

    pub fn put_reduced_body(&mut self, schema: &str, package: &str, body: String) {
        self.reduced_bodies
            .insert((schema.to_uppercase(), package.to_uppercase()), body);
    }

    pub fn reduced_body(&self, schema: &str, package: &str) -> Option<&str> {
        self.reduced_bodies
            .get(&(schema.to_uppercase(), package.to_uppercase()))
            .map(|s| s.as_str())
    }

    /// Drops every stored routine source and reduced body (spec.md §3:
    /// "cleared by `clear_routine_storage` after emission completes").
    pub fn clear_all(&mut self) {
        self.routines.clear();
        self.reduced_bodies.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty() && self.reduced_bodies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let mut store = RoutineStore::default();
        store.put(
            "hr",
            "emp_pkg",
            RoutineRecord {
                full: "FUNCTION f IS BEGIN RETURN 1; END;".to_string(),
                stub: "FUNCTION f IS BEGIN RETURN NULL; END;".to_string(),
                method_key: "F_0000".to_string(),
            },
        );
        let got = store.get("HR", "EMP_PKG", "f_0000").unwrap();
        assert!(got.full.contains("RETURN 1"));
    }

    #[test]
    fn clear_all_empties_store() {
        let mut store = RoutineStore::default();
        store.put(
            "hr",
            "p",
            RoutineRecord {
                full: String::new(),
                stub: String::new(),
                method_key: "X_0000".to_string(),
            },
        );
        store.clear_all();
        assert!(store.is_empty());
    }

    #[test]
    fn missing_routine_is_storage_miss() {
        let store = RoutineStore::default();
        let err = store.require("hr", "p", "x_0000").unwrap_err();
        assert!(matches!(err, TransformError::StorageMiss { .. }));
    }
}
