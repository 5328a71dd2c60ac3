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

//! Oracle PL/SQL -> PostgreSQL PL/pgSQL source-to-source transformer kernel.
//!
//! The public surface (spec.md §6) is deliberately small: build an index
//! once from dictionary rows ([`build_indices`]), segment and store one
//! compilation unit's source ([`segment_and_store`]), then transform
//! routines one at a time ([`transform_routine`]). [`clear_routine_storage`]
//! drops everything [`RoutineStore`] is holding once a migration's emission
//! pass is done (spec.md §5).

pub mod ast;
pub mod cleaner;
pub mod config;
pub mod context;
pub mod digest;
pub mod emit;
pub mod error;
pub mod lob;
pub mod metadata;
pub mod parser;
pub mod parser_integration;
pub mod qualified_name;
pub mod reducer;
pub mod scanner;
pub mod segment;
pub mod store;
pub mod stub;
pub mod tokenizer;
pub mod visitor;

use config::TransformConfig;
use context::TransformContext;
use error::{Result, TransformError, Warning};
use metadata::dictionary::DictionaryRows;
pub use metadata::MetadataIndex;
use parser_integration::{parse, ParseInput, ParseOutput};
use qualified_name::QualifiedName;
use store::{RoutineRecord, RoutineStore};

/// spec.md §6's `build_indices(metadata_rows)`.
pub fn build_indices(rows: &DictionaryRows) -> MetadataIndex {
    metadata::build_indices(rows)
}

/// The kind of compilation unit [`segment_and_store`] is segmenting
/// (spec.md §4.2: the package-body and type-body scanners are distinct
/// entry points sharing one engine).
pub enum SourceUnit<'a> {
    PackageBody { schema: &'a str, package: &'a str, source: &'a str },
    TypeBody { schema: &'a str, type_name: &'a str, source: &'a str },
}

/// Runs the SourceCleaner -> BoundaryScanner -> StubGenerator/BodyReducer
/// pipeline (spec.md §4.1-§4.4) over one compilation unit and populates
/// `store` with every routine's `{full, stub}` pair (plus, for package
/// bodies, the reduced body text).
pub fn segment_and_store(unit: SourceUnit<'_>, store: &mut RoutineStore) -> Result<()> {
    match unit {
        SourceUnit::PackageBody { schema, package, source } => {
            let cleaned = cleaner::clean(source)?;
            let segments = scanner::scan_package_body(&cleaned)?;
            for seg in &segments {
                let stub = stub::generate_stub(seg, &cleaned);
                let full = seg.full(&cleaned).to_string();
                let method_key = method_key_for_stub(&stub)?;
                store.put(schema, package, RoutineRecord { full, stub, method_key });
            }
            let reduced = reducer::reduce_body(&cleaned, &segments);
            store.put_reduced_body(schema, package, reduced);
            Ok(())
        }
        SourceUnit::TypeBody { schema, type_name, source } => {
            let cleaned = cleaner::clean(source)?;
            let segments = scanner::scan_type_body(&cleaned, type_name)?;
            for seg in &segments {
                let stub = stub::generate_stub(seg, &cleaned);
                let full = seg.full(&cleaned).to_string();
                let method_key = method_key_for_stub(&stub)?;
                store.put(schema, type_name, RoutineRecord { full, stub, method_key });
            }
            Ok(())
        }
    }
}

/// `name + '_' + param_type_digest` (spec.md §9), derived from the stub's
/// own signature so overloads are distinguished without depending on the
/// scanner's internal ordering.
fn method_key_for_stub(stub: &str) -> Result<String> {
    let sig = match parse(ParseInput::Stub(stub))? {
        ParseOutput::Sig(sig) => sig,
        _ => unreachable!("ParseInput::Stub always yields ParseOutput::Sig"),
    };
    let param_types: Vec<String> = sig.params.iter().map(|p| p.type_name.clone()).collect();
    Ok(digest::method_key(&sig.name, &param_types))
}

/// The registered private routines/methods a `MetadataIndex` doesn't yet
/// know about (spec.md §4.2/§4.7.6: private package routines and private
/// type methods are recovered from the scan, not the dictionary). Call this
/// once per segmented unit, after [`segment_and_store`], before
/// transforming any of its routines.
pub fn register_private_methods(
    idx: &mut MetadataIndex,
    owning_type: &QualifiedName,
    segments: &[segment::RoutineSegment],
    cleaned_source: &str,
) -> Result<()> {
    for seg in segments {
        let stub = stub::generate_stub(seg, cleaned_source);
        let sig = match parse(ParseInput::Stub(&stub))? {
            ParseOutput::Sig(sig) => sig,
            _ => unreachable!("ParseInput::Stub always yields ParseOutput::Sig"),
        };
        let param_types: Vec<String> = sig.params.iter().map(|p| p.type_name.clone()).collect();
        idx.add_private_method(
            owning_type.clone(),
            sig.name.clone(),
            metadata::types::MethodKind::from(seg.kind),
            param_types,
            sig.return_type.filter(|_| !sig.is_self_as_result),
        );
    }
    Ok(())
}

/// The result of transforming one routine (spec.md §6's `transform_routine`
/// return shape): the emitted PL/pgSQL text plus any warnings recorded along
/// the way (spec.md §7: "Warnings are collected in a per-run structured
/// report").
pub struct TransformOutcome {
    pub sql: String,
    pub warnings: Vec<Warning>,
}

/// spec.md §6's `transform_routine(qualified_name) -> text`: looks the
/// routine's full source up in `store`, parses it as a `SingleRoutine`
/// (never a whole package/type body, spec.md §4.6), and runs the visitor
/// pipeline plus `ImplementationEmitter` over the result.
pub fn transform_routine(
    name: &QualifiedName,
    container: &str,
    method_key: &str,
    store: &RoutineStore,
    idx: &MetadataIndex,
    config: &TransformConfig,
    owning_type: Option<&QualifiedName>,
) -> Result<TransformOutcome> {
    let record = store.require(&name.schema, container, method_key)?;
    let (sig, block) = match parse(ParseInput::SingleRoutine(&record.full))? {
        ParseOutput::Routine(sig, block) => (sig, block),
        _ => {
            return Err(TransformError::TransformInconsistency {
                routine: name.clone(),
                detail: "ParseInput::SingleRoutine did not yield ParseOutput::Routine".to_string(),
            })
        }
    };
    let mut ctx = TransformContext::new(config, name.clone());
    let result = emit::emit_routine(name, &sig, &block, &mut ctx, idx, owning_type)?;
    Ok(TransformOutcome {
        sql: result.sql,
        warnings: result.warnings,
    })
}

/// Drops every source/reduced-body string `store` is holding (spec.md §3:
/// "cleared by `clear_routine_storage` after emission completes").
pub fn clear_routine_storage(store: &mut RoutineStore) {
    store.clear_all();
}

/// Feature-gated worker-pool entry point (SPEC_FULL.md §5): transforms many
/// independent routines concurrently. `MetadataIndex` and `RoutineStore` are
/// read-only for the duration (built once, shared via `&`), which is what
/// makes this safe — no routine's transformation mutates shared state.
#[cfg(feature = "parallel")]
pub fn transform_many(
    requests: &[(QualifiedName, String, String, Option<QualifiedName>)],
    store: &RoutineStore,
    idx: &MetadataIndex,
    config: &TransformConfig,
) -> Vec<Result<TransformOutcome>> {
    use rayon::prelude::*;
    requests
        .par_iter()
        .map(|(name, container, method_key, owning_type)| {
            transform_routine(name, container, method_key, store, idx, config, owning_type.as_ref())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_pipeline_transforms_a_simple_function() {
        let src = "PACKAGE BODY emp_pkg IS\n\
                    FUNCTION get_salary(emp_id NUMBER) RETURN NUMBER IS\n\
                    v_salary NUMBER;\n\
                    BEGIN\n\
                    RETURN v_salary;\n\
                    END;\n\
                    END emp_pkg;";
        let mut store = RoutineStore::default();
        segment_and_store(
            SourceUnit::PackageBody { schema: "hr", package: "emp_pkg", source: src },
            &mut store,
        )
        .unwrap();

        let idx = MetadataIndex::default();
        let config = TransformConfig::new("hr");
        let name = QualifiedName::new("hr", "emp_pkg").with_sub_name("get_salary");
        let method_key = digest::method_key("get_salary", &["NUMBER"]);
        let outcome = transform_routine(&name, "emp_pkg", &method_key, &store, &idx, &config, None).unwrap();
        assert!(outcome.sql.contains("CREATE OR REPLACE FUNCTION hr.get_salary"));
        assert!(outcome.sql.contains("RETURNS numeric"));
    }

    #[test]
    fn clear_routine_storage_empties_the_store() {
        let mut store = RoutineStore::default();
        segment_and_store(
            SourceUnit::PackageBody {
                schema: "hr",
                package: "p",
                source: "PACKAGE BODY p IS\nPROCEDURE x IS\nBEGIN\nNULL;\nEND;\nEND p;",
            },
            &mut store,
        )
        .unwrap();
        assert!(!store.is_empty());
        clear_routine_storage(&mut store);
        assert!(store.is_empty());
    }
}
