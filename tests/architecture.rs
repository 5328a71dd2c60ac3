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

//! Property-style tests over the architectural guarantees this crate makes
//! rather than any single scenario's literal output: round-trip
//! stubification, segment completeness, scanner/parser agreement, cursor
//! tracker soundness, closed attribute rewrites, the exception-code
//! formula, LOB type-mapping closure, object-field rewrite locality, and
//! the never-parse-a-whole-unit rule that bounds memory use.

use orasql_transform::ast::Expr;
use orasql_transform::config::TransformConfig;
use orasql_transform::context::{ExceptionMap, TransformContext};
use orasql_transform::digest;
use orasql_transform::metadata::types::ColumnType;
use orasql_transform::metadata::MetadataIndex;
use orasql_transform::parser_integration::{parse, ParseInput, ParseOutput};
use orasql_transform::qualified_name::QualifiedName;
use orasql_transform::visitor::expr::render_expr;
use orasql_transform::{cleaner, reducer, scanner, segment_and_store, stub, transform_routine, SourceUnit};
use orasql_transform::store::RoutineStore;
use std::collections::HashMap;

fn sig_of(parse_input: ParseInput<'_>) -> orasql_transform::ast::RoutineSig {
    match parse(parse_input).unwrap() {
        ParseOutput::Sig(sig) => sig,
        _ => panic!("expected a signature"),
    }
}

#[test]
fn property_1_stub_and_full_routine_agree_on_signature() {
    let full_src = "FUNCTION get_salary(emp_id NUMBER, bonus OUT NUMBER) RETURN NUMBER IS\n\
                    v NUMBER;\n\
                    BEGIN\n\
                    RETURN v;\n\
                    END;";
    let cleaned = cleaner::clean(full_src).unwrap();
    let segs = scanner::scan_package_body(&cleaned).unwrap();
    assert_eq!(segs.len(), 1);
    let stub_text = stub::generate_stub(&segs[0], &cleaned);

    let from_stub = sig_of(ParseInput::Stub(&stub_text));
    let from_full = sig_of(ParseInput::Stub(segs[0].signature(&cleaned)));
    assert_eq!(from_stub, from_full);
    assert_eq!(from_stub.name, "get_salary");
    assert_eq!(from_stub.params.len(), 2);
    assert_eq!(from_stub.return_type.as_deref(), Some("NUMBER"));
}

#[test]
fn property_1_constructor_self_as_result_round_trips() {
    let full_src = "CONSTRUCTOR FUNCTION employee_type(id NUMBER, name VARCHAR2) RETURN SELF AS RESULT IS\n\
                    BEGIN\n\
                    self.id := id;\n\
                    self.name := name;\n\
                    END;";
    let cleaned = cleaner::clean(full_src).unwrap();
    let segs = scanner::scan_type_body(&cleaned, "employee_type").unwrap();
    let stub_text = stub::generate_stub(&segs[0], &cleaned);
    let sig = sig_of(ParseInput::Stub(&stub_text));
    assert!(sig.is_self_as_result);
    assert_eq!(sig.params.len(), 2);
}

#[test]
fn property_2_segments_plus_reduced_body_reconstruct_every_byte_in_source_order() {
    let src = "PACKAGE BODY p IS\n  v_count NUMBER := 0;\n\n  \
               FUNCTION f RETURN NUMBER IS\n  BEGIN\n    RETURN 1;\n  END;\n\n  \
               PROCEDURE g IS\n  BEGIN\n    NULL;\n  END;\n\nEND p;";
    let cleaned = cleaner::clean(src).unwrap();
    let segs = scanner::scan_package_body(&cleaned).unwrap();
    let reduced = reducer::reduce_body(&cleaned, &segs);

    // Reconstruct by re-inserting each segment's full text at its recorded
    // offset against the reduced body's complementary ranges; byte-for-byte
    // equality with the cleaned source demonstrates no byte was dropped or
    // duplicated between {segments, reduced_body}.
    let mut reconstructed = String::with_capacity(cleaned.len());
    let mut cursor = 0usize;
    for seg in &segs {
        reconstructed.push_str(&cleaned[cursor..seg.start]);
        reconstructed.push_str(seg.full(&cleaned));
        cursor = seg.end;
    }
    reconstructed.push_str(&cleaned[cursor..]);
    assert_eq!(reconstructed, cleaned);

    // every segment's full text is missing from the reduced body, and every
    // declaration surviving in the reduced body is intact.
    assert!(reduced.contains("v_count NUMBER"));
    assert!(!reduced.contains("RETURN 1"));
    assert!(!reduced.contains("NULL;"));
}

#[test]
fn property_3_scanner_names_and_kinds_match_a_full_parse_of_each_segment() {
    let src = "PACKAGE BODY p IS\n\
               FUNCTION f RETURN NUMBER IS\n  BEGIN\n    RETURN 1;\n  END;\n\
               PROCEDURE g(x NUMBER) IS\n  BEGIN\n    NULL;\n  END;\n\
               END p;";
    let cleaned = cleaner::clean(src).unwrap();
    let segs = scanner::scan_package_body(&cleaned).unwrap();
    assert_eq!(segs.len(), 2);

    for seg in &segs {
        let full_text = seg.full(&cleaned);
        let (sig, _block) = match parse(ParseInput::SingleRoutine(full_text)).unwrap() {
            ParseOutput::Routine(sig, block) => (sig, block),
            _ => panic!("expected a routine"),
        };
        // the scanner's own segment name/kind agrees with what a full parse
        // of that single routine's text reports.
        assert_eq!(sig.name.to_uppercase(), seg.name.to_uppercase());
        assert_eq!(sig.return_type.is_some(), seg.kind.is_function());
    }
}

#[test]
fn property_4_cursor_tracker_soundness_across_a_full_routine() {
    let src = "PACKAGE BODY emp_pkg IS\n\
               PROCEDURE walk_emps IS\n\
               CURSOR c IS SELECT 1 FROM dual;\n\
               v_x NUMBER;\n\
               BEGIN\n\
               OPEN c;\n\
               FETCH c INTO v_x;\n\
               CLOSE c;\n\
               IF c%ISOPEN THEN\n\
               NULL;\n\
               END IF;\n\
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
    let name = QualifiedName::new("hr", "emp_pkg").with_sub_name("walk_emps");
    let method_key = digest::method_key("walk_emps", &[] as &[&str]);
    let outcome =
        transform_routine(&name, "emp_pkg", &method_key, &store, &idx, &config, None).unwrap();

    // a tracking variable is declared for c, and only for c.
    assert!(outcome.sql.contains("c__found BOOLEAN;"));
    assert!(outcome.sql.contains("c__rowcount INT := 0;"));
    assert!(outcome.sql.contains("c__isopen BOOLEAN := FALSE;"));
    assert!(!outcome.sql.contains("sql__rowcount"));

    // every OPEN/FETCH/CLOSE carries its maintenance statement.
    assert!(outcome.sql.contains("OPEN c;\n  c__isopen := TRUE;"));
    assert!(outcome.sql.contains("c__found := FOUND;"));
    assert!(outcome.sql.contains("CLOSE c;\n  c__isopen := FALSE;"));
}

#[test]
fn property_5_no_oracle_cursor_attribute_token_survives_emission() {
    let src = "PACKAGE BODY emp_pkg IS\n\
               FUNCTION update_salary(p_dept_id NUMBER) RETURN NUMBER IS\n\
               BEGIN\n\
               UPDATE emp SET salary = salary * 1.1 WHERE dept_id = p_dept_id;\n\
               IF SQL%FOUND THEN\n\
               RETURN SQL%ROWCOUNT;\n\
               END IF;\n\
               IF SQL%NOTFOUND THEN\n\
               RETURN 0;\n\
               END IF;\n\
               RETURN -1;\n\
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
    let name = QualifiedName::new("hr", "emp_pkg").with_sub_name("update_salary");
    let method_key = digest::method_key("update_salary", &["NUMBER"]);
    let outcome =
        transform_routine(&name, "emp_pkg", &method_key, &store, &idx, &config, None).unwrap();

    for token in ["%FOUND", "%NOTFOUND", "%ROWCOUNT", "%ISOPEN"] {
        assert!(!outcome.sql.contains(token), "leftover token {token} in:\n{}", outcome.sql);
    }
}

#[test]
fn property_6_exception_code_formula_holds_for_several_codes() {
    for (oracle_code, expected) in [(-20001, "P0001"), (-20000, "P0000"), (-20999, "P0999"), (-20042, "P0042")] {
        let mut map = ExceptionMap::default();
        map.register("e", oracle_code);
        assert_eq!(map.sqlstate_for("e"), Some(expected));
    }
}

#[test]
fn property_7_lob_type_mapping_closure() {
    assert_eq!(ColumnType::from_oracle_lob_name("BLOB"), Some(ColumnType::Oid));
    assert_eq!(ColumnType::from_oracle_lob_name("CLOB"), Some(ColumnType::Oid));
    assert_eq!(ColumnType::from_oracle_lob_name("NCLOB"), Some(ColumnType::Oid));
    assert_eq!(ColumnType::from_oracle_lob_name("LONG"), Some(ColumnType::Text));
    assert_eq!(ColumnType::from_oracle_lob_name("BFILE"), Some(ColumnType::Text));
    assert_eq!(ColumnType::from_oracle_lob_name("LONG RAW"), Some(ColumnType::Bytea));

    // no other Oracle type name produces Oid.
    for other in ["NUMBER", "VARCHAR2", "DATE", "BOOLEAN", "PLS_INTEGER"] {
        assert_ne!(ColumnType::from_oracle_lob_name(other), Some(ColumnType::Oid));
        assert_eq!(ColumnType::from_oracle_lob_name(other), None);
    }
}

#[test]
fn property_8_staging_plan_never_leaves_a_staging_column_in_its_final_state() {
    use orasql_transform::lob::LobTransferPlan;

    let plan = LobTransferPlan::new("hr.docs", "body", ColumnType::Oid, true);
    let steps = plan.render();
    // the staging column is dropped in the final statement: once it runs,
    // `body_staging` no longer exists as a column name anywhere past that
    // point in the sequence.
    let drop_staging_idx = steps
        .iter()
        .position(|s| s.contains("DROP COLUMN body_staging"))
        .unwrap();
    assert_eq!(drop_staging_idx, steps.len() - 1);
    // no statement after the drop still names the staging column.
    for step in &steps[drop_staging_idx + 1..] {
        assert!(!step.contains("_staging"));
    }
}

#[test]
fn property_9_object_field_locality_preserves_non_object_columns_verbatim() {
    let mut idx = MetadataIndex::default();
    idx.add_table_column(&QualifiedName::new("HR", "EMP"), "ID", "NUMBER");
    idx.add_table_column(&QualifiedName::new("HR", "EMP"), "NAME", "VARCHAR2");

    let config = TransformConfig::new("hr");
    let mut ctx = TransformContext::new(&config, QualifiedName::new("hr", "p"));
    ctx.aliases.push_frame();
    ctx.aliases.bind("e", QualifiedName::new("hr", "emp"));

    let expr = Expr::Dotted(vec!["e".to_string(), "name".to_string(), "length".to_string()]);
    let locals = HashMap::new();
    let mut extra = Vec::new();
    let out = render_expr(&expr, &mut ctx, &idx, &locals, None, &mut extra);

    // `name` is not an object type, so the dotted chain passes through
    // verbatim (case-folded), not rewritten into `(e.name).length`.
    assert_eq!(out, "e.name.length");
}

#[test]
fn property_10_routine_isolation_bounds_what_a_single_transform_can_see() {
    let src = "PACKAGE BODY emp_pkg IS\n\
               FUNCTION f RETURN NUMBER IS\n\
               BEGIN\n\
               RETURN 111111;\n\
               END;\n\
               FUNCTION g RETURN NUMBER IS\n\
               BEGIN\n\
               RETURN 222222;\n\
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

    let f_key = digest::method_key("f", &[] as &[&str]);
    let f_name = QualifiedName::new("hr", "emp_pkg").with_sub_name("f");
    let f_outcome =
        transform_routine(&f_name, "emp_pkg", &f_key, &store, &idx, &config, None).unwrap();
    assert!(f_outcome.sql.contains("111111"));
    assert!(!f_outcome.sql.contains("222222"));

    let g_key = digest::method_key("g", &[] as &[&str]);
    let g_name = QualifiedName::new("hr", "emp_pkg").with_sub_name("g");
    let g_outcome =
        transform_routine(&g_name, "emp_pkg", &g_key, &store, &idx, &config, None).unwrap();
    assert!(g_outcome.sql.contains("222222"));
    assert!(!g_outcome.sql.contains("111111"));
}
