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

//! End-to-end scenarios exercising the full public pipeline (build an
//! index, segment a compilation unit, transform one routine) against each
//! of the shapes the core is built around: an implicit cursor attribute
//! referenced after the DML statement that sets it, object-typed column
//! access through an alias, a user-defined exception mapped to a SQLSTATE,
//! a type constructor plus a subsequent method call, a package-body
//! forward declaration, and a staged LOB column migration.

use orasql_transform::ast::{Expr, SelectIntoStmt, SelectItem, SelectStmt, TableRef};
use orasql_transform::config::TransformConfig;
use orasql_transform::context::TransformContext;
use orasql_transform::digest;
use orasql_transform::lob::LobTransferPlan;
use orasql_transform::metadata::types::{ColumnType, MethodKind};
use orasql_transform::metadata::{MetadataIndex, ObjectTypeDef};
use orasql_transform::qualified_name::QualifiedName;
use orasql_transform::visitor::dml::render_select_into;
use orasql_transform::{cleaner, scanner, segment_and_store, transform_routine, SourceUnit};
use orasql_transform::{store::RoutineStore};
use std::collections::HashMap;

#[test]
fn s1_sql_rowcount_referenced_after_the_update_that_sets_it() {
    let src = "PACKAGE BODY emp_pkg IS\n\
               FUNCTION update_salary(p_dept_id NUMBER) RETURN NUMBER IS\n\
               BEGIN\n\
               UPDATE emp SET salary = salary * 1.1 WHERE dept_id = p_dept_id;\n\
               IF SQL%FOUND THEN\n\
               RETURN SQL%ROWCOUNT;\n\
               END IF;\n\
               RETURN 0;\n\
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

    assert!(outcome.sql.contains("sql__rowcount INT := 0;"));
    assert!(outcome.sql.contains("UPDATE hr.emp SET salary = salary * 1.1 WHERE dept_id = p_dept_id;"));
    assert!(outcome.sql.contains("GET DIAGNOSTICS sql__rowcount = ROW_COUNT;"));
    assert!(outcome.sql.contains("IF (sql__rowcount > 0) THEN"));
    assert!(outcome.sql.contains("RETURN sql__rowcount;"));
}

#[test]
fn s2_object_field_access_through_an_alias_rewrites_to_row_paren_syntax() {
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

    let config = TransformConfig::new("hr");
    let mut ctx = TransformContext::new(&config, QualifiedName::new("hr", "p"));
    let locals = HashMap::new();

    let select = SelectStmt {
        items: vec![
            SelectItem {
                expr: Expr::Dotted(vec!["l".to_string(), "langy".to_string(), "de".to_string()]),
                alias: Some("lgde".to_string()),
            },
            SelectItem {
                expr: Expr::Dotted(vec!["l".to_string(), "langy".to_string(), "en".to_string()]),
                alias: None,
            },
        ],
        from: vec![TableRef { name: "langtable".to_string(), alias: Some("l".to_string()) }],
        where_clause: None,
    };
    let stmt = SelectIntoStmt { select, into: vec!["v_de".to_string(), "v_en".to_string()] };

    let out = render_select_into(&stmt, &mut ctx, &idx, &locals, None);
    let rendered = out.join("\n");

    assert!(rendered.contains("(l.langy).de AS lgde"));
    assert!(rendered.contains("(l.langy).en"));
    assert!(rendered.contains("FROM hr.langtable l"));
    assert!(rendered.contains("INTO v_de, v_en"));
}

#[test]
fn s3_user_defined_exception_maps_to_its_pragma_sqlstate() {
    let src = "PACKAGE BODY emp_pkg IS\n\
               PROCEDURE set_salary(p_salary NUMBER) IS\n\
               invalid_salary EXCEPTION;\n\
               PRAGMA EXCEPTION_INIT(invalid_salary, -20001);\n\
               BEGIN\n\
               IF p_salary < 0 THEN\n\
               RAISE invalid_salary;\n\
               END IF;\n\
               EXCEPTION\n\
               WHEN invalid_salary THEN\n\
               NULL;\n\
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
    let name = QualifiedName::new("hr", "emp_pkg").with_sub_name("set_salary");
    let method_key = digest::method_key("set_salary", &["NUMBER"]);
    let outcome =
        transform_routine(&name, "emp_pkg", &method_key, &store, &idx, &config, None).unwrap();

    assert!(outcome.sql.contains("RAISE EXCEPTION 'invalid_salary' USING ERRCODE = 'P0001';"));
    assert!(outcome.sql.contains("WHEN SQLSTATE 'P0001' THEN"));
}

#[test]
fn s4_constructor_invocation_then_member_method_call() {
    let src = "PACKAGE BODY emp_pkg IS\n\
               PROCEDURE show_salary IS\n\
               v EMPLOYEE_TYPE;\n\
               s NUMBER;\n\
               BEGIN\n\
               v := EMPLOYEE_TYPE(1, 'john');\n\
               s := v.get_salary();\n\
               END;\n\
               END emp_pkg;";
    let mut store = RoutineStore::default();
    segment_and_store(
        SourceUnit::PackageBody { schema: "hr", package: "emp_pkg", source: src },
        &mut store,
    )
    .unwrap();

    let mut idx = MetadataIndex::default();
    idx.add_private_method(
        QualifiedName::new("HR", "EMPLOYEE_TYPE"),
        "EMPLOYEE_TYPE".to_string(),
        MethodKind::Constructor,
        vec!["NUMBER".to_string(), "VARCHAR2".to_string()],
        Some("EMPLOYEE_TYPE".to_string()),
    );
    idx.add_private_method(
        QualifiedName::new("HR", "EMPLOYEE_TYPE"),
        "GET_SALARY".to_string(),
        MethodKind::Member,
        vec![],
        Some("NUMBER".to_string()),
    );

    let config = TransformConfig::new("hr");
    let name = QualifiedName::new("hr", "emp_pkg").with_sub_name("show_salary");
    let method_key = digest::method_key("show_salary", &[] as &[&str]);
    let outcome =
        transform_routine(&name, "emp_pkg", &method_key, &store, &idx, &config, None).unwrap();

    assert!(outcome.sql.contains("v := employee_type__new(1, 'john');"));
    assert!(outcome.sql.contains("s := employee_type__get_salary(v);"));
}

#[test]
fn s5_forward_declaration_yields_no_segment_of_its_own() {
    let src = "PACKAGE BODY p IS\n\
               FUNCTION b(x NUMBER) RETURN NUMBER;\n\
               FUNCTION a RETURN NUMBER IS\n\
               BEGIN\n\
               RETURN b(1);\n\
               END;\n\
               FUNCTION b(x NUMBER) RETURN NUMBER IS\n\
               BEGIN\n\
               RETURN x;\n\
               END;\n\
               END p;";
    let cleaned = cleaner::clean(src).unwrap();
    let segs = scanner::scan_package_body(&cleaned).unwrap();

    assert_eq!(segs.len(), 2);
    assert_eq!(segs[0].name, "a");
    assert_eq!(segs[1].name, "b");
    // the full body of `b`, not just its forward-declared signature, got
    // segmented (its segment spans a BEGIN/END pair).
    assert!(segs[1].full(&cleaned).contains("RETURN x;"));
}

#[test]
fn s6_not_null_blob_column_migrates_through_staging_without_a_gap() {
    let plan = LobTransferPlan::new("hr.documents", "doc", ColumnType::Oid, true);
    let steps = plan.render();

    assert_eq!(
        steps,
        vec![
            "ALTER TABLE hr.documents ALTER COLUMN doc DROP NOT NULL;".to_string(),
            "ALTER TABLE hr.documents ADD COLUMN doc_staging BYTEA;".to_string(),
            "-- bulk-load hr.documents.doc into doc_staging here (out-of-core data path)".to_string(),
            "UPDATE hr.documents SET doc = lo_from_bytea(0, doc_staging) WHERE doc_staging IS NOT NULL;"
                .to_string(),
            "ALTER TABLE hr.documents ALTER COLUMN doc SET NOT NULL;".to_string(),
            "ALTER TABLE hr.documents DROP COLUMN doc_staging;".to_string(),
        ]
    );
}
