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

//! StubGenerator (spec.md §4.3): derives a small parseable stub per
//! routine — signature plus `RETURN NULL;`/`RETURN;` — guaranteed to parse
//! and yield the exact signature metadata of the full routine (spec.md §8
//! property 1, "round-trip stubification").

use crate::segment::RoutineSegment;

/// Builds the stub text for `segment` out of `full_text` (the underlying
/// cleaned source the segment's offsets index into).
pub fn generate_stub(segment: &RoutineSegment, full_text: &str) -> String {
    let signature = segment.signature(full_text).trim_end();
    if segment.kind.is_function() {
        format!("{signature}\nIS\nBEGIN\n  RETURN NULL;\nEND;")
    } else {
        format!("{signature}\nIS\nBEGIN\n  RETURN;\nEND;")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner;
    use crate::scanner;

    #[test]
    fn function_stub_returns_null() {
        let cleaned = cleaner::clean(
            "FUNCTION get_salary(emp_id NUMBER) RETURN NUMBER IS\nBEGIN\n  RETURN 1;\nEND;",
        )
        .unwrap();
        let segs = scanner::scan_package_body(&cleaned).unwrap();
        let stub = generate_stub(&segs[0], &cleaned);
        assert!(stub.contains("RETURN NULL;"));
        assert!(stub.starts_with("FUNCTION get_salary(emp_id NUMBER) RETURN NUMBER"));
    }

    #[test]
    fn procedure_stub_returns_bare() {
        let cleaned =
            cleaner::clean("PROCEDURE do_thing(x NUMBER) IS\nBEGIN\n  NULL;\nEND;").unwrap();
        let segs = scanner::scan_package_body(&cleaned).unwrap();
        let stub = generate_stub(&segs[0], &cleaned);
        assert!(stub.contains("RETURN;"));
        assert!(!stub.contains("RETURN NULL"));
    }

    #[test]
    fn constructor_stub_preserves_self_as_result() {
        let cleaned = cleaner::clean(
            "CONSTRUCTOR FUNCTION employee_type(id NUMBER) RETURN SELF AS RESULT IS\nBEGIN\n  self.id := id;\nEND;",
        )
        .unwrap();
        let segs = scanner::scan_type_body(&cleaned, "employee_type").unwrap();
        let stub = generate_stub(&segs[0], &cleaned);
        assert!(stub.contains("RETURN SELF AS RESULT"));
        assert!(stub.contains("RETURN;"));
    }
}
