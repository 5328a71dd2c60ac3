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

//! BodyReducer (spec.md §4.4, packages only): excises every routine's
//! `[start, end)` range from a package body, preserving package-level
//! declarations so they can be parsed (spec.md §8 property 2: "segment
//! completeness").

use crate::segment::RoutineSegment;

/// Produces the reduced body for `full_text`, given the (already
/// source-ordered) `segments` found by [`crate::scanner::scan_package_body`].
/// Type bodies have no reducer (spec.md §4.4: "no declarations outside
/// methods") — this function is only ever called for package bodies.
pub fn reduce_body(full_text: &str, segments: &[RoutineSegment]) -> String {
    let mut out = String::with_capacity(full_text.len());
    let mut cursor = 0usize;
    for seg in segments {
        out.push_str(&full_text[cursor..seg.start]);
        cursor = seg.end;
    }
    out.push_str(&full_text[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner;
    use crate::scanner;

    #[test]
    fn reduced_body_preserves_declarations_and_drops_routine_text() {
        let src = "PACKAGE BODY p IS\n  v_count NUMBER := 0;\n\n  FUNCTION f RETURN NUMBER IS\n  BEGIN\n    RETURN 1;\n  END;\n\nEND p;";
        let cleaned = cleaner::clean(src).unwrap();
        let segs = scanner::scan_package_body(&cleaned).unwrap();
        let reduced = reduce_body(&cleaned, &segs);
        assert!(reduced.contains("v_count NUMBER"));
        assert!(!reduced.contains("RETURN 1"));
    }

    #[test]
    fn segments_plus_reduced_body_reconstruct_full_text() {
        // spec.md §8 property 2, byte-for-byte modulo ordering: every byte
        // of the cleaned source appears in exactly one of {segments,
        // reduced body}, since reduce_body is built by excising exactly
        // the segment ranges.
        let src = "PACKAGE BODY p IS\n  FUNCTION f RETURN NUMBER IS\n  BEGIN\n    RETURN 1;\n  END;\nEND p;";
        let cleaned = cleaner::clean(src).unwrap();
        let segs = scanner::scan_package_body(&cleaned).unwrap();
        let reduced = reduce_body(&cleaned, &segs);
        let mut reconstructed_len = reduced.len();
        for seg in &segs {
            reconstructed_len += seg.end - seg.start;
        }
        assert_eq!(reconstructed_len, cleaned.len());
    }
}
