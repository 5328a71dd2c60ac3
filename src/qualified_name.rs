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

//! `QualifiedName`, the case-folded `(schema, object, sub_object)` key used
//! throughout the metadata index, the routine store, and the emitted output.
//!
//! Oracle dictionary names are case-insensitive (unquoted identifiers are
//! folded to upper case at parse time); spec.md §3 requires equality on
//! `QualifiedName` to follow that rule regardless of how a caller happened
//! to type the name.

use core::fmt;

/// A dotted Oracle name, optionally with a sub-name (e.g. a package member
/// or a type method), case-folded to upper case on construction so that
/// `Eq`/`Hash`/`Ord` are case-insensitive for free.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub schema: String,
    pub object_name: String,
    pub sub_name: Option<String>,
}

impl QualifiedName {
    pub fn new(schema: impl Into<String>, object_name: impl Into<String>) -> Self {
        QualifiedName {
            schema: fold(schema.into()),
            object_name: fold(object_name.into()),
            sub_name: None,
        }
    }

    pub fn with_sub_name(mut self, sub_name: impl Into<String>) -> Self {
        self.sub_name = Some(fold(sub_name.into()));
        self
    }

    /// Re-qualifies this name under a different schema, keeping the object
    /// and sub-name. Used when `qualify_type_name` resolves an unqualified
    /// type against `current_schema`, `PUBLIC`, and `SYS` in turn.
    pub fn with_schema(&self, schema: impl Into<String>) -> Self {
        QualifiedName {
            schema: fold(schema.into()),
            object_name: self.object_name.clone(),
            sub_name: self.sub_name.clone(),
        }
    }
}

fn fold(s: String) -> String {
    s.to_uppercase()
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.object_name)?;
        if let Some(sub) = &self.sub_name {
            write!(f, ".{sub}")?;
        }
        Ok(())
    }
}

/// Schema probe order used by `qualify_type_name`: current schema, then
/// `PUBLIC`, then `SYS`.
pub const QUALIFY_PROBE_ORDER_TAIL: [&str; 2] = ["PUBLIC", "SYS"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_case_insensitive() {
        assert_eq!(QualifiedName::new("hr", "emp"), QualifiedName::new("HR", "EMP"));
        assert_eq!(QualifiedName::new("hr", "emp"), QualifiedName::new("Hr", "Emp"));
    }

    #[test]
    fn display_round_trips_upper_cased() {
        let q = QualifiedName::new("hr", "employee_type").with_sub_name("get_salary");
        assert_eq!(q.to_string(), "HR.EMPLOYEE_TYPE.GET_SALARY");
    }
}
