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

//! LOB column migration plan (spec.md §4.7.7, §6 scenario S6): the
//! statements that load a BLOB/CLOB/NCLOB column's data into its
//! PostgreSQL-mapped replacement column through a transient `BYTEA` staging
//! column, without an intervening window where the target column is both
//! present and unusable. Text only — running these against a live
//! connection, and the bulk load into the staging column itself, is the
//! out-of-core data-path collaborator's job (spec.md §1).

use crate::metadata::ColumnType;

/// One column's staged LOB migration (spec.md §4.7.7's step sequence).
#[derive(Debug, Clone)]
pub struct LobTransferPlan {
    pub table: String,
    pub column: String,
    pub staging_column: String,
    pub target_type: ColumnType,
    pub was_not_null: bool,
}

impl LobTransferPlan {
    pub fn new(table: impl Into<String>, column: impl Into<String>, target_type: ColumnType, was_not_null: bool) -> Self {
        let column = column.into();
        let staging_column = format!("{column}_staging");
        LobTransferPlan {
            table: table.into(),
            column,
            staging_column,
            target_type,
            was_not_null,
        }
    }

    /// Renders the statements in source order (spec.md §4.7.7/§6-S6):
    /// 1. drop the `NOT NULL` constraint on the target column (if present)
    ///    so it can sit transiently null while the load is in flight;
    /// 2. add the `BYTEA` staging column;
    /// 3. bulk-load placeholder, left to the data-path collaborator
    ///    (emitted as a comment marking where that step runs, loading into
    ///    the staging column, never the target column directly);
    /// 4. copy staged bytes into the target column via the LOB-specific
    ///    conversion, reading from the staging column and writing the
    ///    target column — never the other way around;
    /// 5. restore `NOT NULL` on the target column if it was present
    ///    originally (safe once the load above has filled every row);
    /// 6. drop the staging column.
    pub fn render(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.was_not_null {
            out.push(format!(
                "ALTER TABLE {} ALTER COLUMN {} DROP NOT NULL;",
                self.table, self.column
            ));
        }
        out.push(format!(
            "ALTER TABLE {} ADD COLUMN {} BYTEA;",
            self.table, self.staging_column
        ));
        out.push(format!(
            "-- bulk-load {}.{} into {} here (out-of-core data path)",
            self.table, self.column, self.staging_column
        ));
        out.push(self.conversion_update());
        if self.was_not_null {
            out.push(format!(
                "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL;",
                self.table, self.column
            ));
        }
        out.push(format!(
            "ALTER TABLE {} DROP COLUMN {};",
            self.table, self.staging_column
        ));
        out
    }

    fn conversion_update(&self) -> String {
        match self.target_type {
            ColumnType::Oid => format!(
                "UPDATE {} SET {} = lo_from_bytea(0, {}) WHERE {} IS NOT NULL;",
                self.table, self.column, self.staging_column, self.staging_column
            ),
            ColumnType::Bytea => format!(
                "UPDATE {} SET {} = {} WHERE {} IS NOT NULL;",
                self.table, self.column, self.staging_column, self.staging_column
            ),
            ColumnType::Text | ColumnType::Scalar(_) => format!(
                "UPDATE {} SET {} = {}::text WHERE {} IS NOT NULL;",
                self.table, self.column, self.staging_column, self.staging_column
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_plan_has_six_steps_when_not_null() {
        let plan = LobTransferPlan::new("hr.emp", "photo", ColumnType::Oid, true);
        let steps = plan.render();
        assert_eq!(steps.len(), 6);
        assert!(steps[0].contains("DROP NOT NULL"));
        assert!(steps[steps.len() - 2].contains("SET NOT NULL"));
        assert!(steps.last().unwrap().contains("DROP COLUMN photo_staging"));
    }

    #[test]
    fn nullable_column_skips_not_null_steps() {
        let plan = LobTransferPlan::new("hr.emp", "notes", ColumnType::Text, false);
        let steps = plan.render();
        assert_eq!(steps.len(), 4);
        assert!(!steps.iter().any(|s| s.contains("NOT NULL")));
    }

    #[test]
    fn long_raw_uses_bytea_conversion() {
        let plan = LobTransferPlan::new("hr.emp", "raw_data", ColumnType::Bytea, false);
        let steps = plan.render();
        assert!(steps.iter().any(|s| s.contains("::bytea")));
    }
}
