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

//! Per-migration configuration. Built programmatically by the host; there
//! is no on-disk config format in scope (the CLI that would parse one is an
//! out-of-core collaborator, spec.md §1).

use crate::metadata::types::ColumnType;

/// LOB type mapping policy (spec.md §3's "LOB policy"). Carried as
/// configuration rather than a hardcoded match so a host can special-case a
/// table without forking the crate, while the defaults reproduce §3 and §8
/// property 7 exactly.
#[derive(Debug, Clone)]
pub struct LobPolicy {
    pub blob: ColumnType,
    pub clob: ColumnType,
    pub nclob: ColumnType,
    pub bfile: ColumnType,
    pub long: ColumnType,
    pub long_raw: ColumnType,
}

impl Default for LobPolicy {
    fn default() -> Self {
        LobPolicy {
            blob: ColumnType::Oid,
            clob: ColumnType::Oid,
            nclob: ColumnType::Oid,
            bfile: ColumnType::Text,
            long: ColumnType::Text,
            long_raw: ColumnType::Bytea,
        }
    }
}

/// Per-migration configuration (SPEC_FULL.md §3 ambient "TransformConfig").
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// The schema under transformation; used by `qualify_type_name` and by
    /// bare-table schema qualification (spec.md §4.7.1).
    pub current_schema: String,
    /// Schema owning the Oracle-compatibility polyfills (spec.md §6),
    /// e.g. `oracle_compat.dbms_output__put_line`.
    pub oracle_compat_schema: String,
    pub lob_policy: LobPolicy,
}

impl TransformConfig {
    pub fn new(current_schema: impl Into<String>) -> Self {
        TransformConfig {
            current_schema: current_schema.into().to_uppercase(),
            oracle_compat_schema: "oracle_compat".to_string(),
            lob_policy: LobPolicy::default(),
        }
    }
}
