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

//! Representative package bodies for profiling the cleaner/scanner/parser/
//! visitor pipeline end to end, grouped the way a migration batch would see
//! them: one cursor-heavy package, one DML-heavy package, one exception-
//! heavy package.

pub mod cursors;
pub mod dml;
pub mod exceptions;

/// A named compilation unit: `(schema, package, source)`.
pub type Unit = (&'static str, &'static str, &'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSet {
    Cursors,
    Dml,
    Exceptions,
    All,
}

impl SampleSet {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cursors" => Some(Self::Cursors),
            "dml" => Some(Self::Dml),
            "exceptions" => Some(Self::Exceptions),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

pub fn get_units(set: SampleSet) -> Vec<Unit> {
    match set {
        SampleSet::Cursors => vec![cursors::EMP_CURSOR_PKG],
        SampleSet::Dml => vec![dml::EMP_DML_PKG],
        SampleSet::Exceptions => vec![exceptions::EMP_EXC_PKG],
        SampleSet::All => vec![cursors::EMP_CURSOR_PKG, dml::EMP_DML_PKG, exceptions::EMP_EXC_PKG],
    }
}
