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

//! [`RoutineSegment`]: the position-delimited description of one routine
//! found by a [`crate::scanner`] pass (spec.md §3, §4.2).

/// The kind of routine a segment describes, spanning both the package-body
/// scanner (`Function`/`Procedure`) and the type-body scanner (the object
/// method variants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutineKind {
    Function,
    Procedure,
    MemberFunction,
    MemberProcedure,
    StaticFunction,
    StaticProcedure,
    MapFunction,
    OrderFunction,
    Constructor,
}

impl RoutineKind {
    pub fn is_function(self) -> bool {
        matches!(
            self,
            RoutineKind::Function
                | RoutineKind::MemberFunction
                | RoutineKind::StaticFunction
                | RoutineKind::MapFunction
                | RoutineKind::OrderFunction
                | RoutineKind::Constructor
        )
    }

    pub fn is_member(self) -> bool {
        matches!(
            self,
            RoutineKind::MemberFunction | RoutineKind::MemberProcedure
        )
    }
}

/// A byte range, in the cleaned source, delimiting exactly one routine.
///
/// Invariant (spec.md §3): `start <= body_start < body_end <= end`, and
/// `end` is one past the terminating `;` of the routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineSegment {
    pub name: String,
    pub kind: RoutineKind,
    pub start: usize,
    pub body_start: usize,
    pub body_end: usize,
    pub end: usize,
}

impl RoutineSegment {
    pub fn check_invariant(&self) -> bool {
        self.start <= self.body_start && self.body_start < self.body_end && self.body_end <= self.end
    }

    /// The full routine text (signature + body) within `src`.
    pub fn full<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }

    /// Just the signature portion (start..body_start), used by the stub
    /// generator.
    pub fn signature<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.body_start]
    }
}
