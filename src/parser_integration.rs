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

//! The swappable grammar boundary named in SPEC_FULL.md §4.6: every caller
//! in this crate reaches the grammar through `parser_integration::parse`,
//! not through `crate::parser` directly, so a future full-grammar crate can
//! replace `crate::parser`'s recursive-descent implementation behind this
//! one re-export without the visitor pipeline noticing.

pub use crate::parser::{parse, ParseInput, ParseOutput};
