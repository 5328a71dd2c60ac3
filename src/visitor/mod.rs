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

//! The rewrite pipeline (spec.md §4.7): an `Expr` visitor (`expr`), its two
//! specialized rewrites (`object_access`, `methods`), a DML visitor (`dml`),
//! and a statement visitor (`stmt`) that drives all of them plus the
//! cursor/exception/declare bookkeeping spec.md §4.7.3-§4.7.4 need.

pub mod dml;
pub mod expr;
pub mod methods;
pub mod object_access;
pub mod stmt;

pub use expr::{render_expr, LocalTypes};
pub use methods::MethodRenderCtx;
pub use stmt::render_block;
