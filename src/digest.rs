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

//! Deterministic parameter-type digests, used everywhere overload identity
//! matters: `RoutineRecord`'s method key (spec.md §3), `TypeMethodSig`
//! lookup, and the `typename__methodname[_argdigest]` emission convention
//! (spec.md §6). Deterministic on the declared parameter *types* only (not
//! names or modes) so two routines with the same name and the same
//! parameter type list collide exactly when Oracle would consider them the
//! same overload-resolution candidate shape.
//!
//! spec.md §9: "Overloading identity... uses a deterministic
//! parameter-type digest, to avoid collisions without relying on identity
//! of any source-language method object."

/// Computes a short, stable digest string for a parameter type list.
///
/// Deliberately not a cryptographic hash: the digest must be reproducible
/// across runs and readable enough to appear in generated PostgreSQL
/// function names (`employee_type__new_2a7f`), so a simple FNV-1a fold
/// truncated to 4 hex nibbles is used rather than pulling in a hashing
/// crate for a name-mangling concern.
pub fn param_type_digest(param_types: &[impl AsRef<str>]) -> String {
    let mut hash: u64 = 0xcbf29ce484222325; // FNV offset basis
    for ty in param_types {
        for byte in ty.as_ref().to_uppercase().bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x100000001b3); // FNV prime
        }
        // separator byte so ["AB", "C"] and ["A", "BC"] don't collide
        hash ^= 0x1f;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    format!("{:04x}", hash & 0xffff)
}

/// Builds the `name + '_' + digest` method key stored in `RoutineRecord`.
pub fn method_key(name: &str, param_types: &[impl AsRef<str>]) -> String {
    format!("{}_{}", name.to_uppercase(), param_type_digest(param_types))
}
