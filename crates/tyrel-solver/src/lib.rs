//! Structural assignability solver for schema type descriptors.
//!
//! Answers one question: can every value described by `source` be used where
//! `target` is expected? Descriptors are built through a [`TypeInterner`] and
//! compared structurally, the way a structural type system decides
//! `A extends B`.
//!
//! - **Interning**: every descriptor is a `TypeId` handle, so identity is an
//!   integer comparison
//! - **Coinductive cycles**: self-referential descriptors (lazy nodes) are
//!   compared by assuming an in-progress pair holds
//! - **Variance table**: each constructor pair names the variance of its type
//!   parameters in one place (`relations::rules`)
//!
//! ```ignore
//! let db = TypeInterner::new();
//! let name = db.intern_string("name");
//! let user = db.object(vec![PropertyInfo::new(name, TypeId::STRING)]);
//! let empty = db.object(Vec::new());
//! assert!(is_assignable(&db, user, empty));
//! ```

pub mod def;
mod diagnostics;
mod format;
mod intern;
pub mod recursion;
pub mod relation_queries;
mod relations;
mod subtype_rules;
pub mod types;

pub use def::{DefId, DefinitionStore, LazyResolver};
pub use diagnostics::SubtypeFailureReason;
pub use format::TypeFormatter;
pub use intern::{TypeDatabase, TypeInterner};
pub use relation_queries::*;
pub use relations::rules::{ConstructorRule, Variance, constructor_rule};
pub use relations::{SubtypeChecker, SubtypeResult};
pub use subtype_rules::ArityRule;
pub use types::*;
pub use tyrel_common::interner::Atom;

#[cfg(test)]
#[path = "../tests/test_support.rs"]
mod test_support;
#[cfg(test)]
#[path = "../tests/intrinsic_tests.rs"]
mod intrinsic_tests;
#[cfg(test)]
#[path = "../tests/extended_types_tests.rs"]
mod extended_types_tests;
#[cfg(test)]
#[path = "../tests/object_tests.rs"]
mod object_tests;
#[cfg(test)]
#[path = "../tests/tuple_tests.rs"]
mod tuple_tests;
#[cfg(test)]
#[path = "../tests/function_tests.rs"]
mod function_tests;
#[cfg(test)]
#[path = "../tests/union_intersection_tests.rs"]
mod union_intersection_tests;
#[cfg(test)]
#[path = "../tests/branded_tests.rs"]
mod branded_tests;
#[cfg(test)]
#[path = "../tests/recursive_tests.rs"]
mod recursive_tests;
// explain_tests: loaded from relations/explain.rs
#[cfg(test)]
#[path = "../tests/relation_query_tests.rs"]
mod relation_query_tests;
#[cfg(test)]
#[path = "../tests/concurrent_tests.rs"]
mod concurrent_tests;
#[cfg(test)]
#[path = "../tests/type_law_tests.rs"]
mod type_law_tests;
