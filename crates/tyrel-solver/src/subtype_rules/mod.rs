//! Per-shape assignability rules.
//!
//! Each file extends [`SubtypeChecker`](crate::SubtypeChecker) with the rules
//! for one family of descriptors. Dispatch lives in `relations::subtype`.

mod brands;
mod functions;
mod intrinsics;
mod objects;
mod structural;
mod tuples;
mod unions;

pub use structural::ArityRule;
pub(crate) use objects::canonical_numeric_key;
pub(crate) use structural::SequenceView;
