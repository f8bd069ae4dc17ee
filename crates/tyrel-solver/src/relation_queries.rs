//! Relation query entrypoints.
//!
//! Callers ask relation questions through these functions instead of driving
//! a `SubtypeChecker` themselves. Each query creates a fresh checker, so
//! queries are independent and may run concurrently against one interner.

use crate::TypeDatabase;
use crate::diagnostics::SubtypeFailureReason;
use crate::recursion::RecursionProfile;
use crate::relations::SubtypeChecker;
use crate::types::TypeId;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Relation categories supported by the query API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    /// `source <: target`.
    Assignable,
    /// Mutual assignability: `source <: target` and `target <: source`.
    Identical,
}

bitflags! {
    /// Switches that make the relation stricter than the default.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RelationFlags: u16 {
        /// `any` is only a top type: everything is assignable to it, but it
        /// is assignable only to `any` and `unknown`.
        const STRICT_ANY = 1 << 0;
        /// A tuple without a rest element accepts no extra source items.
        const EXACT_TUPLE_ARITY = 1 << 1;
    }
}

/// Policy knobs for relation checks.
///
/// Deserializes from partial input; missing fields take their defaults:
///
/// ```json
/// { "flags": "EXACT_TUPLE_ARITY", "max_depth": 50 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationPolicy {
    pub flags: RelationFlags,
    /// Maximum nesting of guarded comparisons.
    pub max_depth: u32,
    /// Maximum number of guarded comparisons per query.
    pub max_iterations: u32,
}

impl Default for RelationPolicy {
    fn default() -> Self {
        let profile = RecursionProfile::SubtypeCheck;
        Self {
            flags: RelationFlags::empty(),
            max_depth: profile.max_depth(),
            max_iterations: profile.max_iterations(),
        }
    }
}

impl RelationPolicy {
    pub fn from_flags(flags: RelationFlags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    pub fn with_strict_any(mut self, strict: bool) -> Self {
        self.flags.set(RelationFlags::STRICT_ANY, strict);
        self
    }

    pub fn with_exact_tuple_arity(mut self, exact: bool) -> Self {
        self.flags.set(RelationFlags::EXACT_TUPLE_ARITY, exact);
        self
    }

    pub fn with_limits(mut self, max_depth: u32, max_iterations: u32) -> Self {
        self.max_depth = max_depth;
        self.max_iterations = max_iterations;
        self
    }

    pub fn recursion_profile(&self) -> RecursionProfile {
        RecursionProfile::Custom {
            max_depth: self.max_depth,
            max_iterations: self.max_iterations,
        }
    }
}

/// Result of a relation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelationResult {
    pub kind: RelationKind,
    pub related: bool,
    /// A recursion limit was hit; the comparisons it cut off counted as
    /// not related.
    pub depth_exceeded: bool,
}

impl RelationResult {
    #[inline]
    pub fn is_related(self) -> bool {
        self.related
    }
}

/// Query a relation under an explicit policy.
pub fn query_relation(
    interner: &dyn TypeDatabase,
    source: TypeId,
    target: TypeId,
    kind: RelationKind,
    policy: RelationPolicy,
) -> RelationResult {
    let mut checker = SubtypeChecker::with_policy(interner, &policy);
    let related = match kind {
        RelationKind::Assignable => checker.is_subtype_of(source, target),
        RelationKind::Identical => {
            checker.is_subtype_of(source, target) && checker.is_subtype_of(target, source)
        }
    };
    RelationResult {
        kind,
        related,
        depth_exceeded: checker.depth_exceeded(),
    }
}

/// `source <: target` under the default policy.
pub fn is_assignable(interner: &dyn TypeDatabase, source: TypeId, target: TypeId) -> bool {
    is_assignable_with_policy(interner, source, target, RelationPolicy::default())
}

pub fn is_assignable_with_policy(
    interner: &dyn TypeDatabase,
    source: TypeId,
    target: TypeId,
    policy: RelationPolicy,
) -> bool {
    query_relation(interner, source, target, RelationKind::Assignable, policy).is_related()
}

/// Mutual assignability under the default policy.
pub fn are_types_equivalent(interner: &dyn TypeDatabase, left: TypeId, right: TypeId) -> bool {
    query_relation(
        interner,
        left,
        right,
        RelationKind::Identical,
        RelationPolicy::default(),
    )
    .is_related()
}

/// Why `source` is not assignable to `target`, or `None` if it is.
pub fn explain_assignability(
    interner: &dyn TypeDatabase,
    source: TypeId,
    target: TypeId,
) -> Option<SubtypeFailureReason> {
    explain_assignability_with_policy(interner, source, target, RelationPolicy::default())
}

pub fn explain_assignability_with_policy(
    interner: &dyn TypeDatabase,
    source: TypeId,
    target: TypeId,
    policy: RelationPolicy,
) -> Option<SubtypeFailureReason> {
    SubtypeChecker::with_policy(interner, &policy).explain_failure(source, target)
}
