//! Assignability checking.
//!
//! `SubtypeChecker` decides `source <: target` for two interned descriptors.
//! Rules are tried in a fixed order and the first rule that applies decides:
//!
//! 1. anything `<:` unknown, never `<:` anything
//! 2. `any` on either side (only as a target under `STRICT_ANY`)
//! 3. identical handles, then intrinsic and literal pairs (these never
//!    recurse, so they are settled without touching the guard)
//! 4. lazy nodes are resolved, then the pair is checked again under the guard
//! 5. intrinsic pairs (`NaN <: number`, `undefined <: void`, `Date` only to itself)
//! 6. source union / enumeration: every member
//! 7. target union / enumeration: some member (plus the boolean expansion);
//!    an intersection source may still match through one of its members
//! 8. target intersection: every member
//! 9. source intersection: some member, then merged object members
//! 10. branded types
//! 11. the constructor-pair table in [`rules`](super::rules)
//!
//! Lazy resolution runs before the distributive rules so that a lazy node
//! standing for a union is split like any other union.
//!
//! ## Cycles
//!
//! Each guarded comparison puts its `(source, target)` pair on the active
//! path. Meeting a pair that is already on the path assumes it holds
//! (coinduction), which is how two structurally equal recursive descriptors
//! relate. Results are memoized per checker; `true` results are only cached
//! once every cycle assumption they relied on has been discharged.

use crate::TypeDatabase;
use crate::recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
use crate::relation_queries::{RelationFlags, RelationPolicy};
use crate::relations::rules::{ConstructorRule, constructor_rule};
use crate::types::{TypeData, TypeId};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, trace};
use tyrel_common::limits::{STACK_GROWTH_SIZE, STACK_RED_ZONE};

/// Outcome of one guarded comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubtypeResult {
    True,
    False,
    /// The pair was already being compared further up; assumed to hold.
    CycleDetected,
    /// A recursion limit was hit; treated as not related.
    DepthExceeded,
}

impl SubtypeResult {
    #[inline]
    pub fn is_true(self) -> bool {
        matches!(self, Self::True | Self::CycleDetected)
    }

    #[inline]
    pub fn is_false(self) -> bool {
        !self.is_true()
    }

    #[inline]
    pub(crate) fn from_bool(related: bool) -> Self {
        if related { Self::True } else { Self::False }
    }
}

type PairKey = (TypeId, TypeId);

/// Structural assignability checker.
///
/// A checker owns its cycle guard and result cache, so it is cheap to create
/// one per query; the interner it reads from may be shared across threads.
pub struct SubtypeChecker<'a> {
    pub(crate) interner: &'a dyn TypeDatabase,
    pub(crate) flags: RelationFlags,
    guard: RecursionGuard<PairKey>,
    /// Depth at which each pair on the active path was entered.
    path_depth: FxHashMap<PairKey, u32>,
    /// Shallowest active-path depth that a cycle assumption taken inside the
    /// current comparison refers to (`u32::MAX` when none).
    shallowest_assumption: u32,
    cache: FxHashMap<PairKey, bool>,
    pub(crate) explain_depth: DepthCounter,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(interner: &'a dyn TypeDatabase) -> Self {
        Self::with_policy(interner, &RelationPolicy::default())
    }

    pub fn with_policy(interner: &'a dyn TypeDatabase, policy: &RelationPolicy) -> Self {
        Self {
            interner,
            flags: policy.flags,
            guard: RecursionGuard::with_profile(policy.recursion_profile()),
            path_depth: FxHashMap::default(),
            shallowest_assumption: u32::MAX,
            cache: FxHashMap::default(),
            explain_depth: DepthCounter::with_profile(RecursionProfile::Explain),
        }
    }

    /// `source <: target`.
    pub fn is_subtype_of(&mut self, source: TypeId, target: TypeId) -> bool {
        self.check_subtype(source, target).is_true()
    }

    /// Whether any comparison made by this checker hit a recursion limit.
    pub fn depth_exceeded(&self) -> bool {
        self.guard.is_exceeded()
    }

    /// Guarded comparison of one pair.
    pub fn check_subtype(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        if target == TypeId::UNKNOWN || source == TypeId::NEVER {
            return SubtypeResult::True;
        }
        if target == TypeId::ANY {
            return SubtypeResult::True;
        }
        if source == TypeId::ANY && !self.flags.contains(RelationFlags::STRICT_ANY) {
            return SubtypeResult::True;
        }
        if source == target {
            return SubtypeResult::True;
        }
        if let Some(related) = self.check_leaf_pair(source, target) {
            return SubtypeResult::from_bool(related);
        }

        let key = (source, target);
        if let Some(&related) = self.cache.get(&key) {
            return SubtypeResult::from_bool(related);
        }

        match self.guard.enter(key) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                let depth = self.path_depth.get(&key).copied().unwrap_or(0);
                self.shallowest_assumption = self.shallowest_assumption.min(depth);
                trace!(source = source.0, target = target.0, "cycle: assuming related");
                return SubtypeResult::CycleDetected;
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                debug!(
                    source = source.0,
                    target = target.0,
                    depth = self.guard.depth(),
                    iterations = self.guard.iterations(),
                    "recursion limit exceeded, treating pair as unrelated"
                );
                return SubtypeResult::DepthExceeded;
            }
        }

        let depth = self.guard.depth();
        self.path_depth.insert(key, depth);
        let outer_assumption = std::mem::replace(&mut self.shallowest_assumption, u32::MAX);

        trace!(source = source.0, target = target.0, depth, "check_subtype");
        let mut result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH_SIZE, || {
            self.check_subtype_inner(source, target)
        });

        self.path_depth.remove(&key);
        self.guard.leave(key);

        // Assumptions on this pair or deeper ones are discharged now.
        let inner_assumption = self.shallowest_assumption;
        let self_contained = inner_assumption >= depth;
        if self_contained && result == SubtypeResult::CycleDetected {
            result = SubtypeResult::True;
        }
        match result {
            SubtypeResult::False => {
                self.cache.insert(key, false);
            }
            SubtypeResult::True if self_contained => {
                self.cache.insert(key, true);
            }
            _ => {}
        }
        self.shallowest_assumption = if self_contained {
            outer_assumption
        } else {
            outer_assumption.min(inner_assumption)
        };
        result
    }

    fn check_subtype_inner(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        let (Some(s_data), Some(t_data)) =
            (self.interner.lookup(source), self.interner.lookup(target))
        else {
            return SubtypeResult::False;
        };

        if matches!(s_data, TypeData::Lazy(_)) || matches!(t_data, TypeData::Lazy(_)) {
            let source = self.resolve(source);
            let target = self.resolve(target);
            return self.check_subtype(source, target);
        }

        if let (TypeData::Intrinsic(s_kind), TypeData::Intrinsic(t_kind)) = (s_data, t_data) {
            return SubtypeResult::from_bool(self.check_intrinsic_subtype(s_kind, t_kind));
        }

        if let Some(members) = self.union_members(&s_data) {
            return self.check_union_source_subtype(&members, target);
        }
        if let Some(members) = self.union_members(&t_data) {
            let result = self.check_union_target_subtype(source, &members);
            // `(A | B) & C <: A | B` holds through a member, not through any
            // single member of the target.
            let TypeData::Intersection(list) = s_data else {
                return result;
            };
            if result.is_true() {
                return result;
            }
            let s_members = self.interner.type_list(list);
            return match self.check_intersection_source_subtype(&s_members, target, &t_data) {
                SubtypeResult::False => result,
                other => other,
            };
        }

        if let TypeData::Intersection(list) = t_data {
            let members = self.interner.type_list(list);
            return self.check_intersection_target_subtype(source, &members);
        }
        if let TypeData::Intersection(list) = s_data {
            let members = self.interner.type_list(list);
            return self.check_intersection_source_subtype(&members, target, &t_data);
        }

        if matches!(s_data, TypeData::Branded { .. }) || matches!(t_data, TypeData::Branded { .. })
        {
            return self.check_branded_subtype(&s_data, target, &t_data);
        }

        match constructor_rule(s_data.kind(), t_data.kind()) {
            Some(rule) => self.check_constructor_pair(rule, &s_data, &t_data),
            None => {
                trace!(
                    source = source.0,
                    target = target.0,
                    source_kind = ?s_data.kind(),
                    target_kind = ?t_data.kind(),
                    "no rule for constructor pair"
                );
                SubtypeResult::False
            }
        }
    }

    fn check_constructor_pair(
        &mut self,
        rule: ConstructorRule,
        s_data: &TypeData,
        t_data: &TypeData,
    ) -> SubtypeResult {
        match (rule, *s_data, *t_data) {
            (ConstructorRule::LiteralToPrimitive, TypeData::Literal(value), TypeData::Intrinsic(kind)) => {
                SubtypeResult::from_bool(self.check_literal_to_intrinsic(&value, kind))
            }
            (ConstructorRule::Array, TypeData::Array(s_elem), TypeData::Array(t_elem)) => {
                self.relate(s_elem, t_elem, rule.variance_at(0))
            }
            (ConstructorRule::Tuple, TypeData::Tuple(s_id), TypeData::Tuple(t_id)) => {
                let source = self.interner.tuple_shape(s_id);
                let target = self.interner.tuple_shape(t_id);
                self.check_tuple_subtype(&source, &target, rule.variance_at(0))
            }
            (ConstructorRule::TupleToArray, TypeData::Tuple(s_id), TypeData::Array(t_elem)) => {
                let source = self.interner.tuple_shape(s_id);
                self.check_tuple_to_array_subtype(&source, t_elem, rule.variance_at(0))
            }
            (ConstructorRule::ArrayToTuple, TypeData::Array(s_elem), TypeData::Tuple(t_id)) => {
                let target = self.interner.tuple_shape(t_id);
                self.check_array_to_tuple_subtype(s_elem, &target, rule.variance_at(0))
            }
            (ConstructorRule::Object, TypeData::Object(s_id), TypeData::Object(t_id)) => {
                let source = self.interner.object_shape(s_id);
                let target = self.interner.object_shape(t_id);
                self.check_object_subtype(&source, &target)
            }
            (
                ConstructorRule::ObjectToRecord,
                TypeData::Object(s_id),
                TypeData::Record { key, value },
            ) => {
                let source = self.interner.object_shape(s_id);
                self.check_object_to_record_subtype(&source, key, value)
            }
            (
                ConstructorRule::RecordToObject,
                TypeData::Record { key, value },
                TypeData::Object(t_id),
            ) => {
                let target = self.interner.object_shape(t_id);
                self.check_record_to_object_subtype(key, value, &target)
            }
            (
                ConstructorRule::Record,
                TypeData::Record {
                    key: s_key,
                    value: s_value,
                },
                TypeData::Record {
                    key: t_key,
                    value: t_value,
                },
            ) => self.check_record_subtype(s_key, s_value, t_key, t_value, rule.variance_at(0)),
            (ConstructorRule::Promise, TypeData::Promise(s_inner), TypeData::Promise(t_inner)) => {
                self.relate(s_inner, t_inner, rule.variance_at(0))
            }
            (ConstructorRule::Set, TypeData::Set(s_elem), TypeData::Set(t_elem)) => {
                self.relate(s_elem, t_elem, rule.variance_at(0))
            }
            (
                ConstructorRule::Map,
                TypeData::Map {
                    key: s_key,
                    value: s_value,
                },
                TypeData::Map {
                    key: t_key,
                    value: t_value,
                },
            ) => {
                let keys = self.relate(s_key, t_key, rule.variance_at(0));
                if !keys.is_true() {
                    return keys;
                }
                self.relate(s_value, t_value, rule.variance_at(1))
            }
            (ConstructorRule::Function, TypeData::Function(s_id), TypeData::Function(t_id)) => {
                let source = self.interner.function_shape(s_id);
                let target = self.interner.function_shape(t_id);
                self.check_function_subtype(&source, &target, rule)
            }
            _ => SubtypeResult::False,
        }
    }

    /// Follow a lazy handle to its shape; unresolvable lazies are `never`.
    pub(crate) fn resolve(&self, id: TypeId) -> TypeId {
        match self.interner.lookup(id) {
            Some(TypeData::Lazy(def_id)) => self
                .interner
                .resolve_lazy(def_id)
                .unwrap_or(TypeId::NEVER),
            _ => id,
        }
    }

    /// Members of a union, or the literals of an enumeration.
    pub(crate) fn union_members(&self, data: &TypeData) -> Option<Arc<[TypeId]>> {
        match *data {
            TypeData::Union(list) | TypeData::Enum(list) => Some(self.interner.type_list(list)),
            _ => None,
        }
    }
}
