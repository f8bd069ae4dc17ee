//! Failure explanation.
//!
//! The slow path: only called after a check returned `false`. It follows the
//! same rules as the checker, but stops at the first failing sub-comparison
//! and records where it happened. Every sub-question is still answered by
//! `check_subtype`, so explanation and checking cannot disagree.

use crate::diagnostics::SubtypeFailureReason;
use crate::relations::SubtypeChecker;
use crate::relations::rules::{ConstructorRule, constructor_rule};
use crate::subtype_rules::{ArityRule, SequenceView};
use crate::types::{FunctionShape, IndexSignature, ObjectShape, TupleShape, TypeData, TypeId};
use tyrel_common::interner::Atom;

impl<'a> SubtypeChecker<'a> {
    /// Explain why `source` is not assignable to `target`.
    ///
    /// Returns `None` when the types are assignable after all.
    pub fn explain_failure(
        &mut self,
        source: TypeId,
        target: TypeId,
    ) -> Option<SubtypeFailureReason> {
        if self.check_subtype(source, target).is_true() {
            return None;
        }
        if self.depth_exceeded() {
            return Some(SubtypeFailureReason::RecursionLimitExceeded {
                source_type: source,
                target_type: target,
            });
        }
        Some(self.explain_mismatch(source, target))
    }

    fn explain_mismatch(&mut self, source: TypeId, target: TypeId) -> SubtypeFailureReason {
        if !self.explain_depth.enter() {
            return SubtypeFailureReason::RecursionLimitExceeded {
                source_type: source,
                target_type: target,
            };
        }
        let reason = self.explain_mismatch_inner(source, target);
        self.explain_depth.leave();
        reason
    }

    /// Reason for a failing sub-comparison, `None` when it holds.
    fn explain_nested(
        &mut self,
        source: TypeId,
        target: TypeId,
    ) -> Option<Box<SubtypeFailureReason>> {
        if self.check_subtype(source, target).is_true() {
            None
        } else {
            Some(Box::new(self.explain_mismatch(source, target)))
        }
    }

    fn explain_mismatch_inner(&mut self, source: TypeId, target: TypeId) -> SubtypeFailureReason {
        let mismatch = SubtypeFailureReason::TypeMismatch {
            source_type: source,
            target_type: target,
        };
        let source = self.resolve(source);
        let target = self.resolve(target);
        let (Some(s_data), Some(t_data)) =
            (self.interner.lookup(source), self.interner.lookup(target))
        else {
            return mismatch;
        };

        if let Some(members) = self.union_members(&s_data) {
            for &member in members.iter() {
                if let Some(nested_reason) = self.explain_nested(member, target) {
                    return SubtypeFailureReason::UnionMemberNotAssignable {
                        member,
                        target_type: target,
                        nested_reason,
                    };
                }
            }
            return mismatch;
        }
        if let Some(members) = self.union_members(&t_data) {
            return SubtypeFailureReason::NoUnionMemberMatches {
                source_type: source,
                target_union_members: members.to_vec(),
            };
        }

        if let TypeData::Intersection(list) = t_data {
            for &member in self.interner.type_list(list).iter() {
                if let Some(nested_reason) = self.explain_nested(source, member) {
                    return SubtypeFailureReason::IntersectionMemberMismatch {
                        member,
                        nested_reason,
                    };
                }
            }
            return mismatch;
        }
        if let TypeData::Intersection(_) = s_data {
            return SubtypeFailureReason::NoIntersectionMemberMatches {
                source_type: source,
                target_type: target,
            };
        }

        match (s_data, t_data) {
            (
                TypeData::Branded {
                    base: s_base,
                    brand: s_brand,
                },
                TypeData::Branded {
                    base: t_base,
                    brand: t_brand,
                },
            ) => {
                if s_brand == t_brand {
                    return self.explain_mismatch(s_base, t_base);
                }
                // A stacked brand may still carry the target's brand further down.
                if self.carries_brand(s_base, t_brand) {
                    return self.explain_mismatch(s_base, target);
                }
                return SubtypeFailureReason::BrandMismatch {
                    source_brand: Some(s_brand),
                    target_brand: t_brand,
                };
            }
            (_, TypeData::Branded { brand, .. }) => {
                return SubtypeFailureReason::BrandMismatch {
                    source_brand: None,
                    target_brand: brand,
                };
            }
            (TypeData::Branded { base, .. }, _) => return self.explain_mismatch(base, target),
            _ => {}
        }

        let Some(rule) = constructor_rule(s_data.kind(), t_data.kind()) else {
            return mismatch;
        };
        self.explain_constructor_pair(rule, source, &s_data, target, &t_data)
            .unwrap_or(mismatch)
    }

    fn carries_brand(&self, id: TypeId, brand: Atom) -> bool {
        let mut current = id;
        while let Some(TypeData::Branded { base, brand: b }) = self.interner.lookup(current) {
            if b == brand {
                return true;
            }
            current = base;
        }
        false
    }

    fn explain_constructor_pair(
        &mut self,
        rule: ConstructorRule,
        source: TypeId,
        s_data: &TypeData,
        target: TypeId,
        t_data: &TypeData,
    ) -> Option<SubtypeFailureReason> {
        match (rule, *s_data, *t_data) {
            (ConstructorRule::Array, TypeData::Array(s_elem), TypeData::Array(t_elem))
            | (ConstructorRule::Promise, TypeData::Promise(s_elem), TypeData::Promise(t_elem)) => {
                let nested_reason = self.explain_nested(s_elem, t_elem);
                Some(SubtypeFailureReason::ElementTypeMismatch {
                    source_element: s_elem,
                    target_element: t_elem,
                    nested_reason,
                })
            }
            (ConstructorRule::Set, TypeData::Set(s_elem), TypeData::Set(t_elem)) => {
                Some(SubtypeFailureReason::InvariantParameterMismatch {
                    source_param: s_elem,
                    target_param: t_elem,
                })
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
                let keys_match = self.relate(s_key, t_key, rule.variance_at(0)).is_true();
                let (source_param, target_param) = if keys_match {
                    (s_value, t_value)
                } else {
                    (s_key, t_key)
                };
                Some(SubtypeFailureReason::InvariantParameterMismatch {
                    source_param,
                    target_param,
                })
            }
            (ConstructorRule::Tuple, TypeData::Tuple(s_id), TypeData::Tuple(t_id)) => {
                let s_shape = self.interner.tuple_shape(s_id);
                let t_shape = self.interner.tuple_shape(t_id);
                self.explain_tuple_failure(&s_shape, &t_shape)
            }
            (ConstructorRule::Function, TypeData::Function(s_id), TypeData::Function(t_id)) => {
                let s_shape = self.interner.function_shape(s_id);
                let t_shape = self.interner.function_shape(t_id);
                self.explain_function_failure(&s_shape, &t_shape)
            }
            (ConstructorRule::Object, TypeData::Object(s_id), TypeData::Object(t_id)) => {
                let s_shape = self.interner.object_shape(s_id);
                let t_shape = self.interner.object_shape(t_id);
                self.explain_object_failure(source, &s_shape, target, &t_shape)
            }
            (
                ConstructorRule::ObjectToRecord,
                TypeData::Object(s_id),
                TypeData::Record { key, value },
            ) => {
                let s_shape = self.interner.object_shape(s_id);
                let t_shape = ObjectShape {
                    properties: Vec::new(),
                    index: Some(IndexSignature {
                        key_type: key,
                        value_type: value,
                    }),
                };
                self.explain_object_failure(source, &s_shape, target, &t_shape)
            }
            _ => None,
        }
    }

    fn explain_object_failure(
        &mut self,
        source: TypeId,
        s_shape: &ObjectShape,
        target: TypeId,
        t_shape: &ObjectShape,
    ) -> Option<SubtypeFailureReason> {
        for t_prop in &t_shape.properties {
            match s_shape.property(t_prop.name) {
                None if !t_prop.optional => {
                    return Some(SubtypeFailureReason::MissingProperty {
                        property_name: t_prop.name,
                        source_type: source,
                        target_type: target,
                    });
                }
                None => {}
                Some(s_prop) => {
                    if !t_prop.optional && !s_prop.is_always_present() {
                        return Some(SubtypeFailureReason::OptionalPropertyRequired {
                            property_name: t_prop.name,
                        });
                    }
                    if let Some(nested) = self.explain_nested(s_prop.type_id, t_prop.type_id) {
                        return Some(SubtypeFailureReason::PropertyTypeMismatch {
                            property_name: t_prop.name,
                            source_property_type: s_prop.type_id,
                            target_property_type: t_prop.type_id,
                            nested_reason: Some(nested),
                        });
                    }
                }
            }
        }

        let t_index = t_shape.index?;
        for s_prop in &s_shape.properties {
            if self.key_admits(t_index.key_type, s_prop.name)
                && self
                    .check_subtype(s_prop.type_id, t_index.value_type)
                    .is_false()
            {
                return Some(SubtypeFailureReason::IndexSignatureMismatch {
                    property_name: Some(s_prop.name),
                    source_value_type: s_prop.type_id,
                    target_value_type: t_index.value_type,
                });
            }
        }
        if let Some(s_index) = s_shape.index {
            if self
                .check_subtype(s_index.value_type, t_index.value_type)
                .is_false()
            {
                return Some(SubtypeFailureReason::IndexSignatureMismatch {
                    property_name: None,
                    source_value_type: s_index.value_type,
                    target_value_type: t_index.value_type,
                });
            }
        }
        None
    }

    fn explain_tuple_failure(
        &mut self,
        s_shape: &TupleShape,
        t_shape: &TupleShape,
    ) -> Option<SubtypeFailureReason> {
        let source = SequenceView::new(&s_shape.items, s_shape.rest);
        let target = SequenceView::new(&t_shape.items, t_shape.rest);
        if !self.sequence_arity_matches(source, target, ArityRule::AtLeast) {
            return Some(SubtypeFailureReason::TupleArityMismatch {
                source_count: s_shape.items.len(),
                target_count: t_shape.items.len(),
            });
        }

        let rest_positions = t_shape
            .rest
            .map(|t_rest| {
                s_shape.items[t_shape.items.len()..]
                    .iter()
                    .chain(s_shape.rest.iter())
                    .map(move |&s_elem| (s_elem, t_rest))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let pairs = s_shape
            .items
            .iter()
            .copied()
            .zip(t_shape.items.iter().copied())
            .chain(rest_positions);

        for (index, (s_elem, t_elem)) in pairs.enumerate() {
            if let Some(nested) = self.explain_nested(s_elem, t_elem) {
                return Some(SubtypeFailureReason::TupleElementMismatch {
                    index,
                    source_element: s_elem,
                    target_element: t_elem,
                    nested_reason: Some(nested),
                });
            }
        }
        None
    }

    fn explain_function_failure(
        &mut self,
        s_shape: &FunctionShape,
        t_shape: &FunctionShape,
    ) -> Option<SubtypeFailureReason> {
        if s_shape.params.len() != t_shape.params.len() {
            return Some(SubtypeFailureReason::ParameterCountMismatch {
                source_count: s_shape.params.len(),
                target_count: t_shape.params.len(),
            });
        }

        let rest_pair = match (t_shape.rest, s_shape.rest) {
            (Some(t_rest), Some(s_rest)) => Some((s_rest, t_rest)),
            _ => None,
        };
        let pairs = s_shape
            .params
            .iter()
            .copied()
            .zip(t_shape.params.iter().copied())
            .chain(rest_pair);
        for (param_index, (source_param, target_param)) in pairs.enumerate() {
            if self.check_subtype(target_param, source_param).is_false() {
                return Some(SubtypeFailureReason::ParameterTypeMismatch {
                    param_index,
                    source_param,
                    target_param,
                });
            }
        }

        let nested_reason = self.explain_nested(s_shape.return_type, t_shape.return_type)?;
        Some(SubtypeFailureReason::ReturnTypeMismatch {
            source_return: s_shape.return_type,
            target_return: t_shape.return_type,
            nested_reason: Some(nested_reason),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/explain_tests.rs"]
mod tests;
