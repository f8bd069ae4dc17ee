//! Union, enumeration and intersection rules.
//!
//! - Source union (`A | B <: T`): every member must be assignable
//! - Target union (`S <: A | B`): some member must accept the source
//! - Target intersection (`S <: A & B`): every member must accept the source
//! - Source intersection (`A & B <: T`): some member must be assignable
//!
//! Enumerations take the union paths with their literal members.

use crate::relations::{SubtypeChecker, SubtypeResult};
use crate::types::{ObjectShape, TypeData, TypeId};
use smallvec::SmallVec;
use std::sync::Arc;

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_union_source_subtype(
        &mut self,
        members: &[TypeId],
        target: TypeId,
    ) -> SubtypeResult {
        for &member in members {
            let result = self.check_subtype(member, target);
            if !result.is_true() {
                return result;
            }
        }
        SubtypeResult::True
    }

    pub(crate) fn check_union_target_subtype(
        &mut self,
        source: TypeId,
        members: &[TypeId],
    ) -> SubtypeResult {
        // Enumeration lists keep declaration order, so membership is a scan.
        if members.contains(&source) {
            return SubtypeResult::True;
        }
        if let Some(TypeData::Literal(value)) = self.interner.lookup(source) {
            if members.contains(&value.primitive())
                || (value.is_nan() && members.contains(&TypeId::NAN))
            {
                return SubtypeResult::True;
            }
        }

        let mut exceeded = false;
        for &member in members {
            match self.check_subtype(source, member) {
                result if result.is_true() => return SubtypeResult::True,
                SubtypeResult::DepthExceeded => exceeded = true,
                _ => {}
            }
        }

        // boolean is exactly `true | false`
        if source == TypeId::BOOLEAN {
            let covers = |value: bool| members.iter().any(|&m| self.is_boolean_literal(m, value));
            if covers(true) && covers(false) {
                return SubtypeResult::True;
            }
        }

        if exceeded {
            SubtypeResult::DepthExceeded
        } else {
            SubtypeResult::False
        }
    }

    pub(crate) fn check_intersection_target_subtype(
        &mut self,
        source: TypeId,
        members: &[TypeId],
    ) -> SubtypeResult {
        for &member in members {
            let result = self.check_subtype(source, member);
            if !result.is_true() {
                return result;
            }
        }
        SubtypeResult::True
    }

    /// Some member alone must be assignable. When that fails and every member
    /// is an object, the members are compared field by field as one merged
    /// object, so `{ a } & { b } <: { a, b }` holds.
    pub(crate) fn check_intersection_source_subtype(
        &mut self,
        members: &[TypeId],
        target: TypeId,
        t_data: &TypeData,
    ) -> SubtypeResult {
        let mut exceeded = false;
        for &member in members {
            match self.check_subtype(member, target) {
                result if result.is_true() => return SubtypeResult::True,
                SubtypeResult::DepthExceeded => exceeded = true,
                _ => {}
            }
        }

        if let TypeData::Object(t_id) = *t_data {
            if let Some(shapes) = self.object_members(members) {
                let target_shape = self.interner.object_shape(t_id);
                let merged = self.check_merged_objects_subtype(&shapes, &target_shape);
                if merged.is_true() || merged == SubtypeResult::DepthExceeded {
                    return merged;
                }
            }
        }

        if exceeded {
            SubtypeResult::DepthExceeded
        } else {
            SubtypeResult::False
        }
    }

    /// Object shapes of all members (lazies resolved), or `None` if any member
    /// is not an object.
    fn object_members(&self, members: &[TypeId]) -> Option<SmallVec<[Arc<ObjectShape>; 4]>> {
        members
            .iter()
            .map(|&member| match self.interner.lookup(self.resolve(member)) {
                Some(TypeData::Object(id)) => Some(self.interner.object_shape(id)),
                _ => None,
            })
            .collect()
    }

    fn check_merged_objects_subtype(
        &mut self,
        members: &[Arc<ObjectShape>],
        target: &ObjectShape,
    ) -> SubtypeResult {
        for t_prop in &target.properties {
            let found: SmallVec<[_; 4]> = members
                .iter()
                .filter_map(|shape| shape.property(t_prop.name).copied())
                .collect();
            if found.is_empty() {
                if t_prop.optional {
                    continue;
                }
                return SubtypeResult::False;
            }
            if !t_prop.optional && !found.iter().any(|p| p.is_always_present()) {
                return SubtypeResult::False;
            }
            // The merged field has the intersection of the member field types.
            let mut field = SubtypeResult::False;
            for s_prop in &found {
                match self.check_subtype(s_prop.type_id, t_prop.type_id) {
                    result if result.is_true() => {
                        field = result;
                        break;
                    }
                    SubtypeResult::DepthExceeded => field = SubtypeResult::DepthExceeded,
                    _ => {}
                }
            }
            if !field.is_true() {
                return field;
            }
        }

        if let Some(t_index) = target.index {
            for shape in members {
                let result = self.check_index_signature_target(shape, t_index);
                if !result.is_true() {
                    return result;
                }
            }
        }
        SubtypeResult::True
    }
}
