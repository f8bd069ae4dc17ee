//! Tuple and array rules.
//!
//! - `[A, B] <: [A', B']`: positional, source at least as long as the target
//! - `[A, B, ...R] <: T[]`: every item and the rest fit `T`
//! - `T[] <: [...R]`: only a tuple with no fixed items can accept an array

use crate::relations::rules::Variance;
use crate::relations::{SubtypeChecker, SubtypeResult};
use crate::subtype_rules::{ArityRule, SequenceView};
use crate::types::{TupleShape, TypeId};

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_tuple_subtype(
        &mut self,
        source: &TupleShape,
        target: &TupleShape,
        variance: Variance,
    ) -> SubtypeResult {
        self.relate_sequences(
            SequenceView::new(&source.items, source.rest),
            SequenceView::new(&target.items, target.rest),
            variance,
            ArityRule::AtLeast,
        )
    }

    pub(crate) fn check_tuple_to_array_subtype(
        &mut self,
        source: &TupleShape,
        t_elem: TypeId,
        variance: Variance,
    ) -> SubtypeResult {
        for &item in source.items.iter().chain(source.rest.iter()) {
            let result = self.relate(item, t_elem, variance);
            if !result.is_true() {
                return result;
            }
        }
        SubtypeResult::True
    }

    pub(crate) fn check_array_to_tuple_subtype(
        &mut self,
        s_elem: TypeId,
        target: &TupleShape,
        variance: Variance,
    ) -> SubtypeResult {
        // An array may be empty, so no fixed position is guaranteed.
        match target.rest {
            Some(t_rest) if target.items.is_empty() => self.relate(s_elem, t_rest, variance),
            _ => SubtypeResult::False,
        }
    }
}
