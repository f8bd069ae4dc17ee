//! Variance-parameterized comparison shared by every compound rule.
//!
//! `relate` compares one pair of type parameters in the direction a variance
//! asks for. `relate_sequences` does the same for positional sequences
//! (tuple items, function parameters), where trailing rest elements fold in as
//! the bound for every further position.

use crate::relation_queries::RelationFlags;
use crate::relations::rules::Variance;
use crate::relations::{SubtypeChecker, SubtypeResult};
use crate::types::TypeId;

/// How the fixed lengths of two sequences must relate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArityRule {
    /// The providing side has at least as many fixed items (tuples).
    AtLeast,
    /// Both sides have the same number of fixed items (function parameters).
    Exact,
}

/// Borrowed view of a positional sequence with an optional rest element.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SequenceView<'s> {
    pub items: &'s [TypeId],
    pub rest: Option<TypeId>,
}

impl<'s> SequenceView<'s> {
    pub fn new(items: &'s [TypeId], rest: Option<TypeId>) -> Self {
        Self { items, rest }
    }
}

impl<'a> SubtypeChecker<'a> {
    /// Compare two type parameters with the given variance.
    ///
    /// Invariance is mutual assignability.
    pub(crate) fn relate(
        &mut self,
        source: TypeId,
        target: TypeId,
        variance: Variance,
    ) -> SubtypeResult {
        match variance {
            Variance::Covariant => self.check_subtype(source, target),
            Variance::Contravariant => self.check_subtype(target, source),
            Variance::Invariant => {
                let forward = self.check_subtype(source, target);
                if !forward.is_true() {
                    return forward;
                }
                self.check_subtype(target, source)
            }
        }
    }

    /// Compare two positional sequences with the given variance.
    ///
    /// For a contravariant comparison the target sequence provides the values
    /// and the source consumes them, so the roles (and the arity check) are
    /// swapped.
    pub(crate) fn relate_sequences(
        &mut self,
        source: SequenceView<'_>,
        target: SequenceView<'_>,
        variance: Variance,
        arity: ArityRule,
    ) -> SubtypeResult {
        match variance {
            Variance::Covariant => self.check_sequence(source, target, arity),
            Variance::Contravariant => self.check_sequence(target, source, arity),
            Variance::Invariant => {
                let forward = self.check_sequence(source, target, arity);
                if !forward.is_true() {
                    return forward;
                }
                self.check_sequence(target, source, arity)
            }
        }
    }

    /// Covariant sequence comparison: values of `source` flow into `target`.
    fn check_sequence(
        &mut self,
        source: SequenceView<'_>,
        target: SequenceView<'_>,
        arity: ArityRule,
    ) -> SubtypeResult {
        if !self.sequence_arity_matches(source, target, arity) {
            return SubtypeResult::False;
        }

        for (&s_item, &t_item) in source.items.iter().zip(target.items) {
            let result = self.check_subtype(s_item, t_item);
            if !result.is_true() {
                return result;
            }
        }

        // Without a target rest, surplus source positions are never read.
        let Some(t_rest) = target.rest else {
            return SubtypeResult::True;
        };
        for &extra in &source.items[target.items.len()..] {
            let result = self.check_subtype(extra, t_rest);
            if !result.is_true() {
                return result;
            }
        }
        if let Some(s_rest) = source.rest {
            return self.check_subtype(s_rest, t_rest);
        }
        SubtypeResult::True
    }

    pub(crate) fn sequence_arity_matches(
        &self,
        source: SequenceView<'_>,
        target: SequenceView<'_>,
        arity: ArityRule,
    ) -> bool {
        let (s_len, t_len) = (source.items.len(), target.items.len());
        match arity {
            ArityRule::Exact => s_len == t_len,
            ArityRule::AtLeast => {
                if s_len < t_len {
                    return false;
                }
                let has_surplus = s_len > t_len || source.rest.is_some();
                !(self.flags.contains(RelationFlags::EXACT_TUPLE_ARITY)
                    && target.rest.is_none()
                    && has_surplus)
            }
        }
    }
}
