//! Function rules.
//!
//! `(P) => R <: (P') => R'` when the parameters are contravariant
//! (`P' <: P`, compared as sequences with the same fixed arity) and the return
//! type is covariant (`R <: R'`). Both variances come from the constructor
//! table.

use crate::relations::rules::ConstructorRule;
use crate::relations::{SubtypeChecker, SubtypeResult};
use crate::subtype_rules::{ArityRule, SequenceView};
use crate::types::FunctionShape;

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_function_subtype(
        &mut self,
        source: &FunctionShape,
        target: &FunctionShape,
        rule: ConstructorRule,
    ) -> SubtypeResult {
        let params = self.relate_sequences(
            SequenceView::new(&source.params, source.rest),
            SequenceView::new(&target.params, target.rest),
            rule.variance_at(0),
            ArityRule::Exact,
        );
        if !params.is_true() {
            return params;
        }
        self.relate(source.return_type, target.return_type, rule.variance_at(1))
    }
}
