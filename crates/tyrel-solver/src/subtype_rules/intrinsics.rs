//! Intrinsic and literal rules.
//!
//! Top, bottom, `any` and identity are settled before these rules run, so
//! only genuinely different primitive pairs reach `check_intrinsic_subtype`.

use crate::relations::SubtypeChecker;
use crate::types::{IntrinsicKind, LiteralValue, TypeData, TypeId};

impl<'a> SubtypeChecker<'a> {
    /// Pairs built only from intrinsics and literals never recurse, so they
    /// are decided here without entering the cycle guard. `None` for any
    /// other pair.
    pub(crate) fn check_leaf_pair(&self, source: TypeId, target: TypeId) -> Option<bool> {
        let s_data = self.interner.lookup(source)?;
        let t_data = self.interner.lookup(target)?;
        match (s_data, t_data) {
            (TypeData::Intrinsic(s_kind), TypeData::Intrinsic(t_kind)) => {
                Some(self.check_intrinsic_subtype(s_kind, t_kind))
            }
            (TypeData::Literal(value), TypeData::Intrinsic(kind)) => {
                Some(self.check_literal_to_intrinsic(&value, kind))
            }
            // Literals are interned, so distinct handles are distinct values.
            (TypeData::Intrinsic(_) | TypeData::Literal(_), TypeData::Literal(_)) => Some(false),
            _ => None,
        }
    }

    /// Different intrinsics relate only in the widening directions below.
    pub(crate) fn check_intrinsic_subtype(
        &self,
        source: IntrinsicKind,
        target: IntrinsicKind,
    ) -> bool {
        use IntrinsicKind::*;
        match (source, target) {
            (NaN, Number) => true,
            (Undefined, Void) => true,
            _ => source == target,
        }
    }

    /// A literal widens to its primitive. A NaN number literal also fits `NaN`.
    pub(crate) fn check_literal_to_intrinsic(
        &self,
        value: &LiteralValue,
        target: IntrinsicKind,
    ) -> bool {
        let target = target.type_id();
        if value.primitive() == target {
            return true;
        }
        value.is_nan() && target == TypeId::NAN
    }

    /// Whether `member` is the boolean literal `value`, directly or as a
    /// member of an enumeration.
    pub(crate) fn is_boolean_literal(&self, member: TypeId, value: bool) -> bool {
        match self.interner.lookup(member) {
            Some(TypeData::Literal(LiteralValue::Boolean(b))) => b == value,
            Some(TypeData::Enum(list)) => self.interner.type_list(list).iter().any(|&m| {
                matches!(
                    self.interner.lookup(m),
                    Some(TypeData::Literal(LiteralValue::Boolean(b))) if b == value
                )
            }),
            _ => false,
        }
    }
}
