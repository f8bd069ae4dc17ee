//! Branded (nominal) rules.
//!
//! A brand is a nominal tag layered over a structural base:
//! - same brand: compare the bases
//! - branded source, other target: the brand can be forgotten, compare the base
//! - unbranded source, branded target: never, a brand cannot be forged

use crate::relations::{SubtypeChecker, SubtypeResult};
use crate::types::{TypeData, TypeId};

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_branded_subtype(
        &mut self,
        s_data: &TypeData,
        target: TypeId,
        t_data: &TypeData,
    ) -> SubtypeResult {
        match (*s_data, *t_data) {
            (
                TypeData::Branded {
                    base: s_base,
                    brand: s_brand,
                },
                TypeData::Branded {
                    base: t_base,
                    brand: t_brand,
                },
            ) if s_brand == t_brand => self.check_subtype(s_base, t_base),
            // Brands stack: `Branded<Branded<string, A>, B>` still carries `A`.
            (TypeData::Branded { base, .. }, _) => self.check_subtype(base, target),
            _ => SubtypeResult::False,
        }
    }
}
