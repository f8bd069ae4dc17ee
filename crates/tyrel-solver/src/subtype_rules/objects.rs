//! Object and record rules.
//!
//! ## Objects
//!
//! Width subtyping: the source may carry more fields than the target.
//! - required target field: present on the source and always present there
//!   (required, or optional with a default)
//! - optional target field: may be absent, otherwise its type must match
//! - target index signature: every source field whose name the key admits,
//!   and an overlapping source index signature, must fit the value type
//!
//! ## Records
//!
//! A record is an object made only of an index signature. When its key is a
//! finite set of literals it instead stands for one required field per key,
//! which is what `Record<"a" | "b", V>` means.

use crate::relations::rules::Variance;
use crate::relations::{SubtypeChecker, SubtypeResult};
use crate::types::{
    IndexSignature, IntrinsicKind, LiteralValue, ObjectShape, OrderedFloat, PropertyInfo,
    TypeData, TypeId,
};
use smallvec::SmallVec;
use tyrel_common::interner::Atom;

/// Nesting bound for key-type inspection (unions of lazies of unions ...).
const MAX_KEY_NESTING: u32 = 16;

/// One member of a finite key set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FiniteKey {
    Name(Atom),
    Number(OrderedFloat),
}

/// Broad category of the keys a record accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeyFamily {
    /// `never`: no keys at all, compatible with every family.
    Empty,
    String,
    Number,
    Symbol,
    Mixed,
}

impl KeyFamily {
    fn merge(self, other: KeyFamily) -> KeyFamily {
        match (self, other) {
            (KeyFamily::Empty, f) | (f, KeyFamily::Empty) => f,
            (a, b) if a == b => a,
            _ => KeyFamily::Mixed,
        }
    }

    fn compatible(self, other: KeyFamily) -> bool {
        self == other || self == KeyFamily::Empty || other == KeyFamily::Empty
    }
}

/// Numeric value of a property name that is the canonical spelling of a
/// number (`"1"`, `"1.5"`, `"-3"`, `"NaN"`, `"Infinity"`), if any.
pub(crate) fn canonical_numeric_key(name: &str) -> Option<f64> {
    match name {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => name
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && n.to_string() == name),
    }
}

type FiniteKeys = SmallVec<[(FiniteKey, TypeId); 8]>;

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_object_subtype(
        &mut self,
        source: &ObjectShape,
        target: &ObjectShape,
    ) -> SubtypeResult {
        for t_prop in &target.properties {
            let result = self.check_property_against(source, t_prop);
            if !result.is_true() {
                return result;
            }
        }
        if let Some(t_index) = target.index {
            return self.check_index_signature_target(source, t_index);
        }
        SubtypeResult::True
    }

    fn check_property_against(
        &mut self,
        source: &ObjectShape,
        t_prop: &PropertyInfo,
    ) -> SubtypeResult {
        match source.property(t_prop.name) {
            Some(s_prop) => {
                if !t_prop.optional && !s_prop.is_always_present() {
                    return SubtypeResult::False;
                }
                self.check_subtype(s_prop.type_id, t_prop.type_id)
            }
            None if !t_prop.optional => SubtypeResult::False,
            None => match source.index {
                // The field may still be carried by the source's index signature.
                Some(s_index) if self.key_admits(s_index.key_type, t_prop.name) => {
                    self.check_subtype(s_index.value_type, t_prop.type_id)
                }
                _ => SubtypeResult::True,
            },
        }
    }

    /// Every source field admitted by the target key, and an overlapping
    /// source index signature, must fit the target value type.
    pub(crate) fn check_index_signature_target(
        &mut self,
        source: &ObjectShape,
        t_index: IndexSignature,
    ) -> SubtypeResult {
        for s_prop in &source.properties {
            if !self.key_admits(t_index.key_type, s_prop.name) {
                continue;
            }
            let result = self.check_subtype(s_prop.type_id, t_index.value_type);
            if !result.is_true() {
                return result;
            }
        }
        if let Some(s_index) = source.index {
            if self.keys_overlap(s_index.key_type, t_index.key_type) {
                return self.check_subtype(s_index.value_type, t_index.value_type);
            }
        }
        SubtypeResult::True
    }

    pub(crate) fn check_object_to_record_subtype(
        &mut self,
        source: &ObjectShape,
        key: TypeId,
        value: TypeId,
    ) -> SubtypeResult {
        if let Some(keys) = self.finite_keys(key) {
            for (finite_key, _) in keys {
                let Some(s_prop) = self.find_property(source, finite_key).copied() else {
                    return SubtypeResult::False;
                };
                if !s_prop.is_always_present() {
                    return SubtypeResult::False;
                }
            }
        }
        self.check_index_signature_target(
            source,
            IndexSignature {
                key_type: key,
                value_type: value,
            },
        )
    }

    pub(crate) fn check_record_to_object_subtype(
        &mut self,
        key: TypeId,
        value: TypeId,
        target: &ObjectShape,
    ) -> SubtypeResult {
        let finite = self.finite_keys(key);
        for t_prop in &target.properties {
            let carried = match &finite {
                Some(keys) => keys
                    .iter()
                    .any(|&(k, _)| self.finite_key_matches(k, t_prop.name)),
                None => self.key_admits(key, t_prop.name),
            };
            // Only a finite key set guarantees that a field is present.
            let guaranteed = carried && finite.is_some();
            if !t_prop.optional && !guaranteed {
                return SubtypeResult::False;
            }
            if carried {
                let result = self.check_subtype(value, t_prop.type_id);
                if !result.is_true() {
                    return result;
                }
            }
        }
        if let Some(t_index) = target.index {
            if self.keys_overlap(key, t_index.key_type) {
                return self.check_subtype(value, t_index.value_type);
            }
        }
        SubtypeResult::True
    }

    /// Same key family, a finite target key set covered by the source key,
    /// and the value compared with the table's variance.
    pub(crate) fn check_record_subtype(
        &mut self,
        s_key: TypeId,
        s_value: TypeId,
        t_key: TypeId,
        t_value: TypeId,
        value_variance: Variance,
    ) -> SubtypeResult {
        let (Some(s_family), Some(t_family)) = (self.key_family(s_key), self.key_family(t_key))
        else {
            return SubtypeResult::False;
        };
        if !s_family.compatible(t_family) {
            return SubtypeResult::False;
        }
        if let Some(keys) = self.finite_keys(t_key) {
            for (_, literal) in keys {
                let result = self.check_subtype(literal, s_key);
                if !result.is_true() {
                    return result;
                }
            }
        }
        self.relate(s_value, t_value, value_variance)
    }

    // -------------------------------------------------------------------------
    // Key types
    // -------------------------------------------------------------------------

    /// Whether a field called `name` is one of the keys described by `key`.
    pub(crate) fn key_admits(&self, key: TypeId, name: Atom) -> bool {
        self.key_admits_at(key, name, 0)
    }

    fn key_admits_at(&self, key: TypeId, name: Atom, depth: u32) -> bool {
        if depth > MAX_KEY_NESTING {
            return false;
        }
        match self.interner.lookup(key) {
            Some(TypeData::Intrinsic(
                IntrinsicKind::String | IntrinsicKind::Unknown | IntrinsicKind::Any,
            )) => true,
            Some(TypeData::Intrinsic(IntrinsicKind::Number)) => self.numeric_name(name).is_some(),
            Some(TypeData::Literal(LiteralValue::String(atom))) => atom == name,
            Some(TypeData::Literal(LiteralValue::Number(n))) => {
                self.numeric_name(name).map(OrderedFloat) == Some(n)
            }
            Some(TypeData::Union(list) | TypeData::Enum(list)) => self
                .interner
                .type_list(list)
                .iter()
                .any(|&member| self.key_admits_at(member, name, depth + 1)),
            Some(TypeData::Intersection(list)) => self
                .interner
                .type_list(list)
                .iter()
                .all(|&member| self.key_admits_at(member, name, depth + 1)),
            Some(TypeData::Branded { base, .. }) => self.key_admits_at(base, name, depth + 1),
            Some(TypeData::Lazy(_)) => self.key_admits_at(self.resolve(key), name, depth + 1),
            _ => false,
        }
    }

    /// Two key types describe at least one common key.
    fn keys_overlap(&mut self, a: TypeId, b: TypeId) -> bool {
        self.check_subtype(a, b).is_true() || self.check_subtype(b, a).is_true()
    }

    fn numeric_name(&self, name: Atom) -> Option<f64> {
        canonical_numeric_key(&self.interner.resolve_atom(name))
    }

    fn finite_key_matches(&self, key: FiniteKey, name: Atom) -> bool {
        match key {
            FiniteKey::Name(atom) => atom == name,
            FiniteKey::Number(n) => self.numeric_name(name).map(OrderedFloat) == Some(n),
        }
    }

    fn find_property<'s>(&self, shape: &'s ObjectShape, key: FiniteKey) -> Option<&'s PropertyInfo> {
        match key {
            FiniteKey::Name(atom) => shape.property(atom),
            FiniteKey::Number(_) => shape
                .properties
                .iter()
                .find(|p| self.finite_key_matches(key, p.name)),
        }
    }

    /// The literal keys of a finite key type, each with its literal handle.
    /// `None` when the key type admits unboundedly many keys.
    fn finite_keys(&self, key: TypeId) -> Option<FiniteKeys> {
        let mut keys = FiniteKeys::new();
        self.collect_finite_keys(key, &mut keys, 0).then_some(keys)
    }

    fn collect_finite_keys(&self, key: TypeId, out: &mut FiniteKeys, depth: u32) -> bool {
        if depth > MAX_KEY_NESTING {
            return false;
        }
        match self.interner.lookup(key) {
            Some(TypeData::Intrinsic(IntrinsicKind::Never)) => true,
            Some(TypeData::Literal(LiteralValue::String(atom))) => {
                out.push((FiniteKey::Name(atom), key));
                true
            }
            Some(TypeData::Literal(LiteralValue::Number(n))) => {
                out.push((FiniteKey::Number(n), key));
                true
            }
            Some(TypeData::Union(list) | TypeData::Enum(list)) => self
                .interner
                .type_list(list)
                .iter()
                .all(|&member| self.collect_finite_keys(member, out, depth + 1)),
            Some(TypeData::Lazy(_)) => self.collect_finite_keys(self.resolve(key), out, depth + 1),
            _ => false,
        }
    }

    /// `None` for key types that are not keys at all (objects, functions, ...).
    fn key_family(&self, key: TypeId) -> Option<KeyFamily> {
        self.key_family_at(key, 0)
    }

    fn key_family_at(&self, key: TypeId, depth: u32) -> Option<KeyFamily> {
        if depth > MAX_KEY_NESTING {
            return None;
        }
        match self.interner.lookup(key)? {
            TypeData::Intrinsic(kind) => match kind {
                IntrinsicKind::Never => Some(KeyFamily::Empty),
                IntrinsicKind::String => Some(KeyFamily::String),
                IntrinsicKind::Number | IntrinsicKind::NaN => Some(KeyFamily::Number),
                IntrinsicKind::Symbol => Some(KeyFamily::Symbol),
                IntrinsicKind::Unknown | IntrinsicKind::Any => Some(KeyFamily::Mixed),
                _ => None,
            },
            TypeData::Literal(LiteralValue::String(_)) => Some(KeyFamily::String),
            TypeData::Literal(LiteralValue::Number(_)) => Some(KeyFamily::Number),
            TypeData::Literal(_) => None,
            TypeData::Union(list) | TypeData::Enum(list) => {
                let members = self.interner.type_list(list);
                let mut family = KeyFamily::Empty;
                for &member in members.iter() {
                    family = family.merge(self.key_family_at(member, depth + 1)?);
                }
                Some(family)
            }
            TypeData::Branded { base, .. } => self.key_family_at(base, depth + 1),
            TypeData::Lazy(_) => self.key_family_at(self.resolve(key), depth + 1),
            _ => None,
        }
    }
}
