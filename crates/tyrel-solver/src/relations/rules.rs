//! Constructor-pair relation table.
//!
//! Once the distributive rules (unions, intersections, brands, lazies) have
//! been applied, the remaining question is decided by the pair of
//! constructors on both sides. This table is the single place that says
//! which pairs can relate at all and with which variance each type parameter
//! is compared. Any pair missing from the table is unrelated.

use crate::types::TypeKind;
use serde::Serialize;

/// Direction in which a type parameter is compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Variance {
    /// `S<A> <: S<B>` when `A <: B`.
    Covariant,
    /// `S<A> <: S<B>` when `B <: A`.
    Contravariant,
    /// `S<A> <: S<B>` when `A <: B` and `B <: A`.
    Invariant,
}

/// Structural rule selected for a constructor pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ConstructorRule {
    /// Literal widens to its primitive.
    LiteralToPrimitive,
    /// `A[] <: B[]`.
    Array,
    /// `[A, ...] <: [B, ...]`.
    Tuple,
    /// `[A, B, ...R] <: T[]`.
    TupleToArray,
    /// `T[] <: [...R]`.
    ArrayToTuple,
    /// Field-wise object comparison with width subtyping.
    Object,
    /// Object fields checked against a record's key and value.
    ObjectToRecord,
    /// Record viewed as an object with an index signature.
    RecordToObject,
    /// `Record<K1, V1> <: Record<K2, V2>`.
    Record,
    /// `Promise<A> <: Promise<B>`.
    Promise,
    /// `Set<A> <: Set<B>`.
    Set,
    /// `Map<K1, V1> <: Map<K2, V2>`.
    Map,
    /// `(P1) => R1 <: (P2) => R2`.
    Function,
}

impl ConstructorRule {
    /// Variance of each type parameter compared by this rule, in declaration
    /// order (for functions: parameters, then return type; for maps: key,
    /// then value; for records: value only, keys follow the key-family rule).
    pub const fn variances(self) -> &'static [Variance] {
        use Variance::*;
        match self {
            Self::LiteralToPrimitive => &[],
            Self::Array
            | Self::Tuple
            | Self::TupleToArray
            | Self::ArrayToTuple
            | Self::Object
            | Self::ObjectToRecord
            | Self::RecordToObject
            | Self::Record
            | Self::Promise => &[Covariant],
            Self::Set => &[Invariant],
            Self::Map => &[Invariant, Invariant],
            Self::Function => &[Contravariant, Covariant],
        }
    }

    /// Variance of the parameter at `position`.
    pub fn variance_at(self, position: usize) -> Variance {
        self.variances()
            .get(position)
            .copied()
            .unwrap_or(Variance::Covariant)
    }
}

/// Look up the rule for a `(source, target)` constructor pair.
///
/// Intrinsic pairs, literal identity, and the distributive constructors
/// (union, intersection, enum, lazy, branded) are decided before this table
/// is consulted; they have no entry here.
pub fn constructor_rule(source: TypeKind, target: TypeKind) -> Option<ConstructorRule> {
    use TypeKind as K;
    let rule = match (source, target) {
        (K::Literal, K::Intrinsic) => ConstructorRule::LiteralToPrimitive,
        (K::Array, K::Array) => ConstructorRule::Array,
        (K::Tuple, K::Tuple) => ConstructorRule::Tuple,
        (K::Tuple, K::Array) => ConstructorRule::TupleToArray,
        (K::Array, K::Tuple) => ConstructorRule::ArrayToTuple,
        (K::Object, K::Object) => ConstructorRule::Object,
        (K::Object, K::Record) => ConstructorRule::ObjectToRecord,
        (K::Record, K::Object) => ConstructorRule::RecordToObject,
        (K::Record, K::Record) => ConstructorRule::Record,
        (K::Promise, K::Promise) => ConstructorRule::Promise,
        (K::Set, K::Set) => ConstructorRule::Set,
        (K::Map, K::Map) => ConstructorRule::Map,
        (K::Function, K::Function) => ConstructorRule::Function,
        _ => return None,
    };
    Some(rule)
}
