//! Type descriptor model.
//!
//! Every descriptor lives in a [`TypeInterner`](crate::TypeInterner) and is
//! referred to through a [`TypeId`] handle. Structurally identical descriptors
//! share one handle, so identity checks are integer comparisons. Lazy nodes
//! are the exception: each one owns a fresh [`DefId`] and is never merged with
//! another lazy node.

use crate::def::DefId;
use serde::Serialize;
use std::hash::{Hash, Hasher};
use tyrel_common::interner::Atom;

// =============================================================================
// TypeId
// =============================================================================

/// Handle to an interned type descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Bottom type: assignable to everything, nothing else is assignable to it.
    pub const NEVER: TypeId = TypeId(0);
    /// Top type: everything is assignable to it.
    pub const UNKNOWN: TypeId = TypeId(1);
    /// Unconstrained escape hatch, assignable in both directions.
    pub const ANY: TypeId = TypeId(2);
    pub const NULL: TypeId = TypeId(3);
    pub const UNDEFINED: TypeId = TypeId(4);
    pub const VOID: TypeId = TypeId(5);
    pub const NAN: TypeId = TypeId(6);
    pub const BOOLEAN: TypeId = TypeId(7);
    pub const STRING: TypeId = TypeId(8);
    pub const NUMBER: TypeId = TypeId(9);
    pub const BIGINT: TypeId = TypeId(10);
    pub const DATE: TypeId = TypeId(11);
    pub const SYMBOL: TypeId = TypeId(12);

    /// First id handed out for non-intrinsic descriptors.
    pub const FIRST_USER: u32 = 13;

    /// Returns `true` for the pre-registered intrinsic handles.
    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }
}

// =============================================================================
// Intrinsics
// =============================================================================

/// Built-in primitive, top and bottom types.
///
/// The discriminant order matches the fixed [`TypeId`] constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IntrinsicKind {
    Never,
    Unknown,
    Any,
    Null,
    Undefined,
    Void,
    NaN,
    Boolean,
    String,
    Number,
    BigInt,
    Date,
    Symbol,
}

impl IntrinsicKind {
    /// All intrinsics in [`TypeId`] order.
    pub const ALL: [IntrinsicKind; 13] = [
        Self::Never,
        Self::Unknown,
        Self::Any,
        Self::Null,
        Self::Undefined,
        Self::Void,
        Self::NaN,
        Self::Boolean,
        Self::String,
        Self::Number,
        Self::BigInt,
        Self::Date,
        Self::Symbol,
    ];

    /// The fixed handle of this intrinsic.
    #[inline]
    pub const fn type_id(self) -> TypeId {
        TypeId(self as u32)
    }

    /// Map a handle back to its intrinsic, if it is one.
    pub fn from_type_id(id: TypeId) -> Option<Self> {
        Self::ALL.get(id.0 as usize).copied()
    }

    /// Keyword used when formatting this intrinsic.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Unknown => "unknown",
            Self::Any => "any",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Void => "void",
            Self::NaN => "NaN",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Number => "number",
            Self::BigInt => "bigint",
            Self::Date => "Date",
            Self::Symbol => "symbol",
        }
    }
}

// =============================================================================
// Literals
// =============================================================================

/// `f64` wrapper with total equality and hashing so number literals can be
/// interned. `-0.0` is folded into `0.0` and every NaN payload into one NaN.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct OrderedFloat(pub f64);

impl OrderedFloat {
    #[inline]
    fn canonical_bits(self) -> u64 {
        if self.0.is_nan() {
            f64::NAN.to_bits()
        } else if self.0 == 0.0 {
            0.0f64.to_bits()
        } else {
            self.0.to_bits()
        }
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}

/// The exact value carried by a literal type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum LiteralValue {
    String(Atom),
    Number(OrderedFloat),
    Boolean(bool),
    /// Decimal digits of the big integer, interned.
    BigInt(Atom),
}

impl LiteralValue {
    /// The primitive a literal widens to.
    pub const fn primitive(&self) -> TypeId {
        match self {
            Self::String(_) => TypeId::STRING,
            Self::Number(_) => TypeId::NUMBER,
            Self::Boolean(_) => TypeId::BOOLEAN,
            Self::BigInt(_) => TypeId::BIGINT,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Self::Number(n) if n.0.is_nan())
    }
}

// =============================================================================
// Shapes
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectShapeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TupleShapeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShapeId(pub u32);

/// A named field of an object shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: Atom,
    pub type_id: TypeId,
    /// The field may be absent.
    pub optional: bool,
    /// The field is always present because a default fills it in.
    /// Only meaningful together with `optional`.
    pub has_default: bool,
}

impl PropertyInfo {
    /// A required field.
    pub const fn new(name: Atom, type_id: TypeId) -> Self {
        Self {
            name,
            type_id,
            optional: false,
            has_default: false,
        }
    }

    /// An optional field.
    pub const fn optional(name: Atom, type_id: TypeId) -> Self {
        Self {
            name,
            type_id,
            optional: true,
            has_default: false,
        }
    }

    /// An optional field that a default always fills in.
    pub const fn defaulted(name: Atom, type_id: TypeId) -> Self {
        Self {
            name,
            type_id,
            optional: true,
            has_default: true,
        }
    }

    /// Whether a value of the owning object always carries this field.
    #[inline]
    pub const fn is_always_present(&self) -> bool {
        !self.optional || self.has_default
    }
}

/// `[key: K]: V` on an object shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexSignature {
    pub key_type: TypeId,
    pub value_type: TypeId,
}

/// Object shape: fields sorted by name, plus an optional index signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ObjectShape {
    pub properties: Vec<PropertyInfo>,
    pub index: Option<IndexSignature>,
}

impl ObjectShape {
    /// Binary search a field by name (properties are kept sorted).
    pub fn property(&self, name: Atom) -> Option<&PropertyInfo> {
        self.properties
            .binary_search_by_key(&name, |p| p.name)
            .ok()
            .map(|idx| &self.properties[idx])
    }
}

/// Tuple shape: fixed positional items and an optional rest element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct TupleShape {
    pub items: Vec<TypeId>,
    pub rest: Option<TypeId>,
}

/// Function shape: positional parameters, optional rest parameter, return.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub params: Vec<TypeId>,
    pub rest: Option<TypeId>,
    pub return_type: TypeId,
}

impl FunctionShape {
    pub fn new(params: Vec<TypeId>, return_type: TypeId) -> Self {
        Self {
            params,
            rest: None,
            return_type,
        }
    }

    pub fn with_rest(mut self, rest: TypeId) -> Self {
        self.rest = Some(rest);
        self
    }
}

// =============================================================================
// TypeData
// =============================================================================

/// The structure behind a [`TypeId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    /// Ordered set of literal members.
    Enum(TypeListId),
    Array(TypeId),
    Tuple(TupleShapeId),
    Object(ObjectShapeId),
    Record { key: TypeId, value: TypeId },
    Map { key: TypeId, value: TypeId },
    Set(TypeId),
    /// Deferred single value (async result).
    Promise(TypeId),
    Function(FunctionShapeId),
    Union(TypeListId),
    Intersection(TypeListId),
    Lazy(DefId),
    Branded { base: TypeId, brand: Atom },
}

impl TypeData {
    /// The constructor tag of this descriptor.
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Intrinsic(_) => TypeKind::Intrinsic,
            Self::Literal(_) => TypeKind::Literal,
            Self::Enum(_) => TypeKind::Enum,
            Self::Array(_) => TypeKind::Array,
            Self::Tuple(_) => TypeKind::Tuple,
            Self::Object(_) => TypeKind::Object,
            Self::Record { .. } => TypeKind::Record,
            Self::Map { .. } => TypeKind::Map,
            Self::Set(_) => TypeKind::Set,
            Self::Promise(_) => TypeKind::Promise,
            Self::Function(_) => TypeKind::Function,
            Self::Union(_) => TypeKind::Union,
            Self::Intersection(_) => TypeKind::Intersection,
            Self::Lazy(_) => TypeKind::Lazy,
            Self::Branded { .. } => TypeKind::Branded,
        }
    }
}

/// Constructor tag of a [`TypeData`], used as the key of the relation table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    Intrinsic,
    Literal,
    Enum,
    Array,
    Tuple,
    Object,
    Record,
    Map,
    Set,
    Promise,
    Function,
    Union,
    Intersection,
    Lazy,
    Branded,
}
