//! Type interning for structural deduplication.
//!
//! This module implements the construction API: every constructor converts a
//! [`TypeData`] structure into a lightweight [`TypeId`] handle.
//!
//! Benefits:
//! - O(1) identity (just compare `TypeId` values), which the relation engine
//!   uses as its reflexive fast path
//! - Memory efficient (each unique structure stored once)
//! - Thread-safe construction (`RwLock` tables, concurrent lazy store)
//!
//! Unions and intersections are normalized on construction: nested members
//! are flattened, duplicates removed, and degenerate member sets collapse
//! (empty → `never`, single member → that member).

use crate::def::{DefId, DefinitionStore, LazyResolver};
use crate::types::*;
use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use tracing::debug;
use tyrel_common::interner::{Atom, ShardedInterner};
use tyrel_common::limits::MAX_LAZY_CHAIN_DEPTH;

const TYPE_LIST_INLINE: usize = 8;

type TypeListBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

// =============================================================================
// TypeDatabase
// =============================================================================

/// Read-only view of interned descriptors used by the relation engine.
pub trait TypeDatabase: Send + Sync {
    /// The structure behind a handle, or `None` for an unknown handle.
    fn lookup(&self, id: TypeId) -> Option<TypeData>;
    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]>;
    fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape>;
    fn tuple_shape(&self, id: TupleShapeId) -> Arc<TupleShape>;
    fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape>;
    /// Follow a lazy definition to its first non-lazy shape.
    ///
    /// `None` when the definition is unresolvable (never defined, or a chain
    /// of lazies that never reaches a concrete shape).
    fn resolve_lazy(&self, def_id: DefId) -> Option<TypeId>;
    fn resolve_atom(&self, atom: Atom) -> Arc<str>;
}

// =============================================================================
// Side tables
// =============================================================================

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }

        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }

        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<[T]>> {
        self.items.get(id as usize).cloned()
    }

    fn empty(&self) -> Arc<[T]> {
        self.items[0].clone()
    }
}

struct ValueInterner<T> {
    items: Vec<Arc<T>>,
    map: FxHashMap<Arc<T>, u32>,
}

impl<T> ValueInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        ValueInterner {
            items: Vec::new(),
            map: FxHashMap::default(),
        }
    }

    fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }

        let arc = Arc::new(value);
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<T>> {
        self.items.get(id as usize).cloned()
    }
}

// =============================================================================
// TypeInterner
// =============================================================================

/// Type interning table and construction API.
///
/// Thread-safe via `RwLock` for concurrent construction and reads.
pub struct TypeInterner {
    types: RwLock<IndexSet<TypeData, FxBuildHasher>>,
    /// String interner for field names, brand tags and string literals.
    pub string_interner: ShardedInterner,
    type_lists: RwLock<SliceInterner<TypeId>>,
    object_shapes: RwLock<ValueInterner<ObjectShape>>,
    tuple_shapes: RwLock<ValueInterner<TupleShape>>,
    function_shapes: RwLock<ValueInterner<FunctionShape>>,
    definitions: DefinitionStore,
}

impl TypeInterner {
    /// Create a new type interner with pre-registered intrinsics.
    pub fn new() -> Self {
        let mut types = IndexSet::with_capacity_and_hasher(256, FxBuildHasher);
        for kind in IntrinsicKind::ALL {
            types.insert(TypeData::Intrinsic(kind));
        }
        TypeInterner {
            types: RwLock::new(types),
            string_interner: {
                let interner = ShardedInterner::new();
                interner.intern_common();
                interner
            },
            type_lists: RwLock::new(SliceInterner::new()),
            object_shapes: RwLock::new(ValueInterner::new()),
            tuple_shapes: RwLock::new(ValueInterner::new()),
            function_shapes: RwLock::new(ValueInterner::new()),
            definitions: DefinitionStore::new(),
        }
    }

    /// Intern a raw structure.
    ///
    /// Prefer the typed constructors below; they normalize their input.
    pub fn intern(&self, data: TypeData) -> TypeId {
        if let TypeData::Intrinsic(kind) = data {
            return kind.type_id();
        }
        {
            let types = self.types.read().expect("types lock poisoned");
            if let Some(index) = types.get_index_of(&data) {
                return TypeId(index as u32);
            }
        }
        let mut types = self.types.write().expect("types lock poisoned");
        let (index, _) = types.insert_full(data);
        TypeId(index as u32)
    }

    /// Number of interned descriptors, intrinsics included.
    pub fn len(&self) -> usize {
        self.types.read().expect("types lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn intern_string(&self, s: &str) -> Atom {
        self.string_interner.intern(s)
    }

    /// Lazy definition storage.
    pub fn definitions(&self) -> &DefinitionStore {
        &self.definitions
    }

    fn intern_type_list(&self, members: Vec<TypeId>) -> TypeListId {
        let mut lists = self.type_lists.write().expect("type_lists lock poisoned");
        TypeListId(lists.intern(members))
    }

    // -------------------------------------------------------------------------
    // Literals and enumerations
    // -------------------------------------------------------------------------

    pub fn literal(&self, value: LiteralValue) -> TypeId {
        self.intern(TypeData::Literal(value))
    }

    pub fn literal_string(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.literal(LiteralValue::String(atom))
    }

    pub fn literal_number(&self, value: f64) -> TypeId {
        self.literal(LiteralValue::Number(OrderedFloat(value)))
    }

    pub fn literal_boolean(&self, value: bool) -> TypeId {
        self.literal(LiteralValue::Boolean(value))
    }

    /// Big integer literal from its decimal digits.
    pub fn literal_bigint(&self, digits: &str) -> TypeId {
        let atom = self.intern_string(digits);
        self.literal(LiteralValue::BigInt(atom))
    }

    /// Enumeration over an ordered set of literal values.
    ///
    /// Duplicates are dropped (first occurrence kept); an empty enumeration
    /// is `never`.
    pub fn enumeration(&self, values: Vec<LiteralValue>) -> TypeId {
        let mut members: Vec<TypeId> = Vec::with_capacity(values.len());
        for value in values {
            let id = self.literal(value);
            if !members.contains(&id) {
                members.push(id);
            }
        }
        if members.is_empty() {
            return TypeId::NEVER;
        }
        let list = self.intern_type_list(members);
        self.intern(TypeData::Enum(list))
    }

    /// Enumeration of string values.
    pub fn string_enum(&self, values: &[&str]) -> TypeId {
        let values = values
            .iter()
            .map(|v| LiteralValue::String(self.intern_string(v)))
            .collect();
        self.enumeration(values)
    }

    // -------------------------------------------------------------------------
    // Containers
    // -------------------------------------------------------------------------

    pub fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    pub fn tuple(&self, items: Vec<TypeId>, rest: Option<TypeId>) -> TypeId {
        let shape = TupleShape { items, rest };
        let id = {
            let mut shapes = self.tuple_shapes.write().expect("tuple_shapes lock poisoned");
            TupleShapeId(shapes.intern(shape))
        };
        self.intern(TypeData::Tuple(id))
    }

    pub fn record(&self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(TypeData::Record { key, value })
    }

    pub fn map(&self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(TypeData::Map { key, value })
    }

    pub fn set(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Set(element))
    }

    pub fn promise(&self, inner: TypeId) -> TypeId {
        self.intern(TypeData::Promise(inner))
    }

    pub fn function(&self, shape: FunctionShape) -> TypeId {
        let id = {
            let mut shapes = self
                .function_shapes
                .write()
                .expect("function_shapes lock poisoned");
            FunctionShapeId(shapes.intern(shape))
        };
        self.intern(TypeData::Function(id))
    }

    // -------------------------------------------------------------------------
    // Objects
    // -------------------------------------------------------------------------

    /// Object type with named fields.
    ///
    /// Fields are sorted by name. When a name is declared twice, the last
    /// declaration wins.
    pub fn object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        self.object_with_shape(properties, None)
    }

    /// Object type with named fields and an index signature.
    pub fn object_with_index(
        &self,
        properties: Vec<PropertyInfo>,
        index: IndexSignature,
    ) -> TypeId {
        self.object_with_shape(properties, Some(index))
    }

    fn object_with_shape(
        &self,
        mut properties: Vec<PropertyInfo>,
        index: Option<IndexSignature>,
    ) -> TypeId {
        // Reverse first so the stable sort keeps the last declaration of a
        // duplicated name in front, where dedup keeps it.
        properties.reverse();
        properties.sort_by_key(|p| p.name);
        properties.dedup_by_key(|p| p.name);
        let shape = ObjectShape { properties, index };
        let id = {
            let mut shapes = self
                .object_shapes
                .write()
                .expect("object_shapes lock poisoned");
            ObjectShapeId(shapes.intern(shape))
        };
        self.intern(TypeData::Object(id))
    }

    // -------------------------------------------------------------------------
    // Unions and intersections
    // -------------------------------------------------------------------------

    /// Intern a union type, normalizing and deduplicating members.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        self.union_from_iter(members)
    }

    /// Fast path for two-member unions.
    pub fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.union_from_iter([left, right])
    }

    fn union_from_iter<I>(&self, members: I) -> TypeId
    where
        I: IntoIterator<Item = TypeId>,
    {
        let mut flat: TypeListBuffer = SmallVec::new();
        for member in members {
            match self.lookup(member) {
                Some(TypeData::Union(inner)) => flat.extend(self.type_list(inner).iter().copied()),
                _ => flat.push(member),
            }
        }
        self.normalize_union(flat)
    }

    fn normalize_union(&self, mut flat: TypeListBuffer) -> TypeId {
        flat.sort_unstable();
        flat.dedup();

        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        if flat.contains(&TypeId::UNKNOWN) {
            return TypeId::UNKNOWN;
        }
        flat.retain(|id| *id != TypeId::NEVER);
        match flat.len() {
            0 => TypeId::NEVER,
            1 => flat[0],
            _ => {
                let list = self.intern_type_list(flat.into_vec());
                self.intern(TypeData::Union(list))
            }
        }
    }

    /// Intern an intersection type, normalizing and deduplicating members.
    pub fn intersection(&self, members: Vec<TypeId>) -> TypeId {
        self.intersection_from_iter(members)
    }

    /// Fast path for two-member intersections.
    pub fn intersection2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.intersection_from_iter([left, right])
    }

    fn intersection_from_iter<I>(&self, members: I) -> TypeId
    where
        I: IntoIterator<Item = TypeId>,
    {
        let mut flat: TypeListBuffer = SmallVec::new();
        for member in members {
            match self.lookup(member) {
                Some(TypeData::Intersection(inner)) => {
                    flat.extend(self.type_list(inner).iter().copied())
                }
                _ => flat.push(member),
            }
        }
        self.normalize_intersection(flat)
    }

    fn normalize_intersection(&self, mut flat: TypeListBuffer) -> TypeId {
        flat.sort_unstable();
        flat.dedup();

        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        if flat.contains(&TypeId::NEVER) {
            return TypeId::NEVER;
        }
        if flat.len() > 1 {
            flat.retain(|id| *id != TypeId::UNKNOWN);
        }
        match flat.len() {
            0 => TypeId::NEVER,
            1 => flat[0],
            _ => {
                let list = self.intern_type_list(flat.into_vec());
                self.intern(TypeData::Intersection(list))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Branded and lazy
    // -------------------------------------------------------------------------

    /// Nominal wrapper over a structural base.
    pub fn branded(&self, base: TypeId, brand: &str) -> TypeId {
        let brand = self.intern_string(brand);
        self.intern(TypeData::Branded { base, brand })
    }

    /// Lazy descriptor resolved on first use.
    pub fn lazy<F>(&self, resolver: F) -> TypeId
    where
        F: Fn(&TypeInterner) -> TypeId + Send + Sync + 'static,
    {
        let id = self.declare_lazy();
        self.define_lazy(id, resolver);
        id
    }

    /// Lazy descriptor whose resolver can refer to the node itself.
    ///
    /// ```ignore
    /// // type List = { value: number; next: List | null }
    /// let list = interner.lazy_recursive(|db, this| {
    ///     let next = db.union2(this, TypeId::NULL);
    ///     db.object(vec![
    ///         PropertyInfo::new(db.intern_string("value"), TypeId::NUMBER),
    ///         PropertyInfo::new(db.intern_string("next"), next),
    ///     ])
    /// });
    /// ```
    pub fn lazy_recursive<F>(&self, resolver: F) -> TypeId
    where
        F: Fn(&TypeInterner, TypeId) -> TypeId + Send + Sync + 'static,
    {
        let id = self.declare_lazy();
        self.define_lazy(id, move |db| resolver(db, id));
        id
    }

    /// Forward-declare a lazy descriptor; attach its resolver later with
    /// [`define_lazy`](Self::define_lazy). Used for mutual recursion.
    ///
    /// Until it is defined the node is unresolvable and behaves as `never`.
    pub fn declare_lazy(&self) -> TypeId {
        let def_id = self.definitions.declare();
        self.intern(TypeData::Lazy(def_id))
    }

    /// Attach the resolver of a declared lazy descriptor.
    ///
    /// Returns `false` if `id` is not a lazy node or already has a resolver.
    pub fn define_lazy<F>(&self, id: TypeId, resolver: F) -> bool
    where
        F: Fn(&TypeInterner) -> TypeId + Send + Sync + 'static,
    {
        let Some(TypeData::Lazy(def_id)) = self.lookup(id) else {
            return false;
        };
        let resolver: LazyResolver = Arc::new(resolver);
        self.definitions.define(def_id, resolver)
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeDatabase for TypeInterner {
    fn lookup(&self, id: TypeId) -> Option<TypeData> {
        if let Some(kind) = IntrinsicKind::from_type_id(id) {
            return Some(TypeData::Intrinsic(kind));
        }
        let types = self.types.read().expect("types lock poisoned");
        types.get_index(id.0 as usize).copied()
    }

    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let lists = self.type_lists.read().expect("type_lists lock poisoned");
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape> {
        self.object_shapes
            .read()
            .expect("object_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_default()
    }

    fn tuple_shape(&self, id: TupleShapeId) -> Arc<TupleShape> {
        self.tuple_shapes
            .read()
            .expect("tuple_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_default()
    }

    fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        self.function_shapes
            .read()
            .expect("function_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| Arc::new(FunctionShape::new(Vec::new(), TypeId::NEVER)))
    }

    fn resolve_lazy(&self, def_id: DefId) -> Option<TypeId> {
        let mut current = def_id;
        let mut chain: SmallVec<[DefId; 4]> = SmallVec::new();
        for _ in 0..MAX_LAZY_CHAIN_DEPTH {
            if chain.contains(&current) {
                debug!(def_id = def_id.0, "lazy definition resolves to itself");
                return None;
            }
            chain.push(current);
            let resolved = self.definitions.force(current, self)?;
            match self.lookup(resolved) {
                Some(TypeData::Lazy(next)) => current = next,
                _ => return Some(resolved),
            }
        }
        debug!(def_id = def_id.0, "lazy resolution chain too long");
        None
    }

    fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.string_interner.resolve(atom)
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
