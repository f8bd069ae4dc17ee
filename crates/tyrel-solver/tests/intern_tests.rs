use super::*;

#[test]
fn test_intrinsics_are_preregistered() {
    let interner = TypeInterner::new();
    assert_eq!(interner.len(), TypeId::FIRST_USER as usize);
    for kind in IntrinsicKind::ALL {
        let id = kind.type_id();
        assert!(id.is_intrinsic());
        assert_eq!(interner.lookup(id), Some(TypeData::Intrinsic(kind)));
        assert_eq!(interner.intern(TypeData::Intrinsic(kind)), id);
    }
}

#[test]
fn test_structural_deduplication() {
    let interner = TypeInterner::new();
    let a = interner.array(TypeId::STRING);
    let b = interner.array(TypeId::STRING);
    assert_eq!(a, b);
    assert!(!a.is_intrinsic());
    assert_ne!(a, interner.array(TypeId::NUMBER));

    let t1 = interner.tuple(vec![TypeId::STRING], Some(TypeId::NUMBER));
    let t2 = interner.tuple(vec![TypeId::STRING], Some(TypeId::NUMBER));
    assert_eq!(t1, t2);
    assert_ne!(t1, interner.tuple(vec![TypeId::STRING], None));
}

#[test]
fn test_unknown_handle_lookup_is_none() {
    let interner = TypeInterner::new();
    assert_eq!(interner.lookup(TypeId(10_000)), None);
}

#[test]
fn test_object_fields_are_order_independent() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let first = interner.object(vec![
        PropertyInfo::new(a, TypeId::STRING),
        PropertyInfo::optional(b, TypeId::NUMBER),
    ]);
    let second = interner.object(vec![
        PropertyInfo::optional(b, TypeId::NUMBER),
        PropertyInfo::new(a, TypeId::STRING),
    ]);
    assert_eq!(first, second);
}

#[test]
fn test_duplicate_field_last_declaration_wins() {
    let interner = TypeInterner::new();
    let a = interner.intern_string("a");
    let obj = interner.object(vec![
        PropertyInfo::new(a, TypeId::STRING),
        PropertyInfo::new(a, TypeId::NUMBER),
    ]);
    let Some(TypeData::Object(shape_id)) = interner.lookup(obj) else {
        panic!("expected an object");
    };
    let shape = interner.object_shape(shape_id);
    assert_eq!(shape.properties.len(), 1);
    assert_eq!(shape.property(a).map(|p| p.type_id), Some(TypeId::NUMBER));
}

#[test]
fn test_union_normalization() {
    let interner = TypeInterner::new();
    assert_eq!(interner.union(Vec::new()), TypeId::NEVER);
    assert_eq!(interner.union(vec![TypeId::STRING]), TypeId::STRING);
    assert_eq!(interner.union2(TypeId::STRING, TypeId::NEVER), TypeId::STRING);
    assert_eq!(interner.union2(TypeId::STRING, TypeId::ANY), TypeId::ANY);
    assert_eq!(interner.union2(TypeId::STRING, TypeId::UNKNOWN), TypeId::UNKNOWN);

    let ab = interner.union2(TypeId::STRING, TypeId::NUMBER);
    let ba = interner.union2(TypeId::NUMBER, TypeId::STRING);
    assert_eq!(ab, ba);
    assert_eq!(interner.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::STRING]), ab);
}

#[test]
fn test_nested_unions_are_flattened() {
    let interner = TypeInterner::new();
    let inner = interner.union2(TypeId::STRING, TypeId::NUMBER);
    let outer = interner.union2(inner, TypeId::NULL);
    let flat = interner.union(vec![TypeId::NULL, TypeId::NUMBER, TypeId::STRING]);
    assert_eq!(outer, flat);

    let Some(TypeData::Union(list)) = interner.lookup(outer) else {
        panic!("expected a union");
    };
    assert_eq!(interner.type_list(list).len(), 3);
}

#[test]
fn test_intersection_normalization() {
    let interner = TypeInterner::new();
    let obj = interner.object(vec![PropertyInfo::new(
        interner.intern_string("a"),
        TypeId::STRING,
    )]);
    assert_eq!(interner.intersection(Vec::new()), TypeId::NEVER);
    assert_eq!(interner.intersection2(obj, TypeId::NEVER), TypeId::NEVER);
    assert_eq!(interner.intersection2(obj, TypeId::UNKNOWN), obj);
    assert_eq!(interner.intersection2(obj, obj), obj);
    assert_eq!(interner.intersection2(obj, TypeId::ANY), TypeId::ANY);
}

#[test]
fn test_enumeration_drops_duplicates() {
    let interner = TypeInterner::new();
    let abc = interner.string_enum(&["a", "b", "a", "c"]);
    let Some(TypeData::Enum(list)) = interner.lookup(abc) else {
        panic!("expected an enumeration");
    };
    let members = interner.type_list(list);
    assert_eq!(members.len(), 3);
    assert_eq!(members[0], interner.literal_string("a"));
    assert_eq!(interner.string_enum(&[]), TypeId::NEVER);
}

#[test]
fn test_literal_number_nan_is_one_type() {
    let interner = TypeInterner::new();
    assert_eq!(interner.literal_number(f64::NAN), interner.literal_number(f64::NAN));
    assert_ne!(interner.literal_number(1.0), interner.literal_number(2.0));
}

#[test]
fn test_lazy_nodes_are_never_merged() {
    let interner = TypeInterner::new();
    let a = interner.lazy(|_| TypeId::STRING);
    let b = interner.lazy(|_| TypeId::STRING);
    assert_ne!(a, b);
}

#[test]
fn test_define_lazy_rejects_non_lazy_and_redefinition() {
    let interner = TypeInterner::new();
    assert!(!interner.define_lazy(TypeId::STRING, |_| TypeId::NUMBER));

    let id = interner.declare_lazy();
    assert!(interner.define_lazy(id, |_| TypeId::NUMBER));
    assert!(!interner.define_lazy(id, |_| TypeId::STRING));
    let Some(TypeData::Lazy(def_id)) = interner.lookup(id) else {
        panic!("expected a lazy node");
    };
    assert_eq!(interner.resolve_lazy(def_id), Some(TypeId::NUMBER));
}

#[test]
fn test_lazy_chain_resolves_to_first_concrete_shape() {
    let interner = TypeInterner::new();
    let inner = interner.lazy(|db| db.array(TypeId::STRING));
    let outer = interner.lazy(move |_| inner);
    let Some(TypeData::Lazy(def_id)) = interner.lookup(outer) else {
        panic!("expected a lazy node");
    };
    assert_eq!(
        interner.resolve_lazy(def_id),
        Some(interner.array(TypeId::STRING))
    );
}

#[test]
fn test_self_referencing_lazy_is_unresolvable() {
    let interner = TypeInterner::new();
    let id = interner.lazy_recursive(|_, this| this);
    let Some(TypeData::Lazy(def_id)) = interner.lookup(id) else {
        panic!("expected a lazy node");
    };
    assert_eq!(interner.resolve_lazy(def_id), None);
}

#[test]
fn test_resolve_atom_roundtrip() {
    let interner = TypeInterner::new();
    let atom = interner.intern_string("createdAt");
    assert_eq!(&*interner.resolve_atom(atom), "createdAt");
    assert_eq!(interner.intern_string("createdAt"), atom);
}
