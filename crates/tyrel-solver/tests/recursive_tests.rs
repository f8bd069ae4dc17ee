use super::*;
use crate::test_support::*;

/// `type List = { value: V; next: List | null }`
fn linked_list(db: &TypeInterner, value: TypeId) -> TypeId {
    db.lazy_recursive(move |db, this| {
        let next = db.union2(this, TypeId::NULL);
        object_of(db, &[("value", value), ("next", next)])
    })
}

/// `type Tree = { value: V; children: Tree[] }`
fn tree(db: &TypeInterner, value: TypeId) -> TypeId {
    db.lazy_recursive(move |db, this| {
        let children = db.array(this);
        object_of(db, &[("value", value), ("children", children)])
    })
}

#[test]
fn test_structurally_equal_recursive_types_relate() {
    let db = create_test_interner();
    let first = linked_list(&db, TypeId::NUMBER);
    let second = linked_list(&db, TypeId::NUMBER);
    assert_ne!(first, second);
    assert!(assignable(&db, first, second));
    assert!(assignable(&db, second, first));
    assert!(are_types_equivalent(&db, first, second));
}

#[test]
fn test_recursive_types_compare_payloads() {
    let db = create_test_interner();
    let numbers = linked_list(&db, TypeId::NUMBER);
    let strings = linked_list(&db, TypeId::STRING);
    let ones = linked_list(&db, db.literal_number(1.0));
    assert!(!assignable(&db, numbers, strings));
    assert!(assignable(&db, ones, numbers));
    assert!(!assignable(&db, numbers, ones));
}

#[test]
fn test_recursive_tree_against_flat_view() {
    let db = create_test_interner();
    let t = tree(&db, TypeId::STRING);
    assert!(assignable(&db, t, object_of(&db, &[("value", TypeId::STRING)])));
    assert!(!assignable(&db, t, object_of(&db, &[("value", TypeId::NUMBER)])));

    let untyped_children = object_of(&db, &[("children", db.array(TypeId::UNKNOWN))]);
    assert!(assignable(&db, t, untyped_children));
}

#[test]
fn test_wider_recursive_type_is_assignable_to_narrower() {
    let db = create_test_interner();
    let wide = db.lazy_recursive(|db, this| {
        object_of(
            db,
            &[
                ("value", TypeId::NUMBER),
                ("label", TypeId::STRING),
                ("children", db.array(this)),
            ],
        )
    });
    let narrow = tree(&db, TypeId::NUMBER);
    assert!(assignable(&db, wide, narrow));
    assert!(!assignable(&db, narrow, wide));
}

#[test]
fn test_mutual_recursion_through_forward_declarations() {
    let db = create_test_interner();
    let declare_pair = |db: &TypeInterner| {
        let user = db.declare_lazy();
        let post = db.declare_lazy();
        assert!(db.define_lazy(user, move |db| {
            object_of(db, &[("name", TypeId::STRING), ("posts", db.array(post))])
        }));
        assert!(db.define_lazy(post, move |db| {
            object_of(db, &[("title", TypeId::STRING), ("author", user)])
        }));
        (user, post)
    };
    let (user_a, post_a) = declare_pair(&db);
    let (user_b, post_b) = declare_pair(&db);

    assert!(assignable(&db, user_a, user_b));
    assert!(assignable(&db, post_b, post_a));
    assert!(!assignable(&db, user_a, post_b));
}

#[test]
fn test_lazy_resolving_to_union_is_split() {
    let db = create_test_interner();
    let id = db.lazy(|db| db.union2(TypeId::STRING, TypeId::NUMBER));
    assert!(assignable(&db, TypeId::STRING, id));
    assert!(assignable(&db, db.literal_number(4.0), id));
    assert!(!assignable(&db, id, TypeId::STRING));
    assert!(assignable(&db, id, db.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::NULL])));
}

#[test]
fn test_undefined_lazy_behaves_as_never() {
    let db = create_test_interner();
    let pending = db.declare_lazy();
    assert!(assignable(&db, pending, TypeId::STRING));
    assert!(!assignable(&db, TypeId::STRING, pending));
    assert!(assignable(&db, pending, pending));
}

#[test]
fn test_self_referencing_lazy_behaves_as_never() {
    let db = create_test_interner();
    let knot = db.lazy_recursive(|_, this| this);
    assert!(assignable(&db, knot, TypeId::NUMBER));
    assert!(!assignable(&db, TypeId::NUMBER, knot));
}

#[test]
fn test_lazy_cycle_between_two_definitions_behaves_as_never() {
    let db = create_test_interner();
    let a = db.declare_lazy();
    let b = db.declare_lazy();
    db.define_lazy(a, move |_| b);
    db.define_lazy(b, move |_| a);
    assert!(assignable(&db, a, TypeId::STRING));
    assert!(!assignable(&db, TypeId::STRING, b));
}

#[test]
fn test_resolution_is_cached() {
    let db = create_test_interner();
    let list = linked_list(&db, TypeId::BOOLEAN);
    assert!(assignable(&db, list, list));
    let Some(TypeData::Lazy(def_id)) = db.lookup(list) else {
        panic!("expected a lazy node");
    };
    assert_eq!(db.definitions().cached(def_id), None);

    let other = linked_list(&db, TypeId::BOOLEAN);
    assert!(assignable(&db, list, other));
    assert!(db.definitions().cached(def_id).is_some());
}

#[test]
fn test_deeply_nested_non_recursive_types_within_limits() {
    let db = create_test_interner();
    let mut source = TypeId::STRING;
    let mut target = TypeId::STRING;
    for depth in 0..40 {
        source = object_of(&db, &[("inner", source), ("depth", db.literal_number(depth as f64))]);
        target = object_of(&db, &[("inner", target)]);
    }
    let result = query_relation(&db, source, target, RelationKind::Assignable, RelationPolicy::default());
    assert!(result.related);
    assert!(!result.depth_exceeded);
}

#[test]
fn test_deep_acyclic_nesting_beyond_a_hundred_levels() {
    let db = create_test_interner();
    let mut source = TypeId::STRING;
    let mut target = db.union2(TypeId::STRING, TypeId::NUMBER);
    for _ in 0..300 {
        source = db.array(source);
        target = db.array(target);
    }
    let result = query_relation(&db, source, target, RelationKind::Assignable, RelationPolicy::default());
    assert!(result.related);
    assert!(!result.depth_exceeded);

    let mut wide = object_of(&db, &[("leaf", TypeId::STRING), ("extra", TypeId::NULL)]);
    let mut narrow = object_of(&db, &[("leaf", TypeId::STRING)]);
    for _ in 0..300 {
        wide = object_of(&db, &[("next", wide)]);
        narrow = object_of(&db, &[("next", narrow)]);
    }
    assert!(assignable(&db, wide, narrow));
    assert!(!assignable(&db, narrow, wide));
}

/// Every resolution mints a new lazy node, so no pair ever repeats.
fn endless(db: &TypeInterner) -> TypeId {
    db.lazy(|db| db.array(endless(db)))
}

#[test]
fn test_ever_growing_lazy_is_cut_off_by_depth_limit() {
    let db = create_test_interner();
    let left = endless(&db);
    let right = endless(&db);
    let result = query_relation(&db, left, right, RelationKind::Assignable, RelationPolicy::default());
    assert!(!result.related);
    assert!(result.depth_exceeded);
}
