use super::*;
use crate::test_support::*;
use rayon::prelude::*;
use std::sync::Arc;

#[test]
fn test_parallel_queries_share_one_interner() {
    let db = create_test_interner();
    let user = object_of(&db, &[("id", TypeId::STRING), ("age", TypeId::NUMBER)]);
    let view = object_of(&db, &[("id", TypeId::STRING)]);
    let list = db.lazy_recursive(move |db, this| {
        object_of(db, &[("user", user), ("next", db.union2(this, TypeId::NULL))])
    });
    let other = db.lazy_recursive(move |db, this| {
        object_of(db, &[("user", view), ("next", db.union2(this, TypeId::NULL))])
    });

    let results: Vec<(bool, bool)> = (0..256)
        .into_par_iter()
        .map(|_| (is_assignable(&db, list, other), is_assignable(&db, other, list)))
        .collect();
    assert!(results.iter().all(|&r| r == (true, false)));
}

#[test]
fn test_parallel_construction_deduplicates() {
    let db = Arc::new(create_test_interner());
    let ids: Vec<TypeId> = (0..64)
        .into_par_iter()
        .map(|i| {
            let element = db.literal_number((i % 4) as f64);
            db.array(db.union2(element, TypeId::STRING))
        })
        .collect();

    let mut distinct = ids.clone();
    distinct.sort();
    distinct.dedup();
    assert_eq!(distinct.len(), 4);
    for id in distinct {
        assert!(is_assignable(&*db, id, db.array(TypeId::UNKNOWN)));
    }
}

#[test]
fn test_lazy_definition_forced_from_many_threads() {
    let db = create_test_interner();
    let tree = db.lazy_recursive(|db, this| {
        object_of(db, &[("value", TypeId::STRING), ("children", db.array(this))])
    });
    let flat = object_of(&db, &[("value", TypeId::STRING)]);

    let all = (0..128)
        .into_par_iter()
        .all(|_| is_assignable(&db, tree, flat));
    assert!(all);

    let Some(TypeData::Lazy(def_id)) = db.lookup(tree) else {
        panic!("expected a lazy node");
    };
    let first = db.definitions().cached(def_id);
    assert!(first.is_some());
    assert_eq!(db.resolve_lazy(def_id), first);
}
