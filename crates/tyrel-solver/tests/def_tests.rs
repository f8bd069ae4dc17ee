use super::*;
use crate::{TypeData, TypeDatabase, TypeInterner};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_def_id_validity() {
    assert!(!DefId::INVALID.is_valid());
    assert!(DefId(DefId::FIRST_VALID).is_valid());
}

#[test]
fn test_declare_allocates_distinct_ids() {
    let store = DefinitionStore::new();
    let a = store.declare();
    let b = store.declare();
    assert_ne!(a, b);
    assert!(a.is_valid() && b.is_valid());
    assert_eq!(store.len(), 2);
    assert!(store.contains(a));
    assert!(!store.is_defined(a));
}

#[test]
fn test_define_only_once() {
    let store = DefinitionStore::new();
    let id = store.declare();
    assert!(store.define(id, Arc::new(|_: &TypeInterner| TypeId::STRING)));
    assert!(!store.define(id, Arc::new(|_: &TypeInterner| TypeId::NUMBER)));
    assert!(store.is_defined(id));

    let interner = TypeInterner::new();
    assert_eq!(store.force(id, &interner), Some(TypeId::STRING));
}

#[test]
fn test_define_unknown_id_fails() {
    let store = DefinitionStore::new();
    assert!(!store.define(DefId(99), Arc::new(|_: &TypeInterner| TypeId::STRING)));
    assert!(!store.contains(DefId(99)));
}

#[test]
fn test_force_undefined_is_none() {
    let store = DefinitionStore::new();
    let id = store.declare();
    let interner = TypeInterner::new();
    assert_eq!(store.force(id, &interner), None);
    assert_eq!(store.cached(id), None);
}

#[test]
fn test_force_runs_resolver_once() {
    let store = DefinitionStore::new();
    let id = store.declare();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    store.define(
        id,
        Arc::new(move |db: &TypeInterner| {
            counter.fetch_add(1, Ordering::SeqCst);
            db.array(TypeId::STRING)
        }),
    );

    let interner = TypeInterner::new();
    let first = store.force(id, &interner);
    let second = store.force(id, &interner);
    assert_eq!(first, second);
    assert_eq!(first, Some(interner.array(TypeId::STRING)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.cached(id), first);
}

#[test]
fn test_resolver_may_build_new_lazies() {
    let interner = TypeInterner::new();
    let outer = interner.lazy(|db| {
        let inner = db.lazy(|db| db.set(TypeId::NUMBER));
        db.array(inner)
    });
    let Some(TypeData::Lazy(def_id)) = interner.lookup(outer) else {
        panic!("expected a lazy node");
    };
    let resolved = interner.resolve_lazy(def_id);
    assert!(matches!(
        resolved.and_then(|id| interner.lookup(id)),
        Some(TypeData::Array(_))
    ));
    assert_eq!(interner.definitions().len(), 2);
}
