//! Relation engine benchmarks.
//!
//! Measures assignability throughput on wide objects, large unions and
//! recursive descriptors.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tyrel_solver::{
    PropertyInfo, RelationKind, RelationPolicy, TypeId, TypeInterner, are_types_equivalent,
    explain_assignability, is_assignable, query_relation,
};

fn wide_object(db: &TypeInterner, fields: usize, extra: bool) -> TypeId {
    let mut props: Vec<PropertyInfo> = (0..fields)
        .map(|i| PropertyInfo::new(db.intern_string(&format!("field{i}")), TypeId::STRING))
        .collect();
    if extra {
        props.push(PropertyInfo::new(db.intern_string("extra"), TypeId::NUMBER));
    }
    db.object(props)
}

fn literal_union(db: &TypeInterner, members: usize) -> TypeId {
    db.union(
        (0..members)
            .map(|i| db.literal_string(&format!("member{i}")))
            .collect(),
    )
}

/// `type List = { value: V; next: List | null }`
fn linked_list(db: &TypeInterner, value: TypeId) -> TypeId {
    db.lazy_recursive(move |db, this| {
        db.object(vec![
            PropertyInfo::new(db.intern_string("value"), value),
            PropertyInfo::new(db.intern_string("next"), db.union2(this, TypeId::NULL)),
        ])
    })
}

fn bench_wide_objects(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_objects");
    for fields in [8usize, 64, 256] {
        let db = TypeInterner::new();
        let source = wide_object(&db, fields, true);
        let target = wide_object(&db, fields, false);
        group.bench_with_input(BenchmarkId::from_parameter(fields), &fields, |b, _| {
            b.iter(|| is_assignable(&db, black_box(source), black_box(target)))
        });
    }
    group.finish();
}

fn bench_unions(c: &mut Criterion) {
    let mut group = c.benchmark_group("literal_unions");
    for members in [16usize, 128, 1024] {
        let db = TypeInterner::new();
        let narrow = literal_union(&db, members / 2);
        let wide = literal_union(&db, members);
        group.bench_with_input(BenchmarkId::from_parameter(members), &members, |b, _| {
            b.iter(|| is_assignable(&db, black_box(narrow), black_box(wide)))
        });
    }
    group.finish();
}

fn bench_recursive(c: &mut Criterion) {
    let db = TypeInterner::new();
    let first = linked_list(&db, TypeId::NUMBER);
    let second = linked_list(&db, TypeId::NUMBER);
    let strings = linked_list(&db, TypeId::STRING);

    c.bench_function("recursive_equivalent", |b| {
        b.iter(|| are_types_equivalent(&db, black_box(first), black_box(second)))
    });
    c.bench_function("recursive_mismatch_explained", |b| {
        b.iter(|| explain_assignability(&db, black_box(first), black_box(strings)))
    });
}

fn bench_policy(c: &mut Criterion) {
    let db = TypeInterner::new();
    let source = db.tuple(vec![TypeId::STRING; 32], Some(TypeId::NUMBER));
    let target = db.tuple(vec![TypeId::STRING; 16], Some(TypeId::NUMBER));
    let policy = RelationPolicy::default().with_exact_tuple_arity(true);

    c.bench_function("tuple_exact_arity", |b| {
        b.iter(|| {
            query_relation(
                &db,
                black_box(source),
                black_box(target),
                RelationKind::Assignable,
                policy,
            )
        })
    });
}

criterion_group!(
    benches,
    bench_wide_objects,
    bench_unions,
    bench_recursive,
    bench_policy
);
criterion_main!(benches);
