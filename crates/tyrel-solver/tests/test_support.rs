//! Shared helpers for the solver tests.

use crate::*;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test subscriber once per process, filtered by `TYREL_LOG`
/// (falling back to `RUST_LOG`). Does nothing when neither is set.
pub(crate) fn init_tracing() {
    TRACING.call_once(|| {
        let filter = match std::env::var("TYREL_LOG") {
            Ok(val) => EnvFilter::builder().parse_lossy(val),
            Err(_) if std::env::var("RUST_LOG").is_ok() => EnvFilter::from_default_env(),
            Err(_) => return,
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub(crate) fn create_test_interner() -> TypeInterner {
    init_tracing();
    TypeInterner::new()
}

pub(crate) fn assignable(db: &TypeInterner, source: TypeId, target: TypeId) -> bool {
    is_assignable(db, source, target)
}

pub(crate) fn required(db: &TypeInterner, name: &str, type_id: TypeId) -> PropertyInfo {
    PropertyInfo::new(db.intern_string(name), type_id)
}

pub(crate) fn optional(db: &TypeInterner, name: &str, type_id: TypeId) -> PropertyInfo {
    PropertyInfo::optional(db.intern_string(name), type_id)
}

/// Object with only required fields.
pub(crate) fn object_of(db: &TypeInterner, fields: &[(&str, TypeId)]) -> TypeId {
    db.object(
        fields
            .iter()
            .map(|&(name, type_id)| required(db, name, type_id))
            .collect(),
    )
}

pub(crate) fn function_of(db: &TypeInterner, params: &[TypeId], return_type: TypeId) -> TypeId {
    db.function(FunctionShape::new(params.to_vec(), return_type))
}
