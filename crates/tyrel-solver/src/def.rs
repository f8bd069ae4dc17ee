//! Lazy definitions.
//!
//! A lazy descriptor is a `TypeData::Lazy(DefId)` whose shape is produced on
//! demand by a resolver closure. Lazy nodes are what make self-referential
//! descriptors possible: the resolver runs only when the engine first needs
//! the shape, by which time every handle it refers to exists.
//!
//! ## Caching
//!
//! The first successful resolution is stored in a `OnceLock` and reused by
//! every later caller. Two threads racing on the same definition may both run
//! the resolver; resolvers are deterministic, so the loser's result is simply
//! dropped (first resolution wins).
//!
//! ## Locking
//!
//! The resolver is always invoked with no store entry borrowed, so it is free
//! to construct new types (including new lazy nodes) on the interner.

use crate::TypeInterner;
use crate::types::TypeId;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::trace;

// =============================================================================
// DefId
// =============================================================================

/// Identifier of one lazy definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel value for invalid `DefId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DefId`.
    pub const FIRST_VALID: u32 = 1;

    /// Check if this `DefId` is valid.
    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

/// Zero-argument resolver of a lazy descriptor. It receives the interner so
/// it can build (or look up) the shape it stands for.
pub type LazyResolver = Arc<dyn Fn(&TypeInterner) -> TypeId + Send + Sync>;

struct LazyDefinition {
    resolver: OnceLock<LazyResolver>,
    resolved: OnceLock<TypeId>,
}

// =============================================================================
// DefinitionStore
// =============================================================================

/// Concurrent storage for lazy definitions.
pub struct DefinitionStore {
    definitions: DashMap<DefId, Arc<LazyDefinition>>,
    next_id: AtomicU32,
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self {
            definitions: DashMap::new(),
            next_id: AtomicU32::new(DefId::FIRST_VALID),
        }
    }

    /// Allocate a definition with no resolver yet.
    pub fn declare(&self) -> DefId {
        let id = DefId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.definitions.insert(
            id,
            Arc::new(LazyDefinition {
                resolver: OnceLock::new(),
                resolved: OnceLock::new(),
            }),
        );
        id
    }

    /// Attach the resolver of a declared definition.
    ///
    /// Returns `false` if the definition does not exist or already has a
    /// resolver; the existing resolver is kept in that case.
    pub fn define(&self, id: DefId, resolver: LazyResolver) -> bool {
        let Some(def) = self.get(id) else {
            return false;
        };
        def.resolver.set(resolver).is_ok()
    }

    pub fn contains(&self, id: DefId) -> bool {
        self.definitions.contains_key(&id)
    }

    /// Whether a resolver has been attached.
    pub fn is_defined(&self, id: DefId) -> bool {
        self.get(id).is_some_and(|def| def.resolver.get().is_some())
    }

    /// The cached resolution, if the definition was already forced.
    pub fn cached(&self, id: DefId) -> Option<TypeId> {
        self.get(id).and_then(|def| def.resolved.get().copied())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Run the resolver once (or return the cached result).
    ///
    /// This is a single step: the result may itself be another lazy node.
    /// Returns `None` when the definition is unknown or was never defined.
    pub(crate) fn force(&self, id: DefId, interner: &TypeInterner) -> Option<TypeId> {
        let def = self.get(id)?;
        if let Some(&resolved) = def.resolved.get() {
            return Some(resolved);
        }
        let resolver = Arc::clone(def.resolver.get()?);
        let resolved = resolver(interner);
        trace!(def_id = id.0, type_id = resolved.0, "resolved lazy definition");
        let _ = def.resolved.set(resolved);
        def.resolved.get().copied()
    }

    fn get(&self, id: DefId) -> Option<Arc<LazyDefinition>> {
        self.definitions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
    }
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
