//! Centralized limits and thresholds for the assignability engine.
//!
//! Limits on the relation walk itself (depth and total work per call) live in
//! `tyrel_solver::recursion::RecursionProfile`; this module only holds the
//! constants that are not tied to a recursion guard.

/// Maximum number of lazy nodes followed when one lazy resolves directly to
/// another lazy.
///
/// A chain longer than this, or one that loops back on itself, never reaches
/// a concrete shape. Such a node is unresolvable and behaves as `never`.
///
/// ```text
/// const A = lazy(() => B);
/// const B = lazy(() => A);   // A and B are unresolvable
/// ```
pub const MAX_LAZY_CHAIN_DEPTH: u32 = 64;

/// Remaining stack (in bytes) below which a guarded descent grows the stack
/// before recursing further.
pub const STACK_RED_ZONE: usize = 64 * 1024;

/// Size (in bytes) of each additional stack segment allocated when the red
/// zone is reached.
pub const STACK_GROWTH_SIZE: usize = 1024 * 1024;

/// Maximum number of members expanded when formatting a union, intersection
/// or object for a diagnostic. Larger shapes are elided with `...`.
pub const MAX_FORMATTED_MEMBERS: usize = 12;

/// Maximum nesting depth printed by the type formatter.
pub const MAX_FORMAT_DEPTH: u32 = 8;
