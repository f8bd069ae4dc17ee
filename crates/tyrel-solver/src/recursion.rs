//! Cycle guard and depth limits for recursive relation walks.
//!
//! `RecursionGuard` is the Cycle Guard of the relation engine: it records the
//! keys (for the checker, `(source, target)` pairs) that are on the active
//! path. Entering a key that is already on the path reports
//! [`RecursionResult::Cycle`], which the checker answers coinductively.
//!
//! Besides cycle detection it bounds nesting depth and the total number of
//! entries per walk, so malformed descriptors (for instance a lazy node whose
//! resolver builds a fresh lazy node every time) still terminate.
//!
//! `DepthCounter` is the depth-only variant used where the same key may be
//! revisited legitimately (failure explanation).

use rustc_hash::FxHashSet;
use std::hash::Hash;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// Named `(max_depth, max_iterations)` presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Assignability walk of `SubtypeChecker`.
    ///
    /// The walk runs under `stacker`, so the depth bound only has to stop
    /// descriptors that keep growing (lazy resolvers minting fresh nodes).
    ///
    /// depth = 1,000, iterations = 100,000
    SubtypeCheck,

    /// Failure explanation: descends along a single failing path.
    ///
    /// depth = 32, iterations = 10,000
    Explain,

    /// Lazy expansion in the type formatter.
    ///
    /// depth = 8, iterations = 10,000
    Formatting,

    /// Custom limits, usually coming from a `RelationPolicy`.
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::SubtypeCheck => 1_000,
            Self::Explain => 32,
            Self::Formatting => tyrel_common::limits::MAX_FORMAT_DEPTH,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::SubtypeCheck => 100_000,
            Self::Explain => 10_000,
            Self::Formatting => 10_000,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

// ---------------------------------------------------------------------------
// RecursionResult
// ---------------------------------------------------------------------------

/// Outcome of trying to enter a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    /// Proceed; the caller must `leave` the key afterwards.
    Entered,
    /// The key is already on the active path.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle)
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

// ---------------------------------------------------------------------------
// RecursionGuard
// ---------------------------------------------------------------------------

/// Active-path set with depth and work limits.
///
/// ```ignore
/// let mut guard = RecursionGuard::with_profile(RecursionProfile::SubtypeCheck);
/// match guard.enter((source, target)) {
///     RecursionResult::Entered => {
///         let related = compare(source, target);
///         guard.leave((source, target));
///         related
///     }
///     RecursionResult::Cycle => true,
///     RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => false,
/// }
/// ```
///
/// In debug builds, dropping a guard that still has keys on its path panics,
/// which catches a missing `leave`.
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Try to put `key` on the active path.
    ///
    /// Every attempt counts towards the iteration budget, including denied
    /// ones. Only [`RecursionResult::Entered`] must be paired with `leave`.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.visiting.contains(&key) {
            return RecursionResult::Cycle;
        }
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }

        self.visiting.insert(key);
        self.depth += 1;
        RecursionResult::Entered
    }

    /// Take `key` off the active path.
    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);
        debug_assert!(
            was_present,
            "RecursionGuard::leave() called for a key that was never entered"
        );
        self.depth = self.depth.saturating_sub(1);
    }

    /// Run `f` with `key` on the active path.
    ///
    /// Returns `Err` with the denial reason when the key could not be entered.
    pub fn scope<T>(&mut self, key: K, f: impl FnOnce() -> T) -> Result<T, RecursionResult> {
        match self.enter(key) {
            RecursionResult::Entered => {
                let result = f();
                self.leave(key);
                Ok(result)
            }
            denied => Err(denied),
        }
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains(key)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.depth > 0
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Sticky: stays set until [`reset`](Self::reset).
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    /// Forget all state, keeping the limits.
    pub fn reset(&mut self) {
        self.visiting.clear();
        self.depth = 0;
        self.iterations = 0;
        self.exceeded = false;
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!(
                "RecursionGuard dropped with {} keys still on the active path",
                self.visiting.len(),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// DepthCounter
// ---------------------------------------------------------------------------

/// Depth-only guard for walks that may revisit the same key.
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        Self {
            depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    /// Returns `false` (and marks the counter exceeded) at the limit; do not
    /// call `leave` in that case.
    #[inline]
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    #[inline]
    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "DepthCounter::leave() at depth 0");
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl Drop for DepthCounter {
    fn drop(&mut self) {
        if !std::thread::panicking() && self.depth > 0 {
            panic!("DepthCounter dropped at depth {}", self.depth);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtype_profile_limits() {
        let guard = RecursionGuard::<u32>::with_profile(RecursionProfile::SubtypeCheck);
        assert_eq!(guard.max_depth(), 1_000);
        assert_eq!(guard.max_iterations(), 100_000);
        assert!(!guard.is_active());
    }

    #[test]
    fn custom_profile_limits() {
        let p = RecursionProfile::Custom {
            max_depth: 3,
            max_iterations: 9,
        };
        assert_eq!(p.max_depth(), 3);
        assert_eq!(p.max_iterations(), 9);
    }

    #[test]
    fn pair_keys_are_directional() {
        let mut guard = RecursionGuard::new(10, 100);
        assert_eq!(guard.enter((1u32, 2u32)), RecursionResult::Entered);
        assert_eq!(guard.enter((2u32, 1u32)), RecursionResult::Entered);
        assert_eq!(guard.enter((1u32, 2u32)), RecursionResult::Cycle);
        assert!(!guard.is_exceeded());
        guard.leave((2, 1));
        guard.leave((1, 2));
        assert!(!guard.is_active());
    }

    #[test]
    fn key_can_be_reentered_after_leave() {
        let mut guard = RecursionGuard::new(10, 100);
        assert!(guard.enter(7u32).is_entered());
        guard.leave(7);
        assert!(guard.enter(7u32).is_entered());
        assert_eq!(guard.iterations(), 2);
        guard.leave(7);
    }

    #[test]
    fn depth_limit_is_sticky() {
        let mut guard = RecursionGuard::new(1, 100);
        assert!(guard.enter(1u32).is_entered());
        assert_eq!(guard.enter(2u32), RecursionResult::DepthExceeded);
        guard.leave(1);
        assert!(guard.is_exceeded());
        guard.reset();
        assert!(!guard.is_exceeded());
    }

    #[test]
    fn cycle_reported_before_depth_limit() {
        let mut guard = RecursionGuard::new(1, 100);
        assert!(guard.enter(1u32).is_entered());
        assert!(guard.enter(1u32).is_cycle());
        guard.leave(1);
    }

    #[test]
    fn iteration_budget_counts_denied_attempts() {
        let mut guard = RecursionGuard::new(10, 2);
        assert!(guard.enter(1u32).is_entered());
        assert!(guard.enter(1u32).is_cycle());
        assert_eq!(guard.enter(2u32), RecursionResult::IterationExceeded);
        assert!(guard.enter(3u32).is_exceeded());
        guard.leave(1);
    }

    #[test]
    fn scope_leaves_on_success() {
        let mut guard = RecursionGuard::new(10, 100);
        let value = guard.scope(5u32, || 42);
        assert_eq!(value, Ok(42));
        assert!(!guard.is_visiting(&5));
    }

    #[test]
    fn scope_reports_denial() {
        let mut guard = RecursionGuard::new(0, 100);
        assert_eq!(guard.scope(5u32, || 42), Err(RecursionResult::DepthExceeded));
    }

    #[test]
    fn depth_counter_limits_nesting() {
        let mut counter = DepthCounter::new(2);
        assert!(counter.enter());
        assert!(counter.enter());
        assert!(!counter.enter());
        assert!(counter.is_exceeded());
        counter.leave();
        counter.leave();
        assert_eq!(counter.depth(), 0);
    }
}
