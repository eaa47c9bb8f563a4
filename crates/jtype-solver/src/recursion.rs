//! Recursion limits for walks over type graphs and class hierarchies.
//!
//! Two kinds of cycles reach the engine: generic parameters whose bounds
//! mention themselves (`T extends Comparable<T>`, `E extends Enum<E>`) and
//! malformed hierarchies handed over by a metadata resolver. Walks that can
//! follow such edges take their limits from a [`RecursionProfile`] stored in
//! the session's `EngineConfig`:
//!
//! - [`RecursionGuard`] tracks the keys currently being expanded, so a key
//!   reached again from inside its own expansion is reported as a cycle;
//! - [`DepthLimit`] only bounds nesting, for descents where the same node may
//!   legitimately appear twice (`Map<List<T>, List<T>>`).
//!
//! Both report through a sticky flag when a limit cut a walk short. Debug
//! builds panic when a guard is dropped while keys are still active.

use rustc_hash::FxHashSet;
use std::hash::Hash;

// =============================================================================
// RecursionProfile
// =============================================================================

/// Limit presets, one per kind of walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Substitution through nested arguments and parameter bounds.
    Substitution,
    /// Erasure through chains of parameter bounds.
    Erasure,
    /// Base type and interface walks. Iterations count visited types.
    Hierarchy,
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::Substitution | Self::Erasure | Self::Hierarchy => 64,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::Substitution | Self::Erasure => 100_000,
            Self::Hierarchy => 10_000,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

// =============================================================================
// RecursionGuard
// =============================================================================

/// Outcome of [`RecursionGuard::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already being expanded further up the walk.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        self == Self::Entered
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

/// Keys under expansion, with depth and attempt limits.
///
/// Nesting depth is the number of active keys. Every call to
/// [`enter`](Self::enter) counts as an attempt, denied ones included.
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    active: FxHashSet<K>,
    attempts: u32,
    profile: RecursionProfile,
    tripped: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(profile: RecursionProfile) -> Self {
        Self {
            active: FxHashSet::default(),
            attempts: 0,
            profile,
            tripped: false,
        }
    }

    /// Start expanding `key`. Only an [`Entered`](RecursionResult::Entered)
    /// result must be paired with [`leave`](Self::leave).
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.attempts = self.attempts.saturating_add(1);
        let denied = if self.attempts > self.profile.max_iterations() {
            RecursionResult::IterationExceeded
        } else if self.depth() >= self.profile.max_depth() {
            RecursionResult::DepthExceeded
        } else if self.active.insert(key) {
            return RecursionResult::Entered;
        } else {
            return RecursionResult::Cycle;
        };
        self.tripped = true;
        denied
    }

    pub fn leave(&mut self, key: K) {
        let removed = self.active.remove(&key);
        debug_assert!(removed, "RecursionGuard::leave on a key that was never entered");
    }

    /// Run `expand` with `key` active, or return why it could not start.
    pub fn guarded<T>(&mut self, key: K, expand: impl FnOnce() -> T) -> Result<T, RecursionResult> {
        match self.enter(key) {
            RecursionResult::Entered => {
                let result = expand();
                self.leave(key);
                Ok(result)
            }
            denied => Err(denied),
        }
    }

    #[inline]
    pub fn is_active(&self, key: &K) -> bool {
        self.active.contains(key)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.active.len() as u32
    }

    #[inline]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[inline]
    pub fn profile(&self) -> RecursionProfile {
        self.profile
    }

    /// Whether a limit denied any entry since creation or the last reset.
    #[inline]
    pub fn limit_hit(&self) -> bool {
        self.tripped
    }

    pub fn reset(&mut self) {
        self.active.clear();
        self.attempts = 0;
        self.tripped = false;
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.active.is_empty() {
            panic!(
                "RecursionGuard dropped with {} keys still active",
                self.active.len()
            );
        }
    }
}

// =============================================================================
// DepthLimit
// =============================================================================

/// Nesting bound without cycle tracking.
///
/// A `false` from [`descend`](Self::descend) leaves the depth unchanged and
/// must not be followed by [`ascend`](Self::ascend).
pub struct DepthLimit {
    depth: u32,
    max_depth: u32,
    tripped: bool,
}

impl DepthLimit {
    pub fn new(profile: RecursionProfile) -> Self {
        Self {
            depth: 0,
            max_depth: profile.max_depth(),
            tripped: false,
        }
    }

    #[inline]
    pub fn descend(&mut self) -> bool {
        if self.depth < self.max_depth {
            self.depth += 1;
            return true;
        }
        self.tripped = true;
        false
    }

    #[inline]
    pub fn ascend(&mut self) {
        debug_assert!(self.depth > 0, "DepthLimit::ascend at depth 0");
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline]
    pub fn limit_hit(&self) -> bool {
        self.tripped
    }
}

#[cfg(debug_assertions)]
impl Drop for DepthLimit {
    fn drop(&mut self) {
        if !std::thread::panicking() && self.depth > 0 {
            panic!("DepthLimit dropped at depth {}", self.depth);
        }
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
