//=========================================================================
// Reference-Counted Objects
//=========================================================================
//
// Manual, atomic reference counting for objects shared across subsystems
// (frames, frame sequences, host resources).
//
// Architecture:
//   Shared<T> ──Arc──> SharedInner { count, value: RwLock<Option<T>>, pool }
//
//   retain()  → count + 1
//   release() → count - 1 → ≤ 0 ? destroy now (explicit)
//                                 : mark in pool (pool-tracked)
//
// Cloning a `Shared<T>` copies the handle only. Ownership is expressed
// through `retain`/`release`, the value is destroyed exactly once.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

//=== Internal Dependencies ===============================================

use super::release_pool::PoolHandle;

//=== RefCount ============================================================

/// Atomic signed reference counter.
///
/// Reads never report a negative value, even if a caller over-releases.
#[derive(Debug, Default)]
pub struct RefCount(AtomicI32);

impl RefCount {
    /// Creates a counter starting at `initial`.
    pub const fn new(initial: i32) -> Self {
        Self(AtomicI32::new(initial))
    }

    /// Increments and returns the new count.
    pub fn increment(&self) -> i32 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Decrements and returns the new (raw) count.
    pub fn decrement(&self) -> i32 {
        self.0.fetch_sub(1, Ordering::AcqRel) - 1
    }

    /// Snapshot of the current count, clamped at zero.
    pub fn get(&self) -> i32 {
        self.0.load(Ordering::Acquire).max(0)
    }
}

//=== Shared ==============================================================

struct SharedInner<T> {
    count: RefCount,
    value: RwLock<Option<T>>,
    pool: OnceLock<PoolHandle>,
}

/// Handle to a manually reference-counted value.
///
/// Two creation paths exist:
///
/// - [`Shared::new`] creates an explicitly-owned object with count 1. The
///   release that brings the count to zero destroys the value immediately.
/// - [`PoolHandle::adopt`] creates an auto-release object with count 0 that
///   is tracked by a release pool. Releases only decrement; destruction
///   happens at the next pool drain if the count is still ≤ 0 then.
///
/// ```
/// use aetheric_stage::core::object::Shared;
///
/// let frame = Shared::new("frame");
/// assert_eq!(frame.retain(), 2);
/// assert_eq!(frame.release(), 1);
/// assert_eq!(frame.release(), 0);
/// assert!(!frame.is_alive());
/// ```
pub struct Shared<T> {
    inner: Arc<SharedInner<T>>,
}

impl<T> Shared<T> {
    //--- Construction -----------------------------------------------------

    /// Creates an explicitly-owned object (count starts at 1).
    pub fn new(value: T) -> Self {
        Self::with_count(value, 1)
    }

    pub(crate) fn new_unretained(value: T) -> Self {
        Self::with_count(value, 0)
    }

    fn with_count(value: T, count: i32) -> Self {
        Self {
            inner: Arc::new(SharedInner {
                count: RefCount::new(count),
                value: RwLock::new(Some(value)),
                pool: OnceLock::new(),
            }),
        }
    }

    //--- Reference Counting -----------------------------------------------

    /// Increments the reference count and returns the new value.
    pub fn retain(&self) -> i32 {
        self.inner.count.increment()
    }

    /// Decrements the reference count.
    ///
    /// Returns the new count, or 0 once the object is (or is scheduled to
    /// be) destroyed. Pool-tracked objects are destroyed by the pool's next
    /// drain rather than here.
    pub fn release(&self) -> i32 {
        if let Some(pool) = self.inner.pool.get() {
            return pool.release_tracked(&self.inner.count);
        }

        let remaining = self.inner.count.decrement();
        if remaining <= 0 {
            self.destroy();
            return 0;
        }
        remaining
    }

    /// Non-owning snapshot of the reference count.
    pub fn ref_count(&self) -> i32 {
        self.inner.count.get()
    }

    pub(crate) fn raw_decrement(&self) -> i32 {
        self.inner.count.decrement()
    }

    //--- Access -----------------------------------------------------------

    /// Returns `true` until the value has been destroyed.
    pub fn is_alive(&self) -> bool {
        self.inner
            .value
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Runs `f` against the value if it is still alive.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.inner.value.read().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(f)
    }

    /// Runs `f` against the value mutably if it is still alive.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.inner.value.write().unwrap_or_else(|e| e.into_inner());
        guard.as_mut().map(f)
    }

    /// Returns `true` if both handles refer to the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Stable identity of the object (address of the shared allocation).
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    //--- Lifetime ---------------------------------------------------------

    /// Destroys the value; returns `false` if it was already gone.
    ///
    /// The value is dropped after the lock is released so destructors may
    /// freely touch other shared objects.
    pub(crate) fn destroy(&self) -> bool {
        let taken = self
            .inner
            .value
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        match taken {
            Some(value) => {
                drop(value);
                true
            }
            None => false,
        }
    }

    pub(crate) fn attach_pool(&self, pool: PoolHandle) -> bool {
        self.inner.pool.set(pool).is_ok()
    }

    /// Returns `true` if a release pool manages this object's destruction.
    pub fn is_pooled(&self) -> bool {
        self.inner.pool.get().is_some()
    }
}

impl<T: Clone> Shared<T> {
    /// Clones the value out if it is still alive.
    pub fn get_cloned(&self) -> Option<T> {
        self.with(T::clone)
    }
}

//--- Trait Implementations -----------------------------------------------

impl<T> Clone for Shared<T> {
    /// Copies the handle. Does not retain.
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for Shared<T> {}

impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("id", &self.id())
            .field("ref_count", &self.ref_count())
            .field("alive", &self.is_alive())
            .field("pooled", &self.is_pooled())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
