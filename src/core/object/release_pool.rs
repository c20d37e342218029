//=========================================================================
// Release Pool
//=========================================================================
//
// Deferred destruction for auto-release objects.
//
// Architecture:
//   PoolHandle (cloneable, Send) ──track/adopt──> inbox (crossbeam channel)
//        │                                             │
//        └──mark_for_release──> count - 1, dirty = true│
//                                                      ↓
//   ReleasePool::drain() ── absorb inbox ── destroy entries with count ≤ 0
//
// The inbox lets destructors (and worker threads) register objects while
// a drain is running without invalidating the scan.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::ref_counted::{RefCount, Shared};

//=== PoolEntry ===========================================================

/// Type-erased view of a tracked object.
pub(crate) trait PoolEntry: Send + Sync {
    fn id(&self) -> usize;
    fn ref_count(&self) -> i32;
    fn destroy(&self) -> bool;
}

impl<T: Send + Sync + 'static> PoolEntry for Shared<T> {
    fn id(&self) -> usize {
        Shared::id(self)
    }

    fn ref_count(&self) -> i32 {
        Shared::ref_count(self)
    }

    fn destroy(&self) -> bool {
        Shared::destroy(self)
    }
}

//=== PoolHandle ==========================================================

/// Cloneable, thread-safe access to a [`ReleasePool`].
///
/// Handles can be stored inside objects, moved to loader threads, or kept
/// by actors. Everything they register is picked up by the owning pool at
/// its next drain.
#[derive(Clone)]
pub struct PoolHandle {
    inbox: Sender<Box<dyn PoolEntry>>,
    dirty: Arc<AtomicBool>,
}

impl PoolHandle {
    /// Registers an existing object with the pool.
    ///
    /// Returns `false` if the object is already managed by a pool (this
    /// one included); tracking is idempotent per identity.
    pub fn track<T: Send + Sync + 'static>(&self, object: &Shared<T>) -> bool {
        if !object.attach_pool(self.clone()) {
            return false;
        }

        if self.inbox.send(Box::new(object.clone())).is_err() {
            warn!(target: "object::pool", "Release pool is gone, object {:#x} untracked", object.id());
            return false;
        }
        true
    }

    /// Creates an auto-release object (count 0) owned by the pool.
    ///
    /// Retain it to keep it alive across drains.
    pub fn adopt<T: Send + Sync + 'static>(&self, value: T) -> Shared<T> {
        let object = Shared::new_unretained(value);
        self.track(&object);
        object
    }

    /// Decrements the object's count and schedules a drain.
    ///
    /// Untracked objects are adopted by the pool first so that reaching
    /// zero here still leads to destruction. Returns the new count.
    pub fn mark_for_release<T: Send + Sync + 'static>(&self, object: &Shared<T>) -> i32 {
        if !object.is_pooled() {
            self.track(object);
        }
        let remaining = object.raw_decrement();
        self.notify();
        remaining.max(0)
    }

    /// Flags the pool so the next drain scans the tracked set.
    pub fn notify(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    pub(crate) fn release_tracked(&self, count: &RefCount) -> i32 {
        let remaining = count.decrement();
        self.notify();
        remaining.max(0)
    }
}

impl fmt::Debug for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolHandle")
            .field("dirty", &self.dirty.load(Ordering::Acquire))
            .finish()
    }
}

//=== ReleasePool =========================================================

/// Registry of objects pending destruction.
///
/// Owned by the engine context and drained once per tick. Entries whose
/// count rose above zero again before the drain survive it.
///
/// ```
/// use aetheric_stage::core::object::ReleasePool;
///
/// let mut pool = ReleasePool::new();
/// let texture = pool.handle().adopt("pixels");
/// texture.retain();
///
/// texture.release();               // count 0, destruction deferred
/// assert!(texture.is_alive());
///
/// assert_eq!(pool.drain(), 1);     // destroyed at the safe point
/// assert!(!texture.is_alive());
/// ```
pub struct ReleasePool {
    tracked: HashMap<usize, Box<dyn PoolEntry>>,
    inbox: Receiver<Box<dyn PoolEntry>>,
    handle: PoolHandle,
}

impl ReleasePool {
    //--- Construction -----------------------------------------------------

    /// Creates an empty pool.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            tracked: HashMap::new(),
            inbox: receiver,
            handle: PoolHandle {
                inbox: sender,
                dirty: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    /// Returns a cloneable handle to this pool.
    pub fn handle(&self) -> PoolHandle {
        self.handle.clone()
    }

    //--- Registration -----------------------------------------------------

    /// See [`PoolHandle::track`].
    pub fn track<T: Send + Sync + 'static>(&mut self, object: &Shared<T>) -> bool {
        let tracked = self.handle.track(object);
        self.absorb();
        tracked
    }

    /// See [`PoolHandle::adopt`].
    pub fn adopt<T: Send + Sync + 'static>(&mut self, value: T) -> Shared<T> {
        let object = self.handle.adopt(value);
        self.absorb();
        object
    }

    /// See [`PoolHandle::mark_for_release`].
    pub fn mark_for_release<T: Send + Sync + 'static>(&mut self, object: &Shared<T>) -> i32 {
        let remaining = self.handle.mark_for_release(object);
        self.absorb();
        remaining
    }

    //--- Drain ------------------------------------------------------------

    /// Destroys every tracked object whose count is ≤ 0.
    ///
    /// No-op unless something was released since the last drain. Returns
    /// the number of objects destroyed.
    pub fn drain(&mut self) -> usize {
        if !self.handle.dirty.swap(false, Ordering::AcqRel) {
            return 0;
        }

        self.absorb();

        let dead: Vec<usize> = self
            .tracked
            .values()
            .filter(|entry| entry.ref_count() <= 0)
            .map(|entry| entry.id())
            .collect();

        let mut destroyed = 0;
        for id in dead {
            if let Some(entry) = self.tracked.remove(&id) {
                // Destructors may register or release other objects; those
                // land in the inbox and the dirty flag respectively.
                if entry.destroy() {
                    destroyed += 1;
                }
            }
        }

        self.absorb();

        if destroyed > 0 {
            debug!(target: "object::pool", "Drained {} objects ({} still tracked)", destroyed, self.tracked.len());
        }
        destroyed
    }

    /// Destroys every tracked object regardless of its count.
    ///
    /// Only meant for engine teardown. Handles held elsewhere stay valid but
    /// report the object as no longer alive.
    pub fn clear(&mut self) -> usize {
        let mut destroyed = 0;

        loop {
            self.absorb();
            if self.tracked.is_empty() {
                break;
            }

            let entries: Vec<Box<dyn PoolEntry>> =
                self.tracked.drain().map(|(_, entry)| entry).collect();
            for entry in entries {
                if entry.destroy() {
                    destroyed += 1;
                }
            }
        }

        self.handle.dirty.store(false, Ordering::Release);

        if destroyed > 0 {
            debug!(target: "object::pool", "Cleared {} objects", destroyed);
        }
        destroyed
    }

    //--- Query API --------------------------------------------------------

    /// Number of objects currently tracked (including pending inbox items).
    pub fn len(&mut self) -> usize {
        self.absorb();
        self.tracked.len()
    }

    /// Returns `true` if nothing is tracked.
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the next drain will scan the tracked set.
    pub fn is_dirty(&self) -> bool {
        self.handle.dirty.load(Ordering::Acquire)
    }

    //--- Internal Helpers -------------------------------------------------

    fn absorb(&mut self) {
        while let Ok(entry) = self.inbox.try_recv() {
            self.tracked.entry(entry.id()).or_insert(entry);
        }
    }
}

impl Default for ReleasePool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ReleasePool {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for ReleasePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleasePool")
            .field("tracked", &self.tracked.len())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
