//=========================================================================
// Object Lifetime
//=========================================================================
//
// Manual reference counting plus deferred destruction.
//
//   Shared<T>    → atomic count, explicit or pool-tracked
//   ReleasePool  → destroys released objects at the end-of-tick safe point
//   PoolHandle   → cloneable, thread-safe registration into a pool
//
//=========================================================================

pub mod ref_counted;
pub mod release_pool;

pub use ref_counted::{RefCount, Shared};
pub use release_pool::{PoolHandle, ReleasePool};
