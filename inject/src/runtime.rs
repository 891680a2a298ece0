//! Runtime type definitions for shared ownership and the registry's backing store.
//!
//! The container is always usable from several threads at once, so these
//! aliases resolve to the thread-safe primitives:
//!
//! - [`Shared<T>`]: [`Arc<T>`], the handle type of shared-singleton registrations
//! - [`Store<T>`]: [`RwLock<T>`], the map guard (exclusive for registration,
//!   shared for lookups)
//!
//! Lock poisoning is tolerated by [`read`] and [`write`]: every value kept in a
//! [`Store`] is only ever inserted, never mutated in place, so a panic while a
//! guard was held cannot leave a half-written entry behind.
//!
//! # Examples
//!
//! ```
//! use inject::runtime::{self, Shared, Store};
//!
//! let store = Store::new(vec![1, 2, 3]);
//! runtime::write(&store).push(4);
//! assert_eq!(runtime::read(&store).len(), 4);
//!
//! let shared = Shared::new(store);
//! let clone = Shared::clone(&shared);
//! assert!(Shared::ptr_eq(&shared, &clone));
//! ```

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Reference-counted handle used for shared-singleton registrations.
pub type Shared<T> = Arc<T>;

/// Interior-mutable storage with shared reads and exclusive writes.
pub type Store<T> = RwLock<T>;

/// Acquires shared access to `store`.
pub fn read<T>(store: &Store<T>) -> RwLockReadGuard<'_, T> {
    store.read().unwrap_or_else(PoisonError::into_inner)
}

/// Acquires exclusive access to `store`.
pub fn write<T>(store: &Store<T>) -> RwLockWriteGuard<'_, T> {
    store.write().unwrap_or_else(PoisonError::into_inner)
}
