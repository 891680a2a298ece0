//! Stable per-type identifiers used as registry keys.
//!
//! Every distinct `'static` type is assigned a small integer the first time
//! [`TypeKey::of`] is called for it. Ids are handed out from a process-wide
//! table in allocation order, so they are dense, never reused, and a key
//! allocated later always compares greater than one allocated earlier.
//!
//! Lookups go through a per-thread cache first, so once a thread has seen a
//! type it never touches the shared table for it again.
//!
//! Identity is nominal: `u32`, `Shared<u32>` and a `struct Meters(u32)` wrapper
//! are three different keys.
//!
//! # Examples
//!
//! ```
//! use inject::TypeKey;
//!
//! struct Meters(u32);
//!
//! assert_eq!(TypeKey::of::<u32>(), TypeKey::of::<u32>());
//! assert_ne!(TypeKey::of::<u32>(), TypeKey::of::<Meters>());
//! assert_eq!(TypeKey::of::<u32>().type_name(), "u32");
//! ```

use std::any::{TypeId, type_name};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use once_cell::sync::Lazy;

use crate::runtime::{self, Store};

static KEYS: Lazy<Store<HashMap<TypeId, TypeKey>>> = Lazy::new(|| Store::new(HashMap::new()));

thread_local! {
    static LOCAL_KEYS: RefCell<HashMap<TypeId, TypeKey>> = RefCell::new(HashMap::new());
}

/// Opaque, totally ordered identifier of a type.
///
/// Equality, ordering and hashing only look at the id; the type name is kept
/// for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: usize,
    name: &'static str,
}

impl TypeKey {
    /// Returns the key of `T`, allocating one on first use.
    pub fn of<T: ?Sized + 'static>() -> Self {
        let type_id = TypeId::of::<T>();

        if let Some(key) = LOCAL_KEYS.with(|local| local.borrow().get(&type_id).copied()) {
            return key;
        }

        let key = Self::allocate(type_id, type_name::<T>());
        LOCAL_KEYS.with(|local| local.borrow_mut().insert(type_id, key));
        key
    }

    fn allocate(type_id: TypeId, name: &'static str) -> Self {
        if let Some(key) = runtime::read(&KEYS).get(&type_id) {
            return *key;
        }

        let mut keys = runtime::write(&KEYS);
        // Ids are dense: the next id is the number of keys handed out so far.
        let next = keys.len();
        *keys.entry(type_id).or_insert(TypeKey { id: next, name })
    }

    /// The dense numeric id; earlier keys have smaller ids.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The type's name as reported by [`std::any::type_name`].
    pub fn type_name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({}: {})", self.id, self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Shared;

    struct Meters(#[allow(dead_code)] u32);
    type Alias = u64;

    #[test]
    fn same_type_same_key() {
        assert_eq!(TypeKey::of::<String>(), TypeKey::of::<String>());
        assert_eq!(TypeKey::of::<String>().id(), TypeKey::of::<String>().id());
    }

    #[test]
    fn distinct_types_distinct_keys() {
        let keys = [
            TypeKey::of::<u32>(),
            TypeKey::of::<Shared<u32>>(),
            TypeKey::of::<Box<u32>>(),
            TypeKey::of::<Meters>(),
        ];

        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn type_aliases_share_a_key() {
        assert_eq!(TypeKey::of::<Alias>(), TypeKey::of::<u64>());
    }

    #[test]
    fn later_keys_compare_greater() {
        struct First;
        struct Second;

        let first = TypeKey::of::<First>();
        let second = TypeKey::of::<Second>();
        assert!(first < second);
    }

    #[test]
    fn unsized_types_have_keys() {
        let key = TypeKey::of::<dyn fmt::Debug>();
        assert!(key.type_name().contains("Debug"));
        assert_ne!(key, TypeKey::of::<Shared<dyn fmt::Debug>>());
    }

    #[test]
    fn first_lookup_fills_the_thread_cache() {
        struct Fresh;

        let type_id = TypeId::of::<Fresh>();
        let cached = || LOCAL_KEYS.with(|local| local.borrow().get(&type_id).copied());

        assert_eq!(cached(), None);
        let key = TypeKey::of::<Fresh>();
        assert_eq!(cached(), Some(key));
        assert_eq!(runtime::read(&KEYS).get(&type_id), Some(&key));

        // Another thread starts with an empty cache but gets the same key.
        let other = std::thread::spawn(move || {
            let before = LOCAL_KEYS.with(|local| local.borrow().contains_key(&type_id));
            (before, TypeKey::of::<Fresh>())
        })
        .join()
        .unwrap();
        assert_eq!(other, (false, key));
    }

    #[test]
    fn keys_agree_across_threads() {
        struct Contended;

        let keys: Vec<TypeKey> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(TypeKey::of::<Contended>))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(keys.windows(2).all(|w| w[0] == w[1]));
    }
}
