//! The type-indexed factory registry.
//!
//! [`Factory`] maps a [`TypeKey`] to a type-erased producer: a boxed
//! `Fn(&Factory) -> Result<T, Error>` stored behind `dyn Any`. The producer
//! receives the registry it lives in, which is how a factory with parameters
//! resolves them (see [`resolver`](crate::resolver)).
//!
//! Registration is write-once per type: registering the same type twice fails
//! with [`ErrorKind::DuplicateRegistration`](crate::ErrorKind) and leaves the
//! first registration in place. Entries are never replaced or removed.
//!
//! # Concurrency
//!
//! The map sits behind a [`Store`] (`RwLock`). Registration takes the write
//! lock; lookups take the read lock only long enough to clone the entry's
//! handle. Producers run with no lock held, so nested resolutions and
//! resolutions of unrelated types on other threads proceed in parallel.
//!
//! # Examples
//!
//! ```
//! use inject::Factory;
//!
//! struct C { value: i32 }
//! struct B { value: i32 }
//! struct A { value: i32 }
//!
//! let factory = Factory::new();
//! factory.register_type::<A, _, _>(|b: B| A { value: b.value + 1 }).unwrap();
//! factory.register_type::<B, _, _>(|c: C| B { value: c.value + 1 }).unwrap();
//! factory.register_type::<C, _, _>(|| C { value: 1 }).unwrap();
//!
//! assert_eq!(factory.resolve::<A>().unwrap().value, 3);
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "tracing")]
use tracing::{debug, info, trace};

use crate::error::Error;
use crate::resolve_guard::ResolveGuard;
use crate::resolver::Constructor;
use crate::runtime::{self, Shared, Store};
use crate::type_key::TypeKey;

/// Producer closure stored for a single type.
pub type Producer<T> = Box<dyn Fn(&Factory) -> Result<T, Error> + Send + Sync + 'static>;

static NEXT_REGISTRY: AtomicUsize = AtomicUsize::new(0);

struct Entry<T: 'static> {
    produce: Producer<T>,
}

/// Concurrent registry of factories, keyed by the type they produce.
pub struct Factory {
    /// Distinguishes this registry's frames on the resolve stack.
    id: usize,
    entries: Store<HashMap<TypeKey, Shared<dyn Any + Send + Sync>>>,
}

impl Factory {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            id: NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed),
            entries: Store::new(HashMap::new()),
        }
    }

    /// Registers `ctor` as the factory for `T`.
    ///
    /// Every resolution of `T` calls `ctor` again after resolving its
    /// parameters, so each caller receives a fresh value.
    pub fn register_type<T, Args, F>(&self, ctor: F) -> Result<(), Error>
    where
        T: 'static,
        Args: 'static,
        F: Constructor<Args, Output = T> + Send + Sync + 'static,
    {
        self.register_with::<T>(Box::new(move |factory: &Factory| ctor.construct(factory)))
    }

    /// Registers a raw producer for `T`.
    ///
    /// This is the primitive every other registration goes through; the
    /// producer is handed the registry so it can resolve whatever it needs.
    pub fn register_with<T: 'static>(&self, produce: Producer<T>) -> Result<(), Error> {
        let key = TypeKey::of::<T>();

        let mut entries = runtime::write(&self.entries);
        if entries.contains_key(&key) {
            return Err(Error::duplicate_registration(key.type_name()));
        }
        entries.insert(key, Shared::new(Entry { produce }));

        #[cfg(feature = "tracing")]
        info!(type_name = key.type_name(), key = key.id(), "Registered factory");

        Ok(())
    }

    /// Returns `true` if a factory producing `T` is registered.
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.contains(TypeKey::of::<T>())
    }

    /// Returns `true` if a factory is registered under `key`.
    pub fn contains(&self, key: TypeKey) -> bool {
        runtime::read(&self.entries).contains_key(&key)
    }

    /// Produces a value of `T`.
    ///
    /// Fails with `UnregisteredType` if nothing is registered for `T`, with
    /// `CyclicDependency` if this registry is already resolving `T` further
    /// up the current thread's chain, and otherwise with whatever the
    /// factory's own argument resolution returned.
    pub fn resolve<T: 'static>(&self) -> Result<T, Error> {
        let key = TypeKey::of::<T>();
        let _guard = ResolveGuard::push(self.id, key)?;

        #[cfg(feature = "tracing")]
        trace!(type_name = key.type_name(), depth = ResolveGuard::depth(), "Resolving");

        let entry = self.find_entry::<T>(key)?;
        (entry.produce)(self)
    }

    /// Resolves the parameters of `ctor` and invokes it, without registering
    /// anything.
    pub fn call<Args, F>(&self, ctor: F) -> Result<F::Output, Error>
    where
        F: Constructor<Args>,
    {
        #[cfg(feature = "tracing")]
        debug!(callable = std::any::type_name::<F>(), "Invoking ad hoc callable");

        ctor.construct(self)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        runtime::read(&self.entries).len()
    }

    /// Returns `true` if nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of every registered type, in allocation order.
    pub fn keys(&self) -> Vec<TypeKey> {
        let mut keys: Vec<TypeKey> = runtime::read(&self.entries).keys().copied().collect();
        keys.sort();
        keys
    }

    fn find_entry<T: 'static>(&self, key: TypeKey) -> Result<Shared<Entry<T>>, Error> {
        let any_entry = runtime::read(&self.entries)
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::unregistered_type(key.type_name()))?;

        any_entry
            .downcast::<Entry<T>>()
            .map_err(|_| Error::type_mismatch(key.type_name()))
    }
}

impl Default for Factory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.keys().iter().map(TypeKey::type_name).collect();
        f.debug_struct("Factory").field("registered", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn register_type_succeeds() {
        let factory = Factory::new();
        factory.register_type::<i32, _, _>(|| 1).unwrap();

        assert!(factory.is_registered::<i32>());
        assert!(!factory.is_registered::<i64>());
        assert_eq!(factory.len(), 1);
    }

    #[test]
    fn register_trait_object_succeeds() {
        trait Shape: Send + Sync {
            fn sides(&self) -> u32;
        }
        struct Square;
        impl Shape for Square {
            fn sides(&self) -> u32 {
                4
            }
        }

        let factory = Factory::new();
        factory
            .register_type::<Box<dyn Shape>, _, _>(|| Box::new(Square) as Box<dyn Shape>)
            .unwrap();

        assert!(factory.is_registered::<Box<dyn Shape>>());
        assert_eq!(factory.resolve::<Box<dyn Shape>>().unwrap().sides(), 4);
    }

    #[test]
    fn register_type_duplicate_fails() {
        let factory = Factory::new();
        factory.register_type::<i32, _, _>(|| 1).unwrap();

        let err = factory.register_type::<i32, _, _>(|| 2).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateRegistration);
        assert!(err.message.contains("i32"));

        // The first registration is untouched.
        assert_eq!(factory.resolve::<i32>().unwrap(), 1);
        assert_eq!(factory.len(), 1);
    }

    #[test]
    fn resolve_succeeds() {
        let factory = Factory::new();
        factory.register_type::<i32, _, _>(|| 1).unwrap();

        let result: i32 = factory.resolve().unwrap();
        assert_eq!(result, 1);
    }

    #[test]
    fn resolve_repeat_is_transient() {
        let factory = Factory::new();
        let count = Shared::new(AtomicUsize::new(0));
        let counter = Shared::clone(&count);
        factory
            .register_type::<Box<usize>, _, _>(move || {
                Box::new(counter.fetch_add(1, Ordering::SeqCst) + 1)
            })
            .unwrap();

        let first = factory.resolve::<Box<usize>>().unwrap();
        let second = factory.resolve::<Box<usize>>().unwrap();

        assert_eq!(*first, 1);
        assert_eq!(*second, 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn resolve_not_registered() {
        struct Unknown;

        let factory = Factory::new();
        let err = factory.resolve::<Unknown>().map(|_| ()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnregisteredType);
        assert!(err.message.contains("Unknown"));
    }

    #[test]
    fn resolve_args_succeeds() {
        let factory = Factory::new();
        factory
            .register_type::<String, _, _>(|ch: char, f: f32| format!("Char: {ch}, Float: {f}"))
            .unwrap();
        factory.register_type::<char, _, _>(|| 'a').unwrap();
        factory.register_type::<f32, _, _>(|| 3.142).unwrap();

        assert_eq!(factory.resolve::<String>().unwrap(), "Char: a, Float: 3.142");
    }

    #[test]
    fn nested_failure_propagates_unchanged() {
        struct Leaf;
        struct Middle;
        struct Top;

        let factory = Factory::new();
        factory.register_type::<Top, _, _>(|_: Middle| Top).unwrap();
        factory.register_type::<Middle, _, _>(|_: Leaf| Middle).unwrap();

        let err = factory.resolve::<Top>().map(|_| ()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnregisteredType);
        assert!(err.message.contains("Leaf"));
        assert!(!err.message.contains("Top"));
    }

    #[test]
    fn cycle_fails_fast() {
        struct Ping;
        struct Pong;

        let factory = Factory::new();
        factory.register_type::<Ping, _, _>(|_: Pong| Ping).unwrap();
        factory.register_type::<Pong, _, _>(|_: Ping| Pong).unwrap();

        let err = factory.resolve::<Ping>().map(|_| ()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CyclicDependency);
        assert!(err.message.contains("Ping -> "));
        assert_eq!(ResolveGuard::depth(), 0);
    }

    #[test]
    fn delegating_to_another_registry_is_not_a_cycle() {
        let parent = Shared::new(Factory::new());
        parent.register_type::<u32, _, _>(|| 5).unwrap();

        let child = Factory::new();
        let upstream = Shared::clone(&parent);
        child
            .register_with::<u32>(Box::new(move |_: &Factory| upstream.resolve::<u32>()))
            .unwrap();

        assert_eq!(child.resolve::<u32>().unwrap(), 5);
        assert_eq!(ResolveGuard::depth(), 0);
    }

    #[test]
    fn call_resolves_parameters_without_registering() {
        let factory = Factory::new();
        factory.register_type::<u8, _, _>(|| 40).unwrap();

        let total = factory.call(|n: u8| u32::from(n) + 2).unwrap();
        assert_eq!(total, 42);
        assert_eq!(factory.len(), 1);
    }

    #[test]
    fn call_accepts_borrowing_closures() {
        let factory = Factory::new();
        factory.register_type::<u8, _, _>(|| 2).unwrap();

        let base = String::from("x");
        let repeated = factory.call(|n: u8| base.repeat(n.into())).unwrap();
        assert_eq!(repeated, "xx");
    }

    #[test]
    fn registration_from_inside_a_factory() {
        let factory = Factory::new();
        factory
            .register_with::<u16>(Box::new(|factory: &Factory| -> Result<u16, Error> {
                factory.register_type::<u8, _, _>(|| 9)?;
                Ok(u16::from(factory.resolve::<u8>()?))
            }))
            .unwrap();

        assert_eq!(factory.resolve::<u16>().unwrap(), 9);
        assert!(factory.is_registered::<u8>());
    }

    #[test]
    fn debug_lists_registered_types() {
        let factory = Factory::new();
        factory.register_type::<u64, _, _>(|| 0).unwrap();

        let debug = format!("{factory:?}");
        assert!(debug.contains("Factory"));
        assert!(debug.contains("u64"));
    }
}
