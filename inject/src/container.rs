//! The dependency injection container.
//!
//! [`Container`] owns a [`Factory`] and adds the registration modes on top of
//! it. Every mode ends up as one entry in the same registry, so they share its
//! contracts: one registration per type, `UnregisteredType` when nothing is
//! registered, and errors from nested resolution propagated unchanged.
//!
//! # Registration modes
//!
//! | Method                | Registered under | Behaviour                                           |
//! |-----------------------|------------------|-----------------------------------------------------|
//! | [`register_type`]     | `T`              | transient: the factory runs on every resolve        |
//! | [`register_cached`]   | `T`              | the factory runs once; every resolve gets a clone   |
//! | [`register_shared`]   | `Shared<T>`      | one published handle, shared by every resolve       |
//! | [`register_unique`]   | `Box<T>`         | transient, uniquely owned                           |
//! | [`register_instance`] | `Shared<T>`      | an already-built handle, shared by every resolve    |
//!
//! Cached and shared registrations differ under contention. A cached factory
//! runs exactly once and concurrent resolvers wait for it. A shared factory
//! never makes anyone wait: two threads that both find the singleton missing
//! may both run the factory, but only the first handle published is kept and
//! returned to everybody; the other is dropped. See [`cache`](crate::cache).
//!
//! [`register_type`]: Container::register_type
//! [`register_cached`]: Container::register_cached
//! [`register_shared`]: Container::register_shared
//! [`register_unique`]: Container::register_unique
//! [`register_instance`]: Container::register_instance
//!
//! # Examples
//!
//! ```
//! use inject::{Container, Shared};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "Hello".to_string()
//!     }
//! }
//!
//! let container = Container::new();
//! container
//!     .register_shared::<dyn Greeter, _, _>(|| Shared::new(English) as Shared<dyn Greeter>)
//!     .unwrap();
//! container
//!     .register_type::<String, _, _>(|g: Shared<dyn Greeter>| format!("{}, world", g.greet()))
//!     .unwrap();
//!
//! assert_eq!(container.resolve::<String>().unwrap(), "Hello, world");
//! ```

use std::fmt;

#[cfg(feature = "tracing")]
use tracing::{debug, info};

use crate::cache::{SharedCell, ValueCell};
use crate::error::Error;
use crate::factory::Factory;
use crate::resolver::Constructor;
use crate::runtime::Shared;

/// Type-indexed container of transient, cached and shared registrations.
///
/// The container is `Send + Sync`; wrap it in a [`Shared`] to resolve from
/// several threads. Dropping it drops every factory and cached value it holds;
/// shared singletons live on for as long as someone still holds a handle.
pub struct Container {
    factory: Factory,
}

impl Container {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self {
            factory: Factory::new(),
        }
    }

    /// Registers a transient factory for `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use inject::Container;
    ///
    /// let container = Container::new();
    /// container.register_type::<Vec<u8>, _, _>(|| vec![1, 2, 3]).unwrap();
    ///
    /// assert_eq!(container.resolve::<Vec<u8>>().unwrap(), [1, 2, 3]);
    /// ```
    pub fn register_type<T, Args, F>(&self, ctor: F) -> Result<(), Error>
    where
        T: 'static,
        Args: 'static,
        F: Constructor<Args, Output = T> + Send + Sync + 'static,
    {
        self.factory.register_type::<T, Args, F>(ctor)
    }

    /// Registers `T` so that its factory runs at most once.
    ///
    /// The first resolve runs the factory and stores the result; concurrent
    /// resolvers block until it is stored. Every resolve returns a clone of the
    /// stored value. A factory that fails stores nothing, so the next resolve
    /// tries again.
    ///
    /// # Examples
    ///
    /// ```
    /// use inject::Container;
    /// use std::sync::atomic::{AtomicU32, Ordering};
    ///
    /// static CALLS: AtomicU32 = AtomicU32::new(0);
    ///
    /// let container = Container::new();
    /// container
    ///     .register_cached::<u32, _, _>(|| CALLS.fetch_add(1, Ordering::SeqCst) + 1)
    ///     .unwrap();
    ///
    /// assert_eq!(container.resolve::<u32>().unwrap(), 1);
    /// assert_eq!(container.resolve::<u32>().unwrap(), 1);
    /// ```
    pub fn register_cached<T, Args, F>(&self, ctor: F) -> Result<(), Error>
    where
        T: Clone + Send + Sync + 'static,
        Args: 'static,
        F: Constructor<Args, Output = T> + Send + Sync + 'static,
    {
        #[cfg(feature = "tracing")]
        info!(type_name = std::any::type_name::<T>(), "Registering cached factory");

        let cell = ValueCell::new();
        self.factory
            .register_with::<T>(Box::new(move |factory: &Factory| {
                cell.get_or_init(|| {
                    #[cfg(feature = "tracing")]
                    debug!(type_name = std::any::type_name::<T>(), "Computing cached value");

                    ctor.construct(factory)
                })
            }))
    }

    /// Registers a shared singleton of `T`, resolvable as `Shared<T>`.
    ///
    /// `ctor` returns the handle; `T` may be a trait object, in which case the
    /// factory casts its concrete handle (`Shared::new(x) as Shared<dyn Trait>`).
    pub fn register_shared<T, Args, F>(&self, ctor: F) -> Result<(), Error>
    where
        T: ?Sized + Send + Sync + 'static,
        Args: 'static,
        F: Constructor<Args, Output = Shared<T>> + Send + Sync + 'static,
    {
        #[cfg(feature = "tracing")]
        info!(type_name = std::any::type_name::<T>(), "Registering shared singleton");

        let cell = SharedCell::<T>::new();
        self.factory
            .register_with::<Shared<T>>(Box::new(move |factory: &Factory| {
                cell.get_or_publish(|| {
                    #[cfg(feature = "tracing")]
                    debug!(type_name = std::any::type_name::<T>(), "Building shared candidate");

                    ctor.construct(factory)
                })
            }))
    }

    /// Registers a transient factory of uniquely owned `T`, resolvable as
    /// `Box<T>`.
    pub fn register_unique<T, Args, F>(&self, ctor: F) -> Result<(), Error>
    where
        T: ?Sized + 'static,
        Args: 'static,
        F: Constructor<Args, Output = Box<T>> + Send + Sync + 'static,
    {
        self.factory.register_type::<Box<T>, Args, F>(ctor)
    }

    /// Registers an already-built handle as the shared singleton of `T`.
    pub fn register_instance<T>(&self, instance: Shared<T>) -> Result<(), Error>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        #[cfg(feature = "tracing")]
        info!(type_name = std::any::type_name::<T>(), "Registering shared instance");

        self.factory
            .register_with::<Shared<T>>(Box::new(move |_: &Factory| {
                Ok::<_, Error>(Shared::clone(&instance))
            }))
    }

    /// Returns `true` if a factory for `T` is registered in any mode.
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.factory.is_registered::<T>()
    }

    /// Returns `true` if `T` was registered with
    /// [`register_shared`](Container::register_shared) or
    /// [`register_instance`](Container::register_instance).
    pub fn is_registered_shared<T: ?Sized + 'static>(&self) -> bool {
        self.is_registered::<Shared<T>>()
    }

    /// Returns `true` if `T` was registered with
    /// [`register_unique`](Container::register_unique).
    pub fn is_registered_unique<T: ?Sized + 'static>(&self) -> bool {
        self.is_registered::<Box<T>>()
    }

    /// Produces a `T`, resolving its factory's parameters first.
    pub fn resolve<T: 'static>(&self) -> Result<T, Error> {
        self.factory.resolve::<T>()
    }

    /// Returns the shared singleton of `T`, building it on first use.
    pub fn resolve_shared<T: ?Sized + 'static>(&self) -> Result<Shared<T>, Error> {
        self.resolve::<Shared<T>>()
    }

    /// Produces a fresh, uniquely owned `T`.
    pub fn resolve_unique<T: ?Sized + 'static>(&self) -> Result<Box<T>, Error> {
        self.resolve::<Box<T>>()
    }

    /// Like [`resolve`](Container::resolve), but any failure becomes `None`.
    pub fn optional_resolve<T: 'static>(&self) -> Option<T> {
        self.resolve::<T>().ok()
    }

    /// Resolves the parameters of `ctor` and invokes it once, without
    /// registering anything. Handy for composition roots.
    ///
    /// # Examples
    ///
    /// ```
    /// use inject::Container;
    ///
    /// let container = Container::new();
    /// container.register_type::<u16, _, _>(|| 8080).unwrap();
    /// container.register_type::<String, _, _>(|| "localhost".to_string()).unwrap();
    ///
    /// let addr = container.call(|host: String, port: u16| format!("{host}:{port}")).unwrap();
    /// assert_eq!(addr, "localhost:8080");
    /// ```
    pub fn call<Args, F>(&self, ctor: F) -> Result<F::Output, Error>
    where
        F: Constructor<Args>,
    {
        self.factory.call(ctor)
    }

    /// The underlying registry, for raw producers and introspection.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Mutable access to the underlying registry.
    pub fn factory_mut(&mut self) -> &mut Factory {
        &mut self.factory
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("factory", &self.factory)
            .finish()
    }
}
