//! Macros for registering several factories at once.
//!
//! - [`bind!`] registers one factory on an existing container, choosing the
//!   registration mode from a leading keyword.
//! - [`container!`] builds a new container from a list of `bind(...)` entries
//!   and returns `Result<Container, Error>`; the first failed registration
//!   aborts the build.
//!
//! # Example
//! ```
//! use inject::{Shared, container};
//!
//! trait Store: Send + Sync {
//!     fn name(&self) -> &str;
//! }
//!
//! struct Memory;
//!
//! impl Store for Memory {
//!     fn name(&self) -> &str {
//!         "memory"
//!     }
//! }
//!
//! let container = container! {
//!     bind(type u16 => || 8080)
//!     bind(cached String => |port: u16| format!("localhost:{port}"))
//!     bind(shared dyn Store => || Shared::new(Memory) as Shared<dyn Store>)
//!     bind(unique Vec<u8> => || Box::new(vec![0u8; 4]))
//!     bind(instance str => Shared::from("v1"))
//! }
//! .unwrap();
//!
//! assert_eq!(container.resolve::<String>().unwrap(), "localhost:8080");
//! assert_eq!(container.resolve_shared::<dyn Store>().unwrap().name(), "memory");
//! assert_eq!(container.resolve_unique::<Vec<u8>>().unwrap().len(), 4);
//! assert_eq!(&*container.resolve_shared::<str>().unwrap(), "v1");
//! ```

/// Registers a single factory on a container.
///
/// - `type T => factory`: transient factory for `T`.
/// - `cached T => factory`: factory for `T` that runs at most once.
/// - `shared T => factory`: shared singleton, resolved as `Shared<T>`.
/// - `unique T => factory`: transient `Box<T>`.
/// - `instance T => handle`: an existing `Shared<T>`.
///
/// Evaluates to the `Result<(), Error>` of the registration.
#[macro_export]
macro_rules! bind {
    ($container:expr, type $token:ty => $factory:expr) => {
        $container.register_type::<$token, _, _>($factory)
    };

    ($container:expr, cached $token:ty => $factory:expr) => {
        $container.register_cached::<$token, _, _>($factory)
    };

    ($container:expr, shared $token:ty => $factory:expr) => {
        $container.register_shared::<$token, _, _>($factory)
    };

    ($container:expr, unique $token:ty => $factory:expr) => {
        $container.register_unique::<$token, _, _>($factory)
    };

    ($container:expr, instance $token:ty => $instance:expr) => {
        $container.register_instance::<$token>($instance)
    };
}

/// Builds a container from a sequence of `bind(...)` entries.
#[macro_export]
macro_rules! container {
    (
        $(
            bind( $($stmt:tt)* )
        )*
    ) => {
        (|| -> ::core::result::Result<$crate::Container, $crate::Error> {
            let container = $crate::Container::new();

            $(
                $crate::bind!(container, $($stmt)*)?;
            )*

            ::core::result::Result::Ok(container)
        })()
    };
}
