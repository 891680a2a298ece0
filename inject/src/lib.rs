//! # inject
//!
//! A type-indexed dependency injection container.
//!
//! Factories are registered by the type they produce and resolved later by
//! asking for that type. A factory that takes parameters gets each of them
//! resolved from the same container first, so the factory signatures alone
//! describe the dependency graph.
//!
//! ```
//! use inject::Container;
//!
//! #[derive(Clone)]
//! struct Config { url: String }
//! struct Client { url: String }
//!
//! let container = Container::new();
//! container.register_cached::<Config, _, _>(|| Config { url: "db://local".into() }).unwrap();
//! container.register_type::<Client, _, _>(|cfg: Config| Client { url: cfg.url }).unwrap();
//!
//! assert_eq!(container.resolve::<Client>().unwrap().url, "db://local");
//! ```
//!
//! ## Modules
//!
//! - [`type_key`]: per-type registry keys
//! - [`factory`]: the registry itself
//! - [`resolver`]: recursive argument resolution
//! - [`cache`]: the invoke-once and publish-once cells
//! - [`container`]: registration modes on top of the registry
//!
//! ## Feature Flags
//!
//! - `tracing` (default): registration, resolution and errors are logged with
//!   the `tracing` crate.

mod macros;

pub mod cache;
pub mod container;
pub mod error;
pub mod factory;
pub mod resolve_guard;
pub mod resolver;
pub mod runtime;
pub mod type_key;

pub use cache::*;
pub use container::*;
pub use error::*;
pub use factory::*;
pub use resolve_guard::*;
pub use resolver::*;
pub use runtime::{Shared, Store};
pub use type_key::*;
