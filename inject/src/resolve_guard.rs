//! Thread-local stack guard for cyclic dependency detection.
//!
//! Each [`Factory::resolve`](crate::Factory::resolve) pushes a frame naming
//! the registry it runs on and the type it is about to build, and removes that
//! frame again when the guard drops. The stack therefore mirrors the chain of
//! nested resolutions running on the current thread. Pushing a frame that is
//! already on the stack means a factory asked its own registry, directly or
//! transitively, for the type it is producing; that fails with
//! [`ErrorKind::CyclicDependency`](crate::ErrorKind::CyclicDependency) instead
//! of recursing until the stack overflows.
//!
//! The same type requested from a different registry is a different frame, so
//! a child container whose factory delegates to a parent is not a cycle.
//!
//! # Example
//! ```
//! use inject::{ErrorKind, Factory};
//!
//! struct A;
//! struct B;
//!
//! let factory = Factory::new();
//! factory.register_type::<A, _, _>(|_: B| A).unwrap();
//! factory.register_type::<B, _, _>(|_: A| B).unwrap();
//!
//! let err = factory.resolve::<A>().map(|_| ()).unwrap_err();
//! assert_eq!(err.kind, ErrorKind::CyclicDependency);
//! ```

use std::cell::RefCell;

use crate::Error;
use crate::type_key::TypeKey;

thread_local! {
    static RESOLVE_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// One resolution in flight: the registry it runs on and the type it builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    registry: usize,
    key: TypeKey,
}

/// Guard that removes its frame from the thread-local stack on drop.
#[derive(Debug)]
pub struct ResolveGuard {
    frame: Frame,
}

impl ResolveGuard {
    /// Pushes `key`, resolved on `registry`, onto the current thread's stack.
    ///
    /// Returns `Err(Error::cyclic_dependency(..))` if the same registry is
    /// already resolving `key` further up the chain.
    pub(crate) fn push(registry: usize, key: TypeKey) -> Result<Self, Error> {
        let frame = Frame { registry, key };

        RESOLVE_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(start) = stack.iter().position(|f| *f == frame) {
                let chain: Vec<&str> = stack[start..]
                    .iter()
                    .chain(std::iter::once(&frame))
                    .map(|f| f.key.type_name())
                    .collect();
                return Err(Error::cyclic_dependency(&chain));
            }
            stack.push(frame);
            Ok(ResolveGuard { frame })
        })
    }

    /// Number of resolutions in flight on the current thread.
    pub fn depth() -> usize {
        RESOLVE_STACK.with(|stack| stack.borrow().len())
    }
}

impl Drop for ResolveGuard {
    fn drop(&mut self) {
        RESOLVE_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack.iter().rposition(|f| *f == self.frame) {
                stack.remove(pos);
            }
        });
    }
}
