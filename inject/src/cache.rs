//! Lazily computed, write-once cells backing the cached registration modes.
//!
//! Two cells with deliberately different guarantees:
//!
//! - [`ValueCell`] runs its producer **at most once**. The first caller
//!   computes the value while any concurrent caller blocks until it is stored;
//!   every caller then receives a clone of that one value.
//! - [`SharedCell`] never blocks on the producer. A caller that finds the cell
//!   empty runs the producer itself and tries to publish the resulting handle.
//!   If another thread published first, the freshly built candidate is dropped
//!   and the published handle returned. The producer may therefore run more
//!   than once under contention, but only one handle is ever published and
//!   every caller gets a handle to that same instance.
//!
//! In both cells a producer that returns an error publishes nothing: the cell
//! stays empty and the next caller runs the producer again.
//!
//! Once a cell holds a value it never changes.

use std::fmt;

use once_cell::sync::OnceCell;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::error::Error;
use crate::runtime::Shared;

/// Invoke-once cell for plain values.
pub struct ValueCell<T> {
    value: OnceCell<T>,
}

impl<T: Clone> ValueCell<T> {
    /// Creates an empty cell.
    pub fn new() -> Self {
        Self {
            value: OnceCell::new(),
        }
    }

    /// Returns a clone of the stored value, producing it first if needed.
    pub fn get_or_init<F>(&self, produce: F) -> Result<T, Error>
    where
        F: FnOnce() -> Result<T, Error>,
    {
        #[cfg(feature = "tracing")]
        if self.value.get().is_some() {
            trace!("Value cell hit");
        }

        self.value.get_or_try_init(produce).cloned()
    }

    /// The stored value, if it has been produced.
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T: Clone> Default for ValueCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ValueCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCell")
            .field("initialized", &self.value.get().is_some())
            .finish()
    }
}

/// Publish-once cell for shared handles.
///
/// `T` may be unsized, e.g. `SharedCell<dyn Trait>` holds a `Shared<dyn Trait>`.
pub struct SharedCell<T: ?Sized> {
    handle: OnceCell<Shared<T>>,
}

impl<T: ?Sized> SharedCell<T> {
    /// Creates an empty cell.
    pub fn new() -> Self {
        Self {
            handle: OnceCell::new(),
        }
    }

    /// Returns the published handle, producing and publishing a candidate
    /// first if the cell is empty.
    pub fn get_or_publish<F>(&self, produce: F) -> Result<Shared<T>, Error>
    where
        F: FnOnce() -> Result<Shared<T>, Error>,
    {
        if let Some(handle) = self.handle.get() {
            #[cfg(feature = "tracing")]
            trace!("Shared cell hit");

            return Ok(Shared::clone(handle));
        }

        let candidate = produce()?;

        match self.handle.try_insert(candidate) {
            Ok(published) => Ok(Shared::clone(published)),
            Err((published, _discarded)) => {
                #[cfg(feature = "tracing")]
                debug!("Shared cell lost publication race, discarding candidate");

                Ok(Shared::clone(published))
            }
        }
    }

    /// The published handle, if any.
    pub fn get(&self) -> Option<Shared<T>> {
        self.handle.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.get().is_some()
    }
}

impl<T: ?Sized> Default for SharedCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for SharedCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCell")
            .field("initialized", &self.handle.get().is_some())
            .finish()
    }
}
