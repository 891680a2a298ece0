//! Argument resolution for multi-parameter factories.
//!
//! A factory is any `Fn(A1, ..., An) -> R` (closure, `fn` item or function
//! pointer) with up to twelve parameters. [`Constructor::construct`] resolves
//! `A1` through `An` from the registry, left to right, and then calls the
//! function with them. The first parameter that fails to resolve stops the
//! walk and its error is returned unchanged.
//!
//! Because a parameter is resolved with the same
//! [`Factory::resolve`](crate::Factory::resolve) that serves top-level
//! requests, the factory signatures alone describe the dependency graph.
//!
//! Closures that take parameters need their parameter types spelled out,
//! since nothing else tells the compiler which types to resolve:
//!
//! ```
//! use inject::Factory;
//!
//! let factory = Factory::new();
//! factory.register_type::<u8, _, _>(|| 2).unwrap();
//! factory.register_type::<String, _, _>(|n: u8| "x".repeat(n.into())).unwrap();
//!
//! assert_eq!(factory.resolve::<String>().unwrap(), "xx");
//! ```

use crate::error::Error;
use crate::factory::Factory;

/// A callable whose parameters can all be resolved from a [`Factory`].
///
/// `Args` is the tuple of parameter types; it only exists to keep the
/// implementations for different arities apart and is inferred at the call
/// site. Registration additionally requires the callable to be
/// `Send + Sync + 'static`; [`Factory::call`] does not.
pub trait Constructor<Args> {
    type Output;

    /// Resolves every parameter and invokes the callable.
    fn construct(&self, factory: &Factory) -> Result<Self::Output, Error>;
}

macro_rules! impl_constructor {
    ($($arg:ident),*) => {
        impl<F, R, $($arg,)*> Constructor<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R,
            $($arg: 'static,)*
        {
            type Output = R;

            #[allow(non_snake_case, unused_variables)]
            fn construct(&self, factory: &Factory) -> Result<R, Error> {
                $(let $arg = factory.resolve::<$arg>()?;)*
                Ok(self($($arg),*))
            }
        }
    };
}

impl_constructor!();
impl_constructor!(A1);
impl_constructor!(A1, A2);
impl_constructor!(A1, A2, A3);
impl_constructor!(A1, A2, A3, A4);
impl_constructor!(A1, A2, A3, A4, A5);
impl_constructor!(A1, A2, A3, A4, A5, A6);
impl_constructor!(A1, A2, A3, A4, A5, A6, A7);
impl_constructor!(A1, A2, A3, A4, A5, A6, A7, A8);
impl_constructor!(A1, A2, A3, A4, A5, A6, A7, A8, A9);
impl_constructor!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10);
impl_constructor!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11);
impl_constructor!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::sync::Mutex;

    #[test]
    fn zero_arguments_invokes_directly() {
        let factory = Factory::new();
        let ctor = || 7u32;
        assert_eq!(ctor.construct(&factory).unwrap(), 7);
    }

    #[test]
    fn arguments_resolved_from_registry() {
        let factory = Factory::new();
        factory.register_type::<char, _, _>(|| 'a').unwrap();
        factory.register_type::<f32, _, _>(|| 3.142f32).unwrap();

        let ctor = |ch: char, f: f32| format!("Char: {ch}, Float: {f}");
        assert_eq!(ctor.construct(&factory).unwrap(), "Char: a, Float: 3.142");
    }

    #[test]
    fn fn_items_are_constructors() {
        fn double(n: u16) -> u32 {
            u32::from(n) * 2
        }

        let factory = Factory::new();
        factory.register_type::<u16, _, _>(|| 21).unwrap();
        assert_eq!(double.construct(&factory).unwrap(), 42);
    }

    #[test]
    fn arguments_resolved_left_to_right() {
        static ORDER: Mutex<Vec<&str>> = Mutex::new(Vec::new());

        let factory = Factory::new();
        factory
            .register_type::<u8, _, _>(|| {
                ORDER.lock().unwrap().push("u8");
                1
            })
            .unwrap();
        factory
            .register_type::<i8, _, _>(|| {
                ORDER.lock().unwrap().push("i8");
                -1
            })
            .unwrap();

        let ctor = |a: i8, b: u8, c: i8| i32::from(a) + i32::from(b) + i32::from(c);
        assert_eq!(ctor.construct(&factory).unwrap(), -1);
        assert_eq!(*ORDER.lock().unwrap(), ["i8", "u8", "i8"]);
    }

    #[test]
    fn first_failure_short_circuits() {
        struct Missing;
        struct AlsoMissing;

        let factory = Factory::new();
        let ctor = |_: Missing, _: AlsoMissing| ();

        let err = ctor.construct(&factory).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnregisteredType);
        assert!(err.message.contains("Missing"));
        assert!(!err.message.contains("AlsoMissing"));
    }

    #[test]
    fn twelve_arguments() {
        #[allow(clippy::too_many_arguments)]
        fn sum(
            a: u8,
            b: u8,
            c: u8,
            d: u8,
            e: u8,
            f: u8,
            g: u8,
            h: u8,
            i: u8,
            j: u8,
            k: u8,
            l: u8,
        ) -> u32 {
            [a, b, c, d, e, f, g, h, i, j, k, l]
                .iter()
                .map(|v| u32::from(*v))
                .sum()
        }

        let factory = Factory::new();
        factory.register_type::<u8, _, _>(|| 1).unwrap();

        assert_eq!(sum.construct(&factory).unwrap(), 12);
    }
}
