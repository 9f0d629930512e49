//! Compile-time dependency injection.
//!
//! A provider owns the root dependencies (configuration, connections) of the
//! application. Every other type implements [`Build`] (usually via
//! `#[derive(Build)]`) and is constructed from the provider on demand. Built
//! values are cached by type, so each service is created exactly once per
//! provider and shared by everything that depends on it.

#[cfg(test)]
extern crate self as folio_di;

pub use folio_di_derive::Build;
pub use typemap::TypeMap;

mod macros;
mod typemap;

pub trait Provider: Sized {
    /// The cache of values that have already been built by this provider.
    fn cache(&mut self) -> &mut TypeMap;
}

#[diagnostic::on_unimplemented(
    message = "The type `{Self}` cannot be built using the provider `{P}`",
    note = "Add `{Self}` to the provider `{P}` or implement `Build` for `{Self}` and make sure \
            all dependencies are satisfied"
)]
pub trait Build<P: Provider>: Clone + 'static {
    fn build(provider: &mut P) -> Self;
}

pub trait Provide: Provider {
    fn provide<T: Build<Self>>(&mut self) -> T {
        T::build(self)
    }
}

impl<P: Provider> Provide for P {}
