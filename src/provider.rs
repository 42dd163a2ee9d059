use alloc::sync::Arc;
use core::fmt::{self, Debug, Formatter};

use crate::{
    any::RcAny,
    errors::{InstantiateErrorKind, ResolveErrorKind},
    service::{service_fn, Service as _, SharedService},
    Injector,
};

/// Factory that supplies instances of `T` on demand
pub trait Provider<T: ?Sized>: Send + Sync + 'static {
    #[allow(clippy::missing_errors_doc)]
    fn get(&self) -> Result<Arc<T>, InstantiateErrorKind>;
}

/// Provider backed by a closure
#[derive(Clone)]
pub struct ProviderFn<F> {
    f: F,
}

impl<T, F, R> Provider<T> for ProviderFn<F>
where
    T: ?Sized,
    F: Fn() -> R + Send + Sync + 'static,
    R: Into<Arc<T>>,
{
    #[inline]
    fn get(&self) -> Result<Arc<T>, InstantiateErrorKind> {
        Ok((self.f)().into())
    }
}

/// Wraps a closure as a [`Provider`].
/// The closure may return the value itself, an `Arc` or a `Box` of it.
#[inline]
#[must_use]
pub const fn provider_fn<F>(f: F) -> ProviderFn<F> {
    ProviderFn { f }
}

/// Type-erased shared instance, as produced by bindings and consumed by scopes
#[derive(Clone)]
pub struct Erased(RcAny);

impl Erased {
    #[inline]
    #[must_use]
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self(Arc::new(value))
    }

    #[inline]
    #[must_use]
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.0.downcast_ref::<Arc<T>>().cloned()
    }

    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for Erased {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Erased").finish_non_exhaustive()
    }
}

/// Type-erased provider that resolves its dependencies from an injector.
///
/// Clones share state, so a provider wrapped by a scope caches for every clone.
#[derive(Clone)]
pub struct BoxedProvider(SharedService<Injector, Erased, ResolveErrorKind>);

impl BoxedProvider {
    #[inline]
    #[must_use]
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Injector) -> Result<Erased, ResolveErrorKind> + Send + Sync + 'static,
    {
        Self(SharedService::new(service_fn(f)))
    }

    /// Provider that always returns the same instance
    #[inline]
    #[must_use]
    pub fn instance(value: Erased) -> Self {
        Self::from_fn(move |_| Ok(value.clone()))
    }

    #[inline]
    #[allow(clippy::missing_errors_doc)]
    pub fn provide(&self, injector: &Injector) -> Result<Erased, ResolveErrorKind> {
        self.0.call(injector)
    }
}

impl Debug for BoxedProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedProvider").finish_non_exhaustive()
    }
}
