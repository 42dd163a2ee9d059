use alloc::{boxed::Box, sync::Arc};
use tracing::debug;

use super::{
    dependency_resolver::DependencyResolver,
    errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
};
use crate::{
    any::Upcast,
    provider::{BoxedProvider, Erased},
};

/// Constructor of `Provides` from resolved dependencies
pub trait Instantiator<Deps>: Clone + 'static
where
    Deps: DependencyResolver,
{
    type Provides: Send + Sync + 'static;
    type Error: Into<InstantiateErrorKind>;

    fn instantiate(&mut self, dependencies: Deps) -> Result<Self::Provides, Self::Error>;
}

/// Type the injector knows how to construct without an explicit target.
///
/// # Examples
/// ```rust
/// use fluent_inject::{Inject, Injectable, InstantiateErrorKind};
///
/// struct Config;
/// struct Database;
///
/// impl Injectable for Database {
///     type Deps = (Inject<Config>,);
///
///     fn construct((Inject(_config),): Self::Deps) -> Result<Self, InstantiateErrorKind> {
///         Ok(Self)
///     }
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    type Deps: DependencyResolver + Send;

    #[allow(clippy::missing_errors_doc)]
    fn construct(dependencies: Self::Deps) -> Result<Self, InstantiateErrorKind>;
}

macro_rules! impl_instantiator {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, Err, $($ty,)*> Instantiator<($($ty,)*)> for F
        where
            F: FnMut($($ty,)*) -> Result<Response, Err> + Clone + 'static,
            Response: Send + Sync + 'static,
            Err: Into<InstantiateErrorKind>,
            $( $ty: DependencyResolver + Send, )*
        {
            type Provides = Response;
            type Error = Err;

            fn instantiate(&mut self, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self($($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_instantiator);

/// Boxes a constructor into a provider of `T`.
/// Injection listeners of the constructed type run before the instance is upcast.
#[must_use]
pub(crate) fn boxed_constructor<Inst, Deps, T>(instantiator: Inst) -> BoxedProvider
where
    Inst: Instantiator<Deps> + Send + Sync,
    Inst::Provides: Upcast<T>,
    Deps: DependencyResolver,
    T: ?Sized + Send + Sync + 'static,
{
    BoxedProvider::from_fn(move |injector| {
        let dependencies = match Deps::resolve(injector) {
            Ok(dependencies) => dependencies,
            Err(err) => return Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Deps(Box::new(err.into())))),
        };
        let dependency = match instantiator.clone().instantiate(dependencies) {
            Ok(dependency) => Arc::new(dependency),
            Err(err) => return Err(ResolveErrorKind::Instantiator(InstantiatorErrorKind::Factory(err.into()))),
        };

        injector.notify_injection(&*dependency);
        debug!("Constructed");

        Ok(Erased::new::<T>(<Inst::Provides as Upcast<T>>::upcast(dependency)))
    })
}

/// Constructor of an [`Injectable`] type
#[must_use]
pub(crate) fn injectable_constructor<I: Injectable>() -> BoxedProvider {
    boxed_constructor::<_, (I::Deps,), I>(|dependencies: I::Deps| I::construct(dependencies))
}
