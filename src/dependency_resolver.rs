use super::errors::ResolveErrorKind;
use crate::Injector;

pub trait DependencyResolver: Sized {
    type Error: Into<ResolveErrorKind>;

    fn resolve(injector: &Injector) -> Result<Self, Self::Error>;
}

impl DependencyResolver for Injector {
    type Error = ResolveErrorKind;

    #[inline]
    fn resolve(injector: &Injector) -> Result<Self, Self::Error> {
        Ok(injector.clone())
    }
}

macro_rules! impl_dependency_resolver {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_mut)]
        impl<$($ty,)*> DependencyResolver for ($($ty,)*)
        where
            $( $ty: DependencyResolver + Send, )*
        {
            type Error = ResolveErrorKind;

            #[inline]
            #[allow(unused_variables)]
            fn resolve(injector: &Injector) -> Result<Self, Self::Error> {
                Ok(($($ty::resolve(injector).map_err(Into::into)?,)*))
            }
        }
    };
}

all_the_tuples!(impl_dependency_resolver);
