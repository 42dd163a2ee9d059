use alloc::sync::Arc;
use core::marker::PhantomData;

use crate::{
    annotation::Annotation, dependency_resolver::DependencyResolver, injector::KeyProvider, key::Key, Injector,
    ResolveErrorKind,
};

/// Instance bound to the unqualified key of `Dep`
pub struct Inject<Dep: ?Sized>(pub Arc<Dep>);

impl<Dep: ?Sized + Send + Sync + 'static> DependencyResolver for Inject<Dep> {
    type Error = ResolveErrorKind;

    fn resolve(injector: &Injector) -> Result<Self, Self::Error> {
        injector.get().map(Self)
    }
}

/// Instance bound to the key of `Dep` qualified with the annotation type `A`
pub struct InjectWith<Dep: ?Sized, A>(pub Arc<Dep>, pub PhantomData<A>);

impl<Dep: ?Sized + Send + Sync + 'static, A: Annotation> DependencyResolver for InjectWith<Dep, A> {
    type Error = ResolveErrorKind;

    fn resolve(injector: &Injector) -> Result<Self, Self::Error> {
        injector
            .get_key(&Key::<Dep>::annotated_with::<A>())
            .map(|dependency| Self(dependency, PhantomData))
    }
}

/// Provider of the unqualified key of `Dep`, resolved lazily on each [`KeyProvider::get`]
pub struct InjectProvider<Dep: ?Sized>(pub KeyProvider<Dep>);

impl<Dep: ?Sized + Send + Sync + 'static> DependencyResolver for InjectProvider<Dep> {
    type Error = ResolveErrorKind;

    fn resolve(injector: &Injector) -> Result<Self, Self::Error> {
        Ok(Self(injector.get_provider(Key::of())))
    }
}
