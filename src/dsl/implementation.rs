use alloc::sync::Arc;

use super::scope::ScopeRef;
use crate::{
    annotation::{Annotation, Qualifier},
    any::Upcast,
    binder::{AnnotatedBindingBuilder, LinkedBindingBuilder, ScopedBindingBuilder},
    dependency_resolver::DependencyResolver,
    instantiator::{Injectable, Instantiator},
    key::{Key, TypeLiteral},
    provider::{provider_fn, Provider},
};

fn apply_scope(builder: ScopedBindingBuilder<'_>, scope: Option<ScopeRef>) {
    match scope {
        Some(ScopeRef::Instance(scope)) => builder.in_scope(scope),
        Some(ScopeRef::Annotation(annotation)) => builder.in_scope_annotation(annotation),
        None => {}
    }
}

/// Target declarations of a binding.
///
/// Each target except [`Self::to_instance`] is scoped with the ambient scope of the declaring [`super::BindingScope`].
pub trait ImplementationBinding<'a, T: ?Sized + Send + Sync + 'static>: Sized {
    /// Finishes the key of the binding
    #[doc(hidden)]
    fn build(self) -> (LinkedBindingBuilder<'a, T>, Option<ScopeRef>);

    /// Links to `I`, constructed with [`Injectable::construct`] unless it has its own binding
    fn to<I: Injectable + Upcast<T>>(self) {
        let (builder, scope) = self.build();
        apply_scope(builder.to::<I>(), scope);
    }

    fn to_literal<I: Injectable + Upcast<T>>(self, literal: TypeLiteral<I>) {
        let (builder, scope) = self.build();
        apply_scope(builder.to_literal(literal), scope);
    }

    fn to_key<I: ?Sized + Upcast<T> + Send + Sync + 'static>(self, key: Key<I>) {
        let (builder, scope) = self.build();
        apply_scope(builder.to_key(key), scope);
    }

    fn to_provider<P: Provider<T>>(self, provider: P) {
        let (builder, scope) = self.build();
        apply_scope(builder.to_provider(provider), scope);
    }

    /// Provides instances with a closure, which may return the value itself, an `Arc` or a `Box` of it
    fn to_provider_fn<F, R>(self, provider: F)
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Into<Arc<T>>,
    {
        self.to_provider(provider_fn(provider));
    }

    fn to_provider_type<P: Provider<T> + Injectable>(self) {
        let (builder, scope) = self.build();
        apply_scope(builder.to_provider_type::<P>(), scope);
    }

    fn to_provider_key<P: ?Sized + Provider<T>>(self, key: Key<P>) {
        let (builder, scope) = self.build();
        apply_scope(builder.to_provider_key(key), scope);
    }

    /// Binds to a single instance, never scoped
    fn to_instance(self, instance: impl Into<Arc<T>>) {
        let (builder, _) = self.build();
        builder.to_instance(instance);
    }

    fn to_constructor<Inst, Deps>(self, instantiator: Inst)
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Upcast<T>,
        Deps: DependencyResolver,
    {
        let (builder, scope) = self.build();
        apply_scope(builder.to_constructor(instantiator), scope);
    }

    fn to_constructor_typed<Inst, Deps>(self, instantiator: Inst, literal: TypeLiteral<Inst::Provides>)
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Upcast<T>,
        Deps: DependencyResolver,
    {
        let (builder, scope) = self.build();
        apply_scope(builder.to_constructor_typed(instantiator, literal), scope);
    }
}

/// Declaration of a binding of an explicit key
pub struct KeyBinding<'a, T: ?Sized> {
    builder: LinkedBindingBuilder<'a, T>,
    scope: Option<ScopeRef>,
}

impl<'a, T: ?Sized> KeyBinding<'a, T> {
    #[inline]
    #[must_use]
    pub(crate) fn new(builder: LinkedBindingBuilder<'a, T>, scope: Option<ScopeRef>) -> Self {
        Self { builder, scope }
    }
}

impl<'a, T: ?Sized + Send + Sync + 'static> ImplementationBinding<'a, T> for KeyBinding<'a, T> {
    #[inline]
    fn build(self) -> (LinkedBindingBuilder<'a, T>, Option<ScopeRef>) {
        (self.builder, self.scope)
    }
}

/// How the type of a [`TypeBinding`] was given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Literal,
}

/// Declaration of a binding of a type, optionally annotated.
///
/// Annotating again replaces the previous annotation, whether it was an instance or a type.
/// The annotation applies once a target is set.
pub struct TypeBinding<'a, T: ?Sized> {
    builder: AnnotatedBindingBuilder<'a, T>,
    kind: TypeKind,
    annotation: Option<Qualifier>,
    scope: Option<ScopeRef>,
}

impl<'a, T: ?Sized + Send + Sync + 'static> TypeBinding<'a, T> {
    #[inline]
    #[must_use]
    pub(crate) fn new(builder: AnnotatedBindingBuilder<'a, T>, kind: TypeKind, scope: Option<ScopeRef>) -> Self {
        Self {
            builder,
            kind,
            annotation: None,
            scope,
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn annotated_with(mut self, annotation: impl Annotation) -> Self {
        self.annotation = Some(Qualifier::of_instance(annotation));
        self
    }

    #[inline]
    #[must_use]
    pub fn annotated_with_type<A: Annotation>(mut self) -> Self {
        self.annotation = Some(Qualifier::of_type::<A>());
        self
    }
}

impl<'a, T: ?Sized + Send + Sync + 'static> ImplementationBinding<'a, T> for TypeBinding<'a, T> {
    fn build(self) -> (LinkedBindingBuilder<'a, T>, Option<ScopeRef>) {
        let builder = match self.annotation {
            Some(qualifier) => self.builder.qualified(qualifier),
            None => self.builder.linked(),
        };
        (builder, self.scope)
    }
}
