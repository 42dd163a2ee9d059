use alloc::sync::Arc;
use core::ops::{Deref, DerefMut};

use super::{
    constant::ConstantBinding,
    implementation::{KeyBinding, TypeBinding, TypeKind},
    scope::{ScopeBinding, ScopeRef},
};
use crate::{
    annotation::Annotation,
    any::TypeInfo,
    binder::Binder,
    instantiator::Injectable,
    key::{Key, TypeLiteral},
    scope::Scope,
};

/// Declaration context with an optional ambient scope, applied to every targetted binding declared in it
pub struct BindingScope<'a> {
    binder: &'a mut Binder,
    scope: Option<ScopeRef>,
}

impl<'a> BindingScope<'a> {
    #[inline]
    #[must_use]
    pub(crate) fn new(binder: &'a mut Binder, scope: Option<ScopeRef>) -> Self {
        Self { binder, scope }
    }

    #[inline]
    #[must_use]
    pub const fn ambient_scope(&self) -> Option<&ScopeRef> {
        self.scope.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn constant(&mut self) -> ConstantBinding<'_> {
        ConstantBinding::new(self.binder)
    }

    /// Declares a binding of `T`.
    /// Until a target is set, the binding is untargetted, unannotated and unscoped
    #[inline]
    #[track_caller]
    pub fn ty<T: ?Sized + Send + Sync + 'static>(&mut self) -> TypeBinding<'_, T> {
        TypeBinding::new(self.binder.bind::<T>(), TypeKind::Class, self.scope.clone())
    }

    #[inline]
    #[track_caller]
    pub fn ty_literal<T: ?Sized + Send + Sync + 'static>(&mut self, literal: TypeLiteral<T>) -> TypeBinding<'_, T> {
        TypeBinding::new(self.binder.bind_literal(literal), TypeKind::Literal, self.scope.clone())
    }

    #[inline]
    #[track_caller]
    pub fn ty_key<T: ?Sized + Send + Sync + 'static>(&mut self, key: Key<T>) -> KeyBinding<'_, T> {
        KeyBinding::new(self.binder.bind_key(key), self.scope.clone())
    }

    /// Declares a binding of `T` to its own constructor, with the ambient scope
    #[track_caller]
    pub fn injectable<T: Injectable>(&mut self) {
        let builder = self.binder.bind_injectable::<T>();
        match self.scope.clone() {
            Some(ScopeRef::Instance(scope)) => builder.in_scope(scope),
            Some(ScopeRef::Annotation(annotation)) => builder.in_scope_annotation(annotation),
            None => {}
        }
    }

    #[inline]
    pub fn binder(&mut self) -> &mut Binder {
        self.binder
    }
}

/// Outermost declaration context.
/// Only it declares scopes and opens nested contexts, so a nested context can't be scoped again
pub struct DefaultBindingScope<'a> {
    scope: BindingScope<'a>,
}

impl<'a> DefaultBindingScope<'a> {
    #[inline]
    #[must_use]
    pub(crate) fn new(binder: &'a mut Binder) -> Self {
        Self {
            scope: BindingScope::new(binder, None),
        }
    }

    #[inline]
    #[must_use]
    pub fn scope_annotation<A: Annotation>(&mut self) -> ScopeBinding<'_> {
        ScopeBinding::new(self.scope.binder, TypeInfo::of::<A>())
    }

    /// Binds the scope annotation `A` to `scope`
    #[inline]
    #[track_caller]
    pub fn bind_scope<A: Annotation>(&mut self, scope: impl Scope) {
        self.scope.binder.bind_scope::<A>(scope);
    }

    /// Opens a nested context scoped with `scope`.
    /// The same scope instance scopes each binding separately
    pub fn scope(&mut self, scope: impl Scope, body: impl FnOnce(&mut BindingScope<'_>)) {
        let mut nested = BindingScope::new(self.scope.binder, Some(ScopeRef::Instance(Arc::new(scope))));
        body(&mut nested);
    }

    /// Opens a nested context scoped with the scope bound to the annotation `A`
    pub fn scope_annotated<A: Annotation>(&mut self, body: impl FnOnce(&mut BindingScope<'_>)) {
        let mut nested = BindingScope::new(self.scope.binder, Some(ScopeRef::Annotation(TypeInfo::of::<A>())));
        body(&mut nested);
    }
}

impl<'a> Deref for DefaultBindingScope<'a> {
    type Target = BindingScope<'a>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.scope
    }
}

impl DerefMut for DefaultBindingScope<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.scope
    }
}
