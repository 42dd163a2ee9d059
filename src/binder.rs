use alloc::{boxed::Box, collections::BTreeMap, string::String, sync::Arc, vec::Vec};
use core::{
    fmt::{self, Debug, Formatter},
    marker::PhantomData,
    panic::Location,
};
use tracing::debug;

use crate::{
    annotation::{Annotation, Qualifier},
    any::{TypeInfo, Upcast},
    dependency_resolver::DependencyResolver,
    errors::ResolveErrorKind,
    injector::BindingInfo,
    instantiator::{boxed_constructor, injectable_constructor, Injectable, Instantiator},
    intercept::MethodInterceptor,
    key::{Key, KeyData, TypeLiteral},
    listener::{ProvisionListener, TypeListener},
    matcher::Matcher,
    provider::{BoxedProvider, Erased, Provider},
    scope::{Scope, Scoping},
};

/// Unit of binding declarations
pub trait Module {
    fn configure(&self, binder: &mut Binder);
}

impl<M: Module + ?Sized> Module for Box<M> {
    #[inline]
    fn configure(&self, binder: &mut Binder) {
        (**self).configure(binder);
    }
}

impl<M: Module + ?Sized> Module for &M {
    #[inline]
    fn configure(&self, binder: &mut Binder) {
        (**self).configure(binder);
    }
}

/// Reference from a binding to the key that supplies its instances
#[derive(Clone)]
pub struct Link {
    pub key: KeyData,
    pub(crate) adapt: fn(&KeyData, &Erased) -> Result<Erased, ResolveErrorKind>,
}

impl Debug for Link {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link").field("key", &self.key).finish_non_exhaustive()
    }
}

fn link_upcast<I, T>(key: &KeyData, source: &Erased) -> Result<Erased, ResolveErrorKind>
where
    I: ?Sized + Upcast<T> + Send + Sync + 'static,
    T: ?Sized + Send + Sync + 'static,
{
    match source.downcast::<I>() {
        Some(instance) => Ok(Erased::new::<T>(<I as Upcast<T>>::upcast(instance))),
        None => Err(ResolveErrorKind::IncorrectType {
            key: key.clone(),
            expected: TypeInfo::of::<I>(),
        }),
    }
}

fn link_provider<P, T>(key: &KeyData, source: &Erased) -> Result<Erased, ResolveErrorKind>
where
    P: ?Sized + Provider<T>,
    T: ?Sized + Send + Sync + 'static,
{
    let Some(provider) = source.downcast::<P>() else {
        return Err(ResolveErrorKind::IncorrectType {
            key: key.clone(),
            expected: TypeInfo::of::<P>(),
        });
    };
    provider.get().map(Erased::new::<T>).map_err(|source| ResolveErrorKind::Provision {
        key: key.clone(),
        source,
    })
}

/// What a binding supplies for its key
#[derive(Debug, Clone)]
pub enum Target {
    /// Constructor of the bound type itself
    Untargetted,
    /// Instances of another key
    Linked(Link),
    Instance(Erased),
    Provider(BoxedProvider),
    /// Provider instance bound to another key
    ProviderKey(Link),
    /// Constructor of the given type
    Constructor(TypeInfo, BoxedProvider),
}

/// Binding declaration recorded by a [`Binder`]
#[derive(Debug, Clone)]
pub struct BindingElement {
    pub key: KeyData,
    pub target: Target,
    pub scoping: Scoping,
    pub source: &'static Location<'static>,
}

/// Scope annotation declaration recorded by a [`Binder`]
#[derive(Clone)]
pub struct ScopeElement {
    pub annotation: TypeInfo,
    pub scope: Arc<dyn Scope>,
    pub source: &'static Location<'static>,
}

impl Debug for ScopeElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeElement")
            .field("annotation", &self.annotation)
            .field("scope", &self.scope.name())
            .field("source", &self.source)
            .finish()
    }
}

pub(crate) struct ConstructorElement {
    pub(crate) provider: BoxedProvider,
    pub(crate) source: &'static Location<'static>,
}

pub(crate) struct TypeListenerElement {
    pub(crate) matcher: Box<dyn Matcher<TypeInfo>>,
    pub(crate) listener: Arc<dyn TypeListener>,
}

pub(crate) struct ProvisionListenerElement {
    pub(crate) matcher: Box<dyn Matcher<BindingInfo>>,
    pub(crate) listeners: Vec<Arc<dyn ProvisionListener>>,
}

pub(crate) struct InterceptorElement {
    pub(crate) class_matcher: Box<dyn Matcher<TypeInfo>>,
    pub(crate) method_matcher: Box<dyn Matcher<str>>,
    pub(crate) interceptors: Vec<Arc<dyn MethodInterceptor>>,
}

/// Collects binding declarations of modules. See [`crate::Injector::create`] to assemble them
#[derive(Default)]
pub struct Binder {
    pub(crate) elements: Vec<BindingElement>,
    pub(crate) scopes: Vec<ScopeElement>,
    pub(crate) constructors: BTreeMap<TypeInfo, ConstructorElement>,
    pub(crate) type_listeners: Vec<TypeListenerElement>,
    pub(crate) provision_listeners: Vec<ProvisionListenerElement>,
    pub(crate) interceptors: Vec<InterceptorElement>,
    pub(crate) require_explicit_bindings: bool,
}

impl Binder {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an unqualified binding of `T`
    #[track_caller]
    pub fn bind<T: ?Sized + Send + Sync + 'static>(&mut self) -> AnnotatedBindingBuilder<'_, T> {
        let index = self.push(KeyData::unqualified(TypeInfo::of::<T>()), Location::caller());
        BindingBuilder::new(self, index)
    }

    #[track_caller]
    pub fn bind_literal<T: ?Sized + Send + Sync + 'static>(&mut self, _literal: TypeLiteral<T>) -> AnnotatedBindingBuilder<'_, T> {
        let index = self.push(KeyData::unqualified(TypeInfo::of::<T>()), Location::caller());
        BindingBuilder::new(self, index)
    }

    #[track_caller]
    pub fn bind_key<T: ?Sized + Send + Sync + 'static>(&mut self, key: Key<T>) -> LinkedBindingBuilder<'_, T> {
        let index = self.push(key.into_data(), Location::caller());
        BindingBuilder::new(self, index)
    }

    /// Declares a binding of `T` to its own constructor
    #[track_caller]
    pub fn bind_injectable<T: Injectable>(&mut self) -> ScopedBindingBuilder<'_> {
        let source = Location::caller();
        self.register_constructor::<T>(source);
        let index = self.push(KeyData::unqualified(TypeInfo::of::<T>()), source);
        ScopedBindingBuilder { binder: self, index }
    }

    #[track_caller]
    pub fn bind_constant(&mut self) -> AnnotatedConstantBindingBuilder<'_> {
        AnnotatedConstantBindingBuilder {
            binder: self,
            source: Location::caller(),
        }
    }

    /// Binds the scope annotation `A` to `scope`
    #[track_caller]
    pub fn bind_scope<A: Annotation>(&mut self, scope: impl Scope) {
        self.bind_scope_type(TypeInfo::of::<A>(), Arc::new(scope));
    }

    #[track_caller]
    pub fn bind_scope_type(&mut self, annotation: TypeInfo, scope: Arc<dyn Scope>) {
        debug!(%annotation, scope = scope.name(), "Scope declared");
        self.scopes.push(ScopeElement {
            annotation,
            scope,
            source: Location::caller(),
        });
    }

    /// Registers a listener of constructible types matched by `matcher`
    pub fn bind_listener(&mut self, matcher: impl Matcher<TypeInfo>, listener: impl TypeListener) {
        self.type_listeners.push(TypeListenerElement {
            matcher: Box::new(matcher),
            listener: Arc::new(listener),
        });
    }

    /// Registers listeners of provisions of bindings matched by `matcher`.
    /// Listeners are notified in registration order
    pub fn bind_provision_listeners<I>(&mut self, matcher: impl Matcher<BindingInfo>, listeners: I)
    where
        I: IntoIterator<Item = Arc<dyn ProvisionListener>>,
    {
        self.provision_listeners.push(ProvisionListenerElement {
            matcher: Box::new(matcher),
            listeners: listeners.into_iter().collect(),
        });
    }

    /// Registers interceptors of methods matched by `method_matcher` declared by types matched by `class_matcher`.
    /// See [`crate::Injector::intercept`] for the join point
    pub fn bind_interceptor<I>(&mut self, class_matcher: impl Matcher<TypeInfo>, method_matcher: impl Matcher<str>, interceptors: I)
    where
        I: IntoIterator<Item = Arc<dyn MethodInterceptor>>,
    {
        self.interceptors.push(InterceptorElement {
            class_matcher: Box::new(class_matcher),
            method_matcher: Box::new(method_matcher),
            interceptors: interceptors.into_iter().collect(),
        });
    }

    #[inline]
    pub fn install(&mut self, module: &impl Module) {
        module.configure(self);
    }

    /// Disables implicit bindings of constructors registered by link targets
    #[inline]
    pub fn require_explicit_bindings(&mut self) {
        self.require_explicit_bindings = true;
    }

    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[BindingElement] {
        &self.elements
    }

    #[inline]
    #[must_use]
    pub fn scope_elements(&self) -> &[ScopeElement] {
        &self.scopes
    }
}

impl Binder {
    fn push(&mut self, key: KeyData, source: &'static Location<'static>) -> usize {
        debug!(%key, %source, "Binding declared");
        self.elements.push(BindingElement {
            key,
            target: Target::Untargetted,
            scoping: Scoping::Unscoped,
            source,
        });
        self.elements.len() - 1
    }

    fn register_constructor<I: Injectable>(&mut self, source: &'static Location<'static>) {
        self.constructors
            .entry(TypeInfo::of::<I>())
            .or_insert_with(|| ConstructorElement {
                provider: injectable_constructor::<I>(),
                source,
            });
    }

    #[inline]
    fn element_mut(&mut self, index: usize) -> &mut BindingElement {
        &mut self.elements[index]
    }
}

/// Builder state before a qualifier is set
pub struct Annotatable;
/// Builder state after a qualifier is set, or for an explicit key
pub struct Linkable;

/// Builder of the binding recorded by a `bind*` call of [`Binder`].
///
/// The binding exists as soon as the builder does, so an unfinished chain leaves an untargetted, unscoped binding.
pub struct BindingBuilder<'a, T: ?Sized, S> {
    binder: &'a mut Binder,
    index: usize,
    _marker: PhantomData<(fn(&T), S)>,
}

pub type AnnotatedBindingBuilder<'a, T> = BindingBuilder<'a, T, Annotatable>;
pub type LinkedBindingBuilder<'a, T> = BindingBuilder<'a, T, Linkable>;

impl<'a, T: ?Sized, S> BindingBuilder<'a, T, S> {
    #[inline]
    fn new(binder: &'a mut Binder, index: usize) -> Self {
        Self {
            binder,
            index,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: ?Sized + Send + Sync + 'static> AnnotatedBindingBuilder<'a, T> {
    /// Qualifies the key with an annotation instance
    #[inline]
    pub fn annotated_with(self, annotation: impl Annotation) -> LinkedBindingBuilder<'a, T> {
        self.qualified(Qualifier::of_instance(annotation))
    }

    /// Qualifies the key with an annotation type
    #[inline]
    pub fn annotated_with_type<A: Annotation>(self) -> LinkedBindingBuilder<'a, T> {
        self.qualified(Qualifier::of_type::<A>())
    }

    pub fn qualified(self, qualifier: Qualifier) -> LinkedBindingBuilder<'a, T> {
        self.binder.element_mut(self.index).key.qualifier = Some(qualifier);
        self.linked()
    }

    /// Leaves the key unqualified
    #[inline]
    pub(crate) fn linked(self) -> LinkedBindingBuilder<'a, T> {
        BindingBuilder::new(self.binder, self.index)
    }
}

impl<'a, T: ?Sized + Send + Sync + 'static, S> BindingBuilder<'a, T, S> {
    fn key(&self) -> KeyData {
        self.binder.elements[self.index].key.clone()
    }

    fn target(self, target: Target) -> ScopedBindingBuilder<'a> {
        let Self { binder, index, .. } = self;
        binder.element_mut(index).target = target;
        ScopedBindingBuilder { binder, index }
    }

    fn into_scoped(self) -> ScopedBindingBuilder<'a> {
        ScopedBindingBuilder {
            binder: self.binder,
            index: self.index,
        }
    }

    /// Links to the unqualified key of `I`, constructing `I` with [`Injectable::construct`] unless `I` has its own binding
    pub fn to<I: Injectable + Upcast<T>>(self) -> ScopedBindingBuilder<'a> {
        let source = self.binder.elements[self.index].source;
        self.binder.register_constructor::<I>(source);
        self.to_key(Key::<I>::of())
    }

    #[inline]
    pub fn to_literal<I: Injectable + Upcast<T>>(self, _literal: TypeLiteral<I>) -> ScopedBindingBuilder<'a> {
        self.to::<I>()
    }

    /// Links to another key
    pub fn to_key<I: ?Sized + Upcast<T> + Send + Sync + 'static>(self, key: Key<I>) -> ScopedBindingBuilder<'a> {
        self.target(Target::Linked(Link {
            key: key.into_data(),
            adapt: link_upcast::<I, T>,
        }))
    }

    pub fn to_provider<P: Provider<T>>(self, provider: P) -> ScopedBindingBuilder<'a> {
        let key = self.key();
        self.target(Target::Provider(BoxedProvider::from_fn(move |_| {
            provider.get().map(Erased::new::<T>).map_err(|source| ResolveErrorKind::Provision {
                key: key.clone(),
                source,
            })
        })))
    }

    /// Provides instances through a provider constructed with [`Injectable::construct`]
    pub fn to_provider_type<P: Provider<T> + Injectable>(self) -> ScopedBindingBuilder<'a> {
        let source = self.binder.elements[self.index].source;
        self.binder.register_constructor::<P>(source);
        self.to_provider_key(Key::<P>::of())
    }

    /// Provides instances through the provider bound to `key`
    pub fn to_provider_key<P: ?Sized + Provider<T>>(self, key: Key<P>) -> ScopedBindingBuilder<'a> {
        self.target(Target::ProviderKey(Link {
            key: key.into_data(),
            adapt: link_provider::<P, T>,
        }))
    }

    /// Binds to a single instance. Instance bindings can't be scoped
    pub fn to_instance(self, instance: impl Into<Arc<T>>) {
        self.target(Target::Instance(Erased::new::<T>(instance.into())));
    }

    pub fn to_constructor<Inst, Deps>(self, instantiator: Inst) -> ScopedBindingBuilder<'a>
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Upcast<T>,
        Deps: DependencyResolver,
    {
        self.target(Target::Constructor(
            TypeInfo::of::<Inst::Provides>(),
            boxed_constructor::<Inst, Deps, T>(instantiator),
        ))
    }

    /// Same as [`Self::to_constructor`] with the constructed type spelled out
    #[inline]
    pub fn to_constructor_typed<Inst, Deps>(
        self,
        instantiator: Inst,
        _literal: TypeLiteral<Inst::Provides>,
    ) -> ScopedBindingBuilder<'a>
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Upcast<T>,
        Deps: DependencyResolver,
    {
        self.to_constructor(instantiator)
    }

    #[inline]
    pub fn in_scope(self, scope: Arc<dyn Scope>) {
        self.into_scoped().in_scope(scope);
    }

    #[inline]
    pub fn in_scope_annotation(self, annotation: TypeInfo) {
        self.into_scoped().in_scope_annotation(annotation);
    }

    #[inline]
    pub fn in_annotation<A: Annotation>(self) {
        self.into_scoped().in_annotation::<A>();
    }

    #[inline]
    pub fn as_eager_singleton(self) {
        self.into_scoped().as_eager_singleton();
    }
}

/// Builder of the scope of a targetted binding
pub struct ScopedBindingBuilder<'a> {
    binder: &'a mut Binder,
    index: usize,
}

impl ScopedBindingBuilder<'_> {
    fn scoping(self, scoping: Scoping) {
        let element = self.binder.element_mut(self.index);
        debug!(key = %element.key, ?scoping, "Binding scoped");
        element.scoping = scoping;
    }

    #[inline]
    pub fn in_scope(self, scope: Arc<dyn Scope>) {
        self.scoping(Scoping::Instance(scope));
    }

    /// Scopes the binding with the scope bound to `annotation`
    #[inline]
    pub fn in_scope_annotation(self, annotation: TypeInfo) {
        self.scoping(Scoping::Annotation(annotation));
    }

    #[inline]
    pub fn in_annotation<A: Annotation>(self) {
        self.in_scope_annotation(TypeInfo::of::<A>());
    }

    /// Singleton instantiated while the injector is created, regardless of its stage
    #[inline]
    pub fn as_eager_singleton(self) {
        self.scoping(Scoping::EagerSingleton);
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Value types of constant bindings
pub trait Constant: sealed::Sealed {
    type Value: Send + Sync + 'static;

    fn into_value(self) -> Self::Value;
}

macro_rules! impl_constant {
    ($($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Constant for $ty {
                type Value = $ty;

                #[inline]
                fn into_value(self) -> Self::Value {
                    self
                }
            }
        )*
    };
}

impl_constant!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, char, bool, String, TypeInfo);

impl sealed::Sealed for &str {}

impl Constant for &str {
    type Value = String;

    #[inline]
    fn into_value(self) -> Self::Value {
        String::from(self)
    }
}

/// Builder of a constant binding, which must be qualified before its value is set
pub struct AnnotatedConstantBindingBuilder<'a> {
    binder: &'a mut Binder,
    source: &'static Location<'static>,
}

impl<'a> AnnotatedConstantBindingBuilder<'a> {
    #[inline]
    pub fn annotated_with(self, annotation: impl Annotation) -> ConstantBindingBuilder<'a> {
        self.qualified(Qualifier::of_instance(annotation))
    }

    #[inline]
    pub fn annotated_with_type<A: Annotation>(self) -> ConstantBindingBuilder<'a> {
        self.qualified(Qualifier::of_type::<A>())
    }

    #[inline]
    pub fn qualified(self, qualifier: Qualifier) -> ConstantBindingBuilder<'a> {
        ConstantBindingBuilder {
            binder: self.binder,
            qualifier,
            source: self.source,
        }
    }
}

pub struct ConstantBindingBuilder<'a> {
    binder: &'a mut Binder,
    qualifier: Qualifier,
    source: &'static Location<'static>,
}

impl ConstantBindingBuilder<'_> {
    fn bind_value<V: Send + Sync + 'static>(self, value: V) {
        let key = KeyData {
            type_info: TypeInfo::of::<V>(),
            qualifier: Some(self.qualifier),
        };
        let index = self.binder.push(key, self.source);
        self.binder.element_mut(index).target = Target::Instance(Erased::new(Arc::new(value)));
    }

    #[inline]
    pub fn to<C: Constant>(self, value: C) {
        self.bind_value(value.into_value());
    }

    /// Binds a value of an enumeration, keyed by the enumeration type
    #[inline]
    pub fn to_enum<E: Copy + Send + Sync + 'static>(self, value: E) {
        self.bind_value(value);
    }

    /// Binds the [`TypeInfo`] of `C`
    #[inline]
    pub fn to_type<C: ?Sized + 'static>(self) {
        self.bind_value(TypeInfo::of::<C>());
    }
}
