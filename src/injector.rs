use alloc::{
    boxed::Box,
    collections::{btree_map::Entry, BTreeMap, BTreeSet},
    sync::Arc,
    vec::Vec,
};
use core::{any::Any, panic::Location};
use tracing::{debug, error, info_span};

use crate::{
    any::TypeInfo,
    binder::{Binder, BindingElement, ConstructorElement, InterceptorElement, Link, Module, ScopeElement, Target},
    config::{Config, Stage},
    errors::{BindingErrorKind, CreationError, InterceptErrorKind, ResolveErrorKind},
    intercept::{MethodInterceptor, MethodInvocation, MethodResult},
    key::{Key, KeyData},
    listener::{InjectionListener, ProvisionInvocation, ProvisionListener, TypeEncounter},
    provider::{BoxedProvider, Erased},
    scope::{Scope, Scoping, Singleton, SingletonScope},
};

/// Resolved binding of an injector
#[derive(Debug, Clone)]
pub struct BindingInfo {
    pub key: KeyData,
    /// Name of the scope, if the binding is scoped
    pub scope: Option<&'static str>,
    pub source: &'static Location<'static>,
}

struct Binding {
    info: BindingInfo,
    provider: BoxedProvider,
}

pub(crate) struct InjectorInner {
    bindings: BTreeMap<KeyData, Binding>,
    constructors: BTreeMap<TypeInfo, BoxedProvider>,
    injection_listeners: BTreeMap<TypeInfo, Vec<InjectionListener>>,
    interceptors: Vec<InterceptorElement>,
    config: Config,
}

/// Assembled bindings of modules.
///
/// Clones share the same bindings and scoped instances.
#[derive(Clone)]
pub struct Injector {
    inner: Arc<InjectorInner>,
}

impl core::fmt::Debug for Injector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Injector").finish_non_exhaustive()
    }
}

impl Injector {
    /// Creates injector from bindings of `module` with the default config
    ///
    /// # Errors
    /// Returns [`CreationError`] with every invalid binding declaration of the module
    #[inline]
    pub fn create(module: &impl Module) -> Result<Self, CreationError> {
        Self::create_with_config(Config::default(), module)
    }

    /// Creates injector from bindings of `module`
    ///
    /// # Errors
    /// Returns [`CreationError`] with every invalid binding declaration of the module
    #[inline]
    pub fn create_with_config(config: Config, module: &impl Module) -> Result<Self, CreationError> {
        let mut binder = Binder::new();
        binder.install(module);
        Self::from_binder(binder, config)
    }

    /// Creates injector from declarations collected by `binder`.
    ///
    /// Validation doesn't stop on the first invalid declaration, so all of them are reported at once.
    /// Eager singletons are instantiated last, only when every declaration is valid.
    ///
    /// # Errors
    /// Returns [`CreationError`] if any of the next checks fails:
    /// - Each key and each scope annotation is bound once
    /// - Scope annotations used by bindings are bound to a scope
    /// - Untargetted bindings and link targets have an implementation
    /// - Bindings don't link to themselves
    /// - Type listeners don't report errors
    /// - Eager singletons are instantiated without errors
    pub fn from_binder(binder: Binder, config: Config) -> Result<Self, CreationError> {
        let span = info_span!("create_injector", stage = ?config.stage);
        let _guard = span.enter();

        let Binder {
            elements,
            scopes: scope_elements,
            constructors,
            type_listeners,
            provision_listeners,
            interceptors,
            require_explicit_bindings,
        } = binder;
        let require_explicit_bindings = require_explicit_bindings || config.require_explicit_bindings;
        let mut errors = Vec::new();

        let mut scopes: BTreeMap<TypeInfo, Arc<dyn Scope>> = BTreeMap::new();
        scopes.insert(TypeInfo::of::<Singleton>(), Arc::new(SingletonScope));
        for ScopeElement { annotation, scope, source } in scope_elements {
            match scopes.entry(annotation) {
                Entry::Occupied(_) => errors.push(BindingErrorKind::DuplicateScope {
                    annotation,
                    location: source,
                }),
                Entry::Vacant(entry) => {
                    entry.insert(scope);
                }
            }
        }

        let mut declared: BTreeMap<KeyData, BindingElement> = BTreeMap::new();
        for element in elements {
            match declared.entry(element.key.clone()) {
                Entry::Occupied(previous) => errors.push(BindingErrorKind::DuplicateBinding {
                    key: element.key,
                    location: element.source,
                    previous: previous.get().source,
                }),
                Entry::Vacant(entry) => {
                    entry.insert(element);
                }
            }
        }

        if !require_explicit_bindings {
            for (type_info, ConstructorElement { provider, source }) in &constructors {
                let key = KeyData::unqualified(*type_info);
                if let Entry::Vacant(entry) = declared.entry(key.clone()) {
                    debug!(%key, "Implicit binding added");
                    entry.insert(BindingElement {
                        key,
                        target: Target::Constructor(*type_info, provider.clone()),
                        scoping: Scoping::Unscoped,
                        source: *source,
                    });
                }
            }
        }

        let constructible = constructors
            .keys()
            .copied()
            .chain(declared.values().filter_map(|element| match element.target {
                Target::Constructor(type_info, _) => Some(type_info),
                _ => None,
            }))
            .collect::<BTreeSet<_>>();
        let mut injection_listeners = BTreeMap::new();
        for type_info in constructible {
            let mut encounter = TypeEncounter::new(type_info);
            for element in type_listeners.iter().filter(|element| element.matcher.matches(&type_info)) {
                element.listener.hear(type_info, &mut encounter);
            }
            errors.extend(
                encounter
                    .errors
                    .into_iter()
                    .map(|message| BindingErrorKind::TypeListener { type_info, message }),
            );
            if !encounter.injection_listeners.is_empty() {
                injection_listeners.insert(type_info, encounter.injection_listeners);
            }
        }

        let bound_keys = declared.keys().cloned().collect::<BTreeSet<_>>();
        let links = declared
            .iter()
            .filter_map(|(key, element)| match &element.target {
                Target::Linked(link) | Target::ProviderKey(link) => Some((key.clone(), link.key.clone())),
                _ => None,
            })
            .collect::<BTreeMap<_, _>>();
        let has_implementation =
            |key: &KeyData| bound_keys.contains(key) || (key.qualifier.is_none() && constructors.contains_key(&key.type_info));

        let mut bindings = BTreeMap::new();
        let mut eager = Vec::new();
        for (key, BindingElement { target, scoping, source, .. }) in declared {
            let unscoped = match target {
                Target::Untargetted => match constructors.get(&key.type_info) {
                    Some(constructor) if key.qualifier.is_none() => constructor.provider.clone(),
                    _ => {
                        errors.push(BindingErrorKind::MissingImplementation { key, location: source });
                        continue;
                    }
                },
                Target::Linked(link) | Target::ProviderKey(link) => {
                    if link.key == key {
                        errors.push(BindingErrorKind::SelfLink { key, location: source });
                        continue;
                    }
                    if links_back(&links, &key) {
                        errors.push(BindingErrorKind::LinkCycle { key, location: source });
                        continue;
                    }
                    if !has_implementation(&link.key) {
                        errors.push(BindingErrorKind::MissingImplementation {
                            key: link.key,
                            location: source,
                        });
                        continue;
                    }
                    linked_provider(link)
                }
                Target::Instance(instance) => BoxedProvider::instance(instance),
                Target::Provider(provider) | Target::Constructor(_, provider) => provider,
            };

            let eager_singleton = matches!(scoping, Scoping::EagerSingleton);
            let scope = match scoping {
                Scoping::Unscoped => None,
                Scoping::Instance(scope) => Some(scope),
                Scoping::Annotation(annotation) => match scopes.get(&annotation) {
                    Some(scope) => Some(scope.clone()),
                    None => {
                        errors.push(BindingErrorKind::ScopeNotBound {
                            annotation,
                            key,
                            location: source,
                        });
                        continue;
                    }
                },
                Scoping::EagerSingleton => Some(Arc::new(SingletonScope) as Arc<dyn Scope>),
            };

            let info = BindingInfo {
                key: key.clone(),
                scope: scope.as_ref().map(|scope| scope.name()),
                source,
            };
            let listeners = provision_listeners
                .iter()
                .filter(|element| element.matcher.matches(&info))
                .flat_map(|element| element.listeners.iter().cloned())
                .collect::<Vec<_>>();
            let provider = with_provision_listeners(info.clone(), listeners, unscoped);
            let provider = match &scope {
                Some(scope) => scope.scope(&key, provider),
                None => provider,
            };

            if eager_singleton || (config.stage == Stage::Production && scope.is_some_and(|scope| scope.is_singleton())) {
                eager.push(key.clone());
            }
            debug!(%key, scope = info.scope, "Bound");
            bindings.insert(key, Binding { info, provider });
        }

        if !errors.is_empty() {
            return Err(creation_error(errors));
        }

        let injector = Self {
            inner: Arc::new(InjectorInner {
                bindings,
                constructors: constructors
                    .into_iter()
                    .map(|(type_info, constructor)| (type_info, constructor.provider))
                    .collect(),
                injection_listeners,
                interceptors,
                config,
            }),
        };

        for key in eager {
            debug!(%key, "Eager instantiation");
            if let Err(error) = injector.provide(&key) {
                errors.push(BindingErrorKind::EagerSingleton { key, error });
            }
        }
        if !errors.is_empty() {
            return Err(creation_error(errors));
        }

        debug!(bindings = injector.inner.bindings.len(), "Injector created");
        Ok(injector)
    }

    /// Gets an instance bound to the unqualified key of `T`
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NoBinding`] if the key isn't bound
    /// - Returns another [`ResolveErrorKind`] if the binding fails to provide the instance
    #[inline]
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.get_key(&Key::of())
    }

    /// Gets an instance bound to `key`
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NoBinding`] if the key isn't bound
    /// - Returns another [`ResolveErrorKind`] if the binding fails to provide the instance
    pub fn get_key<T: ?Sized + Send + Sync + 'static>(&self, key: &Key<T>) -> Result<Arc<T>, ResolveErrorKind> {
        let span = info_span!("get", %key);
        let _guard = span.enter();

        let instance = self.provide(key.data())?;
        match instance.downcast::<T>() {
            Some(instance) => Ok(instance),
            None => {
                let err = ResolveErrorKind::IncorrectType {
                    key: key.data().clone(),
                    expected: TypeInfo::of::<T>(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Gets a provider of instances bound to `key`.
    /// The key is resolved on each [`KeyProvider::get`] call
    #[inline]
    #[must_use]
    pub fn get_provider<T: ?Sized + Send + Sync + 'static>(&self, key: Key<T>) -> KeyProvider<T> {
        KeyProvider {
            injector: self.clone(),
            key,
        }
    }

    #[inline]
    #[must_use]
    pub fn binding(&self, key: &KeyData) -> Option<&BindingInfo> {
        self.inner.bindings.get(key).map(|binding| &binding.info)
    }

    /// Bindings ordered by key, including implicit ones
    #[inline]
    pub fn bindings(&self) -> impl Iterator<Item = &BindingInfo> {
        self.inner.bindings.values().map(|binding| &binding.info)
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Calls `body` as the method `method` of `T` through the interceptors bound to them.
    /// Without interceptors `body` is called directly.
    ///
    /// # Errors
    /// - Returns [`InterceptErrorKind::IncorrectReturnType`] if an interceptor returns a value of another type than `R`
    /// - Returns another [`InterceptErrorKind`] if an interceptor fails
    pub fn intercept<T, R>(&self, method: &'static str, mut body: impl FnMut() -> R) -> Result<R, InterceptErrorKind>
    where
        T: ?Sized + 'static,
        R: Send + 'static,
    {
        let declaring_type = TypeInfo::of::<T>();
        let interceptors = self
            .inner
            .interceptors
            .iter()
            .filter(|element| element.class_matcher.matches(&declaring_type) && element.method_matcher.matches(method))
            .flat_map(|element| element.interceptors.iter().cloned())
            .collect::<Vec<Arc<dyn MethodInterceptor>>>();
        if interceptors.is_empty() {
            return Ok(body());
        }

        let span = info_span!("intercept", %declaring_type, method, interceptors = interceptors.len());
        let _guard = span.enter();

        let mut target = || Box::new(body()) as MethodResult;
        MethodInvocation::new(declaring_type, method, &interceptors, &mut target)
            .proceed_as()
            .inspect_err(|err| error!("{}", err))
    }
}

impl Injector {
    fn provide(&self, key: &KeyData) -> Result<Erased, ResolveErrorKind> {
        let Some(binding) = self.inner.bindings.get(key) else {
            let err = ResolveErrorKind::NoBinding { key: key.clone() };
            error!("{}", err);
            return Err(err);
        };
        binding.provider.provide(self).inspect_err(|err| error!("{}", err))
    }

    /// Same as [`Self::provide`], but also uses constructors which aren't bound implicitly
    fn provide_link(&self, key: &KeyData) -> Result<Erased, ResolveErrorKind> {
        match self.inner.constructors.get(&key.type_info) {
            Some(constructor) if key.qualifier.is_none() && !self.inner.bindings.contains_key(key) => constructor.provide(self),
            _ => self.provide(key),
        }
    }

    /// Calls injection listeners registered for the type of `instance`
    pub(crate) fn notify_injection<I: Send + Sync + 'static>(&self, instance: &I) {
        let Some(listeners) = self.inner.injection_listeners.get(&TypeInfo::of::<I>()) else {
            return;
        };
        let instance: &(dyn Any + Send + Sync) = instance;
        for listener in listeners {
            listener(instance);
        }
        debug!(listeners = listeners.len(), "Injection listeners notified");
    }
}

fn creation_error(errors: Vec<BindingErrorKind>) -> CreationError {
    for err in &errors {
        error!("{}", err);
    }
    CreationError { errors }
}

/// Whether following links from `start` leads back to it
fn links_back(links: &BTreeMap<KeyData, KeyData>, start: &KeyData) -> bool {
    let mut visited = BTreeSet::new();
    let mut current = start;
    while let Some(next) = links.get(current) {
        if next == start {
            return true;
        }
        // A cycle that doesn't pass through `start` is reported by its own bindings
        if !visited.insert(next) {
            return false;
        }
        current = next;
    }
    false
}

fn linked_provider(link: Link) -> BoxedProvider {
    BoxedProvider::from_fn(move |injector| {
        let instance = injector.provide_link(&link.key)?;
        (link.adapt)(&link.key, &instance)
    })
}

fn with_provision_listeners(
    info: BindingInfo,
    listeners: Vec<Arc<dyn ProvisionListener>>,
    provider: BoxedProvider,
) -> BoxedProvider {
    if listeners.is_empty() {
        return provider;
    }

    BoxedProvider::from_fn(move |injector| {
        let mut provision = || provider.provide(injector);
        ProvisionInvocation::new(&info, &listeners, &mut provision).finish()
    })
}

/// Provider of instances bound to a key, resolved on each call
pub struct KeyProvider<T: ?Sized> {
    injector: Injector,
    key: Key<T>,
}

impl<T: ?Sized + Send + Sync + 'static> KeyProvider<T> {
    /// # Errors
    /// See [`Injector::get_key`]
    #[inline]
    pub fn get(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.injector.get_key(&self.key)
    }

    #[inline]
    #[must_use]
    pub const fn key(&self) -> &Key<T> {
        &self.key
    }
}

impl<T: ?Sized> Clone for KeyProvider<T> {
    fn clone(&self) -> Self {
        Self {
            injector: self.injector.clone(),
            key: self.key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::Injector;
    use crate::{
        annotation::{named, Annotation},
        any::TypeInfo,
        binder::Binder,
        config::{Config, Stage},
        errors::{BindingErrorKind, InterceptErrorKind, ResolveErrorKind},
        inject::{Inject, InjectProvider},
        instantiator::Injectable,
        intercept::{MethodInterceptor, MethodInvocation},
        key::{Key, KeyData},
        listener::{ProvisionInvocation, ProvisionListener, TypeEncounter},
        matcher::{any, only},
        provider::{provider_fn, Provider},
        scope::{NoScope, Singleton, SingletonScope},
        InstantiateErrorKind,
    };

    use alloc::{boxed::Box, string::String, sync::Arc, vec, vec::Vec};
    use core::sync::atomic::{AtomicU8, Ordering};
    use parking_lot::Mutex;
    use tracing_test::traced_test;

    #[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
    struct Request;

    impl Annotation for Request {}

    trait Repo: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct MemoryRepo;

    impl Repo for MemoryRepo {
        fn name(&self) -> &'static str {
            "memory"
        }
    }

    implements!(MemoryRepo => dyn Repo);

    impl Injectable for MemoryRepo {
        type Deps = ();

        fn construct((): ()) -> Result<Self, InstantiateErrorKind> {
            Ok(Self)
        }
    }

    struct UserService {
        repo: Arc<dyn Repo>,
    }

    impl Injectable for UserService {
        type Deps = (Inject<dyn Repo>,);

        fn construct((Inject(repo),): Self::Deps) -> Result<Self, InstantiateErrorKind> {
            Ok(Self { repo })
        }
    }

    struct RepoProvider;

    impl Provider<dyn Repo> for RepoProvider {
        fn get(&self) -> Result<Arc<dyn Repo>, InstantiateErrorKind> {
            Ok(Arc::new(MemoryRepo))
        }
    }

    impl Injectable for RepoProvider {
        type Deps = ();

        fn construct((): ()) -> Result<Self, InstantiateErrorKind> {
            Ok(Self)
        }
    }

    fn create(configure: impl FnOnce(&mut Binder)) -> Injector {
        let mut binder = Binder::new();
        configure(&mut binder);
        Injector::from_binder(binder, Config::default()).unwrap()
    }

    fn creation_errors(configure: impl FnOnce(&mut Binder)) -> Vec<BindingErrorKind> {
        let mut binder = Binder::new();
        configure(&mut binder);
        match Injector::from_binder(binder, Config::default()) {
            Ok(_) => panic!("injector creation should fail"),
            Err(err) => err.errors,
        }
    }

    #[test]
    #[traced_test]
    fn test_linked_binding() {
        let injector = create(|binder| {
            binder.bind::<dyn Repo>().to::<MemoryRepo>();
            binder.bind_injectable::<UserService>();
        });

        let service = injector.get::<UserService>().unwrap();

        assert_eq!(service.repo.name(), "memory");
        // `MemoryRepo` is bound implicitly
        assert!(injector.get::<MemoryRepo>().is_ok());
        assert!(injector.binding(Key::<MemoryRepo>::of().data()).is_some());
        assert!(logs_contain("Implicit binding added"));
    }

    #[test]
    #[traced_test]
    fn test_require_explicit_bindings() {
        let injector = create(|binder| {
            binder.require_explicit_bindings();
            binder.bind::<dyn Repo>().to::<MemoryRepo>();
        });

        assert_eq!(injector.get::<dyn Repo>().unwrap().name(), "memory");
        assert!(matches!(injector.get::<MemoryRepo>(), Err(ResolveErrorKind::NoBinding { .. })));
        assert!(logs_contain("No binding found"));
    }

    #[test]
    #[traced_test]
    fn test_provider_bindings() {
        let injector = create(|binder| {
            binder.bind::<dyn Repo>().to_provider_type::<RepoProvider>();
            binder
                .bind::<dyn Repo>()
                .annotated_with(named("boxed"))
                .to_provider(provider_fn(|| Box::new(MemoryRepo) as Box<dyn Repo>));
            binder.bind::<dyn Provider<dyn Repo>>().to_instance(Arc::new(RepoProvider) as Arc<dyn Provider<dyn Repo>>);
            binder
                .bind::<dyn Repo>()
                .annotated_with(named("keyed"))
                .to_provider_key(Key::<dyn Provider<dyn Repo>>::of());
        });

        assert_eq!(injector.get::<dyn Repo>().unwrap().name(), "memory");
        assert_eq!(injector.get_key(&Key::<dyn Repo>::annotated(named("boxed"))).unwrap().name(), "memory");
        assert_eq!(injector.get_key(&Key::<dyn Repo>::annotated(named("keyed"))).unwrap().name(), "memory");
    }

    #[test]
    #[traced_test]
    fn test_get_provider_resolves_lazily() {
        let calls = Arc::new(AtomicU8::new(0));
        let injector = create(|binder| {
            let calls = calls.clone();
            binder.bind::<u8>().to_provider(provider_fn(move || calls.fetch_add(1, Ordering::SeqCst)));
        });

        let provider = injector.get_provider(Key::<u8>::of());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(*provider.get().unwrap(), 0);
        assert_eq!(*provider.clone().get().unwrap(), 1);

        let Ok(InjectProvider(provider)) = <InjectProvider<u8> as crate::DependencyResolver>::resolve(&injector) else {
            panic!("provider should be resolved");
        };
        assert_eq!(*provider.get().unwrap(), 2);
    }

    #[test]
    #[traced_test]
    fn test_scopes() {
        let injector = create(|binder| {
            binder.bind_scope::<Request>(NoScope);
            binder.bind::<String>().to_provider(provider_fn(|| String::from("unscoped")));
            binder
                .bind::<String>()
                .annotated_with(named("singleton"))
                .to_provider(provider_fn(|| String::from("singleton")))
                .in_annotation::<Singleton>();
            binder
                .bind::<String>()
                .annotated_with(named("request"))
                .to_provider(provider_fn(|| String::from("request")))
                .in_annotation::<Request>();
        });

        let get = |name: &str| injector.get_key(&Key::<String>::annotated(named(name))).unwrap();

        assert!(!Arc::ptr_eq(&injector.get::<String>().unwrap(), &injector.get::<String>().unwrap()));
        assert!(Arc::ptr_eq(&get("singleton"), &get("singleton")));
        assert!(!Arc::ptr_eq(&get("request"), &get("request")));
        assert_eq!(
            injector.binding(Key::<String>::annotated(named("request")).data()).unwrap().scope,
            Some("no_scope")
        );
    }

    #[test]
    #[traced_test]
    fn test_creation_errors() {
        let errors = creation_errors(|binder| {
            binder.bind::<String>().to_instance(String::new());
            binder.bind::<String>().to_instance(String::new());
            binder.bind_scope::<Singleton>(SingletonScope);
        });

        assert!(matches!(errors[0], BindingErrorKind::DuplicateScope { .. }));
        assert!(matches!(errors[1], BindingErrorKind::DuplicateBinding { .. }));
        assert!(logs_contain("Unable") || logs_contain("already"));
    }

    #[test]
    #[traced_test]
    fn test_invalid_targets() {
        let errors = creation_errors(|binder| {
            binder.bind::<dyn Repo>();
            binder.bind_key(Key::<dyn Repo>::annotated(named("self"))).to_key(Key::<dyn Repo>::annotated(named("self")));
            binder.bind::<u8>().annotated_with(named("missing")).to_key(Key::<u8>::of());
            binder.bind::<u16>().to_instance(0_u16);
            binder.bind::<u32>().to_provider(provider_fn(|| 0_u32)).in_annotation::<Request>();
        });

        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|err| matches!(
            err,
            BindingErrorKind::MissingImplementation { key, .. } if key.type_info == TypeInfo::of::<dyn Repo>()
        )));
        assert!(errors.iter().any(|err| matches!(err, BindingErrorKind::SelfLink { .. })));
        assert!(errors.iter().any(|err| matches!(
            err,
            BindingErrorKind::MissingImplementation { key, .. } if *key == KeyData::unqualified(TypeInfo::of::<u8>())
        )));
        assert!(errors.iter().any(|err| matches!(
            err,
            BindingErrorKind::ScopeNotBound { annotation, .. } if *annotation == TypeInfo::of::<Request>()
        )));
    }

    #[test]
    #[traced_test]
    fn test_link_cycle() {
        let errors = creation_errors(|binder| {
            binder
                .bind_key(Key::<dyn Repo>::annotated(named("a")))
                .to_key(Key::<dyn Repo>::annotated(named("b")));
            binder
                .bind_key(Key::<dyn Repo>::annotated(named("b")))
                .to_key(Key::<dyn Repo>::annotated(named("c")));
            binder
                .bind_key(Key::<dyn Repo>::annotated(named("c")))
                .to_key(Key::<dyn Repo>::annotated(named("a")));
            // Links into the cycle without being part of it
            binder.bind::<dyn Repo>().to_key(Key::<dyn Repo>::annotated(named("a")));
            binder
                .bind_key(Key::<dyn Repo>::annotated(named("memory")))
                .to::<MemoryRepo>();
        });

        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|err| matches!(
            err,
            BindingErrorKind::LinkCycle { key, .. } if key.qualifier.is_some()
        )));
        assert!(logs_contain("links back to itself"));
    }

    #[test]
    #[traced_test]
    fn test_eager_singletons() {
        let calls = Arc::new(AtomicU8::new(0));
        let configure = |binder: &mut Binder| {
            let eager_calls = calls.clone();
            binder
                .bind::<u8>()
                .to_provider(provider_fn(move || eager_calls.fetch_add(1, Ordering::SeqCst)))
                .as_eager_singleton();
            let singleton_calls = calls.clone();
            binder
                .bind::<u16>()
                .to_provider(provider_fn(move || u16::from(singleton_calls.fetch_add(1, Ordering::SeqCst))))
                .in_annotation::<Singleton>();
        };

        let mut binder = Binder::new();
        configure(&mut binder);
        let development = Injector::from_binder(binder, Config::default()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        development.get::<u8>().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let mut binder = Binder::new();
        configure(&mut binder);
        let production = Injector::from_binder(binder, Config::production()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(production.config().stage, Stage::Production);
    }

    #[test]
    #[traced_test]
    fn test_eager_singleton_error() {
        let errors = creation_errors(|binder| {
            binder
                .bind::<dyn Repo>()
                .to_constructor(|| Err::<MemoryRepo, _>(InstantiateErrorKind::Custom(anyhow::anyhow!("unavailable"))))
                .as_eager_singleton();
        });

        assert!(matches!(errors[..], [BindingErrorKind::EagerSingleton { .. }]));
    }

    #[test]
    #[traced_test]
    fn test_listeners() {
        let injected = Arc::new(AtomicU8::new(0));
        let provisions = Arc::new(Mutex::new(Vec::new()));

        let injector = create(|binder| {
            binder.bind::<dyn Repo>().to::<MemoryRepo>().in_annotation::<Singleton>();
            binder.bind_listener(only(TypeInfo::of::<MemoryRepo>()), {
                let injected = injected.clone();
                move |type_info: TypeInfo, encounter: &mut TypeEncounter| {
                    assert_eq!(type_info, encounter.type_info());
                    let injected = injected.clone();
                    encounter.register_injection_listener(move |_: &MemoryRepo| {
                        injected.fetch_add(1, Ordering::SeqCst);
                    });
                }
            });
            let listener: Arc<dyn ProvisionListener> = Arc::new({
                let provisions = provisions.clone();
                move |invocation: &mut ProvisionInvocation<'_>| {
                    provisions.lock().push(invocation.binding().key.clone());
                }
            });
            binder.bind_provision_listeners(
                |binding: &super::BindingInfo| binding.key.type_info == TypeInfo::of::<dyn Repo>(),
                vec![listener],
            );
        });

        injector.get::<dyn Repo>().unwrap();
        injector.get::<dyn Repo>().unwrap();
        injector.get::<MemoryRepo>().unwrap();

        assert_eq!(injected.load(Ordering::SeqCst), 2);
        // Cached instances aren't provisioned again
        assert_eq!(*provisions.lock(), [Key::<dyn Repo>::of().into_data()]);
    }

    #[test]
    #[traced_test]
    fn test_type_listener_error() {
        let errors = creation_errors(|binder| {
            binder.bind_injectable::<MemoryRepo>();
            binder.bind_listener(any(), |_: TypeInfo, encounter: &mut TypeEncounter| {
                encounter.add_error("rejected");
            });
        });

        assert!(matches!(&errors[..], [BindingErrorKind::TypeListener { message, .. }] if message == "rejected"));
    }

    #[test]
    #[traced_test]
    fn test_intercept() {
        let injector = create(|binder| {
            let doubling: Arc<dyn MethodInterceptor> = Arc::new(
                |invocation: &mut MethodInvocation<'_>| -> Result<crate::MethodResult, InterceptErrorKind> {
                    let result = invocation.proceed_as::<u32>()?;
                    Ok(Box::new(result * 2) as crate::MethodResult)
                },
            );
            binder.bind_interceptor(
                only(TypeInfo::of::<dyn Repo>()),
                |method: &str| method.starts_with("count"),
                vec![doubling],
            );
        });

        assert_eq!(injector.intercept::<dyn Repo, u32>("count_users", || 21).unwrap(), 42);
        assert_eq!(injector.intercept::<dyn Repo, u32>("name", || 21).unwrap(), 21);
        assert_eq!(injector.intercept::<MemoryRepo, u32>("count_users", || 21).unwrap(), 21);
        assert!(matches!(
            injector.intercept::<dyn Repo, u8>("count_users", || 1),
            Err(InterceptErrorKind::IncorrectReturnType { .. })
        ));
    }

    #[test]
    fn test_injector_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Injector>();
        assert_send_sync::<super::KeyProvider<dyn Repo>>();
    }
}
