use alloc::sync::Arc;

use super::binding_scope::DefaultBindingScope;
use crate::{
    any::TypeInfo,
    binder::{Binder, Module},
    errors::InterceptErrorKind,
    injector::BindingInfo,
    intercept::{MethodInterceptor, MethodInvocation, MethodResult},
    listener::{ProvisionListener, TypeEncounter, TypeListener},
    matcher::{any, Matcher},
};

/// [`Module`] configured by a closure, see [`module`]
#[derive(Clone)]
pub struct FnModule<F>(F);

impl<F: Fn(&mut Binder)> Module for FnModule<F> {
    #[inline]
    fn configure(&self, binder: &mut Binder) {
        (self.0)(binder);
    }
}

/// Builds a module from a closure called with the binder on every installation
#[inline]
#[must_use]
pub const fn module<F: Fn(&mut Binder)>(configure: F) -> FnModule<F> {
    FnModule(configure)
}

/// Fluent declarations on a [`Binder`]
pub trait BinderExt {
    /// Runs `body` in the outermost declaration context
    fn bindings(&mut self, body: impl FnOnce(&mut DefaultBindingScope<'_>));

    /// Registers a listener of every constructible type
    fn type_listener<F>(&mut self, listener: F)
    where
        F: Fn(TypeInfo, &mut TypeEncounter) + Send + Sync + 'static;

    fn type_listener_matching<F>(&mut self, matcher: impl Matcher<TypeInfo>, listener: F)
    where
        F: Fn(TypeInfo, &mut TypeEncounter) + Send + Sync + 'static;

    /// Registers listeners of provisions of every binding
    fn provision_listeners<I>(&mut self, listeners: I)
    where
        I: IntoIterator<Item = Arc<dyn ProvisionListener>>;

    fn provision_listeners_matching<I>(&mut self, matcher: impl Matcher<BindingInfo>, listeners: I)
    where
        I: IntoIterator<Item = Arc<dyn ProvisionListener>>;

    /// Registers a closure interceptor of every method of every type
    fn intercept<F>(&mut self, interceptor: F)
    where
        F: Fn(&mut MethodInvocation<'_>) -> Result<MethodResult, InterceptErrorKind> + Send + Sync + 'static;

    fn intercept_matching<F>(&mut self, class_matcher: impl Matcher<TypeInfo>, method_matcher: impl Matcher<str>, interceptor: F)
    where
        F: Fn(&mut MethodInvocation<'_>) -> Result<MethodResult, InterceptErrorKind> + Send + Sync + 'static;

    fn interceptors<I>(&mut self, interceptors: I)
    where
        I: IntoIterator<Item = Arc<dyn MethodInterceptor>>;

    fn interceptors_matching<I>(&mut self, class_matcher: impl Matcher<TypeInfo>, method_matcher: impl Matcher<str>, interceptors: I)
    where
        I: IntoIterator<Item = Arc<dyn MethodInterceptor>>;
}

impl BinderExt for Binder {
    #[inline]
    fn bindings(&mut self, body: impl FnOnce(&mut DefaultBindingScope<'_>)) {
        body(&mut DefaultBindingScope::new(self));
    }

    #[inline]
    fn type_listener<F>(&mut self, listener: F)
    where
        F: Fn(TypeInfo, &mut TypeEncounter) + Send + Sync + 'static,
    {
        self.type_listener_matching(any(), listener);
    }

    #[inline]
    fn type_listener_matching<F>(&mut self, matcher: impl Matcher<TypeInfo>, listener: F)
    where
        F: Fn(TypeInfo, &mut TypeEncounter) + Send + Sync + 'static,
    {
        self.bind_listener(matcher, listener);
    }

    #[inline]
    fn provision_listeners<I>(&mut self, listeners: I)
    where
        I: IntoIterator<Item = Arc<dyn ProvisionListener>>,
    {
        self.bind_provision_listeners(any(), listeners);
    }

    #[inline]
    fn provision_listeners_matching<I>(&mut self, matcher: impl Matcher<BindingInfo>, listeners: I)
    where
        I: IntoIterator<Item = Arc<dyn ProvisionListener>>,
    {
        self.bind_provision_listeners(matcher, listeners);
    }

    #[inline]
    fn intercept<F>(&mut self, interceptor: F)
    where
        F: Fn(&mut MethodInvocation<'_>) -> Result<MethodResult, InterceptErrorKind> + Send + Sync + 'static,
    {
        self.intercept_matching(any(), any(), interceptor);
    }

    #[inline]
    fn intercept_matching<F>(&mut self, class_matcher: impl Matcher<TypeInfo>, method_matcher: impl Matcher<str>, interceptor: F)
    where
        F: Fn(&mut MethodInvocation<'_>) -> Result<MethodResult, InterceptErrorKind> + Send + Sync + 'static,
    {
        let interceptor: Arc<dyn MethodInterceptor> = Arc::new(interceptor);
        self.bind_interceptor(class_matcher, method_matcher, [interceptor]);
    }

    #[inline]
    fn interceptors<I>(&mut self, interceptors: I)
    where
        I: IntoIterator<Item = Arc<dyn MethodInterceptor>>,
    {
        self.bind_interceptor(any(), any(), interceptors);
    }

    #[inline]
    fn interceptors_matching<I>(&mut self, class_matcher: impl Matcher<TypeInfo>, method_matcher: impl Matcher<str>, interceptors: I)
    where
        I: IntoIterator<Item = Arc<dyn MethodInterceptor>>,
    {
        self.bind_interceptor(class_matcher, method_matcher, interceptors);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{module, BinderExt as _};
    use crate::{
        any::TypeInfo,
        binder::{Binder, Module as _},
        dsl::ImplementationBinding as _,
        injector::BindingInfo,
        intercept::{MethodInterceptor, MethodInvocation, MethodResult},
        listener::{ProvisionInvocation, ProvisionListener, TypeEncounter},
        matcher::{only, Matcher as _},
    };

    use alloc::{boxed::Box, sync::Arc};
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_module_configures_every_installation() {
        let module = module(|binder| {
            binder.bindings(|b| {
                b.ty::<u8>().to_instance(1_u8);
            });
        });

        let mut binder = Binder::new();
        module.configure(&mut binder);
        binder.install(&module);

        assert_eq!(binder.elements().len(), 2);
        assert!(logs_contain("Binding declared"));
    }

    #[test]
    fn test_listeners_and_interceptors_default_to_any() {
        let mut binder = Binder::new();
        binder.type_listener(|_: TypeInfo, _: &mut TypeEncounter| {});
        binder.type_listener_matching(only(TypeInfo::of::<u8>()), |_: TypeInfo, _: &mut TypeEncounter| {});

        let listener: Arc<dyn ProvisionListener> = Arc::new(|_: &mut ProvisionInvocation<'_>| {});
        binder.provision_listeners([listener.clone(), listener.clone()]);
        binder.provision_listeners_matching(|binding: &BindingInfo| binding.scope.is_some(), [listener]);

        binder.intercept(|invocation: &mut MethodInvocation<'_>| invocation.proceed());
        binder.intercept_matching(
            only(TypeInfo::of::<u8>()),
            |method: &str| method.starts_with("get"),
            |_: &mut MethodInvocation<'_>| Ok(Box::new(()) as MethodResult),
        );
        let interceptor: Arc<dyn MethodInterceptor> = Arc::new(|invocation: &mut MethodInvocation<'_>| invocation.proceed());
        binder.interceptors([interceptor.clone()]);
        binder.interceptors_matching(only(TypeInfo::of::<u16>()), only_method("run"), [interceptor]);

        assert_eq!(binder.type_listeners.len(), 2);
        assert!(binder.type_listeners[0].matcher.matches(&TypeInfo::of::<u16>()));
        assert!(!binder.type_listeners[1].matcher.matches(&TypeInfo::of::<u16>()));

        assert_eq!(binder.provision_listeners.len(), 2);
        assert_eq!(binder.provision_listeners[0].listeners.len(), 2);

        assert_eq!(binder.interceptors.len(), 4);
        assert!(binder.interceptors[0].method_matcher.matches("anything"));
        assert!(binder.interceptors[1].method_matcher.matches("get_name"));
        assert!(!binder.interceptors[1].method_matcher.matches("set_name"));
        assert!(binder.interceptors[3].method_matcher.matches("run"));
    }

    fn only_method(name: &'static str) -> impl Fn(&str) -> bool + Send + Sync + 'static {
        move |method| method == name
    }
}
