use alloc::{string::String, sync::Arc, vec::Vec};
use core::any::Any;

use crate::{any::TypeInfo, errors::ResolveErrorKind, injector::BindingInfo, provider::Erased};

pub(crate) type InjectionListener = Arc<dyn Fn(&(dyn Any + Send + Sync)) + Send + Sync>;

/// Listener of types the injector constructs, notified once per type while the injector is created
pub trait TypeListener: Send + Sync + 'static {
    fn hear(&self, type_info: TypeInfo, encounter: &mut TypeEncounter);
}

impl<F> TypeListener for F
where
    F: Fn(TypeInfo, &mut TypeEncounter) + Send + Sync + 'static,
{
    #[inline]
    fn hear(&self, type_info: TypeInfo, encounter: &mut TypeEncounter) {
        self(type_info, encounter);
    }
}

/// Context of a [`TypeListener`] for one constructible type
pub struct TypeEncounter {
    type_info: TypeInfo,
    pub(crate) injection_listeners: Vec<InjectionListener>,
    pub(crate) errors: Vec<String>,
}

impl TypeEncounter {
    #[inline]
    #[must_use]
    pub(crate) const fn new(type_info: TypeInfo) -> Self {
        Self {
            type_info,
            injection_listeners: Vec::new(),
            errors: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// Registers a listener called with every constructed instance of the encountered type.
    /// `I` must be the encountered type, otherwise an error is reported
    pub fn register_injection_listener<I, F>(&mut self, listener: F)
    where
        I: Send + Sync + 'static,
        F: Fn(&I) + Send + Sync + 'static,
    {
        if TypeInfo::of::<I>() != self.type_info {
            self.add_error(alloc::format!(
                "injection listener of {} can't be registered for {}",
                TypeInfo::of::<I>(),
                self.type_info
            ));
            return;
        }

        self.injection_listeners.push(Arc::new(move |instance: &(dyn Any + Send + Sync)| {
            if let Some(instance) = instance.downcast_ref::<I>() {
                listener(instance);
            }
        }));
    }

    /// Reports an error, failing the injector creation
    #[inline]
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// Listener of provisions of bindings
pub trait ProvisionListener: Send + Sync + 'static {
    fn on_provision(&self, invocation: &mut ProvisionInvocation<'_>);
}

impl<F> ProvisionListener for F
where
    F: Fn(&mut ProvisionInvocation<'_>) + Send + Sync + 'static,
{
    #[inline]
    fn on_provision(&self, invocation: &mut ProvisionInvocation<'_>) {
        self(invocation);
    }
}

/// Provision in progress.
///
/// The next listeners and then the provision itself run on the first [`Self::provision`] call,
/// or after the last listener returns if no listener calls it. Either way the instance is provided once.
pub struct ProvisionInvocation<'a> {
    binding: &'a BindingInfo,
    listeners: &'a [Arc<dyn ProvisionListener>],
    next: usize,
    provision: &'a mut (dyn FnMut() -> Result<Erased, ResolveErrorKind> + 'a),
    result: Option<Result<Erased, ResolveErrorKind>>,
}

impl<'a> ProvisionInvocation<'a> {
    #[inline]
    #[must_use]
    pub(crate) fn new(
        binding: &'a BindingInfo,
        listeners: &'a [Arc<dyn ProvisionListener>],
        provision: &'a mut (dyn FnMut() -> Result<Erased, ResolveErrorKind> + 'a),
    ) -> Self {
        Self {
            binding,
            listeners,
            next: 0,
            provision,
            result: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn binding(&self) -> &BindingInfo {
        self.binding
    }

    fn notify_rest(&mut self) {
        let listeners = self.listeners;
        while self.result.is_none() {
            let Some(listener) = listeners.get(self.next) else {
                break;
            };
            self.next += 1;
            listener.on_provision(self);
        }
    }

    /// Provides the instance, or returns the result of an earlier call
    #[allow(clippy::missing_errors_doc)]
    pub fn provision(&mut self) -> Result<&Erased, &ResolveErrorKind> {
        self.notify_rest();
        self.result.get_or_insert_with(|| (self.provision)()).as_ref()
    }

    pub(crate) fn finish(mut self) -> Result<Erased, ResolveErrorKind> {
        self.notify_rest();
        match self.result.take() {
            Some(result) => result,
            None => (self.provision)(),
        }
    }
}
