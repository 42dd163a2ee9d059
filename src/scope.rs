use alloc::sync::Arc;
use core::fmt::{self, Debug, Formatter};
use parking_lot::Mutex;
use tracing::debug;

use crate::{
    annotation::Annotation,
    any::TypeInfo,
    key::KeyData,
    provider::{BoxedProvider, Erased},
};

/// Policy governing instance reuse for a binding
pub trait Scope: Send + Sync + 'static {
    /// Wraps the unscoped provider of the binding identified by `key`
    #[must_use]
    fn scope(&self, key: &KeyData, unscoped: BoxedProvider) -> BoxedProvider;

    #[must_use]
    fn name(&self) -> &'static str;

    /// Singleton-equivalent scopes are instantiated eagerly in [`crate::Stage::Production`]
    #[must_use]
    fn is_singleton(&self) -> bool {
        false
    }
}

/// Scope annotation of [`SingletonScope`], bound in every injector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Singleton;

impl Annotation for Singleton {}

/// One instance per binding
#[derive(Debug, Clone, Copy, Default)]
pub struct SingletonScope;

impl Scope for SingletonScope {
    fn scope(&self, key: &KeyData, unscoped: BoxedProvider) -> BoxedProvider {
        let instance: Arc<Mutex<Option<Erased>>> = Arc::default();
        let key = key.clone();

        BoxedProvider::from_fn(move |injector| {
            if let Some(instance) = instance.lock().as_ref() {
                debug!(%key, "Found in cache");
                return Ok(instance.clone());
            }
            debug!(%key, "Not found in cache");

            // The lock isn't held during provision, so the first stored instance wins
            let provided = unscoped.provide(injector)?;
            let instance = instance.lock().get_or_insert(provided).clone();
            debug!(%key, "Cached");
            Ok(instance)
        })
    }

    fn name(&self) -> &'static str {
        "singleton"
    }

    fn is_singleton(&self) -> bool {
        true
    }
}

/// Scope that doesn't reuse instances
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScope;

impl Scope for NoScope {
    fn scope(&self, _key: &KeyData, unscoped: BoxedProvider) -> BoxedProvider {
        unscoped
    }

    fn name(&self) -> &'static str {
        "no_scope"
    }
}

/// Scope setting of a binding
#[derive(Clone, Default)]
pub enum Scoping {
    #[default]
    Unscoped,
    Instance(Arc<dyn Scope>),
    Annotation(TypeInfo),
    EagerSingleton,
}

impl Debug for Scoping {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unscoped => f.write_str("Unscoped"),
            Self::Instance(scope) => f.debug_tuple("Instance").field(&scope.name()).finish(),
            Self::Annotation(annotation) => f.debug_tuple("Annotation").field(&annotation.short_name()).finish(),
            Self::EagerSingleton => f.write_str("EagerSingleton"),
        }
    }
}

impl Scoping {
    #[inline]
    #[must_use]
    pub const fn is_unscoped(&self) -> bool {
        matches!(self, Self::Unscoped)
    }
}
