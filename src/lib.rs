#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod annotation;
pub(crate) mod any;
pub(crate) mod binder;
pub(crate) mod config;
pub(crate) mod dependency_resolver;
pub(crate) mod errors;
pub(crate) mod inject;
pub(crate) mod injector;
pub(crate) mod instantiator;
pub(crate) mod intercept;
pub(crate) mod key;
pub(crate) mod listener;
pub(crate) mod matcher;
pub(crate) mod provider;
pub(crate) mod scope;
pub(crate) mod service;

pub mod dsl;

#[doc(hidden)]
pub mod __private {
    pub use alloc::sync::Arc;
}

pub use annotation::{named, Annotation, AnnotationRef, Named, Qualifier};
pub use any::{TypeInfo, Upcast};
pub use binder::{
    Annotatable, AnnotatedBindingBuilder, AnnotatedConstantBindingBuilder, Binder, BindingBuilder, BindingElement, Constant,
    ConstantBindingBuilder, Link, Linkable, LinkedBindingBuilder, Module, ScopeElement, ScopedBindingBuilder, Target,
};
pub use config::{Config, Stage};
pub use dependency_resolver::DependencyResolver;
pub use errors::{
    BindingErrorKind, ConstantBindingErrorKind, CreationError, InstantiateErrorKind, InstantiatorErrorKind, InterceptErrorKind,
    ResolveErrorKind,
};
pub use inject::{Inject, InjectProvider, InjectWith};
pub use injector::{BindingInfo, Injector, KeyProvider};
pub use instantiator::{Injectable, Instantiator};
pub use intercept::{MethodInterceptor, MethodInvocation, MethodResult};
pub use key::{Key, KeyData, TypeLiteral};
pub use listener::{ProvisionInvocation, ProvisionListener, TypeEncounter, TypeListener};
pub use matcher::{any, not, only, AnyMatcher, Matcher, Not, Only};
pub use provider::{provider_fn, BoxedProvider, Erased, Provider, ProviderFn};
pub use scope::{NoScope, Scope, Scoping, Singleton, SingletonScope};
