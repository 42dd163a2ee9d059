//! Fluent declaration of bindings on top of [`Binder`](crate::Binder).
//!
//! Every terminal call of a declaration performs exactly one registration on the binder.
//!
//! # Examples
//! ```rust
//! use fluent_inject::{dsl::prelude::*, named, Injectable, InstantiateErrorKind, Injector, Key, Singleton};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_owned()
//!     }
//! }
//!
//! impl Injectable for English {
//!     type Deps = ();
//!
//!     fn construct((): ()) -> Result<Self, InstantiateErrorKind> {
//!         Ok(Self)
//!     }
//! }
//!
//! fluent_inject::implements!(English => dyn Greeter);
//!
//! let injector = Injector::create(&module(|binder| {
//!     binder.bindings(|b| {
//!         b.constant().annotated_with(named("retries")).to(3_u8).unwrap();
//!         b.scope_annotated::<Singleton>(|b| {
//!             b.ty::<dyn Greeter>().to::<English>();
//!         });
//!     });
//! }))
//! .unwrap();
//!
//! let greeter = injector.get::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "hello");
//! assert!(Arc::ptr_eq(&greeter, &injector.get::<dyn Greeter>().unwrap()));
//! assert_eq!(*injector.get_key(&Key::<u8>::annotated(named("retries"))).unwrap(), 3);
//! ```

mod binding_scope;
mod constant;
mod implementation;
mod module;
mod scope;

pub use binding_scope::{BindingScope, DefaultBindingScope};
pub use constant::ConstantBinding;
pub use implementation::{ImplementationBinding, KeyBinding, TypeBinding, TypeKind};
pub use module::{module, BinderExt, FnModule};
pub use scope::{ScopeBinding, ScopeRef};

pub mod prelude {
    pub use super::{module, BinderExt as _, ImplementationBinding as _};
}
