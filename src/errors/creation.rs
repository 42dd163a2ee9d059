use alloc::{string::String, vec::Vec};
use core::panic::Location;

use super::dependency_resolver::ResolveErrorKind;
use crate::{any::TypeInfo, key::KeyData};

#[derive(thiserror::Error, Debug)]
pub enum BindingErrorKind {
    #[error("Binding to {key} at {location} was already configured at {previous}")]
    DuplicateBinding {
        key: KeyData,
        location: &'static Location<'static>,
        previous: &'static Location<'static>,
    },
    #[error("Scope annotation {annotation} at {location} is already bound to a scope")]
    DuplicateScope {
        annotation: TypeInfo,
        location: &'static Location<'static>,
    },
    #[error("No scope is bound to {annotation}, required by {key} at {location}")]
    ScopeNotBound {
        annotation: TypeInfo,
        key: KeyData,
        location: &'static Location<'static>,
    },
    #[error("No implementation for {key} was bound, required at {location}")]
    MissingImplementation {
        key: KeyData,
        location: &'static Location<'static>,
    },
    #[error("Binding to {key} at {location} points to itself")]
    SelfLink {
        key: KeyData,
        location: &'static Location<'static>,
    },
    #[error("Binding to {key} at {location} links back to itself through other bindings")]
    LinkCycle {
        key: KeyData,
        location: &'static Location<'static>,
    },
    #[error("Type listener rejected {type_info}: {message}")]
    TypeListener { type_info: TypeInfo, message: String },
    #[error("Unable to eagerly create {key}: {error}")]
    EagerSingleton {
        key: KeyData,
        #[source]
        error: ResolveErrorKind,
    },
}

#[derive(thiserror::Error, Debug)]
#[error("Unable to create injector, {} error(s). First: {}", .errors.len(), FirstError(.errors))]
pub struct CreationError {
    pub errors: Vec<BindingErrorKind>,
}

struct FirstError<'a>(&'a [BindingErrorKind]);

impl core::fmt::Display for FirstError<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0.first() {
            Some(error) => core::fmt::Display::fmt(error, f),
            None => f.write_str("none"),
        }
    }
}
