use alloc::sync::Arc;
use core::fmt::{self, Debug, Formatter};

use crate::{any::TypeInfo, binder::Binder, scope::Scope};

/// Ambient scope of a nested [`super::BindingScope`]: a scope instance or a scope annotation
#[derive(Clone)]
pub enum ScopeRef {
    Instance(Arc<dyn Scope>),
    Annotation(TypeInfo),
}

impl Debug for ScopeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(scope) => f.debug_tuple("Instance").field(&scope.name()).finish(),
            Self::Annotation(annotation) => f.debug_tuple("Annotation").field(&annotation.short_name()).finish(),
        }
    }
}

/// Declaration of the scope bound to a scope annotation
pub struct ScopeBinding<'a> {
    binder: &'a mut Binder,
    annotation: TypeInfo,
}

impl<'a> ScopeBinding<'a> {
    #[inline]
    #[must_use]
    pub(crate) fn new(binder: &'a mut Binder, annotation: TypeInfo) -> Self {
        Self { binder, annotation }
    }

    #[inline]
    #[must_use]
    pub const fn annotation(&self) -> TypeInfo {
        self.annotation
    }

    #[track_caller]
    pub fn to(self, scope: impl Scope) {
        self.binder.bind_scope_type(self.annotation, Arc::new(scope));
    }
}
