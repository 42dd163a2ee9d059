use alloc::{string::String, sync::Arc};
use core::{
    any::Any,
    cmp::Ordering,
    fmt::{self, Debug, Display, Formatter},
    mem,
};

use crate::any::TypeInfo;

/// Marker for types used to disambiguate bindings of the same type.
///
/// A unit struct works as an annotation *type* (see [`crate::Key::annotated_with`]),
/// a struct with fields works as an annotation *instance* (see [`Named`]).
pub trait Annotation: Debug + Ord + Send + Sync + 'static {}

type AnyRef<'a> = &'a (dyn Any + Send + Sync);

/// Type-erased annotation instance
#[derive(Clone)]
pub struct AnnotationRef {
    type_info: TypeInfo,
    value: Arc<dyn Any + Send + Sync>,
    fmt: fn(AnyRef<'_>, &mut Formatter<'_>) -> fmt::Result,
    cmp: fn(AnyRef<'_>, AnyRef<'_>) -> Ordering,
}

impl AnnotationRef {
    #[inline]
    #[must_use]
    pub fn new<A: Annotation>(annotation: A) -> Self {
        Self {
            type_info: TypeInfo::of::<A>(),
            value: Arc::new(annotation),
            fmt: fmt_annotation::<A>,
            cmp: cmp_annotation::<A>,
        }
    }

    #[inline]
    #[must_use]
    pub fn annotation_type(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn downcast_ref<A: Annotation>(&self) -> Option<&A> {
        self.value.downcast_ref()
    }
}

fn fmt_annotation<A: Annotation>(value: AnyRef<'_>, f: &mut Formatter<'_>) -> fmt::Result {
    match value.downcast_ref::<A>() {
        Some(annotation) => Debug::fmt(annotation, f),
        None => f.write_str("<unknown>"),
    }
}

fn cmp_annotation<A: Annotation>(left: AnyRef<'_>, right: AnyRef<'_>) -> Ordering {
    match (left.downcast_ref::<A>(), right.downcast_ref::<A>()) {
        (Some(left), Some(right)) => left.cmp(right),
        _ => Ordering::Equal,
    }
}

impl Debug for AnnotationRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        (self.fmt)(&*self.value, f)
    }
}

impl PartialEq for AnnotationRef {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AnnotationRef {}

impl PartialOrd for AnnotationRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AnnotationRef {
    fn cmp(&self, other: &Self) -> Ordering {
        // Values are compared only when both have the same type
        self.type_info
            .cmp(&other.type_info)
            .then_with(|| (self.cmp)(&*self.value, &*other.value))
    }
}

/// Disambiguator of a binding key: either an annotation type or an annotation instance, never both.
///
/// An instance of a field-less annotation carries nothing beyond its type, so it qualifies as the type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Qualifier {
    Type(TypeInfo),
    Instance(AnnotationRef),
}

impl Qualifier {
    #[inline]
    #[must_use]
    pub fn of_type<A: Annotation>() -> Self {
        Self::Type(TypeInfo::of::<A>())
    }

    #[inline]
    #[must_use]
    pub fn of_instance<A: Annotation>(annotation: A) -> Self {
        if mem::size_of::<A>() == 0 {
            return Self::of_type::<A>();
        }
        Self::Instance(AnnotationRef::new(annotation))
    }

    #[inline]
    #[must_use]
    pub fn annotation_type(&self) -> TypeInfo {
        match self {
            Self::Type(type_info) => *type_info,
            Self::Instance(annotation) => annotation.annotation_type(),
        }
    }
}

impl Display for Qualifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(type_info) => write!(f, "@{}", type_info.short_name()),
            Self::Instance(annotation) => write!(f, "@{annotation:?}"),
        }
    }
}

/// Annotation instance that qualifies a binding by name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Named(pub String);

impl Annotation for Named {}

#[inline]
#[must_use]
pub fn named(name: impl Into<String>) -> Named {
    Named(name.into())
}
