use core::{
    fmt::{self, Debug, Display, Formatter},
    marker::PhantomData,
};

use crate::{
    annotation::{Annotation, Qualifier},
    any::TypeInfo,
};

/// Untyped identity of an injectable slot: a type with an optional qualifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeyData {
    pub type_info: TypeInfo,
    pub qualifier: Option<Qualifier>,
}

impl KeyData {
    #[inline]
    #[must_use]
    pub const fn unqualified(type_info: TypeInfo) -> Self {
        Self {
            type_info,
            qualifier: None,
        }
    }
}

impl Display for KeyData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "Key[type={}, annotation={qualifier}]", self.type_info),
            None => write!(f, "Key[type={}]", self.type_info),
        }
    }
}

/// Typed identity of an injectable slot
pub struct Key<T: ?Sized> {
    data: KeyData,
    _marker: PhantomData<fn(&T)>,
}

impl<T: ?Sized + 'static> Key<T> {
    #[inline]
    #[must_use]
    pub fn of() -> Self {
        Self::from_data(KeyData::unqualified(TypeInfo::of::<T>()))
    }

    #[inline]
    #[must_use]
    pub fn from_literal(_literal: TypeLiteral<T>) -> Self {
        Self::of()
    }

    /// Key qualified with an annotation instance
    #[inline]
    #[must_use]
    pub fn annotated(annotation: impl Annotation) -> Self {
        Self::qualified(Qualifier::of_instance(annotation))
    }

    /// Key qualified with an annotation type
    #[inline]
    #[must_use]
    pub fn annotated_with<A: Annotation>() -> Self {
        Self::qualified(Qualifier::of_type::<A>())
    }

    #[inline]
    #[must_use]
    pub fn qualified(qualifier: Qualifier) -> Self {
        Self::from_data(KeyData {
            type_info: TypeInfo::of::<T>(),
            qualifier: Some(qualifier),
        })
    }
}

impl<T: ?Sized> Key<T> {
    #[inline]
    #[must_use]
    pub(crate) const fn from_data(data: KeyData) -> Self {
        Self {
            data,
            _marker: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub const fn data(&self) -> &KeyData {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn into_data(self) -> KeyData {
        self.data
    }
}

impl<T: ?Sized> Clone for Key<T> {
    fn clone(&self) -> Self {
        Self::from_data(self.data.clone())
    }
}

impl<T: ?Sized> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<T: ?Sized> Eq for Key<T> {}

impl<T: ?Sized> Debug for Key<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.data, f)
    }
}

impl<T: ?Sized> Display for Key<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.data, f)
    }
}

/// Token that carries a (possibly generic) type
pub struct TypeLiteral<T: ?Sized>(PhantomData<fn(&T)>);

impl<T: ?Sized + 'static> TypeLiteral<T> {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }
}

impl<T: ?Sized + 'static> Default for TypeLiteral<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for TypeLiteral<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for TypeLiteral<T> {}

impl<T: ?Sized + 'static> Debug for TypeLiteral<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "TypeLiteral<{}>", self.type_info())
    }
}
