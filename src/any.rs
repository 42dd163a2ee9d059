use alloc::sync::Arc;
use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

pub(crate) type RcAny = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        // Generic arguments may contain paths too, so only the head is split
        let head = self.name.split_once('<').map_or(self.name, |(head, _)| head);
        match head.rsplit_once("::") {
            Some((path, _)) => &self.name[path.len() + 2..],
            None => self.name,
        }
    }
}

/// Conversion of a shared implementation into a shared interface.
///
/// Every type converts into itself. Conversions into trait objects are declared with [`crate::implements`].
pub trait Upcast<T: ?Sized> {
    fn upcast(self: Arc<Self>) -> Arc<T>;
}

impl<T: ?Sized> Upcast<T> for T {
    #[inline]
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{TypeInfo, Upcast};

    use alloc::{string::String, sync::Arc, vec::Vec};

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    implements!(English => dyn Greeter);

    #[test]
    fn test_type_info_eq_by_id() {
        assert_eq!(TypeInfo::of::<String>(), TypeInfo::of::<String>());
        assert_ne!(TypeInfo::of::<String>(), TypeInfo::of::<&'static str>());
        assert_eq!(TypeInfo::of::<dyn Greeter>(), TypeInfo::of::<dyn Greeter>());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(TypeInfo::of::<String>().short_name(), "String");
        assert_eq!(TypeInfo::of::<Vec<String>>().short_name(), "Vec<alloc::string::String>");
        assert_eq!(TypeInfo::of::<u8>().short_name(), "u8");
    }

    #[test]
    fn test_upcast() {
        let english = Arc::new(English);
        let same: Arc<English> = Upcast::<English>::upcast(english.clone());
        let greeter: Arc<dyn Greeter> = Upcast::<dyn Greeter>::upcast(english.clone());

        assert!(Arc::ptr_eq(&english, &same));
        assert_eq!(greeter.greet(), "hello");
        assert_eq!(Arc::strong_count(&english), 3);
    }
}
