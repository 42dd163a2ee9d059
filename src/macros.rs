macro_rules! all_the_tuples {
    ($name:ident) => {
        $name!([]);
        $name!([T1]);
        $name!([T1, T2]);
        $name!([T1, T2, T3]);
        $name!([T1, T2, T3, T4]);
        $name!([T1, T2, T3, T4, T5]);
        $name!([T1, T2, T3, T4, T5, T6]);
        $name!([T1, T2, T3, T4, T5, T6, T7]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9, T10]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11]);
        $name!([T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12]);
    };
}

/// Declares that an implementation type can be bound to one or more interfaces (trait objects).
///
/// # Syntax
/// ```text
/// implements!(Implementation => dyn Trait [, dyn OtherTrait ...]);
/// ```
///
/// # Examples
/// ```rust
/// use fluent_inject::{implements, Upcast};
/// use std::sync::Arc;
///
/// trait UserRepo: Send + Sync {}
///
/// struct PostgresUserRepo;
///
/// impl UserRepo for PostgresUserRepo {}
///
/// implements!(PostgresUserRepo => dyn UserRepo);
///
/// let repo: Arc<dyn UserRepo> = Upcast::<dyn UserRepo>::upcast(Arc::new(PostgresUserRepo));
/// ```
#[macro_export]
macro_rules! implements {
    ($implementation:ty => $($interface:ty),+ $(,)?) => {
        $(
            impl $crate::Upcast<$interface> for $implementation {
                #[inline]
                fn upcast(self: $crate::__private::Arc<Self>) -> $crate::__private::Arc<$interface> {
                    self
                }
            }
        )+
    };
}
