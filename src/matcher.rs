/// Predicate used to select types, methods or bindings
pub trait Matcher<T: ?Sized>: Send + Sync + 'static {
    #[must_use]
    fn matches(&self, value: &T) -> bool;

    #[inline]
    #[must_use]
    fn and<M: Matcher<T>>(self, other: M) -> And<Self, M>
    where
        Self: Sized,
    {
        And(self, other)
    }

    #[inline]
    #[must_use]
    fn or<M: Matcher<T>>(self, other: M) -> Or<Self, M>
    where
        Self: Sized,
    {
        Or(self, other)
    }
}

impl<T, F> Matcher<T> for F
where
    T: ?Sized,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    #[inline]
    fn matches(&self, value: &T) -> bool {
        self(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnyMatcher;

impl<T: ?Sized> Matcher<T> for AnyMatcher {
    #[inline]
    fn matches(&self, _value: &T) -> bool {
        true
    }
}

/// Matches anything
#[inline]
#[must_use]
pub const fn any() -> AnyMatcher {
    AnyMatcher
}

#[derive(Debug, Clone)]
pub struct Only<V>(V);

impl<V> Matcher<V> for Only<V>
where
    V: PartialEq + Send + Sync + 'static,
{
    #[inline]
    fn matches(&self, value: &V) -> bool {
        self.0 == *value
    }
}

/// Matches values equal to `value`
#[inline]
#[must_use]
pub const fn only<V>(value: V) -> Only<V> {
    Only(value)
}

#[derive(Debug, Clone)]
pub struct Not<M>(M);

impl<T: ?Sized, M: Matcher<T>> Matcher<T> for Not<M> {
    #[inline]
    fn matches(&self, value: &T) -> bool {
        !self.0.matches(value)
    }
}

/// Inverts `matcher`
#[inline]
#[must_use]
pub const fn not<M>(matcher: M) -> Not<M> {
    Not(matcher)
}

#[derive(Debug, Clone)]
pub struct And<A, B>(A, B);

impl<T: ?Sized, A: Matcher<T>, B: Matcher<T>> Matcher<T> for And<A, B> {
    #[inline]
    fn matches(&self, value: &T) -> bool {
        self.0.matches(value) && self.1.matches(value)
    }
}

#[derive(Debug, Clone)]
pub struct Or<A, B>(A, B);

impl<T: ?Sized, A: Matcher<T>, B: Matcher<T>> Matcher<T> for Or<A, B> {
    #[inline]
    fn matches(&self, value: &T) -> bool {
        self.0.matches(value) || self.1.matches(value)
    }
}
