use alloc::{boxed::Box, sync::Arc};
use core::any::{type_name, Any};

use crate::{any::TypeInfo, errors::InterceptErrorKind};

/// Return value of an intercepted method
pub type MethodResult = Box<dyn Any + Send>;

/// Interceptor of method calls, see [`crate::Injector::intercept`].
///
/// # Examples
/// ```rust
/// use fluent_inject::{InterceptErrorKind, MethodInvocation, MethodResult};
///
/// fn logging(invocation: &mut MethodInvocation<'_>) -> Result<MethodResult, InterceptErrorKind> {
///     tracing::info!(method = invocation.method(), "Calling");
///     invocation.proceed()
/// }
/// ```
pub trait MethodInterceptor: Send + Sync + 'static {
    #[allow(clippy::missing_errors_doc)]
    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> Result<MethodResult, InterceptErrorKind>;
}

impl<F> MethodInterceptor for F
where
    F: Fn(&mut MethodInvocation<'_>) -> Result<MethodResult, InterceptErrorKind> + Send + Sync + 'static,
{
    #[inline]
    fn invoke(&self, invocation: &mut MethodInvocation<'_>) -> Result<MethodResult, InterceptErrorKind> {
        self(invocation)
    }
}

/// Intercepted method call
pub struct MethodInvocation<'a> {
    declaring_type: TypeInfo,
    method: &'static str,
    interceptors: &'a [Arc<dyn MethodInterceptor>],
    next: usize,
    target: &'a mut (dyn FnMut() -> MethodResult + 'a),
}

impl<'a> MethodInvocation<'a> {
    #[inline]
    #[must_use]
    pub(crate) fn new(
        declaring_type: TypeInfo,
        method: &'static str,
        interceptors: &'a [Arc<dyn MethodInterceptor>],
        target: &'a mut (dyn FnMut() -> MethodResult + 'a),
    ) -> Self {
        Self {
            declaring_type,
            method,
            interceptors,
            next: 0,
            target,
        }
    }

    #[inline]
    #[must_use]
    pub const fn declaring_type(&self) -> TypeInfo {
        self.declaring_type
    }

    #[inline]
    #[must_use]
    pub const fn method(&self) -> &'static str {
        self.method
    }

    /// Calls the next interceptor, or the method itself after the last one.
    /// May be called more than once, every call runs the rest of the chain again
    #[allow(clippy::missing_errors_doc)]
    pub fn proceed(&mut self) -> Result<MethodResult, InterceptErrorKind> {
        let interceptors = self.interceptors;
        match interceptors.get(self.next) {
            Some(interceptor) => {
                self.next += 1;
                let result = interceptor.invoke(self);
                self.next -= 1;
                result
            }
            None => Ok((self.target)()),
        }
    }

    /// Same as [`Self::proceed`] with the result downcast to the method return type
    #[allow(clippy::missing_errors_doc)]
    pub fn proceed_as<R: Send + 'static>(&mut self) -> Result<R, InterceptErrorKind> {
        let method = self.method;
        self.proceed().and_then(|result| downcast_result(method, result))
    }
}

pub(crate) fn downcast_result<R: Send + 'static>(method: &'static str, result: MethodResult) -> Result<R, InterceptErrorKind> {
    result
        .downcast::<R>()
        .map(|result| *result)
        .map_err(|_| InterceptErrorKind::IncorrectReturnType {
            method,
            expected: type_name::<R>(),
        })
}
