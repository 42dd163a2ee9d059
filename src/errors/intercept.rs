#[derive(thiserror::Error, Debug)]
pub enum InterceptErrorKind {
    #[error("Interceptor of method {method} returned a value that isn't {expected}")]
    IncorrectReturnType { method: &'static str, expected: &'static str },
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}
