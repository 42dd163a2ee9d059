#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantBindingErrorKind {
    #[error("Constant binding must have an annotation")]
    MissingAnnotation,
}
