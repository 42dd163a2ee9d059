mod constant;
mod creation;
mod dependency_resolver;
mod instantiate;
mod instantiator;
mod intercept;

pub use constant::ConstantBindingErrorKind;
pub use creation::{BindingErrorKind, CreationError};
pub use dependency_resolver::ResolveErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use instantiator::InstantiatorErrorKind;
pub use intercept::InterceptErrorKind;
