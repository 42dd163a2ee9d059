use alloc::boxed::Box;

use super::{instantiate::InstantiateErrorKind, instantiator::InstantiatorErrorKind};
use crate::{any::TypeInfo, key::KeyData};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No binding found for {key}")]
    NoBinding { key: KeyData },
    #[error("Incorrect provided type for {key}. Expected: {expected}")]
    IncorrectType { key: KeyData, expected: TypeInfo },
    #[error("Provider for {key} failed: {source}")]
    Provision { key: KeyData, source: InstantiateErrorKind },
    #[error(transparent)]
    Instantiator(InstantiatorErrorKind<Box<ResolveErrorKind>, InstantiateErrorKind>),
}
