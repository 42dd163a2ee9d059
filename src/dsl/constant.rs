use tracing::error;

use crate::{
    annotation::{Annotation, Qualifier},
    binder::{Binder, Constant, ConstantBindingBuilder},
    errors::ConstantBindingErrorKind,
};

/// Declaration of a constant binding.
///
/// The constant must be annotated before its value is set.
/// Annotating again replaces the previous annotation, whether it was an instance or a type.
pub struct ConstantBinding<'a> {
    binder: &'a mut Binder,
    annotation: Option<Qualifier>,
}

impl<'a> ConstantBinding<'a> {
    #[inline]
    #[must_use]
    pub(crate) fn new(binder: &'a mut Binder) -> Self {
        Self { binder, annotation: None }
    }

    #[inline]
    #[must_use]
    pub fn annotated_with(mut self, annotation: impl Annotation) -> Self {
        self.annotation = Some(Qualifier::of_instance(annotation));
        self
    }

    #[inline]
    #[must_use]
    pub fn annotated_with_type<A: Annotation>(mut self) -> Self {
        self.annotation = Some(Qualifier::of_type::<A>());
        self
    }

    #[track_caller]
    fn build(self) -> Result<ConstantBindingBuilder<'a>, ConstantBindingErrorKind> {
        match self.annotation {
            Some(qualifier) => Ok(self.binder.bind_constant().qualified(qualifier)),
            None => {
                let err = ConstantBindingErrorKind::MissingAnnotation;
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Binds a primitive, a string or a [`crate::TypeInfo`]
    ///
    /// # Errors
    /// Returns [`ConstantBindingErrorKind::MissingAnnotation`] if the constant isn't annotated. Nothing is bound then
    #[track_caller]
    pub fn to<C: Constant>(self, value: C) -> Result<(), ConstantBindingErrorKind> {
        self.build()?.to(value);
        Ok(())
    }

    /// # Errors
    /// Returns [`ConstantBindingErrorKind::MissingAnnotation`] if the constant isn't annotated. Nothing is bound then
    #[track_caller]
    pub fn to_enum<E: Copy + Send + Sync + 'static>(self, value: E) -> Result<(), ConstantBindingErrorKind> {
        self.build()?.to_enum(value);
        Ok(())
    }

    /// Binds the [`crate::TypeInfo`] of `C`
    ///
    /// # Errors
    /// Returns [`ConstantBindingErrorKind::MissingAnnotation`] if the constant isn't annotated. Nothing is bound then
    #[track_caller]
    pub fn to_type<C: ?Sized + 'static>(self) -> Result<(), ConstantBindingErrorKind> {
        self.build()?.to_type::<C>();
        Ok(())
    }
}
