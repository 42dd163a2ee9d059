/// Stage an injector is created in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Singleton-scoped bindings are instantiated on first use
    #[default]
    Development,
    /// Singleton-scoped bindings are instantiated while the injector is created,
    /// so their errors surface as [`crate::CreationError`]
    Production,
}

/// Config for an injector
/// ## Fields
/// - `stage`:
///   Controls when singleton-scoped bindings are instantiated, see [`Stage`].
/// - `require_explicit_bindings`:
///   If `true`, constructors registered by link targets aren't bound implicitly,
///   so every resolved key must have its own binding.
///
///   Same effect as [`crate::Binder::require_explicit_bindings`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    pub stage: Stage,
    pub require_explicit_bindings: bool,
}

impl Config {
    #[inline]
    #[must_use]
    pub const fn production() -> Self {
        Self {
            stage: Stage::Production,
            require_explicit_bindings: false,
        }
    }
}
