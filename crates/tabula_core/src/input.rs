//! Input normalization: transform then validate.

use crate::error::CoreResult;
use std::fmt;
use std::sync::Arc;
use tabula_store::Tuple;

/// Coerces or reshapes raw caller input into a normalized tuple.
pub type Transform = Arc<dyn Fn(Tuple) -> CoreResult<Tuple> + Send + Sync>;

/// Inspects a normalized tuple and may reject it.
pub type Validator = Arc<dyn Fn(&Tuple) -> CoreResult<()> + Send + Sync>;

/// The pluggable input step of a command.
///
/// Runs exactly once per invocation, before diffing: the transform
/// first, then the validator against the transformed tuple. Either may
/// reject, in which case execution aborts before any store access.
/// An empty pipeline passes input through untouched.
#[derive(Clone, Default)]
pub struct InputPipeline {
    transform: Option<Transform>,
    validator: Option<Validator>,
}

impl InputPipeline {
    /// Creates a pass-through pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transform step.
    #[must_use]
    pub fn with_transform(
        mut self,
        transform: impl Fn(Tuple) -> CoreResult<Tuple> + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Sets the validation step.
    #[must_use]
    pub fn with_validator(
        mut self,
        validator: impl Fn(&Tuple) -> CoreResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Normalizes raw input: transform, then validate.
    pub fn normalize(&self, raw: Tuple) -> CoreResult<Tuple> {
        let attributes = match &self.transform {
            Some(transform) => transform(raw)?,
            None => raw,
        };
        if let Some(validator) = &self.validator {
            validator(&attributes)?;
        }
        Ok(attributes)
    }
}

impl fmt::Debug for InputPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputPipeline")
            .field("transform", &self.transform.is_some())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}
