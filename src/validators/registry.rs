use super::{JsonSchemaValidator, SchemaValidator, XmlSchemaValidator};
use crate::error::ValidationError;
use crate::loader::ResourceLoader;
use crate::media_type::MediaType;
use crate::violations::Violations;
use std::sync::Arc;
use tracing::debug;

/// Ordered, immutable collection of schema validators.
///
/// Every update returns a new registry; existing values are never mutated and
/// are safe to share across sessions.
#[derive(Clone, Default)]
pub struct SchemaValidators {
    validators: Vec<Arc<dyn SchemaValidator>>,
    loader: Option<Arc<dyn ResourceLoader>>,
}

impl SchemaValidators {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the validators every session starts from.
    pub fn standard() -> Self {
        Self::empty()
            .add_schema_validator(Arc::new(XmlSchemaValidator::new()))
            .add_schema_validator(Arc::new(JsonSchemaValidator::new()))
    }

    /// Returns a new registry with `validator` appended.
    ///
    /// A registry already bound to a loader binds the new validator as well.
    pub fn add_schema_validator(&self, validator: Arc<dyn SchemaValidator>) -> Self {
        let validator = match &self.loader {
            Some(loader) => validator.with_resource_loader(loader.clone()),
            None => validator,
        };
        let mut validators = self.validators.clone();
        validators.push(validator);
        Self {
            validators,
            loader: self.loader.clone(),
        }
    }

    /// Returns a new registry with every validator rebound to `loader`.
    pub fn with_resource_loader(&self, loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            validators: self
                .validators
                .iter()
                .map(|validator| validator.with_resource_loader(loader.clone()))
                .collect(),
            loader: Some(loader),
        }
    }

    /// First registered validator that supports `media_type`.
    pub fn find_validator(&self, media_type: &MediaType) -> Option<&Arc<dyn SchemaValidator>> {
        self.validators
            .iter()
            .find(|validator| validator.supports(media_type))
    }

    /// Validates `content` against `schema` with the first supporting validator.
    ///
    /// Fails with [`ValidationError::UnsupportedMediaType`] when no registered
    /// validator supports `media_type`; schema findings go to `violations`.
    pub fn validate(
        &self,
        media_type: &MediaType,
        content: &str,
        schema: &str,
        violations: &mut Violations,
    ) -> Result<(), ValidationError> {
        let validator = self
            .find_validator(media_type)
            .ok_or_else(|| ValidationError::UnsupportedMediaType(media_type.to_string()))?;
        debug!(media_type = %media_type, "schema validator selected");
        validator.validate(content, schema, violations);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}
