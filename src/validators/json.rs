use super::SchemaValidator;
use crate::loader::ResourceLoader;
use crate::media_type::MediaType;
use crate::violations::{format_instance_location, Severity, Violation, Violations};
use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;
use std::sync::Arc;

/// Validates JSON bodies against JSON Schemas.
///
/// Vendor types with a `+json` suffix are supported through the media-type
/// suffix alias.
#[derive(Default)]
pub struct JsonSchemaValidator {
    loader: Option<Arc<dyn ResourceLoader>>,
}

impl JsonSchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    fn build(&self, schema: &Value) -> Result<Validator, String> {
        let mut options = jsonschema::options();
        if let Some(loader) = &self.loader {
            options = options.with_retriever(LoaderRetriever(loader.clone()));
        }
        options.build(schema).map_err(|err| err.to_string())
    }
}

/// Resolves external `$ref`s by fetching the referenced document by URI.
struct LoaderRetriever(Arc<dyn ResourceLoader>);

impl Retrieve for LoaderRetriever {
    fn retrieve(
        &self,
        uri: &Uri<String>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let bytes = self.0.fetch(uri.as_str())?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn supports(&self, media_type: &MediaType) -> bool {
        media_type.is_compatible_with(&MediaType::json())
    }

    fn with_resource_loader(&self, loader: Arc<dyn ResourceLoader>) -> Arc<dyn SchemaValidator> {
        Arc::new(Self {
            loader: Some(loader),
        })
    }

    fn validate(&self, content: &str, schema: &str, violations: &mut Violations) {
        let schema_value: Value = match serde_json::from_str(schema) {
            Ok(value) => value,
            Err(err) => {
                violations.add(Violation::new(
                    Severity::Error,
                    format!("invalid schema: {}", err),
                ));
                return;
            }
        };
        let validator = match self.build(&schema_value) {
            Ok(validator) => validator,
            Err(failure) => {
                violations.add(Violation::new(
                    Severity::Error,
                    format!("invalid schema: {}", failure),
                ));
                return;
            }
        };
        let instance: Value = match serde_json::from_str(content) {
            Ok(value) => value,
            Err(err) => {
                violations.add(Violation::new(
                    Severity::Fatal,
                    format!("malformed document: {}", err),
                ));
                return;
            }
        };
        for error in validator.iter_errors(&instance) {
            let location = format_instance_location(&error.instance_path.to_string(), "body");
            violations.add(Violation::new(
                Severity::Error,
                format!("{}: {}", location, error),
            ));
        }
    }
}
