pub mod json;
pub mod registry;
pub mod xml;

pub use json::JsonSchemaValidator;
pub use registry::SchemaValidators;
pub use xml::XmlSchemaValidator;

use crate::loader::ResourceLoader;
use crate::media_type::MediaType;
use crate::violations::Violations;
use std::sync::Arc;

/// Pluggable schema validation capability for one family of media types.
pub trait SchemaValidator: Send + Sync {
    /// Whether this validator can check bodies of the given content type.
    fn supports(&self, media_type: &MediaType) -> bool;

    /// Returns a copy bound to `loader` for resolving externally referenced
    /// schema fragments; `self` is unchanged.
    fn with_resource_loader(&self, loader: Arc<dyn ResourceLoader>) -> Arc<dyn SchemaValidator>;

    /// Checks `content` against `schema`, appending findings to `violations`.
    ///
    /// Never fails: schema compilation and reference-resolution problems
    /// become a single violation instead of aborting the session.
    fn validate(&self, content: &str, schema: &str, violations: &mut Violations);
}
