pub mod error;
pub mod loader;
pub mod media_type;
pub mod usage;
pub mod validators;
pub mod violations;

pub use error::{LoaderError, MediaTypeError, ValidationError};
pub use loader::{CompositeLoader, FileLoader, MemoryLoader, ResourceLoader};
pub use media_type::MediaType;
pub use usage::{CountSet, Usage};
pub use validators::{JsonSchemaValidator, SchemaValidator, SchemaValidators, XmlSchemaValidator};
pub use violations::{Severity, Violation, Violations};
