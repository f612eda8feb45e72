mod composite;
mod file;
mod memory;

pub use composite::CompositeLoader;
pub use file::FileLoader;
pub use memory::MemoryLoader;

use crate::error::LoaderError;

/// Fetches named byte resources (specs, schema files) from one source.
///
/// `LoaderError::NotFound` means the source does not have the resource; any
/// other error means the source has it but could not deliver it.
pub trait ResourceLoader: Send + Sync {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, LoaderError>;
}
