use super::ResourceLoader;
use crate::error::LoaderError;
use std::collections::HashMap;

/// Serves resources from an in-memory map of name to bytes.
///
/// The embedded-resource analogue; also the natural test double.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.resources.insert(name.into(), bytes.into());
        self
    }
}

impl ResourceLoader for MemoryLoader {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, LoaderError> {
        self.resources
            .get(name)
            .cloned()
            .ok_or_else(|| LoaderError::NotFound(name.to_string()))
    }
}
