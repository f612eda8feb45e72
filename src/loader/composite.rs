use super::ResourceLoader;
use crate::error::LoaderError;
use std::sync::Arc;
use tracing::debug;

/// Delegates to an ordered list of loaders, falling back on "not found".
pub struct CompositeLoader {
    loaders: Vec<Arc<dyn ResourceLoader>>,
}

impl CompositeLoader {
    pub fn new(loaders: Vec<Arc<dyn ResourceLoader>>) -> Self {
        Self { loaders }
    }
}

impl ResourceLoader for CompositeLoader {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, LoaderError> {
        for (index, loader) in self.loaders.iter().enumerate() {
            match loader.fetch(name) {
                Ok(bytes) => {
                    debug!(resource = name, source = index, "composite fetch served");
                    return Ok(bytes);
                }
                Err(LoaderError::NotFound(_)) => continue,
                // A read failure is not "absent"; do not try further sources.
                Err(err) => return Err(err),
            }
        }
        Err(LoaderError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;

    struct BrokenLoader;

    impl ResourceLoader for BrokenLoader {
        fn fetch(&self, name: &str) -> Result<Vec<u8>, LoaderError> {
            Err(LoaderError::Io {
                name: name.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }
    }

    fn spec_loader() -> Arc<dyn ResourceLoader> {
        Arc::new(MemoryLoader::new().with("spec.raml", "#%RAML 0.8"))
    }

    #[test]
    fn falls_back_to_next_source_on_not_found() {
        let composite = CompositeLoader::new(vec![Arc::new(MemoryLoader::new()), spec_loader()]);
        assert_eq!(composite.fetch("spec.raml").unwrap(), b"#%RAML 0.8");
    }

    #[test]
    fn reports_the_requested_name_when_all_sources_are_exhausted() {
        let composite = CompositeLoader::new(vec![Arc::new(MemoryLoader::new()), spec_loader()]);
        match composite.fetch("missing") {
            Err(LoaderError::NotFound(name)) => assert_eq!(name, "missing"),
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn read_failure_stops_the_chain() {
        let composite = CompositeLoader::new(vec![Arc::new(BrokenLoader), spec_loader()]);
        assert!(matches!(
            composite.fetch("spec.raml"),
            Err(LoaderError::Io { .. })
        ));
    }

    #[test]
    fn empty_chain_finds_nothing() {
        let composite = CompositeLoader::new(Vec::new());
        assert!(matches!(
            composite.fetch("anything"),
            Err(LoaderError::NotFound(_))
        ));
    }
}
