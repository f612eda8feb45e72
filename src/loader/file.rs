use super::ResourceLoader;
use crate::error::LoaderError;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Loads resources relative to a base directory.
pub struct FileLoader {
    base: PathBuf,
}

impl FileLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl ResourceLoader for FileLoader {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, LoaderError> {
        std::fs::read(self.base.join(name)).map_err(|err| match err.kind() {
            ErrorKind::NotFound => LoaderError::NotFound(name.to_string()),
            _ => LoaderError::Io {
                name: name.to_string(),
                source: err,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("simple.raml"), "#%RAML 0.8").unwrap();
        let loader = FileLoader::new(dir.path());
        assert_eq!(loader.fetch("simple.raml").unwrap(), b"#%RAML 0.8");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FileLoader::new(dir.path());
        assert!(matches!(
            loader.fetch("bla"),
            Err(LoaderError::NotFound(name)) if name == "bla"
        ));
    }
}
