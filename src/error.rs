use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("resource '{0}' not found")]
    NotFound(String),

    #[error("failed to read resource '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum MediaTypeError {
    #[error("invalid media type '{input}': {reason}")]
    Invalid { input: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("no schema validator supports media type '{0}'")]
    UnsupportedMediaType(String),
}
