use std::path::PathBuf;

/// Errors raised while writing converted lists.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("unable to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unable to encode {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, CompileError>;
