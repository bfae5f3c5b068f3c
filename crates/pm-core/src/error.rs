use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinifyError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Invalid symbol table: {0}")]
    InvalidSymbols(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MinifyError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, MinifyError>;
