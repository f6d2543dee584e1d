use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum BinaryError {
    #[error("config error: {0}")]
    Config(String),

    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("download {binary}: {reason}")]
    Download { binary: String, reason: String },

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BinaryError {
    pub(crate) fn download(binary: &str, reason: impl Into<String>) -> Self {
        Self::Download {
            binary: binary.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
