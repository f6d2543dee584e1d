use engine_binaries::BinaryError;
use raw_results::DeserializeError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Binary(#[from] BinaryError),

    #[error("{0}")]
    Deserialize(#[from] DeserializeError),

    #[error("read '{path}': {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("encode output: {0}")]
    Output(#[from] serde_json::Error),
}
