use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelixError {
    #[error("stack budget exhausted at depth {depth}")]
    StackExhausted { depth: usize },

    #[error("worker spawn failed: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("worker panicked: {0}")]
    WorkerPanic(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HelixError>;
