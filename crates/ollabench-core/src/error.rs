use thiserror::Error;

#[derive(Error, Debug)]
pub enum OllaBenchError {
    #[error("Invalid benchmark config: {0}")]
    InvalidConfig(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OllaBenchError>;
