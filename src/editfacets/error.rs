use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No record #{requested}: {visible} records are visible")]
    OutOfRange { requested: usize, visible: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Preference error: {0}")]
    Preference(String),

    #[error("Invalid records: {0}")]
    Records(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
