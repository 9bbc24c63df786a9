use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Parameter validation error: {0}")]
    Validation(String),

    #[error("Unknown substance: {0}")]
    UnknownSubstance(String),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
