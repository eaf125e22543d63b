use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresentserError {
    #[error("Invalid target percent: {0}")]
    InvalidTarget(String),

    #[error("Invalid numbers: {field} = {value}")]
    InvalidInput { field: String, value: String },

    #[error("Total days must be > 0")]
    NoClassesHeld,

    #[error("No record for '{0}'")]
    RecordNotFound(String),

    #[error("forbidden")]
    Forbidden,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PresentserError>;
