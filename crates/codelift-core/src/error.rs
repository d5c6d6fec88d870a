use thiserror::Error;

pub type SubmitResult<T> = std::result::Result<T, SubmitError>;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid exclude pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("job submission failed: {0}")]
    Submit(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
