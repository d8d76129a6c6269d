use thiserror::Error;

pub type SceneResult<T> = Result<T, SceneError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    /// Transport-level failure reaching the backend.
    #[error("Could not reach backend: {0}")]
    Connectivity(String),

    /// Backend answered a generate call with non-2xx or `success: false`.
    #[error("{0}")]
    Generation(String),

    /// Backend answered a refine call with non-2xx or `success: false`.
    #[error("{0}")]
    Refinement(String),

    /// Client-side check failed before any request was sent.
    #[error("{0}")]
    Precondition(String),

    #[error("Preset '{0}' not found")]
    PresetNotFound(String),
}

impl SceneError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Substring heuristic for missing/invalid credential failures reported by the backend.
    pub fn is_credential_failure(&self) -> bool {
        match self {
            SceneError::Generation(msg) | SceneError::Refinement(msg) => msg.to_lowercase().contains("key"),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for SceneError {
    fn from(err: reqwest::Error) -> Self {
        SceneError::Connectivity(err.to_string())
    }
}
