use thiserror::Error;

/// Failure reported by the native backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Path does not exist: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("An item named '{0}' already exists")]
    AlreadyExists(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("{0}")]
    Other(String),
}

impl From<String> for BackendError {
    fn from(message: String) -> Self {
        BackendError::Other(message)
    }
}

impl From<&str> for BackendError {
    fn from(message: &str) -> Self {
        BackendError::Other(message.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThumbnailError {
    #[error("no thumbnail support for '.{extension}' files")]
    Unsupported { extension: String },
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("thumbnail request ended without a result")]
    Interrupted,
    #[error("no async runtime available to fetch thumbnails")]
    NoRuntime,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no configuration directory available")]
    NoConfigDir,
}
