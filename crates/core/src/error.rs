use crate::TargetHandle;

/// Result alias that carries the custom [`PopError`] type.
pub type Result<T> = std::result::Result<T, PopError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum PopError {
    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The scheduler was handed a pool without any targets.
    #[error("target pool is empty")]
    EmptyPool,
    /// A handle in the pool does not exist in the target host.
    #[error("target {0} is not known to the host")]
    UnknownTarget(TargetHandle),
    /// Free-form failure reported by a host collaborator (sound player,
    /// strike inbox, ...).
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration or event encoding failures.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl PopError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Creates a configuration validation error.
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<&str> for PopError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for PopError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
