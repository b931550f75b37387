//! Error types for toolkit-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from toolkit-registry
    #[error(transparent)]
    Registry(#[from] toolkit_registry::Error),

    /// Conversion failure
    #[error(transparent)]
    Convert(#[from] toolkit_compose::ConvertError),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Options file could not be parsed
    #[error("Invalid options file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A tool ran and reported a failure
    #[error("{path} failed{}: {message}", at_suffix(.locator))]
    ToolFailed {
        path: String,
        locator: Option<String>,
        message: String,
    },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}

fn at_suffix(locator: &Option<String>) -> String {
    match locator {
        Some(locator) => format!(" at {locator}"),
        None => String::new(),
    }
}
