//! Error and warning types for toolkit-compose

use std::fmt;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while converting a compose document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    /// The source text is not a well-formed compose document.
    #[error("Failed to parse compose document{}: {message}", location_suffix(.line, .column))]
    Parse {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    /// A recognized construct has no safe mapping to the AppStore format.
    #[error("{path}: {message}")]
    UnsupportedConstruct { path: String, message: String },

    /// The generated package would violate an AppStore invariant.
    #[error("{path}: {message}")]
    Validation { path: String, message: String },
}

fn location_suffix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(" at line {line}, column {column}"),
        (Some(line), None) => format!(" at line {line}"),
        _ => String::new(),
    }
}

impl ConvertError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn unsupported(path: impl fmt::Display, message: impl Into<String>) -> Self {
        Self::UnsupportedConstruct {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub fn validation(path: impl fmt::Display, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Path-like locator of the offending node.
    ///
    /// Parse errors report `line:column` when the YAML parser knows it.
    pub fn locator(&self) -> Option<String> {
        match self {
            Self::Parse {
                line: Some(line),
                column,
                ..
            } => Some(match column {
                Some(column) => format!("{line}:{column}"),
                None => line.to_string(),
            }),
            Self::Parse { .. } => None,
            Self::UnsupportedConstruct { path, .. } | Self::Validation { path, .. } => {
                Some(path.clone())
            }
        }
    }

    /// Short name of the error kind, used by shells for presentation.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "ParseError",
            Self::UnsupportedConstruct { .. } => "UnsupportedConstructError",
            Self::Validation { .. } => "ValidationError",
        }
    }
}

impl From<serde_yaml::Error> for ConvertError {
    fn from(err: serde_yaml::Error) -> Self {
        let location = err.location();
        Self::Parse {
            message: err.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }
}

/// A lossy or approximate mapping recorded alongside a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionWarning {
    /// Path of the source node the warning refers to
    pub path: String,
    /// Human-readable description
    pub message: String,
}

impl ConversionWarning {
    pub fn new(path: impl fmt::Display, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
