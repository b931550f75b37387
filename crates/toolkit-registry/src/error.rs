//! Error types for toolkit-registry

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Route {path} is already registered")]
    DuplicateRoute { path: String },

    #[error("Invalid route `{path}`: {reason}")]
    InvalidRoute { path: String, reason: String },

    #[error("No tool registered at {path}")]
    NotFound { path: String },
}
