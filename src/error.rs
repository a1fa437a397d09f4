use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from gateway or terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A path could not be resolved in the fetched part of the tree.
    #[error("Not found in tree: {0}")]
    NotFound(String),

    /// A directory operation was requested on a file.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Another operation on the same directory is still in flight.
    #[error("Operation already in progress: {0}")]
    Busy(String),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Session or configuration file errors.
    #[error("Config error: {0}")]
    Config(String),
}
