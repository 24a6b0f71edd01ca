use thiserror::Error;

/// Failures while configuring, starting or stopping the catalog.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SystemError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Actor task failed: {0}")]
    TaskFailed(String),
}
