use thiserror::Error;

pub type Result<T> = std::result::Result<T, AccessError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("Access denied: {0}")]
    Denied(String),

    #[error("Vault is in read-only mode")]
    ReadOnly,

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}
