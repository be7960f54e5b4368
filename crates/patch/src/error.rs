use thiserror::Error;

pub type Result<T> = std::result::Result<T, PatchError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Malformed frontmatter: opening delimiter is never closed")]
    MalformedFrontmatter,

    #[error("Invalid input: {0}")]
    Validation(String),
}
