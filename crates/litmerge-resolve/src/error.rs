use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid ISBN: {0}")]
    InvalidIsbn(String),

    #[error("similarity threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
