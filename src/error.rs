//! Crate error model. Collaborator failures (store, identifier) are not
//! wrapped here; policy methods propagate them unchanged as `anyhow::Error`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Requested at hasher construction time; there is no lazy failure path.
    #[error("hashing algorithm {0} is not implemented")]
    UnsupportedAlgorithm(String),

    #[error("salt generation failed: {0}")]
    Salt(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
