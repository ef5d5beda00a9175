use thiserror::Error;

/// The two failure kinds callers can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input, including references to entities
    /// that do not exist.
    Validation,
    /// Valid input, but the session is invalid or lacks permission.
    Auth,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlockrError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    /// Entity absent. Reported to callers as a validation failure.
    #[error("{0}")]
    NotFound(String),
}

impl FlockrError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::NotFound(_) => ErrorKind::Validation,
            Self::Auth(_) => ErrorKind::Auth,
        }
    }

    pub(crate) fn not_authorised() -> Self {
        Self::auth("User is not authorised")
    }
}

pub type Result<T> = std::result::Result<T, FlockrError>;
