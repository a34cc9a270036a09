use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy shared by every layer. The REST layer maps each variant
/// to exactly one status code.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed identifier or request body.
    #[error("{0}")]
    BadInput(String),
    /// Missing or unverifiable credential.
    #[error("{0}")]
    Unauthorized(String),
    /// Authenticated, but not allowed to perform the operation.
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// A downstream collaborator (store, storage, queue, mail, identity
    /// provider) answered with an error.
    #[error("{0}")]
    BackendFailure(String),
    /// A downstream collaborator could not be reached in time.
    #[error("{0}")]
    BackendUnavailable(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadInput(_) => ErrorKind::BadInput,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::BackendFailure(_) => ErrorKind::BackendFailure,
            Self::BackendUnavailable(_) => ErrorKind::BackendUnavailable,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadInput(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::BackendFailure(msg)
            | Self::BackendUnavailable(msg) => msg,
        }
    }

    /// Prefixes the message with the operation that failed, keeping the kind.
    pub fn context(self, context: &str) -> Self {
        let msg = format!("{context}: {}", self.message());
        match self.kind() {
            ErrorKind::BadInput => Self::BadInput(msg),
            ErrorKind::Unauthorized => Self::Unauthorized(msg),
            ErrorKind::Forbidden => Self::Forbidden(msg),
            ErrorKind::NotFound => Self::NotFound(msg),
            ErrorKind::Conflict => Self::Conflict(msg),
            ErrorKind::BackendFailure => Self::BackendFailure(msg),
            ErrorKind::BackendUnavailable => Self::BackendUnavailable(msg),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadInput,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    BackendFailure,
    BackendUnavailable,
}
