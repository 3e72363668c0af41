// Error kinds reported by the knowledge-base core. Transports translate these
// into their own vocabulary (HTTP status, JSON-RPC code, exit code).

use thiserror::Error;

use crate::path::normalize::PathError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KbError {
    #[error("path traversal detected: {0}")]
    PathTraversal(String),

    #[error("path not in allowed roots: {0}")]
    NotInAllowedRoots(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid sandbox root: {0}")]
    InvalidRoot(String),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("header not found: {0}")]
    HeaderNotFound(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("search index failure: {0}")]
    IndexFailure(String),
}

/// Coarse grouping of error kinds, independent of any transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Forbidden,
    NotFound,
    BadRequest,
    Internal,
}

impl KbError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PathTraversal(_) => "PATH_TRAVERSAL",
            Self::NotInAllowedRoots(_) => "NOT_IN_ALLOWED_ROOTS",
            Self::InvalidPath(_) => "INVALID_PATH",
            Self::InvalidRoot(_) => "INVALID_ROOT",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::HeaderNotFound(_) => "HEADER_NOT_FOUND",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::IndexFailure(_) => "INDEX_FAILURE",
        }
    }

    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::PathTraversal(_) | Self::NotInAllowedRoots(_) => ErrorClass::Forbidden,
            Self::DocumentNotFound(_) | Self::HeaderNotFound(_) => ErrorClass::NotFound,
            Self::InvalidPath(_) | Self::InvalidQuery(_) => ErrorClass::BadRequest,
            Self::InvalidRoot(_) | Self::IndexFailure(_) => ErrorClass::Internal,
        }
    }
}

impl From<PathError> for KbError {
    fn from(error: PathError) -> Self {
        match error {
            PathError::Traversal(path) => Self::PathTraversal(path),
            other => Self::InvalidPath(other.to_string()),
        }
    }
}
