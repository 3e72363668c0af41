// Consistent exit codes for the kbnav CLI.
//
//   0 = success
//   1 = general error
//   2 = bad input (path, query, arguments)
//   3 = document or header not found
//   4 = path outside the sandbox
//   5 = search index failure

use std::process;

use kbnav_common::{ErrorClass, KbError};

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    NotFound = 3,
    Forbidden = 4,
    Index = 5,
}

impl ExitCode {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        err.chain()
            .find_map(|cause| cause.downcast_ref::<KbError>())
            .map(Self::from_kb_error)
            .unwrap_or(Self::Error)
    }

    pub fn from_kb_error(error: &KbError) -> Self {
        if matches!(error, KbError::IndexFailure(_)) {
            return Self::Index;
        }
        match error.class() {
            ErrorClass::Forbidden => Self::Forbidden,
            ErrorClass::NotFound => Self::NotFound,
            ErrorClass::BadRequest => Self::Usage,
            ErrorClass::Internal => Self::Error,
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code())
    }
}
