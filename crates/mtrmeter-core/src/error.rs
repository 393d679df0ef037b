use std::fmt::{Display, Formatter};
use std::io;
use std::time::Duration;
use thiserror::Error;

/// An accumulator error result.
pub type Result<T> = std::result::Result<T, Error>;

/// An accumulator error.
#[derive(Error, Debug)]
pub enum Error {
    /// The host does not exist and will never resolve.
    #[error("failed to resolve host {0}: name or service not known")]
    PermanentResolutionFailure(String),
    /// The local resolver failed, the probe may succeed if retried.
    #[error("failed to resolve host {0}: temporary failure in name resolution")]
    TransientResolutionFailure(String),
    #[error("probe did not complete within {0:?}")]
    Timeout(Duration),
    #[error("probe exited with {code}: {stderr}")]
    ProcessError { code: ExitCode, stderr: String },
    #[error("failed to parse report: {0}")]
    ParseError(#[from] ParseError),
    #[error("failed to spawn `{program}`: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("invalid config: {0}")]
    BadConfig(String),
}

impl Error {
    /// Is this a host resolution failure which the accumulator handles itself?
    #[must_use]
    pub const fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Self::PermanentResolutionFailure(_) | Self::TransientResolutionFailure(_)
        )
    }
}

/// A report parsing error.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("missing column `{0}`")]
    MissingColumn(&'static str),
    #[error("unexpected column `{0}`")]
    UnexpectedColumn(String),
    #[error("duplicate column `{0}`")]
    DuplicateColumn(String),
    #[error("invalid value `{value}` for column `{column}` on line {line}")]
    InvalidField {
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("expected {expected} fields on line {line} but found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("malformed report: {0}")]
    Csv(#[from] csv::Error),
}

/// The exit code of the probe program, `None` if it was terminated by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub Option<i32>);

impl Display for ExitCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(code) => write!(f, "exit code {code}"),
            None => write!(f, "no exit code (terminated by signal)"),
        }
    }
}
