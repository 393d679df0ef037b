use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;

/// `MeasurementCount` newtype.
///
/// The number of pings `mtr` sends to each hop before it writes its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Ord, PartialOrd)]
pub struct MeasurementCount(pub NonZeroUsize);

impl Display for MeasurementCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `MaxRetries` newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct MaxRetries(pub usize);

/// `MaxRounds` newtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Ord, PartialOrd)]
pub struct MaxRounds(pub NonZeroUsize);

/// The raw outcome of running the probe program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutput {
    /// The exit code, `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    /// Did the process exit successfully?
    pub success: bool,
    /// Everything written to standard output.
    pub stdout: String,
    /// Everything written to standard error.
    pub stderr: String,
}

/// The raw report of a single successful probe.
///
/// This is consumed by [`crate::normalize`] and not retained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// The machine readable report.
    pub stdout: String,
    /// Any warnings emitted by the probe program.
    pub stderr: String,
}
