use crate::error::{Error, ExitCode, Result};
use crate::types::{MeasurementCount, ProbeOutput, ProbeReport};

/// Run the probe program on the calling thread.
mod blocking;

/// Run the probe program as a task on a cooperative scheduler.
mod cooperative;

pub use blocking::BlockingProber;
pub use cooperative::CooperativeProber;

/// The text `mtr` writes to standard error when the host does not exist.
pub const PERMANENT_RESOLUTION_FAILURE: &str =
    "Failed to resolve host: Name or service not known";

/// The text `mtr` writes to standard error when the local resolver is unavailable.
pub const TRANSIENT_RESOLUTION_FAILURE: &str =
    "Failed to resolve host: Temporary failure in name resolution";

/// Run a single `mtr` report against a host.
///
/// Implementations differ only in how the program is scheduled, every
/// implementation must classify the program output with [`classify`].
#[cfg_attr(test, mockall::automock)]
pub trait Prober {
    /// Run `measurements` pings against `host` and return the raw report.
    fn invoke(&self, host: &str, measurements: MeasurementCount) -> Result<ProbeReport>;
}

/// The arguments passed to the probe program.
///
/// `-C` requests the comma separated report format and `-c` the number of
/// pings sent to each hop.
#[must_use]
pub fn command_args(host: &str, measurements: MeasurementCount) -> Vec<String> {
    vec![
        String::from("-C"),
        String::from("-c"),
        measurements.to_string(),
        host.to_string(),
    ]
}

/// Classify the output of a completed probe program.
///
/// The two resolution failures are recognised from the exact text on
/// standard error, regardless of the exit status.  Any other text on standard
/// error is treated as a warning if the program exited successfully.
pub fn classify(host: &str, output: ProbeOutput) -> Result<ProbeReport> {
    match output.stderr.trim() {
        PERMANENT_RESOLUTION_FAILURE => {
            return Err(Error::PermanentResolutionFailure(host.to_string()))
        }
        TRANSIENT_RESOLUTION_FAILURE => {
            return Err(Error::TransientResolutionFailure(host.to_string()))
        }
        _ => {}
    }
    if output.success {
        if !output.stderr.trim().is_empty() {
            tracing::debug!(stderr = %output.stderr.trim(), "probe emitted warnings");
        }
        Ok(ProbeReport {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    } else {
        Err(Error::ProcessError {
            code: ExitCode(output.code),
            stderr: output.stderr.trim().to_string(),
        })
    }
}
