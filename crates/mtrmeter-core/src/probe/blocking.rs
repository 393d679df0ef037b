use crate::config::defaults::PROBE_POLL_INTERVAL;
use crate::config::ProbeConfig;
use crate::error::{Error, Result};
use crate::probe::{classify, command_args, Prober};
use crate::types::{MeasurementCount, ProbeOutput, ProbeReport};
use std::io;
use std::io::Read;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::instrument;

/// A prober which blocks the calling thread until the program exits or
/// the timeout expires.
///
/// Both output streams are drained on helper threads so that a chatty
/// program cannot block on a full pipe while we wait for it.
#[derive(Debug, Clone, Default)]
pub struct BlockingProber {
    config: ProbeConfig,
}

impl BlockingProber {
    #[must_use]
    pub const fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }

    fn execute(&self, host: &str, measurements: MeasurementCount) -> Result<ProbeOutput> {
        let mut command = Command::new(&self.config.program);
        command
            .args(command_args(host, measurements))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Keep a terminal interrupt from reaching a probe in flight.
        #[cfg(unix)]
        command.process_group(0);
        let mut child = command
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.config.program.clone(),
                source,
            })?;
        tracing::debug!(pid = child.id(), program = %self.config.program, "probe started");
        let stdout = drain("probe-stdout", child.stdout.take())?;
        let stderr = drain("probe-stderr", child.stderr.take())?;
        let Some(status) = wait_timeout(&mut child, self.config.timeout)? else {
            if let Err(err) = child.kill() {
                tracing::debug!(?err, "failed to kill probe");
            }
            child.wait()?;
            return Err(Error::Timeout(self.config.timeout));
        };
        tracing::debug!(?status, "probe exited");
        Ok(ProbeOutput {
            code: status.code(),
            success: status.success(),
            stdout: collect(stdout)?,
            stderr: collect(stderr)?,
        })
    }
}

impl Prober for BlockingProber {
    #[instrument(skip(self), level = "trace")]
    fn invoke(&self, host: &str, measurements: MeasurementCount) -> Result<ProbeReport> {
        let output = self.execute(host, measurements)?;
        classify(host, output)
    }
}

/// Read a pipe to the end on a new thread.
fn drain<R: Read + Send + 'static>(
    name: &str,
    pipe: Option<R>,
) -> io::Result<JoinHandle<io::Result<String>>> {
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut pipe) = pipe {
                pipe.read_to_end(&mut buf)?;
            }
            Ok(String::from_utf8_lossy(&buf).into_owned())
        })
}

fn collect(handle: JoinHandle<io::Result<String>>) -> Result<String> {
    let text = handle
        .join()
        .map_err(|_| io::Error::other("probe output reader panicked"))??;
    Ok(text)
}

/// Wait for the child to exit, returning `None` if it is still running after `timeout`.
fn wait_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(None);
        }
        thread::sleep(PROBE_POLL_INTERVAL.min(timeout - elapsed));
    }
}
