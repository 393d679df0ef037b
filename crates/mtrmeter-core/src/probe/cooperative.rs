use crate::config::defaults::DEFAULT_PROBE_GRACE_DURATION;
use crate::config::ProbeConfig;
use crate::error::{Error, Result};
use crate::probe::{classify, command_args, Prober};
use crate::types::{MeasurementCount, ProbeOutput, ProbeReport};
use std::process::Stdio;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::instrument;

/// A prober which runs the program as a task on a single threaded tokio
/// runtime.
///
/// The task waits for a fixed grace duration after spawning the program
/// before it starts collecting output.  The grace duration counts towards
/// the timeout.  The program is killed if the timeout expires.
#[derive(Debug)]
pub struct CooperativeProber {
    config: ProbeConfig,
    grace_duration: Duration,
    runtime: Runtime,
}

impl CooperativeProber {
    /// Create a `CooperativeProber` with its own runtime.
    pub fn new(config: ProbeConfig, grace_duration: Duration) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            config,
            grace_duration,
            runtime,
        })
    }

    /// Create a `CooperativeProber` with the default grace duration.
    pub fn with_config(config: ProbeConfig) -> Result<Self> {
        Self::new(config, DEFAULT_PROBE_GRACE_DURATION)
    }

    #[must_use]
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }

    #[must_use]
    pub const fn grace_duration(&self) -> Duration {
        self.grace_duration
    }

    async fn execute(&self, host: &str, measurements: MeasurementCount) -> Result<ProbeOutput> {
        let mut command = tokio::process::Command::new(&self.config.program);
        command
            .args(command_args(host, measurements))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);
        let child = command
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.config.program.clone(),
                source,
            })?;
        tracing::debug!(pid = ?child.id(), program = %self.config.program, "probe task started");
        let grace_duration = self.grace_duration;
        let execution = async move {
            tokio::time::sleep(grace_duration).await;
            child.wait_with_output().await
        };
        match tokio::time::timeout(self.config.timeout, execution).await {
            Ok(output) => {
                let output = output?;
                tracing::debug!(status = ?output.status, "probe task exited");
                Ok(ProbeOutput {
                    code: output.status.code(),
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            Err(_) => Err(Error::Timeout(self.config.timeout)),
        }
    }
}

impl Prober for CooperativeProber {
    #[instrument(skip(self), level = "trace")]
    fn invoke(&self, host: &str, measurements: MeasurementCount) -> Result<ProbeReport> {
        let output = self.runtime.block_on(self.execute(host, measurements))?;
        classify(host, output)
    }
}
