use crate::cancel::Cancellation;
use crate::config::{defaults, ProbeConfig};
use crate::error::{Error, Result};
use crate::probe::{BlockingProber, Prober};
use crate::types::{MaxRetries, MaxRounds, MeasurementCount};
use crate::Accumulator;
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::Dispatch;

/// Build an accumulator.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use std::time::Duration;
/// use mtrmeter_core::Builder;
///
/// let accumulator = Builder::new("example.com")
///     .measurements(5)
///     .max_retries(3)
///     .sleep_interval(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// # See Also
///
/// - [`Accumulator`] - Repeatedly probe a host.
#[derive(Debug)]
pub struct Builder {
    host: String,
    measurements: usize,
    max_retries: usize,
    sleep_interval: Duration,
    max_rounds: Option<usize>,
    probe_config: ProbeConfig,
    cancellation: Cancellation,
    dispatch: Option<Dispatch>,
}

impl Builder {
    /// Build an accumulator for a given host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            measurements: defaults::DEFAULT_MEASUREMENTS,
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            sleep_interval: defaults::DEFAULT_SLEEP_INTERVAL,
            max_rounds: None,
            probe_config: ProbeConfig::default(),
            cancellation: Cancellation::default(),
            dispatch: None,
        }
    }

    /// Set the number of pings sent to each hop per probe.
    #[must_use]
    pub fn measurements(self, measurements: usize) -> Self {
        Self {
            measurements,
            ..self
        }
    }

    /// Set the number of temporary resolution failures tolerated.
    #[must_use]
    pub fn max_retries(self, max_retries: usize) -> Self {
        Self {
            max_retries,
            ..self
        }
    }

    /// Set the pause between probes.
    #[must_use]
    pub fn sleep_interval(self, sleep_interval: Duration) -> Self {
        Self {
            sleep_interval,
            ..self
        }
    }

    /// Set the maximum number of successful probes, `None` for no limit.
    #[must_use]
    pub fn max_rounds(self, max_rounds: Option<usize>) -> Self {
        Self { max_rounds, ..self }
    }

    /// Set how the probe program is run by [`Builder::build`].
    #[must_use]
    pub fn probe_config(self, probe_config: ProbeConfig) -> Self {
        Self {
            probe_config,
            ..self
        }
    }

    /// Set the cancellation observed by the accumulator.
    #[must_use]
    pub fn cancellation(self, cancellation: Cancellation) -> Self {
        Self {
            cancellation,
            ..self
        }
    }

    /// Set the `tracing` dispatcher which receives the accumulator logs.
    ///
    /// If not set the logs go to the thread default dispatcher.
    #[must_use]
    pub fn dispatch(self, dispatch: Dispatch) -> Self {
        Self {
            dispatch: Some(dispatch),
            ..self
        }
    }

    /// Build the accumulator with a [`BlockingProber`].
    pub fn build(self) -> Result<Accumulator<BlockingProber>> {
        let prober = BlockingProber::new(self.probe_config.clone());
        self.build_with(prober)
    }

    /// Build the accumulator with a custom [`Prober`].
    pub fn build_with<P: Prober>(self, prober: P) -> Result<Accumulator<P>> {
        if self.host.trim().is_empty() {
            return Err(Error::BadConfig(String::from("host may not be empty")));
        }
        let measurements = NonZeroUsize::new(self.measurements)
            .map(MeasurementCount)
            .ok_or_else(|| Error::BadConfig(String::from("measurements must be greater than 0")))?;
        if self.max_retries == 0 {
            return Err(Error::BadConfig(String::from(
                "max_retries must be greater than 0",
            )));
        }
        let max_rounds = match self.max_rounds {
            None => None,
            Some(max_rounds) => Some(NonZeroUsize::new(max_rounds).map(MaxRounds).ok_or_else(
                || Error::BadConfig(String::from("max_rounds must be greater than 0")),
            )?),
        };
        Ok(Accumulator::new(
            self.host,
            measurements,
            MaxRetries(self.max_retries),
            self.sleep_interval,
            max_rounds,
            self.cancellation,
            self.dispatch,
            prober,
        ))
    }
}
