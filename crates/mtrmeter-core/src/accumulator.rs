use crate::cancel::Cancellation;
use crate::config::defaults::SLEEP_POLL_INTERVAL;
use crate::error::{Error, Result};
use crate::normalize::{normalize, HopRecord};
use crate::probe::Prober;
use crate::result::ResultSet;
use crate::types::{MaxRetries, MaxRounds, MeasurementCount};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{instrument, Dispatch};

/// The state of the accumulation loop.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum State {
    /// Running a probe.
    Probing,
    /// Pausing between probes.
    Sleeping,
    /// Cancellation was requested.
    Aborted,
    /// The retry budget for temporary resolution failures ran out.
    Exhausted,
    /// The host can never be resolved, or the round limit was reached.
    Done,
}

/// How an accumulation ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Termination {
    Aborted,
    Exhausted,
    Done,
}

/// The outcome of an accumulation which ended without an unhandled error.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulation {
    /// The terminal state the loop ended in.
    pub termination: Termination,
    /// Every record gathered until the loop ended.
    pub results: ResultSet,
    /// The number of successful probes.
    pub rounds: usize,
    /// The number of probes attempted.
    pub attempts: usize,
}

/// How an accumulation into a caller owned [`ResultSet`] ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Summary {
    pub termination: Termination,
    pub rounds: usize,
    pub attempts: usize,
}

/// Repeatedly probe a host and accumulate the normalized records.
///
/// Use the [`crate::Builder`] type to create an [`Accumulator`].
#[derive(Debug)]
pub struct Accumulator<P> {
    host: String,
    measurements: MeasurementCount,
    max_retries: MaxRetries,
    sleep_interval: Duration,
    max_rounds: Option<MaxRounds>,
    cancellation: Cancellation,
    dispatch: Option<Dispatch>,
    prober: P,
}

impl<P: Prober> Accumulator<P> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) const fn new(
        host: String,
        measurements: MeasurementCount,
        max_retries: MaxRetries,
        sleep_interval: Duration,
        max_rounds: Option<MaxRounds>,
        cancellation: Cancellation,
        dispatch: Option<Dispatch>,
        prober: P,
    ) -> Self {
        Self {
            host,
            measurements,
            max_retries,
            sleep_interval,
            max_rounds,
            cancellation,
            dispatch,
            prober,
        }
    }

    /// Run the accumulation loop on the current thread.
    ///
    /// This blocks until the loop reaches a terminal state, which is returned
    /// together with every record gathered so far.  Failures other than host
    /// resolution failures end the loop and are returned as errors.
    pub fn run(&self) -> Result<Accumulation> {
        self.run_with(|_| {})
    }

    /// Run the accumulation loop with a handler which is called with each
    /// batch of records as it is merged.
    ///
    /// Batches passed to the handler are not lost if the loop later fails.
    pub fn run_with<F: FnMut(&[HopRecord])>(&self, func: F) -> Result<Accumulation> {
        let mut results = ResultSet::new();
        let summary = self.dispatched(|| self.accumulate(&mut results, func))?;
        Ok(Accumulation {
            termination: summary.termination,
            results,
            rounds: summary.rounds,
            attempts: summary.attempts,
        })
    }

    /// Run the accumulation loop, merging each batch of records into
    /// `results`.
    ///
    /// Records merged before a failure remain in `results`.
    pub fn run_into(&self, results: &mut ResultSet) -> Result<Summary> {
        self.dispatched(|| self.accumulate(results, |_| {}))
    }

    fn dispatched<T>(&self, func: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, func),
            None => func(),
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub const fn measurements(&self) -> MeasurementCount {
        self.measurements
    }

    #[must_use]
    pub const fn max_retries(&self) -> MaxRetries {
        self.max_retries
    }

    #[must_use]
    pub const fn sleep_interval(&self) -> Duration {
        self.sleep_interval
    }

    #[must_use]
    pub const fn max_rounds(&self) -> Option<MaxRounds> {
        self.max_rounds
    }

    #[must_use]
    pub const fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    #[must_use]
    pub const fn prober(&self) -> &P {
        &self.prober
    }

    #[instrument(skip_all, fields(host = %self.host, measurements = %self.measurements), level = "debug")]
    fn accumulate<F: FnMut(&[HopRecord])>(
        &self,
        results: &mut ResultSet,
        mut func: F,
    ) -> Result<Summary> {
        let mut state = State::Probing;
        let mut retries_remaining = self.max_retries.0;
        let mut rounds = 0;
        let mut attempts = 0;
        let termination = loop {
            state = match state {
                State::Probing if self.cancellation.is_cancelled() => State::Aborted,
                State::Probing => {
                    attempts += 1;
                    match self.prober.invoke(&self.host, self.measurements) {
                        Ok(report) => {
                            let batch = normalize(&report.stdout)?;
                            rounds += 1;
                            tracing::info!(round = rounds, hops = batch.len(), "probe complete");
                            func(&batch);
                            results.extend_batch(batch);
                            if self.max_rounds.is_some_and(|max| rounds >= max.0.get()) {
                                State::Done
                            } else {
                                State::Sleeping
                            }
                        }
                        Err(Error::TransientResolutionFailure(host)) => {
                            retries_remaining = retries_remaining.saturating_sub(1);
                            tracing::warn!(%host, retries_remaining, "temporary failure in name resolution");
                            if retries_remaining == 0 {
                                State::Exhausted
                            } else {
                                State::Sleeping
                            }
                        }
                        Err(Error::PermanentResolutionFailure(host)) => {
                            tracing::error!(%host, "host is unknown, giving up");
                            State::Done
                        }
                        Err(err) => return Err(err),
                    }
                }
                State::Sleeping => {
                    self.sleep();
                    State::Probing
                }
                State::Aborted => break Termination::Aborted,
                State::Exhausted => break Termination::Exhausted,
                State::Done => break Termination::Done,
            };
            tracing::debug!(?state, "transition");
        };
        tracing::info!(
            ?termination,
            rounds,
            attempts,
            records = results.len(),
            "accumulation finished"
        );
        Ok(Summary {
            termination,
            rounds,
            attempts,
        })
    }

    /// Sleep for the sleep interval, waking early if cancelled.
    ///
    /// An interval too large to represent as a deadline sleeps until
    /// cancelled.
    fn sleep(&self) {
        let deadline = Instant::now().checked_add(self.sleep_interval);
        while !self.cancellation.is_cancelled() {
            let pause = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        break;
                    }
                    remaining.min(SLEEP_POLL_INTERVAL)
                }
                None => SLEEP_POLL_INTERVAL,
            };
            thread::sleep(pause);
        }
    }
}
