use std::time::Duration;

/// Default values for configuration.
pub mod defaults {
    use std::time::Duration;

    /// The default value for `program`.
    pub const DEFAULT_PROBE_PROGRAM: &str = "mtr";

    /// The default value for `timeout`.
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(360);

    /// The default value for `grace-duration` of the cooperative prober.
    pub const DEFAULT_PROBE_GRACE_DURATION: Duration = Duration::from_secs(2);

    /// The default value for `measurements`.
    pub const DEFAULT_MEASUREMENTS: usize = 10;

    /// The default value for `max-retries`.
    pub const DEFAULT_MAX_RETRIES: usize = 3;

    /// The default value for `sleep-interval`.
    pub const DEFAULT_SLEEP_INTERVAL: Duration = Duration::from_secs(60);

    /// The interval at which a blocking probe checks whether the program has exited.
    pub const PROBE_POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// The interval at which a sleeping accumulator checks for cancellation.
    pub const SLEEP_POLL_INTERVAL: Duration = Duration::from_millis(100);
}

/// How to run the probe program.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProbeConfig {
    /// The program to run, looked up in `PATH` if not absolute.
    pub program: String,
    /// The wall-clock limit for a single invocation.
    pub timeout: Duration,
}

impl ProbeConfig {
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            program: String::from(defaults::DEFAULT_PROBE_PROGRAM),
            timeout: defaults::DEFAULT_PROBE_TIMEOUT,
        }
    }
}
