use crate::config::{LogFormat, LogSpanEvents, Mode, MtrmeterConfig};
use crate::report::{self, Info, Outcome};
use anyhow::Context;
use chrono::Utc;
use mtrmeter_core::{
    normalize, Builder, Cancellation, CooperativeProber, MeasurementCount, ProbeConfig, Prober,
    ResultSet,
};
use std::num::NonZeroUsize;
use tracing::{Dispatch, Level};
use tracing_chrome::{ChromeLayerBuilder, FlushGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;

/// Run the mtrmeter application.
pub fn run_mtrmeter(cfg: &MtrmeterConfig) -> anyhow::Result<()> {
    let (dispatch, _guard) = configure_logging(cfg);
    tracing::dispatcher::with_default(&dispatch, || match cfg.mode {
        Mode::Accumulate => {
            let cancellation = install_cancellation()?;
            run_accumulate(cfg, &dispatch, &cancellation)
        }
        Mode::Oneshot => run_oneshot(cfg),
    })
}

/// Probe repeatedly until the accumulator reaches a terminal state and
/// report everything gathered.
///
/// The report is written even if the accumulator fails.
fn run_accumulate(
    cfg: &MtrmeterConfig,
    dispatch: &Dispatch,
    cancellation: &Cancellation,
) -> anyhow::Result<()> {
    let accumulator = Builder::new(cfg.host.as_str())
        .measurements(cfg.measurements)
        .max_retries(cfg.max_retries)
        .sleep_interval(cfg.sleep_interval)
        .max_rounds(cfg.max_rounds)
        .probe_config(make_probe_config(cfg))
        .cancellation(cancellation.clone())
        .dispatch(dispatch.clone())
        .build()?;
    let start_timestamp = Utc::now();
    let mut results = ResultSet::new();
    let res = accumulator.run_into(&mut results);
    let end_timestamp = Utc::now();
    let (outcome, failure) = match res {
        Ok(summary) => (Outcome::from(summary.termination), None),
        Err(err) => (Outcome::Failed, Some(err)),
    };
    let info = Info {
        host: cfg.host.clone(),
        start_timestamp,
        end_timestamp,
        outcome,
    };
    let reported = report::report(cfg, &info, &results);
    match (failure, reported) {
        (None, reported) => reported,
        (Some(err), Ok(())) => Err(err).with_context(|| format!("failed to measure {}", cfg.host)),
        (Some(err), Err(report_err)) => {
            Err(report_err.context(format!("failed to measure {}: {err}", cfg.host)))
        }
    }
}

/// Run a single probe on a cooperative scheduler and report it.
fn run_oneshot(cfg: &MtrmeterConfig) -> anyhow::Result<()> {
    let prober = CooperativeProber::new(make_probe_config(cfg), cfg.grace_duration)?;
    let measurements = NonZeroUsize::new(cfg.measurements)
        .map(MeasurementCount)
        .context("measurements must be greater than zero")?;
    let start_timestamp = Utc::now();
    let probe_report = prober
        .invoke(&cfg.host, measurements)
        .with_context(|| format!("failed to measure {}", cfg.host))?;
    let records = normalize(&probe_report.stdout)?;
    let end_timestamp = Utc::now();
    tracing::info!(hops = records.len(), "probe complete");
    let info = Info {
        host: cfg.host.clone(),
        start_timestamp,
        end_timestamp,
        outcome: Outcome::Done,
    };
    report::report(cfg, &info, &ResultSet::from(records))
}

/// Request cancellation of the accumulator on `SIGINT`.
fn install_cancellation() -> anyhow::Result<Cancellation> {
    let cancellation = Cancellation::new();
    let handle = cancellation.clone();
    ctrlc::set_handler(move || handle.cancel())
        .context("failed to install the interrupt handler")?;
    Ok(cancellation)
}

fn make_probe_config(cfg: &MtrmeterConfig) -> ProbeConfig {
    ProbeConfig::new(cfg.program.as_str(), cfg.timeout)
}

/// Build the log dispatcher.
///
/// Without verbose logging only warnings and errors are shown.  Log data is
/// written to stderr as the report may be written to stdout.
fn configure_logging(cfg: &MtrmeterConfig) -> (Dispatch, Option<FlushGuard>) {
    if !cfg.verbose {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::WARN)
            .with_writer(std::io::stderr)
            .compact()
            .finish();
        return (Dispatch::new(subscriber), None);
    }
    let fmt_span = match cfg.log_span_events {
        LogSpanEvents::Off => FmtSpan::NONE,
        LogSpanEvents::Active => FmtSpan::ACTIVE,
        LogSpanEvents::Full => FmtSpan::FULL,
    };
    match cfg.log_format {
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::fmt()
                .with_span_events(fmt_span)
                .with_env_filter(&cfg.log_filter)
                .with_writer(std::io::stderr)
                .compact()
                .finish();
            (Dispatch::new(subscriber), None)
        }
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::fmt()
                .with_span_events(fmt_span)
                .with_env_filter(&cfg.log_filter)
                .with_writer(std::io::stderr)
                .pretty()
                .finish();
            (Dispatch::new(subscriber), None)
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::fmt()
                .with_span_events(fmt_span)
                .with_env_filter(&cfg.log_filter)
                .with_writer(std::io::stderr)
                .json()
                .finish();
            (Dispatch::new(subscriber), None)
        }
        LogFormat::Chrome => {
            let (chrome_layer, guard) = ChromeLayerBuilder::new().include_args(true).build();
            let subscriber = tracing_subscriber::registry().with(chrome_layer);
            (Dispatch::new(subscriber), Some(guard))
        }
    }
}
