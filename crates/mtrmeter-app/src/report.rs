use crate::config::{MtrmeterConfig, ReportFormat};
use anyhow::Context;
use chrono::{DateTime, Utc};
use mtrmeter_core::{HopRecord, ResultSet, Termination};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::instrument;

pub mod csv;
pub mod json;
pub mod table;

/// How a run ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// The run completed.
    Done,
    /// Temporary name resolution failures used up the retry budget.
    Exhausted,
    /// The run was cancelled.
    Aborted,
    /// The run ended with an error.
    Failed,
}

impl From<Termination> for Outcome {
    fn from(value: Termination) -> Self {
        match value {
            Termination::Done => Self::Done,
            Termination::Exhausted => Self::Exhausted,
            Termination::Aborted => Self::Aborted,
        }
    }
}

/// Information about the run which produced a report.
#[derive(Debug, Clone, Serialize)]
pub struct Info {
    pub host: String,
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: DateTime<Utc>,
    pub outcome: Outcome,
}

/// Write the report of a run to the configured output.
#[instrument(skip_all, level = "trace")]
pub fn report(cfg: &MtrmeterConfig, info: &Info, results: &ResultSet) -> anyhow::Result<()> {
    let records = if cfg.report_group {
        results.latest_by_start_time()
    } else {
        results.records().to_vec()
    };
    tracing::debug!(records = records.len(), output = ?cfg.report_output, "writing report");
    if let Some(path) = &cfg.report_output {
        let file = File::create(path)
            .with_context(|| format!("failed to create report file: {path}"))?;
        write_report(cfg, info, &records, BufWriter::new(file))
    } else {
        write_report(cfg, info, &records, std::io::stdout().lock())
    }
}

fn write_report<W: Write>(
    cfg: &MtrmeterConfig,
    info: &Info,
    records: &[HopRecord],
    writer: W,
) -> anyhow::Result<()> {
    match cfg.report_format {
        ReportFormat::Csv => csv::report(writer, records, cfg.csv_delimiter),
        ReportFormat::Json => json::report(writer, info, records),
        ReportFormat::Pretty => table::report_pretty(writer, records),
        ReportFormat::Markdown => table::report_md(writer, records),
    }
}
