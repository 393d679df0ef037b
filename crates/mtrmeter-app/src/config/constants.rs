use crate::config::{LogFormat, LogSpanEvents, Mode, ReportFormat};

/// The default value for `mode`.
pub const DEFAULT_MODE: Mode = Mode::Accumulate;

/// The default value for `log-format`.
pub const DEFAULT_LOG_FORMAT: LogFormat = LogFormat::Pretty;

/// The default value for `log-span-events`.
pub const DEFAULT_LOG_SPAN_EVENTS: LogSpanEvents = LogSpanEvents::Off;

/// The default value for `log-filter`.
pub const DEFAULT_LOG_FILTER: &str = "mtrmeter=debug";

/// The default value for `report-format`.
pub const DEFAULT_REPORT_FORMAT: ReportFormat = ReportFormat::Csv;

/// The default value for `report-group`.
pub const DEFAULT_REPORT_GROUP: bool = true;

/// The default value for `csv-delimiter`.
pub const DEFAULT_CSV_DELIMITER: char = ';';
