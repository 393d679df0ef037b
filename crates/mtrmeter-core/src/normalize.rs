use crate::error::ParseError;
use chrono::{DateTime, Utc};
use csv::StringRecord;
use serde::Serialize;
use std::str::FromStr;
use tracing::instrument;

/// The normalized column names, in report order.
pub const COLUMN_NAMES: [&str; 13] = [
    "start_time",
    "status",
    "host",
    "hop",
    "ip",
    "loss%",
    "snt",
    "dropped",
    "last",
    "avg",
    "best",
    "wrst",
    "stdev",
];

/// A single hop of a normalized `mtr` report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HopRecord {
    /// When the report was started.
    pub start_time: DateTime<Utc>,
    pub status: String,
    /// The target host the report was run against.
    pub host: String,
    /// The hop number, starting from 1.
    pub hop: u16,
    /// The address (or hostname) of the hop, `???` if it did not respond.
    pub ip: String,
    #[serde(rename = "loss%")]
    pub loss_pct: f64,
    #[serde(rename = "snt")]
    pub sent: u32,
    /// The number of dropped packets.
    pub dropped: u32,
    pub last: f64,
    pub avg: f64,
    pub best: f64,
    #[serde(rename = "wrst")]
    pub worst: f64,
    pub stdev: f64,
}

/// Normalize a raw `mtr -C` report into hop records.
///
/// The version column and the unnamed trailing column are dropped, the blank
/// column is renamed to `dropped` and all remaining column names are lower
/// cased.  Headers which are already normalized are accepted as is.
#[instrument(skip_all, level = "trace")]
pub fn normalize(raw: &str) -> Result<Vec<HopRecord>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(raw.as_bytes());
    let schema = Schema::resolve(reader.headers()?)?;
    let records = reader
        .records()
        .map(|record| schema.hop_record(&record?))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(hops = records.len(), "normalized report");
    Ok(records)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    StartTime,
    Status,
    Host,
    Hop,
    Ip,
    Loss,
    Sent,
    Dropped,
    Last,
    Avg,
    Best,
    Worst,
    StdDev,
}

impl Column {
    const ALL: [Self; 13] = [
        Self::StartTime,
        Self::Status,
        Self::Host,
        Self::Hop,
        Self::Ip,
        Self::Loss,
        Self::Sent,
        Self::Dropped,
        Self::Last,
        Self::Avg,
        Self::Best,
        Self::Worst,
        Self::StdDev,
    ];

    const fn name(self) -> &'static str {
        COLUMN_NAMES[self as usize]
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|col| col.name() == name)
    }
}

/// A raw report header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Header {
    Column(Column),
    Version,
    Unnamed,
}

impl Header {
    fn resolve(raw: &str) -> Result<Self, ParseError> {
        if raw.is_empty() {
            return Ok(Self::Unnamed);
        }
        if raw.trim().is_empty() {
            return Ok(Self::Column(Column::Dropped));
        }
        let name = raw.trim().to_lowercase();
        if name == "mtr_version" {
            return Ok(Self::Version);
        }
        Column::from_name(&name)
            .map(Self::Column)
            .ok_or_else(|| ParseError::UnexpectedColumn(raw.to_string()))
    }
}

/// The position of each column within a report row.
#[derive(Debug)]
struct Schema {
    positions: [usize; 13],
    width: usize,
}

impl Schema {
    fn resolve(headers: &StringRecord) -> Result<Self, ParseError> {
        let mut positions = [None; 13];
        let mut version = false;
        let mut unnamed = false;
        for (index, raw) in headers.iter().enumerate() {
            let seen = match Header::resolve(raw)? {
                Header::Column(col) => positions[col as usize].replace(index).is_some(),
                Header::Version => std::mem::replace(&mut version, true),
                Header::Unnamed => std::mem::replace(&mut unnamed, true),
            };
            if seen {
                return Err(ParseError::DuplicateColumn(raw.to_string()));
            }
        }
        let mut resolved = [0; 13];
        for col in Column::ALL {
            resolved[col as usize] =
                positions[col as usize].ok_or(ParseError::MissingColumn(col.name()))?;
        }
        Ok(Self {
            positions: resolved,
            width: headers.len(),
        })
    }

    /// The minimum number of fields a row must have to contain every column.
    fn required(&self) -> usize {
        self.positions.iter().max().map_or(0, |max| max + 1)
    }

    fn hop_record(&self, record: &StringRecord) -> Result<HopRecord, ParseError> {
        let line = record.position().map_or(0, csv::Position::line);
        if record.len() < self.required() || record.len() > self.width {
            return Err(ParseError::FieldCount {
                line,
                expected: self.width,
                found: record.len(),
            });
        }
        let field = |col| self.field(record, line, col);
        Ok(HopRecord {
            start_time: field(Column::StartTime).timestamp()?,
            status: field(Column::Status).text(),
            host: field(Column::Host).text(),
            hop: field(Column::Hop).number()?,
            ip: field(Column::Ip).text(),
            loss_pct: field(Column::Loss).percentage()?,
            sent: field(Column::Sent).number()?,
            dropped: field(Column::Dropped).number()?,
            last: field(Column::Last).number()?,
            avg: field(Column::Avg).number()?,
            best: field(Column::Best).number()?,
            worst: field(Column::Worst).number()?,
            stdev: field(Column::StdDev).number()?,
        })
    }

    fn field<'r>(&self, record: &'r StringRecord, line: u64, col: Column) -> Field<'r> {
        let value = record
            .get(self.positions[col as usize])
            .unwrap_or_default()
            .trim();
        Field { line, col, value }
    }
}

/// A single field of a report row.
struct Field<'a> {
    line: u64,
    col: Column,
    value: &'a str,
}

impl Field<'_> {
    fn invalid(&self) -> ParseError {
        ParseError::InvalidField {
            line: self.line,
            column: self.col.name(),
            value: self.value.to_string(),
        }
    }

    fn text(&self) -> String {
        self.value.to_string()
    }

    fn number<T: FromStr>(&self) -> Result<T, ParseError> {
        self.value.parse().map_err(|_| self.invalid())
    }

    fn percentage(&self) -> Result<f64, ParseError> {
        self.value
            .trim_end_matches('%')
            .parse()
            .map_err(|_| self.invalid())
    }

    /// Seconds since the epoch.
    fn timestamp(&self) -> Result<DateTime<Utc>, ParseError> {
        self.number::<i64>()
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or_else(|| self.invalid())
    }
}
