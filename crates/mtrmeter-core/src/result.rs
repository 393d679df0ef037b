use crate::normalize::HopRecord;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// The hop records accumulated over many probes.
///
/// Records are only ever appended, one fully normalized batch at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    records: Vec<HopRecord>,
}

impl ResultSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append the records of a single successful probe.
    pub fn extend_batch(&mut self, batch: Vec<HopRecord>) {
        self.records.extend(batch);
    }

    /// All records in the order they were appended.
    #[must_use]
    pub fn records(&self) -> &[HopRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn into_records(self) -> Vec<HopRecord> {
        self.records
    }

    /// One record per distinct `start_time`, ordered by `start_time`.
    ///
    /// Where several records share a `start_time` the most recently appended
    /// record is kept.
    #[must_use]
    pub fn latest_by_start_time(&self) -> Vec<HopRecord> {
        self.records
            .iter()
            .map(|record| (record.start_time, record))
            .collect::<BTreeMap<DateTime<Utc>, &HopRecord>>()
            .into_values()
            .cloned()
            .collect()
    }
}

impl From<Vec<HopRecord>> for ResultSet {
    fn from(records: Vec<HopRecord>) -> Self {
        Self { records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start_time: i64, hop: u16, avg: f64) -> HopRecord {
        HopRecord {
            start_time: DateTime::<Utc>::from_timestamp(start_time, 0).unwrap(),
            status: String::from("OK"),
            host: String::from("example.com"),
            hop,
            ip: String::from("10.0.0.1"),
            loss_pct: 0.0,
            sent: 10,
            dropped: 0,
            last: avg,
            avg,
            best: avg,
            worst: avg,
            stdev: 0.0,
        }
    }

    #[test]
    fn test_extend_batch_preserves_order() {
        let mut results = ResultSet::new();
        results.extend_batch(vec![record(20, 1, 1.0), record(20, 2, 2.0)]);
        results.extend_batch(vec![record(10, 1, 3.0)]);
        let hops = results.records().iter().map(|r| r.hop).collect::<Vec<_>>();
        assert_eq!(vec![1, 2, 1], hops);
        assert_eq!(3, results.len());
    }

    #[test]
    fn test_latest_by_start_time_keeps_last_appended() {
        let results = ResultSet::from(vec![
            record(100, 1, 1.0),
            record(100, 2, 2.0),
            record(200, 1, 3.0),
            record(100, 3, 4.0),
            record(200, 2, 5.0),
        ]);
        let latest = results.latest_by_start_time();
        assert_eq!(2, latest.len());
        pretty_assertions::assert_eq!(record(100, 3, 4.0), latest[0]);
        pretty_assertions::assert_eq!(record(200, 2, 5.0), latest[1]);
    }

    #[test]
    fn test_latest_by_start_time_is_ordered() {
        let results = ResultSet::from(vec![record(300, 1, 1.0), record(100, 1, 1.0), record(200, 1, 1.0)]);
        let times = results
            .latest_by_start_time()
            .iter()
            .map(|r| r.start_time.timestamp())
            .collect::<Vec<_>>();
        assert_eq!(vec![100, 200, 300], times);
    }

    #[test]
    fn test_latest_by_start_time_empty() {
        assert!(ResultSet::new().latest_by_start_time().is_empty());
    }
}
