use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL};
use comfy_table::{ContentArrangement, Table};
use mtrmeter_core::HopRecord;
use std::io::Write;
use tracing::instrument;

/// Generate a Markdown table report of hop records.
#[instrument(skip_all, level = "trace")]
pub fn report_md<W: Write>(writer: W, records: &[HopRecord]) -> anyhow::Result<()> {
    run_report_table(writer, records, ASCII_MARKDOWN)
}

/// Generate a pretty table report of hop records.
#[instrument(skip_all, level = "trace")]
pub fn report_pretty<W: Write>(writer: W, records: &[HopRecord]) -> anyhow::Result<()> {
    run_report_table(writer, records, UTF8_FULL)
}

fn run_report_table<W: Write>(
    mut writer: W,
    records: &[HopRecord],
    preset: &str,
) -> anyhow::Result<()> {
    let columns = vec![
        "Start", "Host", "Hop", "Ip", "Loss%", "Snt", "Drop", "Last", "Avg", "Best", "Wrst",
        "StDev",
    ];
    let mut table = Table::new();
    table
        .load_preset(preset)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(columns);
    for record in records {
        table.add_row(vec![
            record.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.host.clone(),
            record.hop.to_string(),
            record.ip.clone(),
            format!("{:.1}", record.loss_pct),
            record.sent.to_string(),
            record.dropped.to_string(),
            format!("{:.1}", record.last),
            format!("{:.1}", record.avg),
            format!("{:.1}", record.best),
            format!("{:.1}", record.worst),
            format!("{:.1}", record.stdev),
        ]);
    }
    writeln!(writer, "{table}")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::records;

    #[test]
    fn test_report_md() -> anyhow::Result<()> {
        let mut buffer = vec![];
        report_md(&mut buffer, &records())?;
        let output = String::from_utf8(buffer)?;
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(5, lines.len());
        assert!(lines[0].contains("Loss%"));
        assert!(lines[3].contains("93.184.216.34"));
        assert!(lines[3].contains("33.3"));
        assert!(lines[2].contains("2020-09-13 12:26:40"));
        Ok(())
    }

    #[test]
    fn test_report_pretty_empty() -> anyhow::Result<()> {
        let mut buffer = vec![];
        report_pretty(&mut buffer, &[])?;
        let output = String::from_utf8(buffer)?;
        assert!(output.contains("StDev"));
        assert!(!output.contains("example.com"));
        Ok(())
    }
}
