use mtrmeter_core::{HopRecord, COLUMN_NAMES};
use std::io::Write;
use tracing::instrument;

/// Generate a CSV report of hop records.
///
/// The header is always written, even if there are no records.
#[instrument(skip_all, level = "trace")]
pub fn report<W: Write>(writer: W, records: &[HopRecord], delimiter: u8) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(COLUMN_NAMES)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
