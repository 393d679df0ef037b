use crate::report::Info;
use mtrmeter_core::HopRecord;
use serde::Serialize;
use std::io::Write;
use tracing::instrument;

#[derive(Serialize)]
struct Report<'a> {
    info: &'a Info,
    records: &'a [HopRecord],
}

/// Generate a json report of hop records.
#[instrument(skip_all, level = "trace")]
pub fn report<W: Write>(mut writer: W, info: &Info, records: &[HopRecord]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, &Report { info, records })?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
