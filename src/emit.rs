use std::io::Write;

use anyhow::{Context, Result};

use crate::models::SessionRecord;

/// Write one session record as a single compact JSON line.
///
/// Records go out in processing order; non-ASCII text is preserved as-is.
pub fn write_record(out: &mut dyn Write, record: &SessionRecord) -> Result<()> {
    let line = serde_json::to_string(record).context("Failed to serialize session record")?;
    out.write_all(line.as_bytes()).context("Failed to write session record")?;
    out.write_all(b"\n").context("Failed to write session record")?;
    Ok(())
}
