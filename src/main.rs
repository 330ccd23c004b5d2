use anyhow::{Context, Result};
use sheet_inspector::{inspect, InspectorConfig};
use std::io::Write;

/// Workbook inspected when the tool runs
const DEFAULT_WORKBOOK_PATH: &str = "스타 세이비어 아르카나 V1.0_251125의 사본.xlsx";

/// Prints the summary of the workbook at [`DEFAULT_WORKBOOK_PATH`].
///
/// Problems with the workbook itself are printed as `Error: ...` and the process still
/// exits successfully; only a failure to write to standard output is returned.
fn main() -> Result<()> {
    let config = InspectorConfig::new(DEFAULT_WORKBOOK_PATH);
    let mut out = std::io::stdout().lock();
    inspect(&config, &mut out).context("Failed to write inspection output")?;
    out.flush().context("Failed to flush standard output")?;
    Ok(())
}
