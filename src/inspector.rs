//! # Workbook Inspector
//!
//! Prints a short structural summary of a workbook: the sheet names, then the columns and
//! first rows of the target sheet (`DB` by default). Everything is read before anything is
//! printed, so a failure at any point produces a single `Error: ...` line.
use crate::error::{InspectError, ResultMessage};
use crate::frame::Frame;
use crate::frame::value::quote;
use crate::spreadsheet::open_spreadsheet;
use log::debug;
use std::io::Write;
use std::path::PathBuf;

/// Default name of the sheet whose contents are previewed
pub const DEFAULT_SHEET_NAME: &str = "DB";

/// Default number of rows shown in the preview
pub const DEFAULT_PREVIEW_ROWS: usize = 3;

/// Settings of one inspection.
#[derive(Clone, Debug, PartialEq)]
pub struct InspectorConfig {
    /// Path of the workbook file
    pub path: PathBuf,
    /// Sheet looked up by exact, case-sensitive name
    pub sheet_name: String,
    /// Number of leading rows shown from the target sheet
    pub preview_rows: usize,
}

impl InspectorConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            sheet_name: DEFAULT_SHEET_NAME.to_owned(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

/// Everything one inspection learned about a workbook.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    /// Sheet names in workbook order
    pub sheet_names: Vec<String>,
    /// Full contents of the target sheet, `None` when the workbook has no such sheet
    pub target: Option<Frame>,
}

/// Opens the workbook and collects its sheet names and the target sheet's frame.
/// The workbook is closed before returning, on success and on failure.
///
/// # Arguments
/// * `config` - Path, target sheet and preview size
///
/// # Returns
/// The summary, or the first error met while opening or reading the workbook
pub fn summarize(config: &InspectorConfig) -> Result<Summary, InspectError> {
    let mut spreadsheet = open_spreadsheet(&config.path)?;
    let sheet_names = spreadsheet.sheet_names();
    debug!("Workbook '{}' has sheets {:?}", spreadsheet.name(), sheet_names);

    let target = if sheet_names.iter().any(|name| name == &config.sheet_name) {
        let rows = spreadsheet.read_rows(&config.sheet_name)
            .with_prefix(&format!("Cannot read sheet '{}'", config.sheet_name))?;
        let frame = Frame::from_rows(rows);
        debug!("Sheet '{}' holds {} columns and {} rows", config.sheet_name, frame.columns().len(), frame.len());
        Some(frame)
    } else {
        debug!("Sheet '{}' not present", config.sheet_name);
        None
    };

    Ok(Summary { sheet_names, target })
}

/// Writes the summary in its console layout.
pub fn render<W: Write>(summary: &Summary, config: &InspectorConfig, out: &mut W) -> std::io::Result<()> {
    let names: Vec<String> = summary.sheet_names.iter().map(|name| quote(name)).collect();
    writeln!(out, "Sheet names: [{}]", names.join(", "))?;
    match &summary.target {
        Some(frame) => {
            writeln!(out, "\nColumns in '{}' sheet:", config.sheet_name)?;
            writeln!(out, "{}", frame.column_names())?;
            writeln!(out, "\nFirst {} rows:", config.preview_rows)?;
            writeln!(out, "{}", frame.head(config.preview_rows))?;
        }
        None => writeln!(out, "\n'{}' sheet not found.", config.sheet_name)?,
    }
    Ok(())
}

/// Inspects the workbook and writes the summary, or a single `Error: ...` line when the
/// workbook cannot be opened or read.
///
/// # Returns
/// An error only when writing to `out` fails
pub fn inspect<W: Write>(config: &InspectorConfig, out: &mut W) -> std::io::Result<()> {
    match summarize(config) {
        Ok(summary) => render(&summary, config, out),
        Err(e) => {
            debug!("Inspection of '{}' failed: {}", config.path.display(), e);
            writeln!(out, "Error: {}", e)
        }
    }
}
