//! # Spreadsheet Reading Module
//!
//! Opens Office Open XML workbooks (.xlsx, .xlsm) and reads their sheets into typed cell
//! values. Sheets are listed in workbook order; a single sheet is read on demand.
use crate::error::InspectError;
use crate::frame::value::Value;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::path::Path;
use thiserror::Error;

pub(crate) mod cell;
pub(crate) mod excel;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;

/// Custom error types for spreadsheet operations.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// OLE container instead of a ZIP package
    #[error("'{0}' is an OLE compound document (password protected workbook or legacy xls), not an xlsx package")]
    CompoundDocument(String),

    /// Required part missing from the package
    #[error("Missing part '{0}' in xlsx package")]
    MissingPart(String),

    /// Requested sheet does not exist
    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    /// Cell content that cannot be interpreted for its declared type
    #[error("Invalid cell value at '{position}': {message}")]
    InvalidCellValue { position: String, message: String },

    /// Sheet listed in the workbook without a cell grid (chartsheet, dialog sheet)
    #[error("Sheet '{0}' is not a worksheet")]
    NotAWorksheet(String),

    /// Used range too large to lay out as a table
    #[error("Sheet '{sheet}' spans {rows} rows x {cols} columns, too large to load")]
    SheetTooLarge { sheet: String, rows: usize, cols: usize },
}

/// Read access to a workbook.
pub(crate) trait Spreadsheet {
    /// Returns the file name of this spreadsheet
    fn name(&self) -> String;

    /// Returns the sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Loads the shared strings table referenced by string cells
    fn load_shared_strings(&mut self) -> Result<Vec<String>, InspectError>;

    /// Reads every non-empty cell of the named sheet
    fn read_sheet(&mut self, sheet_name: &str) -> Result<Sheet, InspectError>;

    /// Reads the named sheet as a dense table of typed values anchored at A1
    fn read_rows(&mut self, sheet_name: &str) -> Result<Vec<Vec<Value>>, InspectError> {
        let sheet = self.read_sheet(sheet_name)?;
        if sheet.is_empty() {
            return Ok(Vec::new());
        }
        let shared_strings = self.load_shared_strings()?;
        sheet.to_values(&shared_strings)
    }
}

/// Opens the workbook at `path`.
///
/// The package is recognised by content rather than extension, so `.xlsx`, `.xlsm` and
/// renamed files are all accepted.
pub(crate) fn open_spreadsheet(path: &Path) -> Result<Box<dyn Spreadsheet>, InspectError> {
    Ok(Box::new(XlsxSpreadsheet::open(path)?))
}
