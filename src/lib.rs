//! # Sheet Inspector
//!
//! A small library and command line tool that opens an Excel workbook and prints a quick
//! structural summary of it: the names of all sheets, and for the sheet named `DB` its
//! column names and first rows, laid out the way pandas prints a `DataFrame`.
//!
//! ## Features
//!
//! - **Workbook reading**: `.xlsx` and `.xlsm` packages read with `zip` and `quick-xml`,
//!   shared and inline strings, booleans, error cells and date/time number formats
//! - **Tabular frame**: the first row becomes the header, blank and duplicate labels are
//!   named like pandas does (`Unnamed: 0`, `A.1`), column kinds are inferred over all rows
//! - **Text rendering**: index column, right-aligned values, float trimming, middle
//!   columns replaced by `...` when lines exceed 80 characters
//! - **Single-line failures**: any problem opening or reading the workbook is reported as
//!   one `Error: ...` line
//!
//! ## Usage
//!
//! ```no_run
//! use sheet_inspector::{inspect, InspectorConfig};
//!
//! let config = InspectorConfig::new("workbook.xlsx");
//! inspect(&config, &mut std::io::stdout().lock())?;
//! # Ok::<(), std::io::Error>(())
//! ```
mod error;
mod helpers;
mod spreadsheet;

pub mod frame;
pub mod inspector;

pub use crate::error::InspectError;
pub use crate::frame::Frame;
pub use crate::inspector::{inspect, render, summarize, InspectorConfig, Summary};
pub use crate::spreadsheet::SpreadsheetError;
