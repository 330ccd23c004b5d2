use crate::error::InspectError;
use crate::frame::value::Value;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::SpreadsheetError;

/// Largest number of grid positions laid out for one sheet
pub(crate) const MAX_GRID_CELLS: usize = 10_000_000;

/// Represents a sheet read from a spreadsheet file, holding its non-empty cells.
pub(crate) struct Sheet {
    /// Sheet name
    pub(crate) name: String,
    /// All non-empty cells in the sheet, in document order
    pub(crate) cells: Vec<Cell>,
    /// Actual data range (determined from cell data)
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
            row_upper_bound: None,
            col_upper_bound: None,
        }
    }

    /// Returns true if the sheet contains no cells.
    pub(crate) fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Adds a cell to the sheet, updating the data range.
    pub(crate) fn push(&mut self, cell: Cell) {
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < cell.row).unwrap_or(true) {
            self.row_upper_bound = Some(cell.row);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < cell.col).unwrap_or(true) {
            self.col_upper_bound = Some(cell.col);
        }
        self.cells.push(cell);
    }

    /// Lays the cells out as a dense table anchored at A1.
    /// Positions without a cell are `None`; a later cell at the same position wins.
    /// Fails when the table would exceed [`MAX_GRID_CELLS`] positions.
    pub(crate) fn to_grid(&self) -> Result<Vec<Vec<Option<&Cell>>>, InspectError> {
        let (rows, cols) = match self.row_upper_bound.zip(self.col_upper_bound) {
            Some((row_upper_bound, col_upper_bound)) => (row_upper_bound.saturating_add(1), col_upper_bound.saturating_add(1)),
            None => return Ok(Vec::new()),
        };
        if rows.checked_mul(cols).map(|size| size > MAX_GRID_CELLS).unwrap_or(true) {
            Err(SpreadsheetError::SheetTooLarge {
                sheet: self.name.to_owned(),
                rows,
                cols,
            })?;
        }
        let mut table = vec![vec![None; cols]; rows];
        for cell in &self.cells {
            table[cell.row][cell.col] = Some(cell);
        }
        Ok(table)
    }

    /// Converts the grid into typed values, resolving shared strings.
    pub(crate) fn to_values(&self, shared_strings: &[String]) -> Result<Vec<Vec<Value>>, InspectError> {
        self.to_grid()?
            .into_iter()
            .map(|record| {
                record.into_iter()
                    .map(|cell| cell.map(|cell| cell.to_value(shared_strings)).unwrap_or(Ok(Value::Empty)))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }
}
