use crate::error::InspectError;
use crate::frame::value::Value;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::SpreadsheetError;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;

const MILLISECONDS_PER_DAY: f64 = 86_400_000f64;

/// Types of cell data in xlsx worksheets.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as 0/1
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from the 1900 epoch
    NumberDateTime1900,
    /// Date/time values stored as numbers from the 1904 epoch
    NumberDateTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values (#N/A, #DIV/0!, ...)
    Error,
}

impl CellType {
    fn date_time(is_1904: bool) -> Self {
        if is_1904 {
            Self::NumberDateTime1904
        } else {
            Self::NumberDateTime1900
        }
    }

    /// Parses built-in Excel number format IDs; only date and time formats are recognized.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "14" | "15" | "16" | "17" | "18" | "19" | "20" | "21" | "22" | "45" | "46" | "47" => Some(Self::date_time(is_1904)),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Quoted literals, escaped characters and bracketed sections are skipped.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        let mut is_date_or_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_literal => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' | 'H' | 'h' | 'S' | 's' => is_date_or_time = true,
                _ => (),
            }
        }

        if is_date_or_time {
            Self::date_time(is_1904)
        } else {
            Self::Number
        }
    }
}

/// Represents a single cell in a worksheet with position, type, and raw value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as stored in the worksheet XML
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Converts the raw cell into a typed value, resolving shared strings.
    pub(crate) fn to_value(&self, shared_strings: &[String]) -> Result<Value, InspectError> {
        let value = match self.kind {
            CellType::Empty | CellType::Error => Value::Empty,
            CellType::Boolean => Value::Bool(self.value == "1" || self.value.eq_ignore_ascii_case("true")),
            CellType::Number => Value::from_number(self.to_double()?),
            CellType::NumberDateTime1900 => {
                let serial = self.to_double()?;
                from_serial(serial, false).unwrap_or_else(|| Value::from_number(serial))
            }
            CellType::NumberDateTime1904 => {
                let serial = self.to_double()?;
                from_serial(serial, true).unwrap_or_else(|| Value::from_number(serial))
            }
            CellType::IsoDateTime => from_iso(&self.value).unwrap_or_else(|| Value::Text(self.value.to_owned())),
            CellType::InlineString => Value::Text(self.value.to_owned()),
            CellType::SharedString => {
                let text = self.value.trim().parse::<usize>().ok()
                    .and_then(|index| shared_strings.get(index))
                    .ok_or_else(|| self.invalid_value("shared string index out of range"))?;
                Value::Text(text.to_owned())
            }
        };
        Ok(value)
    }

    /// Converts cell value to double-precision floating point.
    fn to_double(&self) -> Result<f64, InspectError> {
        self.value.trim()
            .parse::<f64>()
            .map_err(|_| self.invalid_value("not a number").into())
    }

    fn invalid_value(&self, message: &str) -> SpreadsheetError {
        SpreadsheetError::InvalidCellValue {
            position: self.reference(),
            message: format!("'{}' {}", self.value, message),
        }
    }
}

/// Converts an Excel serial number to a date-time rounded to the millisecond, or to a time of
/// day for serials below one.
/// Handles the Lotus 1-2-3 leap year bug for the 1900 epoch.
pub(crate) fn from_serial(serial: f64, is_1904: bool) -> Option<Value> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    let milliseconds = (serial.fract() * MILLISECONDS_PER_DAY).round() as i64;
    if days == 0 && milliseconds < MILLISECONDS_PER_DAY as i64 {
        let seconds = (milliseconds / 1_000) as u32;
        let nanoseconds = (milliseconds % 1_000 * 1_000_000) as u32;
        return NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanoseconds).map(Value::Time);
    }
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let datetime = epoch
        .checked_add_signed(Duration::try_days(days + offset)?)?
        .checked_add_signed(Duration::try_milliseconds(milliseconds)?)?;
    Some(Value::DateTime(datetime))
}

/// Parses ISO 8601 values stored in `t="d"` cells.
fn from_iso(value: &str) -> Option<Value> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        Some(Value::DateTime(datetime))
    } else if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0).map(Value::DateTime)
    } else {
        NaiveTime::parse_from_str(value, "%H:%M:%S%.f").ok().map(Value::Time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell {
            row: 1,
            col: 2,
            kind,
            value: value.to_owned(),
        }
    }

    fn datetime(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> Value {
        Value::DateTime(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, mi, s).unwrap())
    }

    #[test]
    fn builtin_formats() {
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDateTime1900));
        assert_eq!(CellType::parse_builtin_number_format_id("22", true), Some(CellType::NumberDateTime1904));
        assert_eq!(CellType::parse_builtin_number_format_id("46", false), Some(CellType::NumberDateTime1900));
        assert_eq!(CellType::parse_builtin_number_format_id("0", false), None);
        assert_eq!(CellType::parse_builtin_number_format_id("10", false), None);
    }

    #[test]
    fn custom_formats() {
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd", false), CellType::NumberDateTime1900);
        assert_eq!(CellType::parse_custom_number_format("hh:mm", true), CellType::NumberDateTime1904);
        assert_eq!(CellType::parse_custom_number_format("[$-409]mmmm d, yyyy", false), CellType::NumberDateTime1900);
        assert_eq!(CellType::parse_custom_number_format("0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("#,##0 \"days\"", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[Red]0.0", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("0\\d", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("General", false), CellType::Number);
    }

    #[test]
    fn numbers_become_int_or_float() {
        assert_eq!(cell(CellType::Number, "42").to_value(&[]).unwrap(), Value::Int(42));
        assert_eq!(cell(CellType::Number, "42.0").to_value(&[]).unwrap(), Value::Int(42));
        assert_eq!(cell(CellType::Number, "-1.5").to_value(&[]).unwrap(), Value::Float(-1.5));
        assert_eq!(cell(CellType::Number, "1E-3").to_value(&[]).unwrap(), Value::Float(0.001));
        assert!(cell(CellType::Number, "abc").to_value(&[]).is_err());
    }

    #[test]
    fn strings_booleans_and_errors() {
        let shared = vec!["zero".to_owned(), "one".to_owned()];
        assert_eq!(cell(CellType::SharedString, "1").to_value(&shared).unwrap(), Value::Text("one".to_owned()));
        assert!(cell(CellType::SharedString, "5").to_value(&shared).is_err());
        assert_eq!(cell(CellType::InlineString, "inline").to_value(&[]).unwrap(), Value::Text("inline".to_owned()));
        assert_eq!(cell(CellType::Boolean, "1").to_value(&[]).unwrap(), Value::Bool(true));
        assert_eq!(cell(CellType::Boolean, "0").to_value(&[]).unwrap(), Value::Bool(false));
        assert_eq!(cell(CellType::Error, "#N/A").to_value(&[]).unwrap(), Value::Empty);
    }

    #[test]
    fn serial_dates() {
        assert_eq!(from_serial(45292.0, false), Some(datetime(2024, 1, 1, 0, 0, 0)));
        assert_eq!(from_serial(45292.5, false), Some(datetime(2024, 1, 1, 12, 0, 0)));
        assert_eq!(from_serial(1.0, false), Some(datetime(1900, 1, 1, 0, 0, 0)));
        assert_eq!(from_serial(61.0, false), Some(datetime(1900, 3, 1, 0, 0, 0)));
        assert_eq!(from_serial(0.0, true), Some(Value::Time(NaiveTime::from_hms_opt(0, 0, 0).unwrap())));
        assert_eq!(from_serial(1.0, true), Some(datetime(1904, 1, 2, 0, 0, 0)));
        assert_eq!(from_serial(0.75, false), Some(Value::Time(NaiveTime::from_hms_opt(18, 0, 0).unwrap())));
        assert_eq!(from_serial(-1.0, false), None);
    }

    #[test]
    fn iso_dates() {
        assert_eq!(cell(CellType::IsoDateTime, "2024-03-05T10:30:00").to_value(&[]).unwrap(), datetime(2024, 3, 5, 10, 30, 0));
        assert_eq!(cell(CellType::IsoDateTime, "2024-03-05").to_value(&[]).unwrap(), datetime(2024, 3, 5, 0, 0, 0));
        assert_eq!(cell(CellType::IsoDateTime, "soon").to_value(&[]).unwrap(), Value::Text("soon".to_owned()));
    }
}
