//! # Tabular Frame Module
//!
//! Turns the dense rows of a sheet into a table with named columns: the first row is the
//! header, the remaining rows are records. Header naming, missing-value markers and column
//! kind inference follow the conventions of `pandas.read_excel`, so the text rendering in
//! [`render`] matches what a pandas user expects to see.
use crate::frame::value::{datetime_str, float_repr, quote, time_str, Value};
use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use std::collections::HashMap;
use std::fmt::Display;

pub mod render;
pub mod value;

/// A column label taken from the header row.
#[derive(Clone, Debug, PartialEq)]
pub enum Label {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl Label {
    /// Builds the label of the header cell at `index`; blank cells are named `Unnamed: {index}`.
    fn from_header(value: &Value, index: usize) -> Self {
        match value {
            Value::Empty => Label::Text(format!("Unnamed: {}", index)),
            Value::Text(text) if text.is_empty() => Label::Text(format!("Unnamed: {}", index)),
            Value::Text(text) => Label::Text(text.to_owned()),
            Value::Int(number) => Label::Int(*number),
            Value::Float(number) => Label::Float(*number),
            Value::Bool(flag) => Label::Bool(*flag),
            Value::DateTime(datetime) => Label::DateTime(*datetime),
            Value::Time(time) => Label::Time(*time),
        }
    }

    /// Python `repr()` of the label, as it appears inside a list.
    pub fn repr(&self) -> String {
        match self {
            Label::Text(text) => quote(text),
            Label::DateTime(datetime) => {
                let mut parts = vec![datetime.year().to_string(), datetime.month().to_string(), datetime.day().to_string()];
                parts.extend(time_parts(&datetime.time()));
                format!("datetime.datetime({})", parts.join(", "))
            }
            Label::Time(time) => format!("datetime.time({})", time_parts(time).join(", ")),
            _ => self.to_string(),
        }
    }

    /// Key under which labels count as duplicates (`1`, `1.0` and `True` collide as in Python).
    fn dedup_key(&self) -> String {
        match self {
            Label::Text(text) => format!("s:{}", text),
            Label::Int(number) => format!("n:{}", number),
            Label::Float(number) if number.fract() == 0.0 && number.abs() < 9.2e18 => format!("n:{}", *number as i64),
            Label::Float(number) => format!("f:{}", float_repr(*number)),
            Label::Bool(flag) => format!("n:{}", *flag as i64),
            Label::DateTime(datetime) => format!("d:{}", datetime_str(datetime)),
            Label::Time(time) => format!("t:{}", time_str(time)),
        }
    }
}

/// `hour, minute[, second[, microsecond]]` as in Python's `datetime.time` repr.
fn time_parts(time: &NaiveTime) -> Vec<String> {
    let mut parts = vec![time.hour().to_string(), time.minute().to_string()];
    let microseconds = time.nanosecond() / 1_000;
    if time.second() > 0 || microseconds > 0 {
        parts.push(time.second().to_string());
    }
    if microseconds > 0 {
        parts.push(microseconds.to_string());
    }
    parts
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Text(text) => write!(f, "{}", text),
            Label::Int(number) => write!(f, "{}", number),
            Label::Float(number) => write!(f, "{}", float_repr(*number)),
            Label::Bool(flag) => write!(f, "{}", if *flag { "True" } else { "False" }),
            Label::DateTime(datetime) => write!(f, "{}", datetime_str(datetime)),
            Label::Time(time) => write!(f, "{}", time_str(time)),
        }
    }
}

/// Kind of values held by a column, decided over all records.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ColumnKind {
    /// Integers without missing values
    Int,
    /// Numbers, possibly with missing values
    Float,
    /// Booleans without missing values
    Bool,
    /// Date-times, possibly with missing values
    DateTime,
    /// Anything else, rendered value by value
    Object,
}

impl ColumnKind {
    /// Detects the most specific common kind of a column's values.
    /// Falls back to Object if kinds are inconsistent.
    pub(crate) fn detect(values: &[&Value]) -> ColumnKind {
        let present: Vec<&Value> = values.iter().copied().filter(|value| !value.is_blank()).collect();
        let has_missing = present.len() < values.len();
        if present.is_empty() {
            ColumnKind::Float
        } else if present.iter().all(|value| is_integer(value)) {
            if has_missing {
                ColumnKind::Float
            } else {
                ColumnKind::Int
            }
        } else if present.iter().all(|value| value.as_number().is_some()) {
            ColumnKind::Float
        } else if !has_missing && present.iter().all(|value| value.as_bool().is_some()) {
            ColumnKind::Bool
        } else if present.iter().all(|value| matches!(value, Value::DateTime(_))) {
            ColumnKind::DateTime
        } else {
            ColumnKind::Object
        }
    }

    /// Converts a value to the representation used by columns of this kind.
    fn coerce(&self, value: Value) -> Value {
        match self {
            _ if value.is_blank() => Value::Empty,
            ColumnKind::Int | ColumnKind::Float => match value.as_number() {
                Some(number) if *self == ColumnKind::Int => Value::Int(number as i64),
                Some(number) => Value::Float(number),
                None => value,
            },
            ColumnKind::Bool => value.as_bool().map(Value::Bool).unwrap_or(value),
            _ => value,
        }
    }
}

/// True for integer values and text holding an integer literal.
fn is_integer(value: &Value) -> bool {
    match value {
        Value::Int(_) => true,
        Value::Text(text) => text.trim().parse::<i64>().is_ok(),
        _ => false,
    }
}

/// A column of a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub label: Label,
    pub kind: ColumnKind,
}

/// In-memory table with ordered, named columns and rows indexed `0..len()`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Builds a frame from the dense rows of a sheet, using the first row as header.
    ///
    /// Trailing blank cells and trailing blank rows are dropped and shorter rows padded to the
    /// widest one. Blank rows are kept inside multi-column tables and removed from
    /// single-column ones. Record cells holding a missing-value marker (`NA`, `N/A`, `null`, ...)
    /// become empty.
    pub fn from_rows(rows: Vec<Vec<Value>>) -> Frame {
        let mut rows: Vec<Vec<Value>> = rows.into_iter()
            .map(|mut record| {
                while record.last().map(Value::is_blank).unwrap_or(false) {
                    record.pop();
                }
                record
            })
            .collect();
        while rows.last().map(Vec::is_empty).unwrap_or(false) {
            rows.pop();
        }
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for record in &mut rows {
            record.resize(width, Value::Empty);
        }
        if width == 1 {
            rows.retain(|record| match &record[0] {
                Value::Empty => false,
                Value::Text(text) => !text.trim().is_empty(),
                _ => true,
            });
        }

        let mut records = rows.into_iter();
        let header = match records.next() {
            Some(header) => header,
            None => return Frame::default(),
        };
        let labels = dedup_labels(header.iter().enumerate().map(|(index, value)| Label::from_header(value, index)).collect());
        let records: Vec<Vec<Value>> = records
            .map(|record| {
                record.into_iter()
                    .map(|value| if value.is_na_marker() { Value::Empty } else { value })
                    .collect()
            })
            .collect();

        let kinds: Vec<ColumnKind> = (0..labels.len())
            .map(|index| ColumnKind::detect(&records.iter().map(|record| &record[index]).collect::<Vec<_>>()))
            .collect();
        let rows = records.into_iter()
            .map(|record| {
                record.into_iter()
                    .zip(&kinds)
                    .map(|(value, kind)| kind.coerce(value))
                    .collect()
            })
            .collect();
        let columns = labels.into_iter()
            .zip(kinds)
            .map(|(label, kind)| Column { label, kind })
            .collect();

        Frame { columns, rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the frame has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// The first `n` rows, keeping the column kinds of the full frame.
    pub fn head(&self, n: usize) -> Frame {
        Frame {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Column labels as a Python list repr, e.g. `['Name', 'Age', 2024]`.
    pub fn column_names(&self) -> String {
        let labels: Vec<String> = self.columns.iter().map(|column| column.label.repr()).collect();
        format!("[{}]", labels.join(", "))
    }
}

/// Renames duplicate labels to `name.1`, `name.2`, ... in order of appearance.
fn dedup_labels(mut labels: Vec<Label>) -> Vec<Label> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for label in labels.iter_mut() {
        let mut key = label.dedup_key();
        let mut count = counts.get(&key).copied().unwrap_or(0);
        while count > 0 {
            counts.insert(key, count + 1);
            *label = Label::Text(format!("{}.{}", label, count));
            key = label.dedup_key();
            count = counts.get(&key).copied().unwrap_or(0);
        }
        counts.insert(key, count + 1);
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn text(value: &str) -> Value {
        Value::Text(value.to_owned())
    }

    fn labels(frame: &Frame) -> Vec<Label> {
        frame.columns().iter().map(|column| column.label.clone()).collect()
    }

    fn kinds(frame: &Frame) -> Vec<ColumnKind> {
        frame.columns().iter().map(|column| column.kind).collect()
    }

    #[test]
    fn header_row_names_columns() {
        let frame = Frame::from_rows(vec![
            vec![text("Name"), text("Age")],
            vec![text("Ann"), Value::Int(31)],
            vec![text("Bob"), Value::Int(27)],
        ]);
        assert_eq!(labels(&frame), vec![Label::Text("Name".to_owned()), Label::Text("Age".to_owned())]);
        assert_eq!(kinds(&frame), vec![ColumnKind::Object, ColumnKind::Int]);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.column_names(), "['Name', 'Age']");
    }

    #[test]
    fn blank_and_duplicate_headers() {
        let frame = Frame::from_rows(vec![
            vec![Value::Empty, text("A"), text("A"), text("A.1"), Value::Int(1), Value::Float(1.5), Value::Bool(true)],
            vec![Value::Int(1); 7],
        ]);
        assert_eq!(
            frame.column_names(),
            "['Unnamed: 0', 'A', 'A.1', 'A.1.1', 1, 1.5, 'True.1']"
        );
    }

    #[test]
    fn datetime_and_time_headers_use_python_reprs() {
        let datetime = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let time = NaiveTime::from_hms_opt(10, 30, 15).unwrap();
        let frame = Frame::from_rows(vec![vec![Value::DateTime(datetime), Value::Time(time)]]);
        assert_eq!(frame.column_names(), "[datetime.datetime(2024, 1, 5, 0, 0), datetime.time(10, 30, 15)]");
    }

    #[test]
    fn trailing_blanks_are_trimmed_and_rows_padded() {
        let frame = Frame::from_rows(vec![
            vec![text("a"), text("b"), Value::Empty],
            vec![Value::Int(1), Value::Empty, Value::Empty],
            vec![Value::Int(2), Value::Int(3), text("")],
            vec![Value::Empty, Value::Empty, Value::Empty],
        ]);
        assert_eq!(frame.columns().len(), 2);
        assert_eq!(frame.rows(), &[vec![Value::Int(1), Value::Empty], vec![Value::Int(2), Value::Float(3.0)]]);
        assert_eq!(kinds(&frame), vec![ColumnKind::Int, ColumnKind::Float]);
    }

    #[test]
    fn blank_rows_kept_in_wide_tables_and_dropped_in_single_column() {
        let wide = Frame::from_rows(vec![
            vec![text("a"), text("b")],
            vec![Value::Empty, Value::Empty],
            vec![Value::Int(1), Value::Int(2)],
        ]);
        assert_eq!(wide.len(), 2);

        let narrow = Frame::from_rows(vec![
            vec![Value::Empty],
            vec![text("a")],
            vec![Value::Empty],
            vec![Value::Int(1)],
        ]);
        assert_eq!(narrow.column_names(), "['a']");
        assert_eq!(narrow.rows(), &[vec![Value::Int(1)]]);
    }

    #[test]
    fn leading_blank_row_becomes_unnamed_header() {
        let frame = Frame::from_rows(vec![
            vec![],
            vec![text("a"), text("b")],
        ]);
        assert_eq!(frame.column_names(), "['Unnamed: 0', 'Unnamed: 1']");
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn empty_sheet_has_no_columns() {
        let frame = Frame::from_rows(vec![vec![Value::Empty, Value::Empty], vec![]]);
        assert!(frame.is_empty());
        assert_eq!(frame.column_names(), "[]");
    }

    #[test]
    fn missing_value_markers_in_records() {
        let frame = Frame::from_rows(vec![
            vec![text("NA"), text("b")],
            vec![text("N/A"), text("x")],
            vec![Value::Int(4), text("null")],
        ]);
        assert_eq!(frame.column_names(), "['NA', 'b']");
        assert_eq!(frame.rows()[0][0], Value::Empty);
        assert_eq!(frame.rows()[1][1], Value::Empty);
        assert_eq!(kinds(&frame), vec![ColumnKind::Float, ColumnKind::Object]);
    }

    #[test]
    fn column_kind_detection() {
        let date = Value::DateTime(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(ColumnKind::detect(&[&Value::Int(1), &text("2")]), ColumnKind::Int);
        assert_eq!(ColumnKind::detect(&[&Value::Int(1), &text("2.5")]), ColumnKind::Float);
        assert_eq!(ColumnKind::detect(&[&Value::Int(1), &Value::Empty]), ColumnKind::Float);
        assert_eq!(ColumnKind::detect(&[&Value::Empty, &Value::Empty]), ColumnKind::Float);
        assert_eq!(ColumnKind::detect(&[&Value::Bool(true), &text("FALSE")]), ColumnKind::Bool);
        assert_eq!(ColumnKind::detect(&[&Value::Bool(true), &Value::Empty]), ColumnKind::Object);
        assert_eq!(ColumnKind::detect(&[&date, &Value::Empty]), ColumnKind::DateTime);
        assert_eq!(ColumnKind::detect(&[&Value::Int(1), &text("x")]), ColumnKind::Object);
    }

    #[test]
    fn numeric_text_is_coerced() {
        let frame = Frame::from_rows(vec![
            vec![text("n"), text("flag")],
            vec![text("7"), text("TRUE")],
            vec![Value::Int(8), Value::Bool(false)],
        ]);
        assert_eq!(frame.rows(), &[
            vec![Value::Int(7), Value::Bool(true)],
            vec![Value::Int(8), Value::Bool(false)],
        ]);
    }

    #[test]
    fn head_keeps_kinds() {
        let frame = Frame::from_rows(vec![
            vec![text("x")],
            vec![Value::Int(1)],
            vec![Value::Int(2)],
            vec![Value::Float(2.5)],
        ]);
        let head = frame.head(2);
        assert_eq!(head.len(), 2);
        assert_eq!(kinds(&head), vec![ColumnKind::Float]);
        assert_eq!(frame.head(10).len(), 3);
        assert_eq!(frame.head(0).len(), 0);
    }
}
