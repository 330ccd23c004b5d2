//! Plain text layout of a [`Frame`], matching what `print(df)` shows when pandas runs as a
//! script: lines fitted to 80 characters by replacing middle columns with `...`, cells cut at
//! 50 characters and six digits of float precision.
use crate::frame::value::{datetime_str, time_str, Value};
use crate::frame::{Column, ColumnKind, Frame};
use chrono::{NaiveDateTime, Timelike};
use std::fmt::Display;

/// Width that rendered lines are fitted into
const LINE_WIDTH: usize = 80;
/// Maximum width of a cell before it is cut and suffixed with `...`
const MAX_COLWIDTH: usize = 50;
/// Maximum number of labels listed for an empty frame
const MAX_SEQ_ITEMS: usize = 100;
/// Digits after the decimal point for floats
const PRECISION: usize = 6;

impl Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str(&render_empty(self.columns()));
        }
        let (text, is_truncated) = render_table(self);
        f.write_str(&text)?;
        if is_truncated {
            write!(f, "\n\n[{} rows x {} columns]", self.len(), self.columns().len())?;
        }
        Ok(())
    }
}

fn render_empty(columns: &[Column]) -> String {
    let mut labels: Vec<String> = columns.iter()
        .take(MAX_SEQ_ITEMS)
        .map(|column| column.label.to_string())
        .collect();
    if columns.len() > MAX_SEQ_ITEMS {
        labels.push("...".to_owned());
    }
    format!("Empty DataFrame\nColumns: [{}]\nIndex: []", labels.join(", "))
}

/// Renders the table and tells whether middle columns were left out to fit the line width.
fn render_table(frame: &Frame) -> (String, bool) {
    let total = frame.columns().len();
    let columns: Vec<Vec<String>> = (0..total)
        .map(|index| render_column(&frame.columns()[index], &frame.rows().iter().map(|record| &record[index]).collect::<Vec<_>>()))
        .collect();

    let mut index = vec![String::new()];
    index.extend((0..frame.len()).map(|row| row.to_string()));
    let index_width = max_width(&index);
    let index: Vec<String> = index.iter().map(|label| justify_left(label, index_width)).collect();

    // More columns than characters per line: start from the outer ones only
    let first_pass = layout(&index, &columns, (total > LINE_WIDTH).then_some(LINE_WIDTH));
    let widths: Vec<usize> = first_pass.iter().map(|column| max_width(column)).collect();
    let fitted = fitted_column_count(&widths);
    (adjoin(&layout(&index, &columns, Some(fitted))), total > fitted)
}

/// Header followed by the formatted values, right-aligned to a common width.
fn render_column(column: &Column, values: &[&Value]) -> Vec<String> {
    let label = escape(&column.label.to_string());
    let header = match column.kind {
        ColumnKind::Int | ColumnKind::Float | ColumnKind::Bool => format!(" {}", label),
        _ => label,
    };
    let header_width = width(&header);

    let values = format_values(column.kind, values);
    let fitted_width = max_width(&values).max(header_width).min(MAX_COLWIDTH);
    let values: Vec<String> = values.into_iter()
        .map(|value| {
            if width(&value) > fitted_width {
                let cut: String = value.chars().take(fitted_width - 3).collect();
                justify_right(&format!("{}...", cut), fitted_width)
            } else {
                justify_right(&value, fitted_width)
            }
        })
        .collect();

    let column_width = max_width(&values).max(header_width);
    let mut lines = vec![justify_right(&header, column_width)];
    lines.extend(values);
    lines
}

fn format_values(kind: ColumnKind, values: &[&Value]) -> Vec<String> {
    match kind {
        ColumnKind::Int => values.iter()
            .map(|value| match value {
                Value::Int(number) => with_sign_space(number.to_string()),
                other => format_object(other),
            })
            .collect(),
        ColumnKind::Float => format_floats(&values.iter().map(|value| value.as_number()).collect::<Vec<_>>()),
        ColumnKind::DateTime => format_datetimes(values),
        ColumnKind::Bool | ColumnKind::Object => values.iter().map(|value| format_object(value)).collect(),
    }
}

/// Fixed notation with trailing zeros trimmed column-wide, switching to scientific
/// notation when small values would round to zero or large values get too wide.
fn format_floats(numbers: &[Option<f64>]) -> Vec<String> {
    let fixed = trim_zeros(numbers.iter()
        .map(|number| match number {
            Some(number) => with_sign_space(format!("{:.*}", PRECISION, number)),
            None => "NaN".to_owned(),
        })
        .collect());

    let too_long = max_width(&fixed) > PRECISION + 6;
    let has_large = numbers.iter().flatten().any(|number| number.abs() > 1e6);
    let has_small = numbers.iter().flatten().any(|number| number.abs() < 1e-6 && number.abs() > 0.0);
    if has_small || (too_long && has_large) {
        trim_zeros(numbers.iter()
            .map(|number| match number {
                Some(number) => with_sign_space(exponent_notation(*number)),
                None => "NaN".to_owned(),
            })
            .collect())
    } else {
        fixed
    }
}

/// `{:.6e}` with a signed, two digit exponent (`1.500000e+07`).
fn exponent_notation(number: f64) -> String {
    let formatted = format!("{:.*e}", PRECISION, number);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent = exponent.parse::<i32>().unwrap_or_default();
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}

/// Strips trailing zeros shared by all fixed-notation values, keeping at least one decimal.
fn trim_zeros(mut values: Vec<String>) -> Vec<String> {
    loop {
        let mut numbers = values.iter().filter(|value| is_fixed_number(value)).peekable();
        if numbers.peek().is_none() || !numbers.all(|value| value.ends_with('0')) {
            break;
        }
        for value in values.iter_mut().filter(|value| is_fixed_number(value)) {
            value.pop();
        }
    }
    values.into_iter()
        .map(|value| if is_fixed_number(&value) && value.ends_with('.') { format!("{}0", value) } else { value })
        .collect()
}

/// True for `[sign]digits.[digits]` with optional leading whitespace.
fn is_fixed_number(value: &str) -> bool {
    let value = value.trim_start();
    let value = value.strip_prefix(['+', '-']).unwrap_or(value);
    match value.split_once('.') {
        Some((integer, fraction)) => {
            !integer.is_empty()
                && integer.bytes().all(|byte| byte.is_ascii_digit())
                && fraction.bytes().all(|byte| byte.is_ascii_digit())
        }
        None => false,
    }
}

/// Dates only when every value is at midnight, otherwise full timestamps sharing one precision.
fn format_datetimes(values: &[&Value]) -> Vec<String> {
    let datetimes: Vec<&NaiveDateTime> = values.iter()
        .filter_map(|value| match value {
            Value::DateTime(datetime) => Some(datetime),
            _ => None,
        })
        .collect();
    let micros = |datetime: &NaiveDateTime| datetime.nanosecond() / 1_000;
    let format = if datetimes.iter().all(|datetime| datetime.num_seconds_from_midnight() == 0 && datetime.nanosecond() == 0) {
        "%Y-%m-%d"
    } else if datetimes.iter().any(|datetime| micros(datetime) % 1_000 != 0) {
        "%Y-%m-%d %H:%M:%S%.6f"
    } else if datetimes.iter().any(|datetime| micros(datetime) != 0) {
        "%Y-%m-%d %H:%M:%S%.3f"
    } else {
        "%Y-%m-%d %H:%M:%S"
    };
    values.iter()
        .map(|value| match value {
            Value::DateTime(datetime) => datetime.format(format).to_string(),
            _ => "NaT".to_owned(),
        })
        .collect()
}

/// Python `str()` of a single value, prefixed with a space.
fn format_object(value: &Value) -> String {
    match value {
        Value::Empty => " NaN".to_owned(),
        Value::Bool(flag) => (if *flag { " True" } else { " False" }).to_owned(),
        Value::Int(number) => format!(" {}", number),
        Value::Float(number) => {
            let fixed = with_sign_space(format!("{:.*}", PRECISION, number));
            let trimmed = if fixed.contains('.') { fixed.trim_end_matches('0') } else { fixed.as_str() };
            if trimmed.ends_with('.') {
                format!("{}0", trimmed)
            } else {
                trimmed.to_owned()
            }
        }
        Value::Text(text) => format!(" {}", escape(text)),
        Value::DateTime(datetime) => format!(" {}", datetime_str(datetime)),
        Value::Time(time) => format!(" {}", time_str(time)),
    }
}

/// Index followed by the columns; beyond `limit` columns only the first and last
/// `limit / 2` are kept around a ` ...` column.
fn layout(index: &[String], columns: &[Vec<String>], limit: Option<usize>) -> Vec<Vec<String>> {
    let mut lines = vec![index.to_vec()];
    match limit {
        Some(limit) if columns.len() > limit => {
            let half = limit / 2;
            lines.extend(columns[..half].iter().cloned());
            lines.push(vec![" ...".to_owned(); index.len()]);
            lines.extend(columns[columns.len() - half..].iter().cloned());
        }
        _ => lines.extend(columns.iter().cloned()),
    }
    lines
}

/// Number of columns kept so that lines fit in [`LINE_WIDTH`].
///
/// Middle columns are dropped one at a time until the excess width is used up; the count
/// never goes below two.
///
/// # Arguments
/// * `widths` - Widths of the index (first) and of every laid out column
fn fitted_column_count(widths: &[usize]) -> usize {
    let line_length = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
    let mut excess = line_length as isize - LINE_WIDTH as isize + 1;
    let mut remaining = widths.to_vec();
    while excess > 0 && remaining.len() > 1 {
        // Half of the count, rounded half to even
        let half = remaining.len() / 2;
        let middle = if remaining.len() % 2 == 1 && half % 2 == 1 { half + 1 } else { half };
        excess -= remaining.remove(middle) as isize + 1;
    }
    remaining.len().saturating_sub(1).max(2)
}

/// Joins columns line by line, padding every column but the last with one space.
fn adjoin(columns: &[Vec<String>]) -> String {
    let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = columns.iter()
        .enumerate()
        .map(|(i, column)| if i + 1 < columns.len() { max_width(column) + 1 } else { max_width(column) })
        .collect();
    (0..rows)
        .map(|row| {
            columns.iter()
                .zip(&widths)
                .map(|(column, width)| justify_left(column.get(row).map(String::as_str).unwrap_or(""), *width))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn with_sign_space(formatted: String) -> String {
    if formatted.starts_with('-') {
        formatted
    } else {
        format!(" {}", formatted)
    }
}

fn escape(text: &str) -> String {
    text.replace('\t', "\\t").replace('\r', "\\r").replace('\n', "\\n")
}

fn width(text: &str) -> usize {
    text.chars().count()
}

fn max_width(texts: &[String]) -> usize {
    texts.iter().map(|text| width(text)).max().unwrap_or(0)
}

fn justify_left(text: &str, target: usize) -> String {
    format!("{}{}", text, " ".repeat(target.saturating_sub(width(text))))
}

fn justify_right(text: &str, target: usize) -> String {
    format!("{}{}", " ".repeat(target.saturating_sub(width(text))), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> Value {
        Value::Text(value.to_owned())
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn renders_aligned_table() {
        let frame = Frame::from_rows(vec![
            vec![text("Name"), text("Age")],
            vec![text("Ann"), Value::Int(31)],
            vec![text("Bob"), Value::Int(27)],
        ]);
        assert_eq!(frame.to_string(), "  Name  Age\n0  Ann   31\n1  Bob   27");
    }

    #[test]
    fn renders_floats_missing_values_and_dates() {
        let frame = Frame::from_rows(vec![
            vec![text("Name"), text("Score"), text("Joined")],
            vec![text("Ann"), Value::Float(1.5), Value::DateTime(date(2024, 1, 5))],
            vec![text("Bob"), Value::Empty, Value::DateTime(date(2024, 2, 10))],
        ]);
        assert_eq!(
            frame.to_string(),
            "  Name  Score     Joined\n0  Ann    1.5 2024-01-05\n1  Bob    NaN 2024-02-10"
        );
    }

    #[test]
    fn renders_empty_frame() {
        let frame = Frame::from_rows(vec![vec![text("a"), text("b")]]);
        assert_eq!(frame.to_string(), "Empty DataFrame\nColumns: [a, b]\nIndex: []");
    }

    #[test]
    fn float_formatting() {
        assert_eq!(format_floats(&[Some(1.5), Some(2.0), None]), vec![" 1.5", " 2.0", "NaN"]);
        assert_eq!(format_floats(&[Some(-0.25), Some(10.0)]), vec!["-0.25", " 10.00"]);
        assert_eq!(format_floats(&[Some(12345678.9)]), vec![" 12345678.9"]);
        assert_eq!(format_floats(&[Some(1e-7), Some(1.0)]), vec![" 1.000000e-07", " 1.000000e+00"]);
        assert_eq!(format_floats(&[Some(1234567890123.5)]), vec![" 1.234568e+12"]);
    }

    #[test]
    fn object_formatting() {
        assert_eq!(format_object(&Value::Float(2.0)), " 2.0");
        assert_eq!(format_object(&Value::Float(-0.125)), "-0.125");
        assert_eq!(format_object(&Value::Int(7)), " 7");
        assert_eq!(format_object(&Value::Bool(false)), " False");
        assert_eq!(format_object(&Value::Empty), " NaN");
        assert_eq!(format_object(&text("a\tb")), " a\\tb");
    }

    #[test]
    fn datetime_formatting() {
        let morning = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(10, 30, 0).unwrap();
        let midnight = Value::DateTime(date(2024, 1, 6));
        assert_eq!(format_datetimes(&[&midnight, &Value::Empty]), vec!["2024-01-06", "NaT"]);
        assert_eq!(
            format_datetimes(&[&Value::DateTime(morning), &midnight]),
            vec!["2024-01-05 10:30:00", "2024-01-06 00:00:00"]
        );
    }

    #[test]
    fn negative_integers_and_long_text() {
        let long = "x".repeat(60);
        let frame = Frame::from_rows(vec![
            vec![text("n"), text("note")],
            vec![Value::Int(-5), text(&long)],
            vec![Value::Int(12), text("short")],
        ]);
        let lines: Vec<String> = frame.to_string().lines().map(str::to_owned).collect();
        assert_eq!(lines[1], format!("0  -5  {}...", "x".repeat(46)));
        assert_eq!(lines[2], format!("1  12 {}", justify_right(" short", 50)));
    }

    #[test]
    fn wide_frames_drop_middle_columns() {
        let mut header = Vec::new();
        let mut record = Vec::new();
        for i in 0..10 {
            header.push(text(&format!("c{}_xxxxxxxxxxxx", i)));
            record.push(text("v"));
        }
        let rendered = Frame::from_rows(vec![header, record]).to_string();
        let value = justify_right(" v", 15);
        assert_eq!(
            rendered,
            format!(
                "  c0_xxxxxxxxxxxx c1_xxxxxxxxxxxx  ... c8_xxxxxxxxxxxx c9_xxxxxxxxxxxx\n\
                 0 {value} {value}  ... {value} {value}\n\
                 \n\
                 [1 rows x 10 columns]"
            )
        );
        assert!(!rendered.contains(" \\"));
    }

    #[test]
    fn many_columns_keep_the_outer_ones() {
        let header: Vec<Value> = (0..25).map(|i| text(&format!("c{}", i))).collect();
        let record: Vec<Value> = (0..25).map(Value::Int).collect();
        let rendered = Frame::from_rows(vec![header, record]).to_string();
        assert!(rendered.contains(" ..."));
        assert!(rendered.contains("c7") && rendered.contains("c17") && rendered.contains("c24"));
        assert!(!rendered.contains("c8") && !rendered.contains("c16"));
        assert!(rendered.lines().all(|line| line.chars().count() <= LINE_WIDTH));
        assert!(rendered.ends_with("\n\n[1 rows x 25 columns]"));
    }

    #[test]
    fn frames_within_the_line_width_are_complete() {
        let header: Vec<Value> = (0..12).map(|i| text(&format!("c{}", i))).collect();
        let record: Vec<Value> = (0..12).map(Value::Int).collect();
        let rendered = Frame::from_rows(vec![header, record]).to_string();
        assert!(!rendered.contains("..."));
        assert!(!rendered.contains("columns]"));
        assert_eq!(rendered.lines().count(), 2);
    }

    #[test]
    fn fitted_column_count_drops_from_the_middle() {
        assert_eq!(fitted_column_count(&[1, 4, 3]), 2);
        assert_eq!(fitted_column_count(&[1, 15, 15, 15, 15, 15, 15, 15, 15, 15, 15]), 4);
        let mut widths = vec![1];
        widths.extend([3; 10]);
        widths.extend([4; 15]);
        assert_eq!(fitted_column_count(&widths), 17);
        assert_eq!(fitted_column_count(&[1, 100]), 2);
    }
}
