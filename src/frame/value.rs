use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::Timelike;

/// Text markers read as missing values in data rows.
const NA_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>", "N/A", "NA",
    "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A typed cell value inside a frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl Value {
    /// Integral numbers that fit in an `i64` become `Int`, everything else `Float`.
    pub fn from_number(number: f64) -> Self {
        if number.is_finite() && number.fract() == 0.0 && number.abs() < 9.2e18 {
            Value::Int(number as i64)
        } else {
            Value::Float(number)
        }
    }

    /// True for empty cells and empty strings.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    pub(crate) fn is_na_marker(&self) -> bool {
        match self {
            Value::Text(text) => NA_MARKERS.contains(&text.as_str()),
            _ => self.is_blank(),
        }
    }

    /// Numeric view used by column inference; text is accepted when it parses as a number.
    pub(crate) fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            Value::Text(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Boolean view used by column inference; accepts `True/TRUE/true` and `False/FALSE/false`.
    pub(crate) fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            Value::Text(text) => match text.as_str() {
                "True" | "TRUE" | "true" => Some(true),
                "False" | "FALSE" | "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Python `repr()` of a string: single quotes unless the text holds a single quote and no double quote.
pub fn quote(text: &str) -> String {
    let delimiter = if text.contains('\'') && !text.contains('"') { '"' } else { '\'' };
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(delimiter);
    for character in text.chars() {
        match character {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ if character == delimiter => {
                quoted.push('\\');
                quoted.push(character);
            }
            _ if (character as u32) < 0x20 || character as u32 == 0x7f => {
                quoted.push_str(&format!("\\x{:02x}", character as u32));
            }
            _ => quoted.push(character),
        }
    }
    quoted.push(delimiter);
    quoted
}

/// Python `repr()` of a float: shortest round-trip digits, always with a fraction or exponent.
pub fn float_repr(number: f64) -> String {
    if number.is_nan() {
        return "nan".to_owned();
    } else if number.is_infinite() {
        return if number > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    let magnitude = number.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{:e}", number);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let exponent = exponent.parse::<i32>().unwrap_or_default();
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exponent.abs())
            }
            None => formatted,
        }
    } else {
        let formatted = format!("{}", number);
        if formatted.contains('.') {
            formatted
        } else {
            format!("{}.0", formatted)
        }
    }
}

/// Python `str()` of a date-time: `YYYY-MM-DD HH:MM:SS[.ffffff]`.
pub fn datetime_str(datetime: &NaiveDateTime) -> String {
    format!("{} {}", datetime.format("%Y-%m-%d"), time_str(&datetime.time()))
}

/// Python `str()` of a time: `HH:MM:SS[.ffffff]`.
pub fn time_str(time: &NaiveTime) -> String {
    let microseconds = time.nanosecond() / 1_000;
    if microseconds > 0 {
        format!("{}.{:06}", time.format("%H:%M:%S"), microseconds)
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_matches_python_repr() {
        assert_eq!(quote("DB"), "'DB'");
        assert_eq!(quote("스타 세이비어"), "'스타 세이비어'");
        assert_eq!(quote("it's"), "\"it's\"");
        assert_eq!(quote("both ' and \""), "'both \\' and \"'");
        assert_eq!(quote("a\\b\nc"), "'a\\\\b\\nc'");
        assert_eq!(quote("\u{1}"), "'\\x01'");
    }

    #[test]
    fn float_repr_matches_python_repr() {
        assert_eq!(float_repr(1.5), "1.5");
        assert_eq!(float_repr(2.0), "2.0");
        assert_eq!(float_repr(-0.25), "-0.25");
        assert_eq!(float_repr(1e16), "1e+16");
        assert_eq!(float_repr(1.5e-5), "1.5e-05");
        assert_eq!(float_repr(f64::NAN), "nan");
    }

    #[test]
    fn from_number_keeps_integral_values() {
        assert_eq!(Value::from_number(3.0), Value::Int(3));
        assert_eq!(Value::from_number(-0.0), Value::Int(0));
        assert_eq!(Value::from_number(3.25), Value::Float(3.25));
        assert_eq!(Value::from_number(1e300), Value::Float(1e300));
    }

    #[test]
    fn na_markers() {
        assert!(Value::Empty.is_na_marker());
        assert!(Value::Text("N/A".to_owned()).is_na_marker());
        assert!(Value::Text("".to_owned()).is_na_marker());
        assert!(!Value::Text("n.a.".to_owned()).is_na_marker());
        assert!(!Value::Int(0).is_na_marker());
    }
}
