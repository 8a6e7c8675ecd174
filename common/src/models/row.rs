//! Dynamic row mapping.
//!
//! Result sets have no fixed schema, so a row is kept as an ordered list of
//! `(column, value)` pairs and serialized as a JSON object in column order.
//!
//! Every statement runs over the MySQL text protocol, where each non-NULL
//! cell arrives as its textual rendering. [`render_text`] turns that text
//! into the closest JSON value.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Number, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row as _, TypeInfo};

/// One result-set row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column` to `value`.
    ///
    /// A repeated column name keeps its first position and takes the new
    /// value, the same way a JSON object would collapse the duplicate.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in result-set order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Builds a row from a text-protocol MySQL row.
    pub fn from_mysql(row: &MySqlRow) -> Self {
        let mut out = Row::new();
        for column in row.columns() {
            let kind = ValueKind::from_type_name(column.type_info().name());
            let value = match raw_cell(row, column.ordinal()) {
                Some(bytes) => render_text(kind, bytes),
                None => Value::Null,
            };
            out.insert(column.name(), value);
        }
        out
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in &self.columns {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// How a column's text rendering maps onto JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Signed,
    Unsigned,
    Float,
    /// Exact numerics, including `SUM`/`AVG` results.
    Decimal,
    /// `BIT(n)`: raw big-endian bytes, even over the text protocol.
    Bit,
    /// `DATETIME` and `TIMESTAMP`.
    DateTime,
    /// `TIME`, a signed duration.
    Time,
    /// Everything else, including DATE, JSON and binary types.
    Text,
}

impl ValueKind {
    /// Classifies a column by its `sqlx` type name (e.g. `"INT UNSIGNED"`).
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "FLOAT" | "DOUBLE" => ValueKind::Float,
            "DECIMAL" => ValueKind::Decimal,
            "BIT" => ValueKind::Bit,
            "DATETIME" | "TIMESTAMP" => ValueKind::DateTime,
            "TIME" => ValueKind::Time,
            // TINYINT(1) is reported as BOOLEAN but still carries 0/1 on the wire.
            "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
                ValueKind::Signed
            }
            _ if name.ends_with(" UNSIGNED") => ValueKind::Unsigned,
            _ => ValueKind::Text,
        }
    }
}

/// Renders one non-NULL text-protocol cell as JSON.
///
/// - decimals without a fractional part become integers, others floats
/// - datetimes become ISO-8601 (`2024-01-31T10:00:00[.ffffff]`)
/// - times become a number of seconds
///
/// Values that fail to parse degrade to text rather than erroring.
pub fn render_text(kind: ValueKind, bytes: &[u8]) -> Value {
    let text = String::from_utf8_lossy(bytes);
    let rendered = match kind {
        ValueKind::Signed => text.parse::<i64>().ok().map(Value::from),
        ValueKind::Unsigned => text.parse::<u64>().ok().map(Value::from),
        ValueKind::Float => text
            .parse::<f64>()
            .ok()
            .map(|f| Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)),
        ValueKind::Decimal => render_decimal(&text),
        ValueKind::Bit if bytes.len() <= 8 => Some(Value::from(
            bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)),
        )),
        ValueKind::DateTime => render_datetime(&text).map(Value::String),
        ValueKind::Time => render_time(&text),
        ValueKind::Bit | ValueKind::Text => None,
    };
    rendered.unwrap_or_else(|| Value::String(text.into_owned()))
}

fn render_decimal(text: &str) -> Option<Value> {
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(i) = text.parse::<i64>() {
            return Some(Value::from(i));
        }
        if let Ok(u) = text.parse::<u64>() {
            return Some(Value::from(u));
        }
    }
    text.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
}

/// `YYYY-MM-DD hh:mm:ss[.fff]` to ISO-8601 with microsecond precision.
/// A zero fraction is dropped.
fn render_datetime(text: &str) -> Option<String> {
    let (date, time) = text.split_once(' ')?;
    if date.len() != 10 || time.len() < 8 {
        return None;
    }
    let (clock, fraction) = match time.split_once('.') {
        Some((clock, fraction)) => (clock, fraction),
        None => (time, ""),
    };
    if !fraction.bytes().all(|b| b.is_ascii_digit()) || fraction.len() > 6 {
        return None;
    }
    if fraction.bytes().all(|b| b == b'0') {
        Some(format!("{}T{}", date, clock))
    } else {
        Some(format!("{}T{}.{:0<6}", date, clock, fraction))
    }
}

/// `[-]hhh:mm:ss[.fff]` to total seconds.
fn render_time(text: &str) -> Option<Value> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let mut parts = body.splitn(3, ':');
    let hours: f64 = parts.next()?.parse::<u32>().ok()?.into();
    let minutes: f64 = parts.next()?.parse::<u32>().ok()?.into();
    let seconds: f64 = parts.next()?.parse().ok()?;
    let total = hours * 3600.0 + minutes * 60.0 + seconds;
    Number::from_f64(if negative { -total } else { total }).map(Value::Number)
}

/// Reads cell `idx` as text, `None` for NULL.
pub fn text_at(row: &MySqlRow, idx: usize) -> Option<String> {
    raw_cell(row, idx).map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}

fn raw_cell(row: &MySqlRow, idx: usize) -> Option<&[u8]> {
    match row.try_get_unchecked::<Option<&[u8]>, _>(idx) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!(column = idx, error = %err, "unreadable cell rendered as null");
            None
        }
    }
}
