//! Decoding of driver rows into plain text mappings.
//!
//! Everything the core sees is text. Typed coercion happens later, in
//! `metrics::derive`, where every failure can name its field.

use mysql_async::{Row, Value};

use crate::collector::traits::{FetchError, TextRow};

/// Renders one cell as text.
///
/// `NULL` becomes the empty string. The text protocol delivers `SHOW`
/// output as `Bytes`; the other variants only appear with the binary
/// protocol and are formatted the way the server would print them.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::NULL => String::new(),
        Value::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::Int(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Date(year, month, day, hour, min, sec, micro) => {
            let mut text = format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, min, sec
            );
            if *micro > 0 {
                text.push_str(&format!(".{:06}", micro));
            }
            text
        }
        Value::Time(negative, days, hours, mins, secs, micros) => {
            let sign = if *negative { "-" } else { "" };
            let hours = u64::from(*days) * 24 + u64::from(*hours);
            let mut text = format!("{}{:02}:{:02}:{:02}", sign, hours, mins, secs);
            if *micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            text
        }
    }
}

/// Collapses a two-column `name, value` result set into a mapping.
///
/// Later rows win on duplicate names. Extra columns are ignored.
pub(crate) fn name_value_map<I>(rows: I) -> Result<TextRow, FetchError>
where
    I: IntoIterator<Item = Vec<Value>>,
{
    let mut result = TextRow::new();
    for (idx, cells) in rows.into_iter().enumerate() {
        if cells.len() < 2 {
            return Err(FetchError::Malformed(format!(
                "row {} has {} column(s), expected name and value",
                idx,
                cells.len()
            )));
        }
        result.insert(value_to_text(&cells[0]), value_to_text(&cells[1]));
    }
    Ok(result)
}

/// Turns each row into a `column name -> text` mapping.
pub(crate) fn column_maps<I>(columns: &[String], rows: I) -> Result<Vec<TextRow>, FetchError>
where
    I: IntoIterator<Item = Vec<Value>>,
{
    let mut result = Vec::new();
    for (idx, cells) in rows.into_iter().enumerate() {
        if cells.len() != columns.len() {
            return Err(FetchError::Malformed(format!(
                "row {} has {} value(s) for {} column(s)",
                idx,
                cells.len(),
                columns.len()
            )));
        }
        let row = columns
            .iter()
            .cloned()
            .zip(cells.iter().map(value_to_text))
            .collect();
        result.push(row);
    }
    Ok(result)
}

/// Column names of a driver row, in result-set order.
pub(super) fn row_columns(row: &Row) -> Vec<String> {
    row.columns_ref()
        .iter()
        .map(|col| col.name_str().into_owned())
        .collect()
}

/// Cells of a driver row; cells already taken out of the row read as `NULL`.
pub(super) fn row_cells(row: &Row) -> Vec<Value> {
    (0..row.len())
        .map(|idx| row.as_ref(idx).cloned().unwrap_or(Value::NULL))
        .collect()
}
