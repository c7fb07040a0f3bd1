//! Rendering of statement tables and summary figures.

use clap::ValueEnum;
use finmod_data::{Result, Statement};
use finmod_data::table::{DATE_COLUMN, statement_dates};
use polars::prelude::*;
use serde_json::{Map, Number, Value};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// Human-readable table
    Text,
    /// JSON records, one object per period
    Json,
}

pub(crate) fn render_table(
    symbol: &str,
    statement: Statement,
    df: &DataFrame,
    format: Format,
) -> Result<String> {
    match format {
        Format::Text => Ok(format!("{symbol} {statement}\n{df}")),
        Format::Json => {
            let mut object = Map::new();
            object.insert("symbol".to_string(), Value::String(symbol.to_string()));
            object.insert("statement".to_string(), serde_json::to_value(statement)?);
            object.insert("periods".to_string(), table_to_json(df)?);
            Ok(serde_json::to_string_pretty(&Value::Object(object))?)
        }
    }
}

pub(crate) fn render_scalar(
    symbol: &str,
    field: &str,
    value: f64,
    format: Format,
) -> Result<String> {
    match format {
        Format::Text => Ok(format!("{symbol} {field}: {value}")),
        Format::Json => {
            let mut object = Map::new();
            object.insert("symbol".to_string(), Value::String(symbol.to_string()));
            object.insert(field.to_string(), number(value));
            Ok(serde_json::to_string_pretty(&Value::Object(object))?)
        }
    }
}

/// Convert a statement table back into JSON records with ISO dates.
fn table_to_json(df: &DataFrame) -> Result<Value> {
    let dates = statement_dates(df)?;
    let mut records = Vec::with_capacity(df.height());

    for (row, date) in dates.iter().enumerate() {
        let mut record = Map::new();
        record.insert(DATE_COLUMN.to_string(), Value::String(date.to_string()));

        for column in df.get_columns() {
            if column.name().as_str() == DATE_COLUMN {
                continue;
            }
            record.insert(column.name().to_string(), cell(column.get(row)?));
        }
        records.push(Value::Object(record));
    }

    Ok(Value::Array(records))
}

fn cell(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Float64(v) => number(v),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        other => Value::String(other.to_string()),
    }
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}
