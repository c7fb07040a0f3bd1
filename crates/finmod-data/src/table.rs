//! Conversion of date-labeled JSON records into Polars DataFrames.
//!
//! A statement table carries its row index in a leading `date` column of
//! dtype `Date`. Every other column is a line item named after its JSON field,
//! in the order fields are first encountered. Rows keep payload order, which
//! for the upstream API is most recent period first.
//!
//! # Example
//!
//! ```
//! use finmod_data::table::{parse_to_table, statement_dates};
//! use serde_json::json;
//!
//! # fn main() -> finmod_data::Result<()> {
//! let payload = json!({
//!     "financials": [
//!         {"date": "2018-9-29", "Revenue": 265595000000.0},
//!         {"date": "2017-9-30", "Revenue": 229234000000.0}
//!     ]
//! });
//! let df = parse_to_table(&payload)?;
//! assert_eq!(df.height(), 2);
//! assert_eq!(statement_dates(&df)?[0].to_string(), "2018-09-29");
//! # Ok(())
//! # }
//! ```

use crate::error::{DataError, Result};
use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use serde_json::{Map, Value};
use std::ops::RangeInclusive;

/// Name of the index column holding each row's reporting date.
pub const DATE_COLUMN: &str = "date";

/// Key under which some payloads nest their per-period records.
pub const FINANCIALS_KEY: &str = "financials";

/// Parse a `YYYY-M-D` date.
///
/// The year is exactly four digits; month and day take one or two digits, so
/// `2018-9-29` and `2018-09-29` are the same date.
///
/// # Errors
/// Returns `DataError::InvalidDate` if the string has any other shape or does
/// not name a real calendar day.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let invalid = || DataError::InvalidDate(s.to_string());

    let mut parts = s.split('-');
    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    if !is_digits(year, 4..=4) || !is_digits(month, 1..=2) || !is_digits(day, 1..=2) {
        return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

fn is_digits(s: &str, len: RangeInclusive<usize>) -> bool {
    len.contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parse numeric text as a finite `f64`.
///
/// Surrounding whitespace is ignored. `NaN` and infinities are not numbers
/// here, even though `f64::from_str` accepts them.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Convert a statement payload into a date-indexed DataFrame.
///
/// Accepts either an object holding a `financials` array or a bare array of
/// records. Values stay as JSON produced them: all-number columns become
/// `Float64`, all-boolean columns `Boolean`, anything else `String`. `null`
/// and blank strings are missing cells. Numeric strings are not converted
/// here; see [`coerce_numeric`].
///
/// # Errors
/// Fails without a partial result if the payload has the wrong shape, a
/// record lacks `date`, or a date is malformed.
pub fn parse_to_table(payload: &Value) -> Result<DataFrame> {
    let records = records(payload)?;

    let mut dates = Vec::with_capacity(records.len());
    let mut rows: Vec<&Map<String, Value>> = Vec::with_capacity(records.len());
    let mut fields: Vec<&str> = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let record = record
            .as_object()
            .ok_or_else(|| DataError::InvalidRecord(format!("record {i} is not an object")))?;

        let date = record
            .get(DATE_COLUMN)
            .ok_or_else(|| DataError::missing(DATE_COLUMN, format!("record {i}")))?;
        let date = date
            .as_str()
            .ok_or_else(|| DataError::InvalidDate(date.to_string()))?;
        dates.push(parse_date(date)?);

        for key in record.keys() {
            if key != DATE_COLUMN && !fields.contains(&key.as_str()) {
                fields.push(key);
            }
        }
        rows.push(record);
    }

    let mut columns: Vec<Column> = Vec::with_capacity(fields.len() + 1);
    columns.push(date_series(&dates)?.into());

    for field in fields {
        let values: Vec<Option<&Value>> = rows
            .iter()
            .map(|row| row.get(field).filter(|v| !is_missing(v)))
            .collect();
        columns.push(line_item(field, &values).into());
    }

    Ok(DataFrame::new(columns)?)
}

fn records(payload: &Value) -> Result<&Vec<Value>> {
    match payload {
        Value::Array(records) => Ok(records),
        Value::Object(object) => match object.get(FINANCIALS_KEY) {
            Some(Value::Array(records)) => Ok(records),
            Some(_) => Err(DataError::InvalidRecord(format!(
                "'{FINANCIALS_KEY}' is not an array"
            ))),
            None => Err(DataError::missing(FINANCIALS_KEY, "statement payload")),
        },
        other => Err(DataError::InvalidRecord(format!(
            "expected an array of records, got {}",
            json_kind(other)
        ))),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn date_series(dates: &[NaiveDate]) -> Result<Series> {
    let epoch = NaiveDate::default();
    let days: Vec<i32> = dates
        .iter()
        .map(|date| date.signed_duration_since(epoch).num_days() as i32)
        .collect();

    Ok(Series::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?)
}

fn line_item(name: &str, values: &[Option<&Value>]) -> Series {
    let present = || values.iter().flatten();

    if present().all(|v| v.is_number()) {
        let data: Vec<Option<f64>> = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
        Series::new(name.into(), data)
    } else if present().all(|v| v.is_boolean()) {
        let data: Vec<Option<bool>> = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
        Series::new(name.into(), data)
    } else {
        let data: Vec<Option<String>> = values
            .iter()
            .map(|v| {
                v.map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
            })
            .collect();
        Series::new(name.into(), data)
    }
}

/// Convert numeric-looking string columns to `Float64`.
///
/// A `String` line-item column is converted when every non-blank value parses
/// as a finite `f64`; blank strings become null. Text such as `NaN` or `inf`
/// keeps the column as `String`. Columns with any non-numeric text, and
/// the `date` index, are left as they are.
pub fn coerce_numeric(df: &DataFrame) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        if column.name().as_str() == DATE_COLUMN || column.dtype() != &DataType::String {
            columns.push(column.clone());
            continue;
        }

        let parsed: Option<Vec<Option<f64>>> = column
            .str()?
            .into_iter()
            .map(|value| match value.map(str::trim) {
                None | Some("") => Some(None),
                Some(text) => parse_number(text).map(Some),
            })
            .collect();

        match parsed {
            Some(values) => columns.push(Series::new(column.name().clone(), values).into()),
            None => columns.push(column.clone()),
        }
    }

    Ok(DataFrame::new(columns)?)
}

/// Read the `date` index of a statement table back as calendar dates.
///
/// # Errors
/// Returns `DataError::MissingField` if the table has no `date` column.
pub fn statement_dates(df: &DataFrame) -> Result<Vec<NaiveDate>> {
    let column = df
        .column(DATE_COLUMN)
        .map_err(|_| DataError::missing(DATE_COLUMN, "statement table"))?;
    let days = column.cast(&DataType::Int32)?;
    let epoch = NaiveDate::default();

    days.i32()?
        .into_iter()
        .enumerate()
        .map(|(row, day)| {
            day.and_then(|day| epoch.checked_add_signed(Duration::days(i64::from(day))))
                .ok_or_else(|| DataError::InvalidRecord(format!("row {row} has no date")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[rstest]
    #[case("2018-9-29", ymd(2018, 9, 29))]
    #[case("2018-09-29", ymd(2018, 9, 29))]
    #[case("2017-1-2", ymd(2017, 1, 2))]
    #[case("2016-12-31", ymd(2016, 12, 31))]
    #[case("2020-2-29", ymd(2020, 2, 29))]
    fn test_parse_date(#[case] input: &str, #[case] expected: NaiveDate) {
        assert_eq!(parse_date(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("2018-9")]
    #[case("18-9-29")]
    #[case("02018-9-29")]
    #[case("2018-009-29")]
    #[case("2018-9-29-1")]
    #[case("2018/9/29")]
    #[case("2018-13-1")]
    #[case("2019-2-29")]
    #[case("2018-+9-29")]
    #[case("2018-9-29T00:00:00")]
    fn test_parse_date_rejects(#[case] input: &str) {
        assert!(matches!(parse_date(input), Err(DataError::InvalidDate(s)) if s == input));
    }

    #[test]
    fn test_bare_array_and_nested_payloads_agree() {
        let records = json!([
            {"date": "2018-9-29", "Revenue": 1.0},
            {"date": "2017-9-30", "Revenue": 2.0}
        ]);
        let nested = json!({ "financials": records.clone() });

        let a = parse_to_table(&records).unwrap();
        let b = parse_to_table(&nested).unwrap();
        assert!(a.equals_missing(&b));
    }

    #[test]
    fn test_column_order_follows_first_encounter() {
        let payload = json!([
            {"date": "2018-9-29", "Revenue": 1.0, "Cost of Revenue": 0.5},
            {"Gross Profit": 0.2, "date": "2017-9-30", "Revenue": 2.0}
        ]);

        let df = parse_to_table(&payload).unwrap();
        let names: Vec<&str> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();
        assert_eq!(names, ["date", "Revenue", "Cost of Revenue", "Gross Profit"]);

        // Fields absent from a record are null
        let gross = df.column("Gross Profit").unwrap().f64().unwrap();
        assert_eq!(gross.get(0), None);
        assert_eq!(gross.get(1), Some(0.2));
    }

    #[test]
    fn test_string_values_are_kept_verbatim() {
        let payload = json!([
            {"date": "2018-9-29", "Revenue": "265595000000.0", "Note": null},
            {"date": "2017-9-30", "Revenue": "2.0", "Note": "restated"}
        ]);

        let df = parse_to_table(&payload).unwrap();
        let revenue = df.column("Revenue").unwrap();
        assert_eq!(revenue.dtype(), &DataType::String);
        assert_eq!(revenue.str().unwrap().get(0), Some("265595000000.0"));

        let note = df.column("Note").unwrap().str().unwrap();
        assert_eq!(note.get(0), None);
        assert_eq!(note.get(1), Some("restated"));
    }

    #[test]
    fn test_blank_strings_are_missing() {
        let payload = json!([
            {"date": "2018-9-29", "Debt": "2.0", "Cash": 5.0},
            {"date": "2017-9-30", "Debt": "", "Cash": "  "}
        ]);

        let df = parse_to_table(&payload).unwrap();
        let debt = df.column("Debt").unwrap();
        assert_eq!(debt.dtype(), &DataType::String);
        assert_eq!(debt.str().unwrap().get(0), Some("2.0"));
        assert_eq!(debt.str().unwrap().get(1), None);

        // A blank cell does not turn a numeric column into text
        let cash = df.column("Cash").unwrap();
        assert_eq!(cash.dtype(), &DataType::Float64);
        assert_eq!(cash.f64().unwrap().get(1), None);
    }

    #[rstest]
    #[case("12.5", Some(12.5))]
    #[case(" -3 ", Some(-3.0))]
    #[case("1e3", Some(1000.0))]
    #[case("NaN", None)]
    #[case("inf", None)]
    #[case("-infinity", None)]
    #[case("n/a", None)]
    #[case("", None)]
    fn test_parse_number(#[case] text: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_number(text), expected);
    }

    #[test]
    fn test_coerce_numeric_leaves_non_finite_text() {
        let payload = json!([
            {"date": "2018-9-29", "Ratio": "1.5"},
            {"date": "2017-9-30", "Ratio": "NaN"}
        ]);

        let df = coerce_numeric(&parse_to_table(&payload).unwrap()).unwrap();
        let ratio = df.column("Ratio").unwrap();
        assert_eq!(ratio.dtype(), &DataType::String);
        assert_eq!(ratio.str().unwrap().get(1), Some("NaN"));
    }

    #[test]
    fn test_mixed_column_falls_back_to_strings() {
        let payload = json!([
            {"date": "2018-9-29", "Shares": 4754986000u64},
            {"date": "2017-9-30", "Shares": "n/a"}
        ]);

        let df = parse_to_table(&payload).unwrap();
        let shares = df.column("Shares").unwrap().str().unwrap();
        assert_eq!(shares.get(0), Some("4754986000"));
        assert_eq!(shares.get(1), Some("n/a"));
    }

    #[test]
    fn test_boolean_column() {
        let payload = json!([{"date": "2018-9-29", "Audited": true}]);
        let df = parse_to_table(&payload).unwrap();
        assert_eq!(df.column("Audited").unwrap().dtype(), &DataType::Boolean);
    }

    #[test]
    fn test_empty_records() {
        let df = parse_to_table(&json!({"financials": []})).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 1);
        assert_eq!(df.column(DATE_COLUMN).unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn test_missing_date_fails_whole_parse() {
        let payload = json!([
            {"date": "2018-9-29", "Revenue": 1.0},
            {"Revenue": 2.0}
        ]);
        let result = parse_to_table(&payload);
        assert!(matches!(
            result,
            Err(DataError::MissingField { ref field, .. }) if field == "date"
        ));
    }

    #[rstest]
    #[case(json!([{"date": "29/09/2018"}]))]
    #[case(json!([{"date": 20180929}]))]
    fn test_malformed_date_fails(#[case] payload: Value) {
        assert!(matches!(
            parse_to_table(&payload),
            Err(DataError::InvalidDate(_))
        ));
    }

    #[rstest]
    #[case(json!("not records"))]
    #[case(json!({"financials": {"date": "2018-9-29"}}))]
    #[case(json!([1, 2, 3]))]
    fn test_wrong_shape_fails(#[case] payload: Value) {
        assert!(matches!(
            parse_to_table(&payload),
            Err(DataError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_object_without_financials() {
        let result = parse_to_table(&json!({"symbol": "AAPL"}));
        assert!(matches!(
            result,
            Err(DataError::MissingField { ref field, .. }) if field == "financials"
        ));
    }

    #[test]
    fn test_statement_dates_round_trip() {
        let payload = json!([
            {"date": "2018-9-29"},
            {"date": "1969-12-31"},
            {"date": "2016-9-24"}
        ]);
        let df = parse_to_table(&payload).unwrap();
        assert_eq!(
            statement_dates(&df).unwrap(),
            vec![ymd(2018, 9, 29), ymd(1969, 12, 31), ymd(2016, 9, 24)]
        );
    }

    #[test]
    fn test_coerce_numeric() {
        let payload = json!([
            {"date": "2018-9-29", "Revenue": "265595000000.0", "Currency": "USD", "EPS": 11.91},
            {"date": "2017-9-30", "Revenue": " ", "Currency": "USD", "EPS": 9.21}
        ]);

        let df = coerce_numeric(&parse_to_table(&payload).unwrap()).unwrap();

        let revenue = df.column("Revenue").unwrap().f64().unwrap();
        assert_eq!(revenue.get(0), Some(265_595_000_000.0));
        assert_eq!(revenue.get(1), None);

        assert_eq!(df.column("Currency").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("EPS").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column(DATE_COLUMN).unwrap().dtype(), &DataType::Date);
    }
}
