//! Per-company client with memoized statement access.

use crate::error::{DataError, Result};
use crate::fetch::{HttpFetcher, JsonFetcher};
use crate::statement::{Statement, UrlTemplates};
use crate::table::{FINANCIALS_KEY, parse_number, parse_to_table};
use polars::prelude::DataFrame;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, trace};

/// Summary field holding market capitalization.
pub const MARKET_CAP_FIELD: &str = "mktCap";

/// Financial statements for a single company.
///
/// Each statement is fetched on first access and held for the life of the
/// client; later accesses never touch the network. A failed access caches
/// nothing, so the next call tries again.
///
/// # Example
///
/// ```no_run
/// use finmod_data::FinancialsClient;
///
/// # fn example() -> finmod_data::Result<()> {
/// let mut client = FinancialsClient::new("AAPL")?;
/// let balance_sheet = client.balance_sheet_statement()?;
/// println!("{} periods", balance_sheet.height());
///
/// let market_cap = client.market_cap()?;
/// println!("Market cap: {market_cap}");
/// # Ok(())
/// # }
/// ```
pub struct FinancialsClient {
    symbol: String,
    templates: UrlTemplates,
    fetcher: Box<dyn JsonFetcher>,
    tables: HashMap<Statement, DataFrame>,
    summary: Option<Map<String, Value>>,
}

impl FinancialsClient {
    /// Create a client for `symbol` that fetches over HTTP.
    ///
    /// # Errors
    /// Returns `DataError::InvalidSymbol` for a blank symbol and
    /// `DataError::Network` if the HTTP client cannot be built.
    pub fn new(symbol: &str) -> Result<Self> {
        Self::with_fetcher(symbol, HttpFetcher::new()?)
    }

    /// Create a client for `symbol` that fetches through `fetcher`.
    pub fn with_fetcher(symbol: &str, fetcher: impl JsonFetcher + 'static) -> Result<Self> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        Ok(Self {
            symbol: symbol.to_string(),
            templates: UrlTemplates::default(),
            fetcher: Box::new(fetcher),
            tables: HashMap::new(),
            summary: None,
        })
    }

    /// Company symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// URL `statement` is fetched from.
    pub fn url_for(&self, statement: Statement) -> String {
        self.templates.render(statement, &self.symbol)
    }

    /// Replace the URL template for `statement`.
    ///
    /// Statements already cached are not refetched.
    pub fn set_template(&mut self, statement: Statement, template: impl Into<String>) {
        self.templates.set(statement, template);
    }

    /// Replace the fetch capability. Cached statements are kept.
    pub fn set_fetcher(&mut self, fetcher: impl JsonFetcher + 'static) {
        self.fetcher = Box::new(fetcher);
    }

    /// Whether `statement` has already been fetched and cached.
    pub fn is_cached(&self, statement: Statement) -> bool {
        match statement {
            Statement::Summary => self.summary.is_some(),
            _ => self.tables.contains_key(&statement),
        }
    }

    /// Fetch the raw JSON payload for `statement`, bypassing the cache.
    ///
    /// # Errors
    /// `DataError::Parser` when the URL is malformed or unreachable,
    /// `DataError::Json` when the response is not JSON.
    pub fn fetch(&self, statement: Statement) -> Result<Value> {
        fetch(self.fetcher.as_ref(), &self.templates, &self.symbol, statement)
    }

    /// Balance sheet, one row per reporting period.
    pub fn balance_sheet_statement(&mut self) -> Result<&DataFrame> {
        self.statement(Statement::BalanceSheet)
    }

    /// Income statement, one row per reporting period.
    pub fn income_statement(&mut self) -> Result<&DataFrame> {
        self.statement(Statement::IncomeStatement)
    }

    /// Cash flow statement, one row per reporting period.
    pub fn cash_flow_statement(&mut self) -> Result<&DataFrame> {
        self.statement(Statement::CashFlow)
    }

    /// Date-indexed table for any tabular statement.
    ///
    /// # Errors
    /// Returns `DataError::UnknownStatement` for [`Statement::Summary`], which
    /// has no periods.
    pub fn statement(&mut self, statement: Statement) -> Result<&DataFrame> {
        if !statement.is_tabular() {
            return Err(DataError::UnknownStatement(format!(
                "{statement} is not a tabular statement"
            )));
        }

        match self.tables.entry(statement) {
            Entry::Occupied(entry) => {
                trace!(symbol = %self.symbol, %statement, "statement cache hit");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let payload =
                    fetch(self.fetcher.as_ref(), &self.templates, &self.symbol, statement)?;
                let table = parse_statement(statement, &payload)?;
                debug!(
                    symbol = %self.symbol,
                    %statement,
                    rows = table.height(),
                    columns = table.width(),
                    "cached statement"
                );
                Ok(entry.insert(table))
            }
        }
    }

    /// Market capitalization (`mktCap`) from the company summary.
    pub fn market_cap(&mut self) -> Result<f64> {
        self.summary_value(MARKET_CAP_FIELD)
    }

    /// Numeric field from the company summary.
    ///
    /// The summary is fetched once; every field is read from the same cached
    /// object. Numeric strings are accepted; `NaN` and infinities are not.
    ///
    /// # Errors
    /// `DataError::MissingField` if the summary lacks `field`,
    /// `DataError::InvalidValue` if it is not a number.
    pub fn summary_value(&mut self, field: &str) -> Result<f64> {
        let summary = self.summary()?;
        let value = summary
            .get(field)
            .ok_or_else(|| DataError::missing(field, Statement::Summary.as_str()))?;

        number(value).ok_or_else(|| DataError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    fn summary(&mut self) -> Result<&Map<String, Value>> {
        match self.summary {
            Some(ref summary) => {
                trace!(symbol = %self.symbol, "summary cache hit");
                Ok(summary)
            }
            None => {
                let payload = fetch(
                    self.fetcher.as_ref(),
                    &self.templates,
                    &self.symbol,
                    Statement::Summary,
                )?;
                let Value::Object(summary) = payload else {
                    return Err(DataError::InvalidRecord(
                        "summary payload is not an object".to_string(),
                    ));
                };
                debug!(symbol = %self.symbol, fields = summary.len(), "cached summary");
                Ok(self.summary.insert(summary))
            }
        }
    }
}

impl std::fmt::Debug for FinancialsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinancialsClient")
            .field("symbol", &self.symbol)
            .field("templates", &self.templates)
            .field("cached", &self.tables.keys().collect::<Vec<_>>())
            .field("summary_cached", &self.summary.is_some())
            .finish_non_exhaustive()
    }
}

fn fetch(
    fetcher: &dyn JsonFetcher,
    templates: &UrlTemplates,
    symbol: &str,
    statement: Statement,
) -> Result<Value> {
    let url = templates.render(statement, symbol);
    fetcher.fetch_json(&url)
}

fn parse_statement(statement: Statement, payload: &Value) -> Result<DataFrame> {
    match statement {
        Statement::BalanceSheet => {
            let records = payload
                .get(FINANCIALS_KEY)
                .ok_or_else(|| DataError::missing(FINANCIALS_KEY, statement.as_str()))?;
            parse_to_table(records)
        }
        _ => parse_to_table(payload),
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}
