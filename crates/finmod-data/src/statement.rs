//! Statement identifiers and the URL templates they are fetched from.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use url::form_urlencoded::byte_serialize;

/// Placeholder replaced by the company symbol in a URL template.
pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";

const BALANCE_SHEET_URL: &str =
    "https://financialmodelingprep.com/api/v3/financials/balance-sheet-statement/{symbol}";
const INCOME_STATEMENT_URL: &str =
    "https://financialmodelingprep.com/api/v3/financials/income-statement/{symbol}";
const CASH_FLOW_URL: &str =
    "https://financialmodelingprep.com/api/v3/financials/cash-flow-statement/{symbol}";
const SUMMARY_URL: &str = "https://financialmodelingprep.com/api/v3/company/profile/{symbol}";

/// A financial report that can be fetched for a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    /// Balance sheet, records nested under `financials`
    #[serde(rename = "balance_sheet_statement")]
    BalanceSheet,
    /// Income statement
    #[serde(rename = "income_statement")]
    IncomeStatement,
    /// Cash flow statement
    #[serde(rename = "cash_flow_statement")]
    CashFlow,
    /// Flat market snapshot (market cap, price, ...)
    Summary,
}

impl Statement {
    /// All statements, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::BalanceSheet,
        Self::IncomeStatement,
        Self::CashFlow,
        Self::Summary,
    ];

    /// Identifier used in URLs, errors and on the command line.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "balance_sheet_statement",
            Self::IncomeStatement => "income_statement",
            Self::CashFlow => "cash_flow_statement",
            Self::Summary => "summary",
        }
    }

    /// Whether the statement is a dated table rather than a flat snapshot.
    pub const fn is_tabular(&self) -> bool {
        !matches!(self, Self::Summary)
    }

    /// Default URL template for this statement.
    pub const fn default_template(&self) -> &'static str {
        match self {
            Self::BalanceSheet => BALANCE_SHEET_URL,
            Self::IncomeStatement => INCOME_STATEMENT_URL,
            Self::CashFlow => CASH_FLOW_URL,
            Self::Summary => SUMMARY_URL,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Statement {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|statement| statement.as_str() == s)
            .ok_or_else(|| DataError::UnknownStatement(s.to_string()))
    }
}

/// Mapping from statement to URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplates {
    templates: HashMap<Statement, String>,
}

impl UrlTemplates {
    /// Template for `statement`.
    pub fn get(&self, statement: Statement) -> &str {
        self.templates
            .get(&statement)
            .map_or_else(|| statement.default_template(), String::as_str)
    }

    /// Replace the template for `statement`.
    pub fn set(&mut self, statement: Statement, template: impl Into<String>) {
        self.templates.insert(statement, template.into());
    }

    /// Build the URL for `statement` and `symbol`.
    ///
    /// The symbol is percent-encoded, so `BRK/B` stays a single path segment.
    /// Templates without a `{symbol}` placeholder are returned verbatim.
    pub fn render(&self, statement: Statement, symbol: &str) -> String {
        let encoded: String = byte_serialize(symbol.as_bytes()).collect();
        self.get(statement).replace(SYMBOL_PLACEHOLDER, &encoded)
    }
}

impl Default for UrlTemplates {
    fn default() -> Self {
        let templates = Statement::ALL
            .into_iter()
            .map(|statement| (statement, statement.default_template().to_string()))
            .collect();
        Self { templates }
    }
}
