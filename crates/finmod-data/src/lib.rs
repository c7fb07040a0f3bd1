#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finmod/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod client;
pub mod error;
pub mod fetch;
pub mod statement;
pub mod table;

pub use client::{FinancialsClient, MARKET_CAP_FIELD};
pub use error::{DataError, Result};
pub use fetch::{HttpConfig, HttpFetcher, JsonFetcher};
pub use statement::{Statement, UrlTemplates};
pub use table::{coerce_numeric, parse_date, parse_to_table, statement_dates};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
