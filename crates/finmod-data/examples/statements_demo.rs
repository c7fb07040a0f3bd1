//! Example fetching a company's statements and market cap.
//!
//! Note: This requires network access to the statements API.

use finmod_data::{FinancialsClient, Statement, coerce_numeric, statement_dates};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Financial Statements Demo");
    println!("=========================\n");

    let mut client = FinancialsClient::new("AAPL")?;

    for statement in [
        Statement::BalanceSheet,
        Statement::IncomeStatement,
        Statement::CashFlow,
    ] {
        println!("{statement} ({})", client.url_for(statement));
        match client.statement(statement) {
            Ok(table) => {
                let table = coerce_numeric(table)?;
                let dates = statement_dates(&table)?;
                println!(
                    "  {} periods, {} line items, latest {}",
                    table.height(),
                    table.width() - 1,
                    dates.first().map_or_else(|| "n/a".to_string(), ToString::to_string)
                );
            }
            Err(e) => eprintln!("  Error fetching {statement}: {e}"),
        }
    }

    println!();

    // Second access is served from the cache
    if client.is_cached(Statement::IncomeStatement) {
        let income = client.income_statement()?;
        println!("Cached income statement: {} rows", income.height());
    }

    match client.market_cap() {
        Ok(market_cap) => println!("Market cap: ${:.2}B", market_cap / 1e9),
        Err(e) => eprintln!("Error fetching summary: {e}"),
    }

    Ok(())
}
