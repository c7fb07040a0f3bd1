//! finmod CLI binary.
//!
//! Prints a company's financial statements or summary figures.

mod output;

use clap::{Parser, Subcommand};
use finmod_data::{
    FinancialsClient, HttpConfig, HttpFetcher, MARKET_CAP_FIELD, Statement, coerce_numeric,
};
use output::{Format, render_scalar, render_table};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "finmod")]
#[command(about = "Fetch company financial statements", long_about = None)]
#[command(version)]
struct Cli {
    /// Company ticker symbol
    symbol: String,

    #[command(subcommand)]
    command: Commands,

    /// URL template for the requested data ({symbol} is replaced)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout: u64,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Balance sheet, one row per period
    BalanceSheet {
        /// Convert numeric text to numbers
        #[arg(long)]
        numeric: bool,
    },

    /// Income statement, one row per period
    Income {
        /// Convert numeric text to numbers
        #[arg(long)]
        numeric: bool,
    },

    /// Cash flow statement, one row per period
    CashFlow {
        /// Convert numeric text to numbers
        #[arg(long)]
        numeric: bool,
    },

    /// Market capitalization
    MarketCap,

    /// Any numeric field of the company summary
    Summary {
        /// Field name, e.g. price or beta
        #[arg(long)]
        field: String,
    },
}

impl Commands {
    const fn statement(&self) -> Statement {
        match self {
            Self::BalanceSheet { .. } => Statement::BalanceSheet,
            Self::Income { .. } => Statement::IncomeStatement,
            Self::CashFlow { .. } => Statement::CashFlow,
            Self::MarketCap | Self::Summary { .. } => Statement::Summary,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = HttpConfig {
        timeout: Duration::from_secs(cli.timeout),
        ..HttpConfig::default()
    };
    let fetcher = HttpFetcher::with_config(&config)?;
    let mut client = FinancialsClient::with_fetcher(&cli.symbol, fetcher)?;

    let statement = cli.command.statement();
    if let Some(url) = cli.url {
        client.set_template(statement, url);
    }
    tracing::debug!(url = %client.url_for(statement), "resolved endpoint");

    let rendered = match cli.command {
        Commands::BalanceSheet { numeric }
        | Commands::Income { numeric }
        | Commands::CashFlow { numeric } => {
            let symbol = client.symbol().to_string();
            let table = client.statement(statement)?;
            if numeric {
                render_table(&symbol, statement, &coerce_numeric(table)?, cli.format)?
            } else {
                render_table(&symbol, statement, table, cli.format)?
            }
        }
        Commands::MarketCap => {
            let market_cap = client.market_cap()?;
            render_scalar(client.symbol(), MARKET_CAP_FIELD, market_cap, cli.format)?
        }
        Commands::Summary { field } => {
            let value = client.summary_value(&field)?;
            render_scalar(client.symbol(), &field, value, cli.format)?
        }
    };

    println!("{rendered}");
    Ok(())
}
