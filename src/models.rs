use crate::error::{Result, TradebookError};

/// Trade direction, parsed from the statement's type column. Rows with any
/// other type never make it past the pipeline's early filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeKind {
    Buy,
    Sell,
}

impl TradeKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_uppercase().as_str() {
            "BUY" => Some(Self::Buy),
            "SELL" => Some(Self::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

/// Settlement currency of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Usd,
    Cad,
}

impl Currency {
    /// The statement encodes the currency in the account identifier's
    /// trailing character: `U` for USD accounts, `C` for CAD. Anything else
    /// is a hard stop.
    pub fn from_account_number(account: &str) -> Result<Self> {
        match account.to_uppercase().chars().last() {
            Some('U') => Ok(Self::Usd),
            Some('C') => Ok(Self::Cad),
            other => Err(TradebookError::UnknownCurrency(other.unwrap_or('?'))),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Cad => "CAD",
        }
    }
}

/// Typed view of one statement row, rebuilt field by field per row. The
/// currency is derived from the account number, never read from the row's
/// own currency column.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub account_number: String,
    pub trade_date: String,
    pub kind: TradeKind,
    pub symbol: String,
    pub quantity: f64,
    pub price: f64,
    pub currency: Currency,
}

/// One retained row of the output ledger. Quantity and price are always
/// absolute values; the sign is consumed by reversal matching and discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeLine {
    pub trade_date: String,
    pub symbol: String,
    pub market_code: String,
    pub quantity: f64,
    pub price: f64,
    pub kind: TradeKind,
    pub currency: Currency,
}
