use regex::Regex;

use crate::error::Result;
use crate::market::MarketCodeResolver;
use crate::models::{TradeKind, TradeLine, TransactionRecord};

/// What `process` did with a record; the pipeline uses this for progress
/// output and end-of-run reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Appended,
    Cancelled,
    SkippedSymbol,
    UnmatchedReversal,
}

/// Everything a run produced, handed back once the row loop is done.
#[derive(Debug)]
pub struct RunResult {
    pub lines: Vec<TradeLine>,
    pub skipped: Vec<String>,
    pub unmatched: Vec<String>,
}

/// Consumes records in statement order, cancelling erroneous reversals
/// against previously accepted lines and appending everything else.
pub struct ReconciliationEngine {
    resolver: MarketCodeResolver,
    lines: Vec<TradeLine>,
    skipped: Vec<String>,
    unmatched: Vec<String>,
    digit: Regex,
}

impl ReconciliationEngine {
    pub fn new(resolver: MarketCodeResolver) -> Self {
        Self {
            resolver,
            lines: Vec::new(),
            skipped: Vec::new(),
            unmatched: Vec::new(),
            digit: Regex::new(r"\d").unwrap(),
        }
    }

    /// Symbols containing a digit are option-style instruments the ledger
    /// format has no representation for.
    fn skip_symbol(&self, symbol: &str) -> bool {
        self.digit.is_match(symbol)
    }

    pub fn process(&mut self, record: &TransactionRecord) -> Result<Outcome> {
        if self.skip_symbol(&record.symbol) {
            self.skipped.push(record.symbol.clone());
            return Ok(Outcome::SkippedSymbol);
        }

        let erroneous = match record.kind {
            TradeKind::Buy => record.quantity < 0.0,
            TradeKind::Sell => record.quantity > 0.0,
        };
        if erroneous {
            return Ok(self.cancel_reversal(record));
        }

        let market_code = self.resolver.resolve(&record.symbol, record.currency)?;
        self.lines.push(TradeLine {
            trade_date: record.trade_date.clone(),
            symbol: record.symbol.clone(),
            market_code,
            quantity: record.quantity.abs(),
            price: record.price.abs(),
            kind: record.kind,
            currency: record.currency,
        });
        Ok(Outcome::Appended)
    }

    /// A reversal cancels the most recent matching line outright; the pair
    /// drops out of the ledger. Match is on symbol, negated quantity and
    /// absolute price. Currency is deliberately not compared.
    fn cancel_reversal(&mut self, record: &TransactionRecord) -> Outcome {
        let wanted_quantity = -record.quantity;
        let wanted_price = record.price.abs();
        let found = self.lines.iter().rposition(|line| {
            line.symbol == record.symbol
                && line.quantity == wanted_quantity
                && line.price == wanted_price
        });
        match found {
            Some(idx) => {
                self.lines.remove(idx);
                Outcome::Cancelled
            }
            None => {
                self.unmatched.push(record.symbol.clone());
                Outcome::UnmatchedReversal
            }
        }
    }

    pub fn finish(self) -> RunResult {
        RunResult {
            lines: self.lines,
            skipped: self.skipped,
            unmatched: self.unmatched,
        }
    }
}
