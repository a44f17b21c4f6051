use std::io::Write;
use std::path::Path;

use calamine::Data;
use colored::Colorize;

use crate::error::Result;
use crate::exporter;
use crate::ledger::{Outcome, ReconciliationEngine, RunResult};
use crate::market::{MarketCodeResolver, MarketTables};
use crate::models::TradeKind;
use crate::quote::YahooQuoteLookup;
use crate::statement::{self, Field};

pub fn run(input: &str, output: &str, markets: Option<&str>) -> Result<()> {
    let tables = match markets {
        Some(path) => MarketTables::from_file(Path::new(path))?,
        None => MarketTables::default(),
    };
    let lookup = YahooQuoteLookup::new()?;
    let resolver = MarketCodeResolver::new(tables, Box::new(lookup));

    println!("Opening {input}...");
    let range = statement::open_statement(Path::new(input))?;

    println!("Writing CSV to {output}...");
    let result = process_rows(range.rows().skip(1), resolver)?;
    exporter::write_csv(Path::new(output), &result.lines)?;

    report(&result);
    Ok(())
}

/// Row loop, separated from file handling so tests can feed synthetic rows.
/// Rows whose type is outside BUY/SELL are dropped before extraction.
pub fn process_rows<'a, I>(rows: I, resolver: MarketCodeResolver) -> Result<RunResult>
where
    I: Iterator<Item = &'a [Data]>,
{
    let mut engine = ReconciliationEngine::new(resolver);
    let mut stdout = std::io::stdout();
    for row in rows {
        let Some(kind) = TradeKind::parse(&statement::string_field(row, Field::Type)) else {
            continue;
        };
        let record = statement::extract_record(row, kind)?;
        match engine.process(&record)? {
            Outcome::Appended | Outcome::UnmatchedReversal => print!("."),
            Outcome::Cancelled => print!("X."),
            Outcome::SkippedSymbol => {}
        }
        let _ = stdout.flush();
    }
    Ok(engine.finish())
}

fn report(result: &RunResult) {
    if !result.unmatched.is_empty() {
        let symbols = dedup(&result.unmatched).join(", ");
        eprintln!();
        eprintln!(
            "{}",
            format!("Warning: no prior trade matched the reversal of {symbols}; rows dropped")
                .yellow()
        );
    }
    if result.skipped.is_empty() {
        println!("\n{}", "Done!".green());
    } else {
        println!("\nSkipped: {}.", dedup(&result.skipped).join(", "));
        println!("{}", "Done!".green());
    }
}

/// First-seen order, duplicates removed. Statement-sized inputs only.
fn dedup(symbols: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for symbol in symbols {
        if !seen.contains(symbol) {
            seen.push(symbol.clone());
        }
    }
    seen
}
