mod convert;
mod error;
mod exporter;
mod fmt;
mod ledger;
mod market;
mod models;
mod quote;
mod statement;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "tradebook",
    version,
    about = "Convert a brokerage statement spreadsheet into a trade ledger CSV."
)]
struct Cli {
    /// Path to input spreadsheet
    #[arg(short, long)]
    input: String,

    /// Path to CSV output
    #[arg(short, long)]
    output: String,

    /// JSON file extending the built-in market override tables
    #[arg(long)]
    markets: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = convert::run(&cli.input, &cli.output, cli.markets.as_deref()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
