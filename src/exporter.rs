use std::path::Path;

use crate::error::Result;
use crate::fmt::decimal;
use crate::models::TradeLine;

pub const OUTPUT_FIELDS: [&str; 9] = [
    "Trade Date",
    "Instrument Code",
    "Market Code",
    "Quantity",
    "Price in Dollars",
    "Transaction Type",
    "Brokerage",
    "Brokerage Currency",
    "Comments",
];

/// Write the header plus one record per retained trade. Brokerage is fixed
/// to zero and comments left empty.
pub fn write_csv(path: &Path, lines: &[TradeLine]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(OUTPUT_FIELDS)?;
    for line in lines {
        let quantity = decimal(line.quantity);
        let price = decimal(line.price);
        writer.write_record([
            line.trade_date.as_str(),
            line.symbol.as_str(),
            line.market_code.as_str(),
            quantity.as_str(),
            price.as_str(),
            line.kind.as_str(),
            "0",
            line.currency.code(),
            "",
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, TradeKind};

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let lines = vec![TradeLine {
            trade_date: "10/01/2025".to_string(),
            symbol: "ETHC".to_string(),
            market_code: "NEO".to_string(),
            quantity: 100.0,
            price: 2.0,
            kind: TradeKind::Buy,
            currency: Currency::Cad,
        }];
        write_csv(&path, &lines).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Trade Date,Instrument Code,Market Code,Quantity,Price in Dollars,\
             Transaction Type,Brokerage,Brokerage Currency,Comments\n\
             10/01/2025,ETHC,NEO,100.0,2.0,BUY,0,CAD,\n"
        );
    }

    #[test]
    fn test_write_csv_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&path, &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("Trade Date,"));
    }
}
