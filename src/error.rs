use thiserror::Error;

#[derive(Error, Debug)]
pub enum TradebookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Workbook has no worksheets")]
    EmptyWorkbook,

    #[error("Unknown currency marker: {0}")]
    UnknownCurrency(char),

    #[error("Could not determine market code for {0}")]
    MarketCodeResolution(String),

    #[error("Quote lookup failed: {0}")]
    Quote(#[from] reqwest::Error),

    #[error("Market table error: {0}")]
    MarketTable(String),
}

pub type Result<T> = std::result::Result<T, TradebookError>;
