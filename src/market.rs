use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TradebookError};
use crate::models::Currency;

/// Narrow capability over the external quote service: a ticker's primary
/// exchange display name, if the service knows the symbol.
pub trait QuoteLookup {
    fn primary_exchange(&self, symbol: &str) -> Result<Option<String>>;
}

// ---------------------------------------------------------------------------
// Override tables
// ---------------------------------------------------------------------------

const CAD_DEFAULT: &str = "TSE";
const CAD_OVERRIDES: &[(&str, &str)] = &[("ETHC", "NEO")];
const USD_OVERRIDES: &[(&str, &str)] = &[("WFM", "NASDAQ"), ("ENB.PR.V", "TSE")];

#[derive(Debug, Default, Deserialize)]
struct TableFile {
    #[serde(default)]
    cad: TableSection,
    #[serde(default)]
    usd: TableSection,
}

#[derive(Debug, Default, Deserialize)]
struct TableSection {
    default: Option<String>,
    #[serde(default)]
    overrides: HashMap<String, String>,
}

/// Static symbol-to-exchange overrides, consulted before any quote lookup.
/// CAD symbols with no entry fall back to the table default; USD symbols
/// with no entry go to the quote service.
#[derive(Debug, Clone)]
pub struct MarketTables {
    cad_default: String,
    cad: HashMap<String, String>,
    usd: HashMap<String, String>,
}

impl Default for MarketTables {
    fn default() -> Self {
        Self {
            cad_default: CAD_DEFAULT.to_string(),
            cad: CAD_OVERRIDES
                .iter()
                .map(|(s, m)| (s.to_string(), m.to_string()))
                .collect(),
            usd: USD_OVERRIDES
                .iter()
                .map(|(s, m)| (s.to_string(), m.to_string()))
                .collect(),
        }
    }
}

impl MarketTables {
    /// Built-ins extended by a user-supplied JSON table. File entries win;
    /// symbols are uppercased on load.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TradebookError::MarketTable(format!("{}: {e}", path.display())))?;
        let file: TableFile = serde_json::from_str(&content)
            .map_err(|e| TradebookError::MarketTable(format!("{}: {e}", path.display())))?;
        let mut tables = Self::default();
        if let Some(default) = file.cad.default {
            tables.cad_default = default;
        }
        for (symbol, market) in file.cad.overrides {
            tables.cad.insert(symbol.to_uppercase(), market);
        }
        for (symbol, market) in file.usd.overrides {
            tables.usd.insert(symbol.to_uppercase(), market);
        }
        Ok(tables)
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves and memoizes the listing exchange for each (symbol, currency)
/// pair. The cache guarantees at most one resolution attempt, including any
/// quote service call, per distinct pair per run.
pub struct MarketCodeResolver {
    tables: MarketTables,
    lookup: Box<dyn QuoteLookup>,
    cache: HashMap<(String, Currency), String>,
}

impl MarketCodeResolver {
    pub fn new(tables: MarketTables, lookup: Box<dyn QuoteLookup>) -> Self {
        Self {
            tables,
            lookup,
            cache: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, symbol: &str, currency: Currency) -> Result<String> {
        let key = (symbol.to_uppercase(), currency);
        if let Some(code) = self.cache.get(&key) {
            return Ok(code.clone());
        }

        let raw = match currency {
            Currency::Cad => self
                .tables
                .cad
                .get(&key.0)
                .cloned()
                .unwrap_or_else(|| self.tables.cad_default.clone()),
            Currency::Usd => match self.tables.usd.get(&key.0) {
                Some(code) => code.clone(),
                None => self
                    .lookup
                    .primary_exchange(&key.0)?
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| TradebookError::MarketCodeResolution(key.0.clone()))?,
            },
        };

        let code = normalize_market_name(&raw);
        self.cache.insert(key, code.clone());
        Ok(code)
    }
}

/// Collapse long-form exchange names to ledger codes. Unrecognized names
/// pass through unchanged.
pub fn normalize_market_name(name: &str) -> String {
    let lower = name.to_lowercase();
    if lower.contains("new york stock exchange") {
        "NYSE".to_string()
    } else if lower.contains("nasdaq") {
        "NASDAQ".to_string()
    } else if lower.contains("toronto") {
        "TSE".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct StubLookup {
        exchange: Option<String>,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl QuoteLookup for StubLookup {
        fn primary_exchange(&self, symbol: &str) -> Result<Option<String>> {
            self.calls.borrow_mut().push(symbol.to_string());
            Ok(self.exchange.clone())
        }
    }

    struct NoLookup;

    impl QuoteLookup for NoLookup {
        fn primary_exchange(&self, symbol: &str) -> Result<Option<String>> {
            panic!("unexpected quote lookup for {symbol}");
        }
    }

    fn resolver_with(exchange: Option<&str>) -> (MarketCodeResolver, Rc<RefCell<Vec<String>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let lookup = StubLookup {
            exchange: exchange.map(str::to_string),
            calls: Rc::clone(&calls),
        };
        (
            MarketCodeResolver::new(MarketTables::default(), Box::new(lookup)),
            calls,
        )
    }

    #[test]
    fn test_cad_override_and_default() {
        let mut resolver = MarketCodeResolver::new(MarketTables::default(), Box::new(NoLookup));
        assert_eq!(resolver.resolve("ETHC", Currency::Cad).unwrap(), "NEO");
        assert_eq!(resolver.resolve("RY", Currency::Cad).unwrap(), "TSE");
    }

    #[test]
    fn test_usd_override_skips_lookup() {
        let mut resolver = MarketCodeResolver::new(MarketTables::default(), Box::new(NoLookup));
        assert_eq!(resolver.resolve("WFM", Currency::Usd).unwrap(), "NASDAQ");
        assert_eq!(resolver.resolve("ENB.PR.V", Currency::Usd).unwrap(), "TSE");
    }

    #[test]
    fn test_usd_falls_back_to_lookup() {
        let (mut resolver, calls) = resolver_with(Some("New York Stock Exchange Inc."));
        assert_eq!(resolver.resolve("IBM", Currency::Usd).unwrap(), "NYSE");
        assert_eq!(calls.borrow().as_slice(), ["IBM"]);
    }

    #[test]
    fn test_lookup_called_at_most_once_per_key() {
        let (mut resolver, calls) = resolver_with(Some("NASDAQ Global Select"));
        for _ in 0..4 {
            assert_eq!(resolver.resolve("aapl", Currency::Usd).unwrap(), "NASDAQ");
        }
        assert_eq!(resolver.resolve("AAPL", Currency::Usd).unwrap(), "NASDAQ");
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_unresolvable_usd_symbol_fails() {
        let (mut resolver, _calls) = resolver_with(None);
        let err = resolver.resolve("ZZZZ", Currency::Usd).unwrap_err();
        assert!(matches!(
            err,
            TradebookError::MarketCodeResolution(ref s) if s == "ZZZZ"
        ));
    }

    #[test]
    fn test_empty_exchange_name_fails() {
        let (mut resolver, _calls) = resolver_with(Some(""));
        assert!(resolver.resolve("ZZZZ", Currency::Usd).is_err());
    }

    #[test]
    fn test_cache_is_per_currency() {
        let (mut resolver, calls) = resolver_with(Some("Toronto Stock Exchange"));
        assert_eq!(resolver.resolve("ETHC", Currency::Usd).unwrap(), "TSE");
        assert_eq!(resolver.resolve("ETHC", Currency::Cad).unwrap(), "NEO");
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_normalize_market_name() {
        assert_eq!(
            normalize_market_name("New York Stock Exchange Inc."),
            "NYSE"
        );
        assert_eq!(normalize_market_name("NasdaqGS"), "NASDAQ");
        assert_eq!(normalize_market_name("nasdaq global market"), "NASDAQ");
        assert_eq!(normalize_market_name("Toronto Stock Exchange"), "TSE");
        assert_eq!(normalize_market_name("NEO"), "NEO");
        assert_eq!(normalize_market_name("London Stock Exchange"), "London Stock Exchange");
    }

    #[test]
    fn test_tables_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markets.json");
        std::fs::write(
            &path,
            r#"{
                "cad": { "default": "CNQ", "overrides": { "abc": "NEO" } },
                "usd": { "overrides": { "WFM": "NYSE" } }
            }"#,
        )
        .unwrap();
        let tables = MarketTables::from_file(&path).unwrap();
        let mut resolver = MarketCodeResolver::new(tables, Box::new(NoLookup));
        assert_eq!(resolver.resolve("ABC", Currency::Cad).unwrap(), "NEO");
        assert_eq!(resolver.resolve("XYZ", Currency::Cad).unwrap(), "CNQ");
        assert_eq!(resolver.resolve("ETHC", Currency::Cad).unwrap(), "NEO");
        assert_eq!(resolver.resolve("WFM", Currency::Usd).unwrap(), "NYSE");
    }

    #[test]
    fn test_tables_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = MarketTables::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, TradebookError::MarketTable(_)));
    }

    #[test]
    fn test_tables_from_invalid_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markets.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(MarketTables::from_file(&path).is_err());
    }
}
