use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::Result;
use crate::market::QuoteLookup;

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko)";

// ---------------------------------------------------------------------------
// API response structures
// ---------------------------------------------------------------------------

/// Response shape of the v8 chart endpoint, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    full_exchange_name: Option<String>,
    exchange_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Quote lookup against the Yahoo Finance chart API. Blocking, no retries;
/// the resolver's cache keeps it to one request per unresolved symbol.
pub struct YahooQuoteLookup {
    client: Client,
    base_url: String,
}

impl YahooQuoteLookup {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl QuoteLookup for YahooQuoteLookup {
    fn primary_exchange(&self, symbol: &str) -> Result<Option<String>> {
        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            // Unknown symbols come back as a 404 error envelope
            return Ok(None);
        }
        let body: ChartResponse = response.json()?;
        let meta = match body.chart.result.and_then(|r| r.into_iter().next()) {
            Some(first) => first.meta,
            None => return Ok(None),
        };
        Ok(meta.full_exchange_name.or(meta.exchange_name))
    }
}
