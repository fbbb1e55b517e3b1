use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::rate_limit::RateLimiter;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of results to request from the keyword endpoint; the selector
/// filters by packaging, so it wants a wide net.
const KEYWORD_RECORDS: &str = "50";

fn get_api_base_url() -> String {
    if let Ok(url) = std::env::var("MOUSER_API_URL") {
        return url;
    }
    "https://api.mouser.com/api/v2".to_string()
}

/// One distributor search result, normalized for selection.
///
/// `unit_price` is the lowest-quantity price break, when the payload
/// carried one that parses.
#[derive(Debug, Clone, PartialEq)]
pub struct PartCandidate {
    pub mouser_part_number: String,
    pub packaging: String,
    pub availability: String,
    pub unit_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Errors", default)]
    errors: Vec<serde_json::Value>,
    #[serde(rename = "SearchResults")]
    search_results: Option<SearchResults>,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(rename = "Parts", default)]
    parts: Vec<RawPart>,
}

#[derive(Debug, Deserialize)]
struct RawPart {
    #[serde(rename = "MouserPartNumber", default)]
    mouser_part_number: String,
    #[serde(rename = "Packaging", default)]
    packaging: String,
    #[serde(rename = "Availability", default)]
    availability: String,
    #[serde(rename = "PriceBreaks", default)]
    price_breaks: Vec<PriceBreak>,
}

#[derive(Debug, Deserialize)]
struct PriceBreak {
    #[serde(rename = "Quantity", default)]
    quantity: i64,
    #[serde(rename = "Price", default)]
    price: String,
}

impl From<RawPart> for PartCandidate {
    fn from(part: RawPart) -> Self {
        let unit_price = part
            .price_breaks
            .iter()
            .min_by_key(|pb| pb.quantity)
            .and_then(|pb| parse_price(&pb.price));
        PartCandidate {
            mouser_part_number: part.mouser_part_number,
            packaging: part.packaging,
            availability: part.availability,
            unit_price,
        }
    }
}

/// Mouser reports prices as strings like `"$0.095"` or `"1,234.00"`.
fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse().ok()
}

/// KiCad connector symbols (`Conn_01x04` etc.) make useless keyword
/// queries; rewrite them to a generic header search.
pub fn normalize_keyword(value: &str) -> &str {
    if value.trim().starts_with("Conn_") {
        "2.54mm pitch male header"
    } else {
        value
    }
}

/// Client for the Mouser parts-search API. Owns the rate limiter, so all
/// calls through one client are spaced at least a second apart.
pub struct MouserClient {
    http: Client,
    api_key: String,
    base_url: String,
    limiter: RateLimiter,
}

impl MouserClient {
    /// Build a client from the `MOUSER_API_KEY` environment variable.
    /// A missing key is a configuration error, reported before any BOM
    /// file is read or written.
    pub fn from_env() -> Result<Self> {
        let api_key = validate_api_key(std::env::var("MOUSER_API_KEY").ok())?;
        Self::new(api_key)
    }

    pub fn new(api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("kibom")
            .build()?;
        Ok(Self {
            http,
            api_key,
            base_url: get_api_base_url(),
            limiter: RateLimiter::default(),
        })
    }

    /// Exact manufacturer-part-number search. Network failures, API error
    /// payloads, and malformed bodies are recoverable: they are logged and
    /// yield an empty candidate list.
    pub fn search_by_part_number(&mut self, mpn: &str) -> Vec<PartCandidate> {
        if mpn.trim().is_empty() {
            return Vec::new();
        }
        match self.get(
            "search/partnumber",
            &[("partNumber", mpn), ("searchOptions", "exact")],
        ) {
            Ok(candidates) => candidates,
            Err(err) => {
                log::warn!("part number search failed for '{mpn}': {err:#}");
                Vec::new()
            }
        }
    }

    /// Free-text keyword search on the component value. Same failure
    /// handling as [`Self::search_by_part_number`].
    pub fn search_by_keyword(&mut self, keyword: &str) -> Vec<PartCandidate> {
        let keyword = normalize_keyword(keyword);
        if keyword.trim().is_empty() {
            return Vec::new();
        }
        match self.get(
            "search/keyword",
            &[("keyword", keyword), ("records", KEYWORD_RECORDS)],
        ) {
            Ok(candidates) => candidates,
            Err(err) => {
                log::warn!("keyword search failed for '{keyword}': {err:#}");
                Vec::new()
            }
        }
    }

    fn get(&mut self, endpoint: &str, query: &[(&str, &str)]) -> Result<Vec<PartCandidate>> {
        self.limiter.wait();

        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(query)
            .send()?;

        if !response.status().is_success() {
            anyhow::bail!("search failed: {}", response.status());
        }

        parse_search_response(&response.text()?)
    }
}

/// An unset or blank `MOUSER_API_KEY` is a configuration error.
fn validate_api_key(key: Option<String>) -> Result<String> {
    key.filter(|key| !key.trim().is_empty())
        .context("MOUSER_API_KEY environment variable not set")
}

fn parse_search_response(body: &str) -> Result<Vec<PartCandidate>> {
    let response: SearchResponse = serde_json::from_str(body)?;

    if !response.errors.is_empty() {
        anyhow::bail!(
            "Mouser API error: {}",
            serde_json::to_string(&response.errors)?
        );
    }

    Ok(response
        .search_results
        .map(|results| results.parts.into_iter().map(PartCandidate::from).collect())
        .unwrap_or_default())
}
