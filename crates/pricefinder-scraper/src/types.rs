//! Response types for the catalog's commerce API.
//!
//! ## Observed shapes
//!
//! ### Product search (`/jp/api/commerce/v5/ja/products?q=...`)
//! `status` is `"ok"` on success. `result.relaxedQueries` lists the query
//! rewrites the catalog applied; it is empty when the query matched nothing
//! loosely. `result.items[].productId` has the form `"E474479-000"`, so the
//! six-character serial sits at byte offsets `1..7`.
//!
//! ### Variant list (`.../products/E{serial}-000/price-groups/00/l2s`)
//! `result.l2s` lists one entry per color × size. Stock and price live in
//! separate maps keyed by `l2Id`; either map may omit a variant. Prices are
//! JSON numbers and occasionally carry a fractional part.

use std::collections::HashMap;

use serde::Deserialize;

/// Top-level response from the product search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Query rewrites; contents are opaque, only emptiness matters.
    #[serde(default)]
    pub relaxed_queries: Vec<serde_json::Value>,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    /// e.g. `"E474479-000"`.
    pub product_id: String,
}

/// Top-level response from the variant (`l2s`) endpoint.
#[derive(Debug, Deserialize)]
pub struct VariantsResponse {
    pub result: VariantsResult,
}

#[derive(Debug, Deserialize)]
pub struct VariantsResult {
    #[serde(default)]
    pub l2s: Vec<L2Item>,
    #[serde(default)]
    pub stocks: HashMap<String, StockEntry>,
    #[serde(default)]
    pub prices: HashMap<String, PriceEntry>,
}

/// One color × size combination.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2Item {
    pub l2_id: String,
    /// e.g. `"474479-09-004"`; the first six characters are the alternate serial.
    pub communication_code: String,
    pub color: CodeRef,
    pub size: CodeRef,
}

#[derive(Debug, Deserialize)]
pub struct CodeRef {
    /// e.g. `"COL09"` or `"SMA004"`.
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockEntry {
    #[serde(default)]
    pub status_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PriceEntry {
    #[serde(default)]
    pub base: Option<PriceValue>,
}

#[derive(Debug, Deserialize)]
pub struct PriceValue {
    #[serde(default)]
    pub value: Option<f64>,
}
