use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            message: "SEO MCP is healthy".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Backlinks
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Backlink {
    pub anchor: String,
    #[serde(rename = "domainRating")]
    pub domain_rating: f64,
    pub title: String,
    #[serde(rename = "urlFrom")]
    pub url_from: String,
    #[serde(rename = "urlTo")]
    pub url_to: String,
    pub edu: bool,
    pub gov: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BacklinksReport {
    /// Passed through from the overview endpoint untouched.
    pub overview: Value,
    pub backlinks: Vec<Backlink>,
}

/// Signed grant from the backlinks overview endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SignedInput {
    pub signature: String,
    /// Echoed back upstream verbatim; only interpreted for cache expiry.
    pub valid_until: Value,
}

// ---------------------------------------------------------------------------
// Keywords
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdeaKind {
    Idea,
    Question,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct KeywordIdea {
    pub keyword: String,
    pub country: String,
    pub difficulty: String,
    pub volume: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    pub kind: IdeaKind,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SerpEntry {
    pub title: String,
    pub url: String,
    pub position: i64,
    #[serde(rename = "domainRating", skip_serializing_if = "Option::is_none", default)]
    pub domain_rating: Option<f64>,
    #[serde(rename = "urlRating", skip_serializing_if = "Option::is_none", default)]
    pub url_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub traffic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub keywords: Option<f64>,
    #[serde(rename = "topKeyword", skip_serializing_if = "Option::is_none", default)]
    pub top_keyword: Option<String>,
    #[serde(rename = "topVolume", skip_serializing_if = "Option::is_none", default)]
    pub top_volume: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct KeywordDifficulty {
    pub difficulty: f64,
    pub shortage: f64,
    #[serde(rename = "lastUpdate")]
    pub last_update: String,
    pub serp: Vec<SerpEntry>,
}

// ---------------------------------------------------------------------------
// Traffic
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrafficMode {
    #[default]
    Subdomains,
    Exact,
}

impl TrafficMode {
    pub fn parse_str(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "subdomains" => Some(TrafficMode::Subdomains),
            "exact" => Some(TrafficMode::Exact),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficMode::Subdomains => "subdomains",
            TrafficMode::Exact => "exact",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TrafficSummary {
    #[serde(rename = "trafficMonthlyAvg")]
    pub traffic_monthly_avg: f64,
    #[serde(rename = "costMonthlyAvg")]
    pub cost_monthly_avg: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TrafficReport {
    pub traffic_history: Vec<Value>,
    pub traffic: TrafficSummary,
    pub top_pages: Vec<Value>,
    pub top_countries: Vec<Value>,
    pub top_keywords: Vec<Value>,
}
