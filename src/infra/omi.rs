//! Asynchronous client for the OMI quotation service.
//!
//! - Normalizes the varying upstream JSON into typed quotations.
//! - Keeps a fingerprint-keyed TTL cache and a minimum-gap throttle.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::domain::categories::normalize_category;
use crate::domain::collect::collect_quotations;
use crate::domain::entities::{
    Operation, PriceEstimate, QueryResult, QuotationRequest,
};
use crate::domain::gazetteer::{title_case, CadastralGazetteer, Gazetteer};
use crate::infra::cache::{ResponseCache, DEFAULT_TTL};
use crate::infra::envelope::unwrap_envelope;
use crate::infra::rate_limit::{RateLimiter, DEFAULT_MIN_GAP};

const DEFAULT_BASE_URL: &str = "https://3eurotools.it/api-quotazioni-immobiliari-omi/ricerca";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "omi-client/0.1.0";

/// Sentinel for an absent filter inside a fingerprint.
const ALL_SENTINEL: &str = "all";

/// Raw error bodies are clipped to this length before ending up in a message.
const BODY_SNIPPET_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum OmiError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    BuildClient(String),
    /// Client-side fault caught before any network call; not retryable.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Network failure, non-2xx status, malformed JSON, or an envelope that
    /// reports failure. Retryable at the caller's discretion.
    #[error("upstream service error: {0}")]
    Upstream(String),
    /// Structurally fine response with zero matching price-bearing records.
    #[error("no quotations: {0}")]
    NoQuotations(String),
}

impl OmiError {
    /// Only upstream failures are worth a retry; the other classes are
    /// deterministic.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OmiError::Upstream(_))
    }
}

/// Client for the OMI quotation endpoint.
///
/// Intended to be constructed once and shared: it owns its cache and rate
/// limiter, and every clone shares both.
#[derive(Clone)]
pub struct OmiClient {
    http: Client,
    base_url: Url,
    gazetteer: Arc<dyn Gazetteer>,
    cache: Arc<Mutex<ResponseCache<QueryResult>>>,
    limiter: Arc<Mutex<RateLimiter>>,
}

impl OmiClient {
    pub fn new() -> Result<Self, OmiError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self, OmiError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| OmiError::BuildClient(err.to_string()))?;
        Ok(Self {
            http,
            base_url,
            gazetteer: Arc::new(CadastralGazetteer),
            cache: Arc::new(Mutex::new(ResponseCache::new(DEFAULT_TTL))),
            limiter: Arc::new(Mutex::new(RateLimiter::new(DEFAULT_MIN_GAP))),
        })
    }

    pub fn with_ttl(self, ttl: Duration) -> Self {
        Self {
            cache: Arc::new(Mutex::new(ResponseCache::new(ttl))),
            ..self
        }
    }

    pub fn with_min_gap(self, min_gap: Duration) -> Self {
        Self {
            limiter: Arc::new(Mutex::new(RateLimiter::new(min_gap))),
            ..self
        }
    }

    pub fn with_gazetteer(mut self, gazetteer: impl Gazetteer + 'static) -> Self {
        self.gazetteer = Arc::new(gazetteer);
        self
    }

    /// Queries the quotation service, going to the network only on a cache
    /// miss and writing back only on success.
    pub async fn query(&self, request: &QuotationRequest) -> Result<QueryResult, OmiError> {
        let territory_code = self
            .gazetteer
            .territory_code(&request.territory)
            .ok_or_else(|| {
                OmiError::InvalidInput(format!("unknown territory: {}", request.territory))
            })?;
        if !request.reference_area.is_finite() || request.reference_area < 0.0 {
            return Err(OmiError::InvalidInput(format!(
                "invalid reference area: {}",
                request.reference_area
            )));
        }

        let zone_filter = request
            .zone
            .as_deref()
            .map(|zone| zone.trim().to_uppercase())
            .filter(|zone| !zone.is_empty());
        let category_filter = request
            .category
            .as_deref()
            .map(|category| normalize_category(category, ""))
            .filter(|category| !category.is_empty());

        let key = fingerprint(
            &territory_code,
            request.reference_area,
            request.operation,
            zone_filter.as_deref(),
            category_filter.as_deref(),
        );

        if let Some(cached) = self.cache.lock().await.get(&key) {
            debug!("[omi] cache hit for {key} (age: {})", cached.age_string());
            return Ok(cached);
        }

        self.limiter.lock().await.wait_turn().await;

        let url = self.request_url(&territory_code, request, zone_filter.as_deref(), category_filter.as_deref());
        debug!("[omi] requesting {url}");
        let raw = self.fetch_json(url).await?;

        let result = assemble_result(
            &raw,
            &territory_code,
            &request.territory,
            request.reference_area,
            zone_filter,
            category_filter.as_deref(),
        )?;
        debug!(
            "[omi] {} quotations across {} zones for {key}",
            result.quotations.len(),
            result.zones_found
        );

        self.cache.lock().await.set(&key, result.clone());
        Ok(result)
    }

    /// Purchase figures for a territory, per square metre and scaled to
    /// `reference_area`. Delegates to `query`, so caching, throttling, and
    /// the error taxonomy all apply.
    pub async fn purchase_estimate(
        &self,
        territory: &str,
        reference_area: f64,
        category: Option<&str>,
        zone: Option<&str>,
    ) -> Result<PriceEstimate, OmiError> {
        self.estimate(Operation::Purchase, territory, reference_area, category, zone)
            .await
    }

    /// Monthly rental figures for a territory, per square metre and scaled
    /// to `reference_area`.
    pub async fn rental_estimate(
        &self,
        territory: &str,
        reference_area: f64,
        category: Option<&str>,
        zone: Option<&str>,
    ) -> Result<PriceEstimate, OmiError> {
        self.estimate(Operation::Rental, territory, reference_area, category, zone)
            .await
    }

    async fn estimate(
        &self,
        operation: Operation,
        territory: &str,
        reference_area: f64,
        category: Option<&str>,
        zone: Option<&str>,
    ) -> Result<PriceEstimate, OmiError> {
        // Query with one square metre so the upstream returns per-sqm figures.
        let mut request = QuotationRequest::new(territory, 1.0).with_operation(operation);
        if let Some(zone) = zone {
            request = request.with_zone(zone);
        }
        if let Some(category) = category {
            request = request.with_category(category);
        }

        let result = self.query(&request).await?;
        let wanted = category.map(|label| normalize_category(label, ""));
        let quotation = result
            .quotations
            .iter()
            .find(|quotation| wanted.as_deref() == Some(quotation.category.as_str()))
            .or_else(|| result.quotations.first())
            .ok_or_else(|| {
                OmiError::NoQuotations(format!("no quotations for {}", result.territory_name))
            })?;

        Ok(PriceEstimate::from_quotation(quotation, operation, reference_area))
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    fn request_url(
        &self,
        territory_code: &str,
        request: &QuotationRequest,
        zone: Option<&str>,
        category: Option<&str>,
    ) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("codice_comune", territory_code);
            pairs.append_pair("metri_quadri", &request.reference_area.to_string());
            if let Some(operation) = request.operation {
                pairs.append_pair("operazione", operation.as_param());
            }
            if let Some(zone) = zone {
                pairs.append_pair("zona_omi", zone);
            }
            if let Some(category) = category {
                pairs.append_pair("tipo_immobile", category);
            }
        }
        url
    }

    async fn fetch_json(&self, url: Url) -> Result<Value, OmiError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| OmiError::Upstream(format!("request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("[omi] upstream returned {status}");
            return Err(OmiError::Upstream(error_body_message(status, &body)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| OmiError::Upstream(format!("failed to decode response: {err}")))
    }
}

/// Deterministic cache key: logically identical queries must produce
/// byte-identical fingerprints.
fn fingerprint(
    territory_code: &str,
    reference_area: f64,
    operation: Option<Operation>,
    zone: Option<&str>,
    category: Option<&str>,
) -> String {
    let area = reference_area.to_string();
    [
        territory_code,
        area.as_str(),
        operation.map(Operation::as_param).unwrap_or(ALL_SENTINEL),
        zone.unwrap_or(ALL_SENTINEL),
        category.unwrap_or(ALL_SENTINEL),
    ]
    .join("|")
}

/// Unwrap, collect, validate: the full post-fetch path, factored out of the
/// client so it can be exercised on canned payloads.
fn assemble_result(
    raw: &Value,
    territory_code: &str,
    territory: &str,
    reference_area: f64,
    zone_filter: Option<String>,
    category_filter: Option<&str>,
) -> Result<QueryResult, OmiError> {
    let payload = unwrap_envelope(raw)?;
    let collected = collect_quotations(payload, zone_filter.as_deref(), category_filter);

    if collected.quotations.is_empty() {
        return Err(OmiError::NoQuotations(format!(
            "no data for the given filters in {}",
            title_case(territory)
        )));
    }

    Ok(QueryResult {
        territory_code: territory_code.to_string(),
        territory_name: title_case(territory),
        reference_area,
        zone_filter,
        zones_found: collected.zones.len(),
        quotations: collected.quotations,
        fetched_at: OffsetDateTime::now_utc(),
    })
}

/// Best extractable message from an error response body: structured fields
/// first, then a clipped raw snippet.
fn error_body_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(Value::String(text)) = map.get(key) {
                if !text.trim().is_empty() {
                    return format!("HTTP {status}: {}", text.trim());
                }
            }
        }
    }

    let snippet = body.chars().take(BODY_SNIPPET_LEN).collect::<String>();
    let snippet = snippet.trim();
    if snippet.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {snippet}")
    }
}
