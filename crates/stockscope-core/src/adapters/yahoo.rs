use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::clock::Clock;
use crate::data_source::{HistorySource, MetadataSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, DEFAULT_TIMEOUT_MS};
use crate::{
    CompanyProfile, FinancialStatement, Period, ProfileValue, Quote, RecommendationRecord,
    StatementRow, Symbol, UtcDateTime,
};

pub const YAHOO_QUERY_BASE: &str = "https://query1.finance.yahoo.com";
pub const YAHOO_DOWNLOAD_BASE: &str = "https://query2.finance.yahoo.com";
pub const YAHOO_COOKIE_URL: &str = "https://fc.yahoo.com";
const REFERER: &str = "https://finance.yahoo.com/";

/// quoteSummary modules merged into a [`CompanyProfile`], in precedence order.
const PROFILE_MODULES: [&str; 5] = [
    "assetProfile",
    "summaryDetail",
    "defaultKeyStatistics",
    "financialData",
    "price",
];

// ============================================================================
// Shared client: transport, status mapping, cookie/crumb session
// ============================================================================

/// Yahoo Finance session shared by the chart, download and metadata sources.
///
/// quoteSummary requires a crumb token that is bound to the session cookie:
/// 1. Session cookie from fc.yahoo.com (kept by the transport's cookie jar)
/// 2. Crumb token from /v1/test/getcrumb
pub struct YahooClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    download_base_url: String,
    cookie_url: String,
    timeout_ms: u64,
    crumb: Mutex<Option<String>>,
}

impl YahooClient {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(YAHOO_QUERY_BASE),
            download_base_url: String::from(YAHOO_DOWNLOAD_BASE),
            cookie_url: String::from(YAHOO_COOKIE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            crumb: Mutex::new(None),
        }
    }

    /// Points every interface at `base_url`, including bounded downloads.
    pub fn with_endpoints(
        mut self,
        base_url: impl Into<String>,
        cookie_url: impl Into<String>,
    ) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self.download_base_url = self.base_url.clone();
        self.cookie_url = cookie_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn download_base_url(&self) -> &str {
        &self.download_base_url
    }

    fn request(&self, url: &str) -> HttpRequest {
        HttpRequest::get(url)
            .with_header("referer", REFERER)
            .with_timeout_ms(self.timeout_ms)
    }

    async fn execute(&self, url: &str) -> Result<HttpResponse, SourceError> {
        tracing::debug!(url, "yahoo request");
        self.http_client
            .execute(self.request(url))
            .await
            .map_err(|e| {
                SourceError::unavailable(format!("yahoo transport error: {}", e.message()))
            })
    }

    /// Body of a 2xx response. Other statuses are mapped onto error kinds.
    async fn get_body(&self, url: &str) -> Result<String, SourceError> {
        let response = self.execute(url).await?;
        match response.status {
            200..=299 => Ok(response.body),
            401 | 403 => {
                // Force a new handshake on the next call.
                self.invalidate_crumb();
                Err(SourceError::unavailable(format!(
                    "yahoo rejected the session (status {})",
                    response.status
                )))
            }
            404 => Err(not_found_from_body(&response.body)),
            429 => Err(SourceError::rate_limited("yahoo returned status 429")),
            status => Err(SourceError::unavailable(format!(
                "yahoo returned status {status}"
            ))),
        }
    }

    /// Current crumb, performing the cookie/crumb handshake when none is cached.
    pub async fn crumb(&self) -> Result<String, SourceError> {
        if let Some(crumb) = self.cached_crumb() {
            return Ok(crumb);
        }

        // fc.yahoo.com answers with an error status but still sets the cookie.
        let _ = self.execute(&self.cookie_url).await?;

        let body = self
            .get_body(&format!("{}/v1/test/getcrumb", self.base_url))
            .await?;
        let crumb = body.trim();

        if crumb.to_ascii_lowercase().contains("too many requests") {
            return Err(SourceError::rate_limited(
                "yahoo rate limited while fetching crumb",
            ));
        }
        if crumb.is_empty() || crumb.len() >= 100 || crumb.contains(' ') || crumb.contains('<') {
            return Err(SourceError::unavailable("yahoo returned an unusable crumb"));
        }

        let crumb = crumb.to_owned();
        *self.crumb.lock().unwrap_or_else(|p| p.into_inner()) = Some(crumb.clone());
        Ok(crumb)
    }

    fn cached_crumb(&self) -> Option<String> {
        self.crumb
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn invalidate_crumb(&self) {
        *self.crumb.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }

    async fn quote_summary(
        &self,
        symbol: &Symbol,
        modules: &str,
    ) -> Result<Map<String, Value>, SourceError> {
        let crumb = self.crumb().await?;
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules={}&crumb={}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(modules),
            urlencoding::encode(&crumb)
        );
        let body = self.get_body(&url).await?;
        parse_quote_summary(&body)
    }
}

// ============================================================================
// History sources
// ============================================================================

/// Per-symbol chart interface (`/v8/finance/chart`). First link of the
/// default chain.
pub struct YahooChartSource {
    client: Arc<YahooClient>,
}

impl YahooChartSource {
    pub fn new(client: Arc<YahooClient>) -> Self {
        Self { client }
    }
}

impl HistorySource for YahooChartSource {
    fn name(&self) -> &'static str {
        "yahoo_chart"
    }

    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        period: Period,
    ) -> SourceFuture<'a, Vec<Quote>> {
        Box::pin(async move {
            let url = format!(
                "{}/v8/finance/chart/{}?range={}&interval=1d&includePrePost=false&events={}",
                self.client.base_url(),
                urlencoding::encode(symbol.as_str()),
                period.as_str(),
                urlencoding::encode("div,splits")
            );
            let body = self.client.get_body(&url).await?;
            parse_chart(&body)
        })
    }
}

/// Bounded history download: the chart interface queried with explicit
/// `period1`/`period2` bounds on the secondary query host, the path bulk
/// downloads take. Used when the ranged chart request has nothing.
pub struct YahooDownloadSource {
    client: Arc<YahooClient>,
    clock: Arc<dyn Clock>,
}

impl YahooDownloadSource {
    pub fn new(client: Arc<YahooClient>, clock: Arc<dyn Clock>) -> Self {
        Self { client, clock }
    }
}

impl HistorySource for YahooDownloadSource {
    fn name(&self) -> &'static str {
        "yahoo_download"
    }

    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        period: Period,
    ) -> SourceFuture<'a, Vec<Quote>> {
        Box::pin(async move {
            let period2 = self.clock.now().unix_timestamp();
            let period1 = period2 - period.lookback().whole_seconds();
            let url = format!(
                "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
                self.client.download_base_url(),
                urlencoding::encode(symbol.as_str()),
                period1,
                period2
            );
            let body = self.client.get_body(&url).await?;
            parse_chart(&body)
        })
    }
}

// ============================================================================
// Metadata source
// ============================================================================

/// Profile, income statement and recommendation trend from quoteSummary.
pub struct YahooMetadataSource {
    client: Arc<YahooClient>,
}

impl YahooMetadataSource {
    pub fn new(client: Arc<YahooClient>) -> Self {
        Self { client }
    }
}

impl MetadataSource for YahooMetadataSource {
    fn profile<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, CompanyProfile> {
        Box::pin(async move {
            let modules = self
                .client
                .quote_summary(symbol, &PROFILE_MODULES.join(","))
                .await?;
            Ok(profile_from_modules(&modules))
        })
    }

    fn financials<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, FinancialStatement> {
        Box::pin(async move {
            let modules = self
                .client
                .quote_summary(symbol, "incomeStatementHistory")
                .await?;
            Ok(financials_from_modules(&modules))
        })
    }

    fn recommendations<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> SourceFuture<'a, Vec<RecommendationRecord>> {
        Box::pin(async move {
            let modules = self
                .client
                .quote_summary(symbol, "recommendationTrend")
                .await?;
            recommendations_from_modules(&modules)
        })
    }
}

// ============================================================================
// Payload parsing
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct YahooApiError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

impl YahooApiError {
    fn into_source_error(self) -> SourceError {
        let message = match self.description {
            Some(description) if !description.is_empty() => {
                format!("{}: {description}", self.code)
            }
            _ => self.code.clone(),
        };
        if self.code.eq_ignore_ascii_case("Not Found") {
            SourceError::not_found(message)
        } else {
            SourceError::unavailable(format!("yahoo API error: {message}"))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: YahooQuoteSummaryData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct YahooTrendRow {
    period: String,
    strong_buy: u32,
    buy: u32,
    hold: u32,
    sell: u32,
    strong_sell: u32,
}

/// Quotes from a chart payload. Rows with a missing OHLC value or
/// inconsistent bounds are skipped.
fn parse_chart(body: &str) -> Result<Vec<Quote>, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        return Err(error.into_source_error());
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let Some(timestamps) = result.timestamp else {
        return Ok(Vec::new());
    };
    let Some(series) = result.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut quotes = Vec::with_capacity(timestamps.len());
    for (i, &seconds) in timestamps.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) = (
            value_at(&series.open, i),
            value_at(&series.high, i),
            value_at(&series.low, i),
            value_at(&series.close, i),
        ) else {
            continue;
        };

        let ts = UtcDateTime::from_unix_timestamp(seconds)
            .map_err(|e| SourceError::malformed(format!("invalid chart timestamp: {e}")))?;
        let volume = series
            .volume
            .get(i)
            .copied()
            .flatten()
            .and_then(|v| u64::try_from(v).ok());

        match Quote::new(ts, open, high, low, close, volume) {
            Ok(quote) => quotes.push(quote),
            Err(error) => tracing::debug!(%error, %ts, "skipping invalid chart row"),
        }
    }

    Ok(quotes)
}

fn value_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

fn parse_quote_summary(body: &str) -> Result<Map<String, Value>, SourceError> {
    let response: YahooQuoteSummaryResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse yahoo quoteSummary: {e}")))?;

    if let Some(error) = response.quote_summary.error {
        return Err(error.into_source_error());
    }

    Ok(response
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .unwrap_or_default())
}

/// A 404 body usually carries the API error object; fall back to a generic
/// message when it does not.
fn not_found_from_body(body: &str) -> SourceError {
    let api_error = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["chart", "quoteSummary", "finance"]
            .iter()
            .find_map(|root| {
                value
                    .get(root)?
                    .get("error")
                    .filter(|error| !error.is_null())
                    .cloned()
            })
            .and_then(|error| serde_json::from_value::<YahooApiError>(error).ok())
    });

    match api_error {
        Some(error) if error.code.eq_ignore_ascii_case("Not Found") => error.into_source_error(),
        _ => SourceError::not_found("yahoo returned status 404"),
    }
}

/// Flattens the profile modules into one sparse mapping. A key seen in an
/// earlier module wins over the same key in a later one.
fn profile_from_modules(modules: &Map<String, Value>) -> CompanyProfile {
    let mut profile = CompanyProfile::new();
    for module in PROFILE_MODULES {
        let Some(Value::Object(fields)) = modules.get(module) else {
            continue;
        };
        for (key, value) in fields {
            if key == "maxAge" || profile.get(key).is_some() {
                continue;
            }
            if let Some(value) = scalar_value(value) {
                profile.insert(key.as_str(), value);
            }
        }
    }
    profile
}

/// Scalar from a plain JSON value or from Yahoo's `{"raw": .., "fmt": ..}`
/// wrapper. Empty wrappers, arrays and nested objects have no scalar.
fn scalar_value(value: &Value) -> Option<ProfileValue> {
    match value {
        Value::Bool(flag) => Some(ProfileValue::Bool(*flag)),
        Value::Number(number) => number
            .as_i64()
            .map(ProfileValue::Integer)
            .or_else(|| number.as_f64().map(ProfileValue::Float)),
        Value::String(text) if !text.is_empty() => Some(ProfileValue::Text(text.clone())),
        Value::Object(fields) => fields.get("raw").and_then(scalar_value),
        _ => None,
    }
}

fn raw_number(value: &Value) -> Option<f64> {
    scalar_value(value).and_then(|value| value.as_f64())
}

fn financials_from_modules(modules: &Map<String, Value>) -> FinancialStatement {
    let statements = modules
        .get("incomeStatementHistory")
        .and_then(|module| module.get("incomeStatementHistory"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut columns = Vec::with_capacity(statements.len());
    let mut labels: Vec<String> = Vec::new();
    for statement in statements {
        let end_date = statement
            .get("endDate")
            .and_then(|date| date.get("fmt"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        columns.push(end_date.to_owned());

        if let Some(fields) = statement.as_object() {
            for key in fields.keys() {
                if key != "maxAge" && key != "endDate" && !labels.contains(key) {
                    labels.push(key.clone());
                }
            }
        }
    }

    let rows = labels
        .into_iter()
        .map(|label| {
            let values = statements
                .iter()
                .map(|statement| statement.get(&label).and_then(raw_number))
                .collect();
            StatementRow { label, values }
        })
        .collect();

    FinancialStatement { columns, rows }
}

fn recommendations_from_modules(
    modules: &Map<String, Value>,
) -> Result<Vec<RecommendationRecord>, SourceError> {
    let Some(trend) = modules
        .get("recommendationTrend")
        .and_then(|module| module.get("trend"))
    else {
        return Ok(Vec::new());
    };

    let rows: Vec<YahooTrendRow> = serde_json::from_value(trend.clone()).map_err(|e| {
        SourceError::malformed(format!("failed to parse yahoo recommendation trend: {e}"))
    })?;

    Ok(rows
        .into_iter()
        .map(|row| RecommendationRecord {
            period: row.period,
            strong_buy: row.strong_buy,
            buy: row.buy,
            hold: row.hold,
            sell: row.sell,
            strong_sell: row.strong_sell,
        })
        .collect())
}
