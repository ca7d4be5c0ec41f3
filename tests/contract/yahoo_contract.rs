use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use stockscope_core::{
    yahoo_sources, DataFetcher, FetchError, FetcherConfig, HistorySource, HttpClient, HttpError,
    HttpRequest, HttpResponse, ManualClock, Period, SourceErrorKind, Symbol, UtcDateTime,
    YahooChartSource, YahooClient,
};

const CHART_OK: &str = r#"{"chart":{"result":[{"meta":{"currency":"USD","symbol":"AAPL"},
    "timestamp":[1717075800,1717162200],
    "indicators":{"quote":[{"open":[190.76,191.44],"high":[192.18,192.57],"low":[190.63,189.91],
    "close":[191.29,192.25],"volume":[49889100,75158300]}]}}],"error":null}}"#;

const CHART_NOT_FOUND: &str = r#"{"chart":{"result":null,
    "error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

/// Bounded requests carry explicit bounds instead of a range.
const BOUNDED: &str = "period1=";

const PROFILE_OK: &str = r#"{"quoteSummary":{"result":[{
    "assetProfile":{"sector":"Technology","industry":"Consumer Electronics"},
    "summaryDetail":{"trailingPE":{"raw":29.8,"fmt":"29.80"},"dividendYield":{"raw":0.0052,"fmt":"0.52%"},"marketCap":{"raw":2947836051456,"fmt":"2.95T"}},
    "defaultKeyStatistics":{"trailingEps":{"raw":6.44,"fmt":"6.44"}},
    "financialData":{"returnOnEquity":{"raw":1.4725,"fmt":"147.25%"}},
    "price":{"longName":"Apple Inc.","currency":"USD"}
}],"error":null}}"#;

const FINANCIALS_OK: &str = r#"{"quoteSummary":{"result":[{"incomeStatementHistory":{"incomeStatementHistory":[
    {"endDate":{"raw":1696032000,"fmt":"2023-09-30"},"totalRevenue":{"raw":383285000000},"netIncome":{"raw":96995000000}}
]}}],"error":null}}"#;

const TREND_OK: &str = r#"{"quoteSummary":{"result":[{"recommendationTrend":{"trend":[
    {"period":"0m","strongBuy":11,"buy":21,"hold":6,"sell":0,"strongSell":0}
]}}],"error":null}}"#;

/// Transport answering from a route table; the first route whose pattern is
/// contained in the URL wins.
struct CannedHttpClient {
    routes: Vec<(&'static str, HttpResponse)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl CannedHttpClient {
    fn new(routes: Vec<(&'static str, HttpResponse)>) -> Arc<Self> {
        Arc::new(Self {
            routes,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("lock")
            .iter()
            .map(|request| request.url.clone())
            .collect()
    }

    fn count(&self, pattern: &str) -> usize {
        self.urls().iter().filter(|url| url.contains(pattern)).count()
    }
}

impl HttpClient for CannedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self
            .routes
            .iter()
            .find(|(pattern, _)| request.url.contains(pattern))
            .map(|(_, response)| response.clone())
            .ok_or_else(|| HttpError::new(format!("connection failed: {}", request.url)));
        self.requests.lock().expect("lock").push(request);
        Box::pin(async move { response })
    }
}

fn session_routes() -> Vec<(&'static str, HttpResponse)> {
    vec![
        ("fc.yahoo.com", HttpResponse::new(404, "")),
        ("/v1/test/getcrumb", HttpResponse::ok("AbCdEf12345")),
        ("modules=assetProfile", HttpResponse::ok(PROFILE_OK)),
        (
            "modules=incomeStatementHistory",
            HttpResponse::ok(FINANCIALS_OK),
        ),
        ("modules=recommendationTrend", HttpResponse::ok(TREND_OK)),
    ]
}

fn routes(extra: Vec<(&'static str, HttpResponse)>) -> Vec<(&'static str, HttpResponse)> {
    let mut routes = extra;
    routes.extend(session_routes());
    routes
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        UtcDateTime::parse("2024-06-01T00:00:00Z").expect("timestamp"),
    ))
}

fn fetcher(http: Arc<CannedHttpClient>) -> DataFetcher {
    DataFetcher::yahoo_with_http_client(http, clock(), FetcherConfig::default())
}

fn aapl() -> Symbol {
    Symbol::parse("AAPL").expect("valid symbol")
}

#[test]
fn chart_history_and_metadata_parse_into_stock_data() {
    let http = CannedHttpClient::new(routes(vec![(
        "/v8/finance/chart/",
        HttpResponse::ok(CHART_OK),
    )]));
    let mut fetcher = fetcher(Arc::clone(&http));

    let data = block_on(fetcher.fetch(&aapl(), Period::OneYear)).expect("fetch should succeed");

    assert_eq!(data.source, "yahoo_chart");
    assert_eq!(data.history.closes(), vec![191.29, 192.25]);
    assert_eq!(data.history.latest().volume, Some(75_158_300));
    assert_eq!(data.profile.get_text("sector"), Some("Technology"));
    assert_eq!(data.profile.get_number("returnOnEquity"), Some(1.4725));
    assert_eq!(data.financials.columns, vec!["2023-09-30"]);
    assert_eq!(data.recommendations[0].strong_buy, 11);

    let urls = http.urls();
    assert!(urls
        .iter()
        .any(|url| url.contains("/v8/finance/chart/AAPL?range=1y&interval=1d")));
    assert!(urls
        .iter()
        .filter(|url| url.contains("quoteSummary"))
        .all(|url| url.contains("crumb=AbCdEf12345")));
    assert_eq!(http.count("/v1/test/getcrumb"), 1, "crumb is reused across modules");
    assert_eq!(http.count(BOUNDED), 0);
}

#[test]
fn ranged_chart_not_found_falls_back_to_bounded_download() {
    let http = CannedHttpClient::new(routes(vec![
        (BOUNDED, HttpResponse::ok(CHART_OK)),
        ("/v8/finance/chart/", HttpResponse::new(404, CHART_NOT_FOUND)),
    ]));
    let mut fetcher = fetcher(Arc::clone(&http));

    let data = block_on(fetcher.fetch(&aapl(), Period::OneMonth)).expect("fetch should succeed");

    assert_eq!(data.source, "yahoo_download");
    assert_eq!(data.history.len(), 2);
    assert_eq!(data.history.latest().ts.format_rfc3339(), "2024-05-31T13:30:00Z");

    // 2024-06-01T00:00:00Z minus 31 days
    let download = http
        .urls()
        .into_iter()
        .find(|url| url.contains(BOUNDED))
        .expect("bounded request");
    assert!(download.starts_with(
        "https://query2.finance.yahoo.com/v8/finance/chart/AAPL?period1=1714521600&period2=1717200000"
    ));
    assert!(!download.contains("crumb="));
}

#[test]
fn unknown_symbol_exhausts_chain() {
    let http = CannedHttpClient::new(routes(vec![
        (BOUNDED, HttpResponse::new(404, CHART_NOT_FOUND)),
        ("/v8/finance/chart/", HttpResponse::ok(CHART_NOT_FOUND)),
    ]));
    let mut fetcher = fetcher(Arc::clone(&http));
    let symbol = Symbol::parse("ZZZZZ").expect("valid symbol");

    let error = block_on(fetcher.fetch(&symbol, Period::OneYear)).expect_err("fetch should fail");

    assert_eq!(
        error,
        FetchError::NoData {
            symbol: String::from("ZZZZZ")
        }
    );
    assert_eq!(http.count("quoteSummary"), 0, "metadata is only fetched after history");
}

#[test]
fn unknown_symbol_with_rejected_download_is_no_data() {
    let http = CannedHttpClient::new(routes(vec![
        (BOUNDED, HttpResponse::new(401, "Unauthorized")),
        ("/v8/finance/chart/", HttpResponse::new(404, CHART_NOT_FOUND)),
    ]));
    let mut fetcher = fetcher(Arc::clone(&http));
    let symbol = Symbol::parse("ZZZZZ").expect("valid symbol");

    let error = block_on(fetcher.fetch(&symbol, Period::OneYear)).expect_err("fetch should fail");

    assert_eq!(
        error,
        FetchError::NoData {
            symbol: String::from("ZZZZZ")
        }
    );
}

#[test]
fn rate_limited_chart_falls_back_to_bounded_download() {
    let http = CannedHttpClient::new(routes(vec![
        (BOUNDED, HttpResponse::ok(CHART_OK)),
        ("/v8/finance/chart/", HttpResponse::new(429, "Too Many Requests")),
    ]));
    let mut fetcher = fetcher(Arc::clone(&http));

    let data = block_on(fetcher.fetch(&aapl(), Period::OneYear)).expect("fetch should succeed");

    assert_eq!(data.source, "yahoo_download");
    assert_eq!(http.count(BOUNDED), 1);
    assert_eq!(fetcher.cached_entries(), 1);
}

#[test]
fn rate_limited_everywhere_is_api_error_and_not_cached() {
    let http = CannedHttpClient::new(routes(vec![(
        "/v8/finance/chart/",
        HttpResponse::new(429, "Too Many Requests"),
    )]));
    let mut fetcher = fetcher(Arc::clone(&http));

    let error = block_on(fetcher.fetch(&aapl(), Period::OneYear)).expect_err("fetch should fail");

    assert_eq!(error.to_string(), "API Error: yahoo returned status 429");
    assert_eq!(http.count(BOUNDED), 1, "the fallback is still tried");
    assert_eq!(fetcher.cached_entries(), 0);
}

#[test]
fn crumb_failure_degrades_metadata_only() {
    let http = CannedHttpClient::new(vec![
        ("/v8/finance/chart/", HttpResponse::ok(CHART_OK)),
        ("fc.yahoo.com", HttpResponse::new(404, "")),
        ("/v1/test/getcrumb", HttpResponse::new(429, "Too Many Requests")),
    ]);
    let mut fetcher = fetcher(Arc::clone(&http));

    let data = block_on(fetcher.fetch(&aapl(), Period::OneYear)).expect("fetch should succeed");

    assert_eq!(data.history.len(), 2);
    assert!(data.profile.is_empty());
    assert!(data.financials.is_empty());
    assert!(data.recommendations.is_empty());
}

#[test]
fn transport_failure_is_unavailable() {
    let http = CannedHttpClient::new(Vec::new());
    let client = Arc::new(
        YahooClient::new(http).with_endpoints("https://query.test", "https://cookie.test"),
    );
    let source = YahooChartSource::new(client);

    let error = block_on(source.history(&aapl(), Period::FiveDays)).expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    assert!(error.message().contains("https://query.test/v8/finance/chart/AAPL"));
}

#[test]
fn yahoo_chain_order_is_chart_then_download() {
    let http = CannedHttpClient::new(Vec::new());
    let (chain, _metadata) = yahoo_sources(Arc::new(YahooClient::new(http)), clock());

    let names: Vec<&str> = chain.iter().map(|source| source.name()).collect();
    assert_eq!(names, vec!["yahoo_chart", "yahoo_download"]);
}

fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    let waker = noop_waker();
    let mut context = Context::from_waker(&waker);
    let mut future = std::pin::pin!(future);

    loop {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(output) => return output,
            Poll::Pending => std::thread::yield_now(),
        }
    }
}

fn noop_waker() -> Waker {
    // SAFETY: The vtable functions never dereference the data pointer and are no-op operations.
    unsafe { Waker::from_raw(noop_raw_waker()) }
}

fn noop_raw_waker() -> RawWaker {
    RawWaker::new(std::ptr::null(), &NOOP_RAW_WAKER_VTABLE)
}

unsafe fn noop_raw_waker_clone(_: *const ()) -> RawWaker {
    noop_raw_waker()
}

unsafe fn noop_raw_waker_wake(_: *const ()) {}

unsafe fn noop_raw_waker_wake_by_ref(_: *const ()) {}

unsafe fn noop_raw_waker_drop(_: *const ()) {}

static NOOP_RAW_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(
    noop_raw_waker_clone,
    noop_raw_waker_wake,
    noop_raw_waker_wake_by_ref,
    noop_raw_waker_drop,
);
