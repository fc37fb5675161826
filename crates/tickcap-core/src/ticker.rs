use std::env;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::CaptureError;
use crate::http_client::{HttpClient, HttpErrorKind, HttpRequest, ReqwestHttpClient};
use crate::Symbol;

/// Fields every ticker payload must carry. Values are passed through
/// unparsed; coercion to `f64` happens in the orchestrator, immediately
/// before persistence.
pub const REQUIRED_FIELDS: [&str; 3] = ["last", "bid", "ask"];

const DEFAULT_BASE_URL: &str = "https://data.exchange.coinjar.com/products";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Validated-but-unparsed ticker payload. Extra fields beyond the three
/// required ones are permitted and preserved.
pub type TickerPayload = Map<String, Value>;

/// Upstream endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerConfig {
    /// Products endpoint root; `/{symbol}/ticker` is appended per fetch.
    pub base_url: String,
    /// Connect and read deadline for each request.
    pub timeout: Duration,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TickerConfig {
    /// Default configuration with a `TICKCAP_TICKER_URL` override.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("TICKCAP_TICKER_URL") {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }
        config
    }
}

/// Stateless client for the upstream ticker API.
///
/// One `fetch_ticker` call issues exactly one outbound GET. No retries are
/// performed here; callers own retry policy (none is applied in this
/// system).
#[derive(Clone)]
pub struct TickerClient {
    config: TickerConfig,
    http: Arc<dyn HttpClient>,
}

impl TickerClient {
    pub fn new(config: TickerConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    /// Client with the production reqwest transport.
    pub fn with_default_transport(config: TickerConfig) -> Self {
        let transport = Arc::new(ReqwestHttpClient::new(config.timeout));
        Self::new(config, transport)
    }

    /// Fetch and validate the current ticker for one symbol.
    pub async fn fetch_ticker(&self, symbol: &Symbol) -> Result<TickerPayload, CaptureError> {
        let url = format!(
            "{}/{}/ticker",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(symbol.as_str())
        );
        let request = HttpRequest::get(url).with_timeout(self.config.timeout);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|error| match error.kind() {
                HttpErrorKind::Timeout => {
                    CaptureError::api(format!("request timeout for {symbol}"))
                }
                HttpErrorKind::Network => CaptureError::api(format!(
                    "network error for {symbol}: {}",
                    error.message()
                )),
            })?;

        if response.is_success() {
            return parse_payload(symbol, &response.body);
        }

        match response.status {
            404 => Err(CaptureError::api(format!("symbol {symbol} not found"))),
            429 => Err(CaptureError::api(format!(
                "rate limit exceeded for {symbol}"
            ))),
            status => Err(CaptureError::api(format!(
                "HTTP {status}: {}",
                reason_phrase(status)
            ))),
        }
    }
}

/// Validate a 2xx body: well-formed JSON object, all required fields
/// present, every required value either a native number or an
/// unsigned-decimal string.
fn parse_payload(symbol: &Symbol, body: &str) -> Result<TickerPayload, CaptureError> {
    let value: Value = serde_json::from_str(body).map_err(|error| {
        CaptureError::invalid_response(format!("invalid JSON response for {symbol}: {error}"))
    })?;

    let Value::Object(data) = value else {
        return Err(CaptureError::invalid_response(format!(
            "invalid JSON response for {symbol}: expected an object"
        )));
    };

    let missing = REQUIRED_FIELDS
        .iter()
        .filter(|field| !data.contains_key(**field))
        .copied()
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(CaptureError::invalid_response(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    for field in REQUIRED_FIELDS {
        let value = &data[field];
        let valid = match value {
            Value::Number(_) => true,
            Value::String(raw) => is_unsigned_decimal(raw),
            _ => false,
        };
        if !valid {
            return Err(CaptureError::invalid_response(format!(
                "invalid {field} value: {}",
                render_raw(value)
            )));
        }
    }

    Ok(data)
}

/// Unsigned decimal grammar: one or more digits, optionally a dot and one
/// or more digits. No sign, no exponent, no separators.
fn is_unsigned_decimal(value: &str) -> bool {
    let (integer, fraction) = match value.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (value, None),
    };

    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    all_digits(integer) && fraction.map_or(true, all_digits)
}

fn render_raw(value: &Value) -> String {
    match value {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown Status")
}
