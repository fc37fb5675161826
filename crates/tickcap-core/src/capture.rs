use serde::Serialize;
use serde_json::Value;

use crate::error::{CaptureError, StoreError};
use crate::ticker::{TickerClient, TickerPayload};
use crate::{Instrument, Observation, Symbol, UtcDateTime};

/// Storage port consumed by the orchestrator. The DuckDB implementation
/// lives in `tickcap-store`; tests substitute in-memory stores.
///
/// `list_instruments` must return a stable enumeration order; the capture
/// report mirrors it. `insert_observation` is a single atomic write with
/// no transaction spanning instruments.
pub trait InstrumentStore: Send + Sync {
    fn list_instruments(&self) -> Result<Vec<Instrument>, StoreError>;
    fn insert_observation(&self, observation: &Observation) -> Result<(), StoreError>;
}

/// One failed instrument within a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureFailure {
    pub symbol: Symbol,
    pub error: String,
}

/// Aggregate outcome of one capture-all run. Success and failure entries
/// keep the configured instrument order. Not persisted; callers use it
/// for reporting and downstream cache invalidation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CaptureReport {
    pub successes: Vec<Symbol>,
    pub failures: Vec<CaptureFailure>,
}

impl CaptureReport {
    pub fn attempted(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_full_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives the ticker client across every tracked instrument and persists
/// one observation per success. A single bad symbol never aborts the
/// batch.
pub struct CaptureService<S> {
    ticker: TickerClient,
    store: S,
}

impl<S: InstrumentStore> CaptureService<S> {
    pub fn new(ticker: TickerClient, store: S) -> Self {
        Self { ticker, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Capture every tracked instrument, isolating per-instrument
    /// failures into the report. Only the initial instrument listing can
    /// fail; nothing inside the loop escapes.
    pub async fn capture_all(&self) -> Result<CaptureReport, StoreError> {
        let instruments = self.store.list_instruments()?;
        let mut report = CaptureReport::default();

        for instrument in &instruments {
            match self.capture_instrument(instrument).await {
                Ok(()) => report.successes.push(instrument.symbol.clone()),
                Err(error) => {
                    log::error!("failed to capture price for {}: {error}", instrument.symbol);
                    report.failures.push(CaptureFailure {
                        symbol: instrument.symbol.clone(),
                        error: error.message().to_owned(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Fetch one instrument's ticker and persist an observation stamped
    /// with the current time. Decimal fields are parsed from their raw
    /// string/number form here, immediately before persistence.
    pub async fn capture_instrument(&self, instrument: &Instrument) -> Result<(), CaptureError> {
        let symbol = &instrument.symbol;
        let payload = self.ticker.fetch_ticker(symbol).await?;

        let last = decimal_field(&payload, "last", symbol)?;
        let bid = decimal_field(&payload, "bid", symbol)?;
        let ask = decimal_field(&payload, "ask", symbol)?;

        let observation = Observation::new(symbol.clone(), last, bid, ask, UtcDateTime::now())
            .map_err(|error| {
                CaptureError::invalid_response(format!("invalid data for {symbol}: {error}"))
            })?;

        self.store
            .insert_observation(&observation)
            .map_err(|error| match error {
                StoreError::InvalidRecord(detail) => {
                    CaptureError::invalid_response(format!("invalid data for {symbol}: {detail}"))
                }
                StoreError::Backend(detail) => CaptureError::invalid_response(format!(
                    "storage failure for {symbol}: {detail}"
                )),
            })?;

        log::info!("captured price for {symbol}: last={last}");
        Ok(())
    }
}

/// Coerce a validated payload field to `f64`. The client has already
/// checked the shape, so a failure here means a number outside the f64
/// range or a payload constructed outside the client.
fn decimal_field(
    payload: &TickerPayload,
    field: &'static str,
    symbol: &Symbol,
) -> Result<f64, CaptureError> {
    let parsed = match payload.get(field) {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(raw)) => raw.parse::<f64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        CaptureError::invalid_response(format!("invalid data for {symbol}: bad {field} value"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureErrorKind;
    use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};
    use crate::ticker::TickerConfig;
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};

    /// Routes each request by the symbol embedded in its URL.
    struct RoutedHttpClient {
        responses: HashMap<String, Result<HttpResponse, HttpError>>,
    }

    impl HttpClient for RoutedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let response = self
                .responses
                .iter()
                .find(|(symbol, _)| request.url.contains(&format!("/{symbol}/ticker")))
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| Ok(HttpResponse::with_status(404, "")));
            Box::pin(async move { response })
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        instruments: Vec<Instrument>,
        observations: Mutex<Vec<Observation>>,
    }

    impl MemoryStore {
        fn with_instruments(pairs: &[(&str, &str)]) -> Self {
            Self {
                instruments: pairs
                    .iter()
                    .map(|(name, symbol)| {
                        Instrument::new(Symbol::parse(symbol).expect("valid symbol"), *name)
                            .expect("valid instrument")
                    })
                    .collect(),
                observations: Mutex::new(Vec::new()),
            }
        }

        fn observations(&self) -> Vec<Observation> {
            self.observations
                .lock()
                .expect("observation store should not be poisoned")
                .clone()
        }
    }

    impl InstrumentStore for MemoryStore {
        fn list_instruments(&self) -> Result<Vec<Instrument>, StoreError> {
            Ok(self.instruments.clone())
        }

        fn insert_observation(&self, observation: &Observation) -> Result<(), StoreError> {
            self.observations
                .lock()
                .expect("observation store should not be poisoned")
                .push(observation.clone());
            Ok(())
        }
    }

    fn ticker_body(last: &str, bid: &str, ask: &str) -> String {
        format!(r#"{{"last":"{last}","bid":"{bid}","ask":"{ask}"}}"#)
    }

    enum InsertFailure {
        InvalidRecord,
        Backend,
    }

    /// Store whose insert always fails; listing still works.
    struct FailingStore {
        instruments: Vec<Instrument>,
        failure: InsertFailure,
    }

    impl InstrumentStore for FailingStore {
        fn list_instruments(&self) -> Result<Vec<Instrument>, StoreError> {
            Ok(self.instruments.clone())
        }

        fn insert_observation(&self, _observation: &Observation) -> Result<(), StoreError> {
            Err(match self.failure {
                InsertFailure::InvalidRecord => {
                    StoreError::InvalidRecord(String::from("unknown instrument BTCAUD"))
                }
                InsertFailure::Backend => StoreError::Backend(String::from("disk I/O error")),
            })
        }
    }

    fn failing_service(failure: InsertFailure) -> (CaptureService<FailingStore>, Instrument) {
        let instrument = Instrument::new(Symbol::parse("BTCAUD").expect("valid symbol"), "Bitcoin")
            .expect("valid instrument");
        let transport = Arc::new(RoutedHttpClient {
            responses: HashMap::from([(
                String::from("BTCAUD"),
                Ok(HttpResponse::ok_json(ticker_body(
                    "50000.00", "49900.00", "50100.00",
                ))),
            )]),
        });
        let ticker = TickerClient::new(TickerConfig::default(), transport);
        let store = FailingStore {
            instruments: vec![instrument.clone()],
            failure,
        };
        (CaptureService::new(ticker, store), instrument)
    }

    fn service(
        instruments: &[(&str, &str)],
        responses: Vec<(&str, Result<HttpResponse, HttpError>)>,
    ) -> CaptureService<MemoryStore> {
        let transport = Arc::new(RoutedHttpClient {
            responses: responses
                .into_iter()
                .map(|(symbol, response)| (symbol.to_owned(), response))
                .collect(),
        });
        let ticker = TickerClient::new(TickerConfig::default(), transport);
        CaptureService::new(ticker, MemoryStore::with_instruments(instruments))
    }

    #[tokio::test]
    async fn all_instruments_succeeding_fills_the_success_list_in_order() {
        let service = service(
            &[("Bitcoin", "BTCAUD"), ("Ethereum", "ETHAUD"), ("Ripple", "XRPAUD")],
            vec![
                ("BTCAUD", Ok(HttpResponse::ok_json(ticker_body("50000.00", "49900.00", "50100.00")))),
                ("ETHAUD", Ok(HttpResponse::ok_json(ticker_body("4000.00", "3990.00", "4010.00")))),
                ("XRPAUD", Ok(HttpResponse::ok_json(ticker_body("1.05", "1.04", "1.06")))),
            ],
        );

        let report = service.capture_all().await.expect("listing succeeds");

        assert!(report.is_full_success());
        let symbols = report
            .successes
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>();
        assert_eq!(symbols, ["BTCAUD", "ETHAUD", "XRPAUD"]);
        assert_eq!(service.store().observations().len(), 3);
    }

    #[tokio::test]
    async fn one_not_found_symbol_does_not_abort_the_batch() {
        let service = service(
            &[("Bitcoin", "BTCAUD"), ("Ethereum", "ETHAUD")],
            vec![
                ("BTCAUD", Ok(HttpResponse::ok_json(ticker_body("50000.00", "49900.00", "50100.00")))),
                ("ETHAUD", Ok(HttpResponse::with_status(404, ""))),
            ],
        );

        let report = service.capture_all().await.expect("listing succeeds");

        assert_eq!(report.successes.len(), 1);
        assert_eq!(report.successes[0].as_str(), "BTCAUD");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].symbol.as_str(), "ETHAUD");
        assert!(report.failures[0].error.contains("not found"));

        let observations = service.store().observations();
        assert_eq!(observations.len(), 1);
        let observation = &observations[0];
        assert_eq!(observation.symbol.as_str(), "BTCAUD");
        assert!((observation.last - 50_000.0).abs() < f64::EPSILON);
        assert!((observation.bid - 49_900.0).abs() < f64::EPSILON);
        assert!((observation.ask - 50_100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn total_failure_is_a_report_not_an_error() {
        let service = service(
            &[("Bitcoin", "BTCAUD"), ("Ethereum", "ETHAUD")],
            vec![
                ("BTCAUD", Err(HttpError::timeout("deadline elapsed"))),
                ("ETHAUD", Ok(HttpResponse::with_status(429, ""))),
            ],
        );

        let report = service.capture_all().await.expect("listing succeeds");

        assert!(report.successes.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures[0].error.contains("request timeout"));
        assert!(report.failures[1].error.contains("rate limit"));
        assert!(service.store().observations().is_empty());
    }

    #[tokio::test]
    async fn zero_price_passes_the_client_but_fails_persistence() {
        let service = service(
            &[("Bitcoin", "BTCAUD")],
            vec![(
                "BTCAUD",
                Ok(HttpResponse::ok_json(ticker_body("0.00", "49900.00", "50100.00"))),
            )],
        );

        let report = service.capture_all().await.expect("listing succeeds");

        assert!(report.successes.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].error.contains("invalid data for BTCAUD"));
        assert!(service.store().observations().is_empty());
    }

    #[tokio::test]
    async fn invalid_record_inserts_surface_as_invalid_data() {
        let (service, instrument) = failing_service(InsertFailure::InvalidRecord);

        let error = service
            .capture_instrument(&instrument)
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), CaptureErrorKind::InvalidResponse);
        assert!(!error.retryable());
        assert_eq!(
            error.message(),
            "invalid data for BTCAUD: unknown instrument BTCAUD"
        );
    }

    #[tokio::test]
    async fn backend_faults_surface_as_storage_failures_without_aborting() {
        let (service, instrument) = failing_service(InsertFailure::Backend);

        let error = service
            .capture_instrument(&instrument)
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), CaptureErrorKind::InvalidResponse);
        assert_eq!(error.message(), "storage failure for BTCAUD: disk I/O error");

        let report = service.capture_all().await.expect("listing succeeds");
        assert!(report.successes.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].error,
            "storage failure for BTCAUD: disk I/O error"
        );
    }

    #[tokio::test]
    async fn single_capture_propagates_the_error_kind() {
        let service = service(
            &[("Ethereum", "ETHAUD")],
            vec![("ETHAUD", Ok(HttpResponse::with_status(404, "")))],
        );
        let instrument = service.store().instruments[0].clone();

        let error = service
            .capture_instrument(&instrument)
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), CaptureErrorKind::Api);
        assert_eq!(error.message(), "symbol ETHAUD not found");
    }

    #[tokio::test]
    async fn repeated_captures_append_distinct_observations() {
        let service = service(
            &[("Bitcoin", "BTCAUD")],
            vec![(
                "BTCAUD",
                Ok(HttpResponse::ok_json(ticker_body("50000.00", "49900.00", "50100.00"))),
            )],
        );

        service.capture_all().await.expect("first run");
        service.capture_all().await.expect("second run");

        assert_eq!(service.store().observations().len(), 2);
    }
}
