//! # Tickcap Core
//!
//! Capture pipeline for periodic price observations of tracked
//! instruments: a validating client for the upstream ticker API and an
//! orchestrator that drives it across every instrument with per-symbol
//! failure isolation.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`capture`] | Capture orchestrator, report types, storage port |
//! | [`domain`] | Domain models (Symbol, Instrument, Observation) |
//! | [`error`] | Error taxonomy (ApiError vs InvalidResponse) |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`ticker`] | Upstream ticker client |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tickcap_core::{CaptureService, TickerClient, TickerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ticker = TickerClient::with_default_transport(TickerConfig::from_env());
//!     let store = tickcap_store::Store::open_default()?;
//!     let service = CaptureService::new(ticker, store);
//!
//!     let report = service.capture_all().await?;
//!     println!("captured {} instruments", report.successes.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Capture failures are two-kind: `Api` (transport/HTTP, potentially
//! transient) and `InvalidResponse` (payload shape or persistence
//! invariant, not retryable without an upstream fix). No retry policy is
//! applied anywhere in this crate.

pub mod capture;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod ticker;

pub use capture::{CaptureFailure, CaptureReport, CaptureService, InstrumentStore};
pub use domain::{Instrument, Observation, Symbol, UtcDateTime};
pub use error::{CaptureError, CaptureErrorKind, StoreError, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use ticker::{TickerClient, TickerConfig, TickerPayload, REQUIRED_FIELDS};
