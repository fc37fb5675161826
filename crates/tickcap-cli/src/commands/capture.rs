use tickcap_core::{CaptureService, Symbol, TickerClient, TickerConfig};
use tickcap_store::Store;

use crate::cli::CaptureArgs;
use crate::error::CliError;

pub async fn run(args: &CaptureArgs, store: Store) -> Result<(), CliError> {
    let ticker = TickerClient::with_default_transport(TickerConfig::from_env());

    // Targeted re-capture of a single tracked symbol.
    if let Some(raw) = &args.symbol {
        let symbol = Symbol::parse(raw)?;
        let instrument = store
            .find_instrument(&symbol)?
            .ok_or_else(|| CliError::Command(format!("symbol {symbol} is not tracked")))?;

        let service = CaptureService::new(ticker, store);
        match service.capture_instrument(&instrument).await {
            Ok(()) => println!("captured {symbol}"),
            Err(error) => println!("warning: capture failed for {symbol}: {}", error.message()),
        }
        return Ok(());
    }

    let service = CaptureService::new(ticker, store);
    let report = service.capture_all().await?;

    if report.attempted() == 0 {
        println!("no instruments tracked; run 'tickcap seed' to create the defaults");
        return Ok(());
    }

    println!(
        "captured {} of {} instruments",
        report.successes.len(),
        report.attempted()
    );
    for failure in &report.failures {
        println!("warning: {}: {}", failure.symbol, failure.error);
    }
    Ok(())
}
