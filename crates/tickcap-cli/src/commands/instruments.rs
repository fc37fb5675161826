use tickcap_store::Store;

use crate::error::CliError;

pub fn run(store: &Store) -> Result<(), CliError> {
    let instruments = store.list_instruments()?;
    if instruments.is_empty() {
        println!("no instruments tracked; run 'tickcap seed' to create the defaults");
        return Ok(());
    }

    for instrument in instruments {
        match store.latest_observation(&instrument.symbol)? {
            Some(observation) => println!(
                "{}  {}  last={} at {}",
                instrument.symbol,
                instrument.name,
                observation.last,
                observation.captured_at.format_rfc3339()
            ),
            None => println!("{}  {}  (no observations)", instrument.symbol, instrument.name),
        }
    }
    Ok(())
}
