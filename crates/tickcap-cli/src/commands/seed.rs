use tickcap_core::{Instrument, Symbol};
use tickcap_store::Store;

use crate::error::CliError;

/// Default tracked pairs created on first setup.
const DEFAULT_INSTRUMENTS: &[(&str, &str)] = &[("Bitcoin", "BTCAUD"), ("Ethereum", "ETHAUD")];

pub fn run(store: &Store) -> Result<(), CliError> {
    for (name, symbol) in DEFAULT_INSTRUMENTS {
        let instrument = Instrument::new(Symbol::parse(symbol)?, *name)?;
        store.upsert_instrument(&instrument)?;
        println!("tracking {} ({})", instrument.name, instrument.symbol);
    }
    Ok(())
}
