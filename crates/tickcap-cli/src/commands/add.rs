use tickcap_core::{Instrument, Symbol};
use tickcap_store::Store;

use crate::cli::AddArgs;
use crate::error::CliError;

pub fn run(args: &AddArgs, store: &Store) -> Result<(), CliError> {
    let instrument = Instrument::new(Symbol::parse(&args.symbol)?, args.name.clone())?;
    store.upsert_instrument(&instrument)?;
    println!("tracking {} ({})", instrument.name, instrument.symbol);
    Ok(())
}
