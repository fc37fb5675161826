use tickcap_core::Symbol;
use tickcap_store::Store;

use crate::cli::PurgeArgs;
use crate::error::CliError;

pub fn run(args: &PurgeArgs, store: &Store) -> Result<(), CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let deleted = store.delete_observations(&symbol)?;
    println!("deleted {deleted} observations for {symbol}");
    Ok(())
}
