use tickcap_core::Symbol;
use tickcap_store::Store;

use crate::cli::LatestArgs;
use crate::error::CliError;

pub fn run(args: &LatestArgs, store: &Store) -> Result<(), CliError> {
    let symbol = Symbol::parse(&args.symbol)?;

    match store.latest_observation(&symbol)? {
        Some(observation) if args.json => {
            println!("{}", serde_json::to_string_pretty(&observation)?);
            Ok(())
        }
        Some(observation) => {
            println!(
                "{}  last={} bid={} ask={} spread={:.2} ({:.2}%)  at {}",
                observation.symbol,
                observation.last,
                observation.bid,
                observation.ask,
                observation.spread(),
                observation.spread_percentage(),
                observation.captured_at.format_rfc3339()
            );
            Ok(())
        }
        None => {
            println!("no observations for {symbol}");
            Ok(())
        }
    }
}
