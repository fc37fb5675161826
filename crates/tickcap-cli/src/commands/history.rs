use tickcap_core::Symbol;
use tickcap_store::Store;

use crate::cli::HistoryArgs;
use crate::error::CliError;

pub fn run(args: &HistoryArgs, store: &Store) -> Result<(), CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let observations = store.list_observations(&symbol, args.limit)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&observations)?);
        return Ok(());
    }

    if observations.is_empty() {
        println!("no observations for {symbol}");
        return Ok(());
    }

    for observation in observations {
        println!(
            "{}  last={} bid={} ask={}",
            observation.captured_at.format_rfc3339(),
            observation.last,
            observation.bid,
            observation.ask
        );
    }
    Ok(())
}
