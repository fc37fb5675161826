mod add;
mod capture;
mod history;
mod instruments;
mod latest;
mod purge;
mod seed;

use tickcap_store::{Store, StoreConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let store = open_store(cli)?;

    match &cli.command {
        Command::Seed => seed::run(&store),
        Command::Add(args) => add::run(args, &store),
        Command::Instruments => instruments::run(&store),
        Command::Capture(args) => capture::run(args, store).await,
        Command::Latest(args) => latest::run(args, &store),
        Command::History(args) => history::run(args, &store),
        Command::Purge(args) => purge::run(args, &store),
    }
}

fn open_store(cli: &Cli) -> Result<Store, CliError> {
    let store = match &cli.db {
        Some(path) => Store::open(StoreConfig::at(path.clone()))?,
        None => Store::open_default()?,
    };
    Ok(store)
}
