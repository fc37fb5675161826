//! CLI argument definitions for tickcap.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `seed` | Create the default tracked instruments |
//! | `add` | Track a new instrument |
//! | `instruments` | List tracked instruments |
//! | `capture` | Capture current prices for tracked instruments |
//! | `latest` | Show the newest observation for a symbol |
//! | `history` | Show recent observations for a symbol |
//! | `purge` | Delete all observations for a symbol |
//!
//! # Examples
//!
//! ```bash
//! # Set up the default instruments and take a first capture
//! tickcap seed
//! tickcap capture
//!
//! # Track an extra pair and inspect its history
//! tickcap add Ripple XRPAUD
//! tickcap capture --symbol XRPAUD
//! tickcap history XRPAUD --limit 5
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Capture and store exchange ticker prices for tracked instruments.
#[derive(Debug, Parser)]
#[command(
    name = "tickcap",
    author,
    version,
    about = "Price capture pipeline for tracked trading pairs"
)]
pub struct Cli {
    /// Path to the DuckDB database file.
    ///
    /// Defaults to `$TICKCAP_HOME/tickcap.duckdb`, falling back to
    /// `~/.tickcap/tickcap.duckdb`.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the default tracked instruments (Bitcoin/BTCAUD, Ethereum/ETHAUD).
    ///
    /// Safe to run repeatedly; existing instruments are left untouched.
    Seed,

    /// Track a new instrument.
    ///
    /// # Examples
    ///
    ///   tickcap add Ripple XRPAUD
    Add(AddArgs),

    /// List tracked instruments in configuration order.
    Instruments,

    /// Capture current prices for tracked instruments.
    ///
    /// Without `--symbol`, every tracked instrument is captured; a
    /// failing symbol never aborts the rest of the batch. The command
    /// exits 0 even when some symbols fail, printing a warning that
    /// enumerates them.
    Capture(CaptureArgs),

    /// Show the newest observation for a symbol.
    Latest(LatestArgs),

    /// Show recent observations for a symbol, newest first.
    History(HistoryArgs),

    /// Delete all observations for a symbol.
    Purge(PurgeArgs),
}

/// Arguments for the `add` command.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Display name (e.g. Bitcoin).
    pub name: String,

    /// Trading pair symbol (e.g. BTCAUD).
    pub symbol: String,
}

/// Arguments for the `capture` command.
#[derive(Debug, Args)]
pub struct CaptureArgs {
    /// Capture only this symbol instead of the whole tracked set.
    #[arg(long)]
    pub symbol: Option<String>,
}

/// Arguments for the `latest` command.
#[derive(Debug, Args)]
pub struct LatestArgs {
    /// Trading pair symbol.
    pub symbol: String,

    /// Print the observation as a JSON object.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Arguments for the `history` command.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Trading pair symbol.
    pub symbol: String,

    /// Maximum number of observations to show.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Print the observations as a JSON array.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Arguments for the `purge` command.
#[derive(Debug, Args)]
pub struct PurgeArgs {
    /// Trading pair symbol.
    pub symbol: String,
}
