use clap::Parser;
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use std::process;

use toy_bank::account::AccountStore;
use toy_bank::cli::{Session, TerminalPort};
use toy_bank::config;
use toy_bank::database::SqliteSnapshotStore;

/// Toy Bank - a menu-driven terminal banking ledger
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Sets the configuration file
    #[clap(short, long, value_name = "FILE", default_value = "config.toml")]
    config: String,

    /// Overrides the database file from the configuration
    #[clap(long, value_name = "PATH")]
    data: Option<String>,

    /// Turn debugging information on
    #[clap(short, long, action = clap::ArgAction::Count)]
    debug: u8,
}

fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    // Log to stderr; quiet by default so it doesn't interleave with the menus
    let default_level = match cli.debug {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let mut config = match config::load_config(&cli.config) {
        Ok(config) => {
            info!("Configuration loaded from {}", cli.config);
            config
        }
        Err(err) => {
            error!("Failed to load configuration: {:#}", err);
            process::exit(1);
        }
    };

    if let Some(path) = cli.data {
        config.storage.path = path;
    }

    let snapshots = match SqliteSnapshotStore::open(&config.storage.path) {
        Ok(snapshots) => snapshots,
        Err(err) => {
            error!("Failed to open database {}: {}", config.storage.path, err);
            process::exit(1);
        }
    };

    let store = match AccountStore::open(
        Box::new(snapshots),
        &config.storage.snapshot_key,
        config.accounts.number_length,
    ) {
        Ok(store) => store,
        Err(err) => {
            error!("Failed to open account store: {}", err);
            process::exit(1);
        }
    };

    let mut session = Session::new(TerminalPort::stdio(), store, &config);
    if let Err(err) = session.run() {
        // Closed stdin ends the session like "Exit" does
        info!("Session ended: {:#}", err);
    }
}
