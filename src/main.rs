mod cli;

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pit::config::Config;
use pit::{Pit, Storage};

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = Config::load()?;
    let path = config.resolve_pit_file(cli.pit.as_deref())?;

    let storage =
        Storage::new(&path).map_err(|e| format!("failed to initialize storage: {e}"))?;
    let pit = Pit::open(storage).map_err(|e| format!("failed to open {}: {e}", path.display()))?;

    cli::run(cli.command, &config, &pit)
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "pit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
