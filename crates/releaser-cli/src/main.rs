use clap::Parser;
use releaser_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging before anything else runs; a bad log file falls back to stderr.
    match &cli.log_file {
        Some(path) => {
            if let Err(e) = logging::init_logging(path) {
                logging::init_logging_stderr();
                tracing::warn!("log file unavailable ({:#}), logging to stderr", e);
            }
        }
        None => logging::init_logging_stderr(),
    }

    if let Err(err) = cli.run().await {
        eprintln!("plugin-releaser error: {:#}", err);
        std::process::exit(1);
    }
}
