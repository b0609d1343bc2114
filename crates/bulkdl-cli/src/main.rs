use bulkdl_core::logging;

mod cli;

use crate::cli::Cli;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible.
    if cli.log_file {
        if let Err(e) = logging::init_logging(cli.verbose) {
            logging::init_logging_stderr(cli.verbose);
            tracing::warn!("cannot open log file ({:#}); logging to stderr", e);
        }
    } else {
        logging::init_logging_stderr(cli.verbose);
    }

    match cli.run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("bulkdl error: {:#}", err);
            std::process::exit(1);
        }
    }
}
