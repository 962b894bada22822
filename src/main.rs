//! feedbin-tools CLI
//!
//! Streams Feedbin API resources to stdout as JSON lines

use clap::Parser;
use feedbin_tools::cli::{Cli, Runner};
use feedbin_tools::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.logging()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let runner = Runner::new(cli);

    match runner.run().await {
        Ok(()) => {}
        Err(e) if e.is_output_closed() => {}
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
