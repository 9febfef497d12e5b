//! fmgateway - gateway for Chilean electronic tax documents (DTE).
//!
//! ingests authority CAF authorizations, stamps outbound invoices with
//! the Timbre Electrónico and runs the file-integration pipeline.

use clap::Parser;
use color_eyre::eyre::Result;
use fmgateway::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(cmd) => cmd.run().await,
    }
}
