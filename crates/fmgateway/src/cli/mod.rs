//! cli for the gateway.
//!
//! a single `serve` subcommand runs the http surface and the file
//! integration worker; configuration comes from flags or the `FMG_*`
//! environment variables.

mod serve;

pub use serve::ServeCommand;

use clap::{Parser, Subcommand};

/// fmgateway - gateway for Chilean electronic tax documents.
#[derive(Parser, Debug)]
#[command(name = "fmgateway")]
#[command(about = "DTE stamping gateway", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// run the gateway (http api + file integration worker).
    Serve(ServeCommand),
}
