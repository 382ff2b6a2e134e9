// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! migrctl - thin operational CLI for the migrd daemon.
//!
//! Grounded on `oj`'s CLI shape (clap `Parser`/`Subcommand`, anyhow at the
//! binary edge, a deduplicating error formatter) but reduced to the two
//! operational concerns spec.md leaves this edge with: start the daemon in
//! the foreground, and report version/health. `migrd` has no unix-socket
//! IPC protocol (see migr-service's DESIGN.md note on the dropped
//! daemon<->CLI protocol), so `migrctl` never opens a client connection —
//! unlike `oj`'s `DaemonClient`, every subcommand here is self-contained.

mod env;
mod health;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "migrctl",
    version,
    about = "Operational CLI for the migration pipeline daemon"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run migrd in the foreground, forwarding its exit code
    Run,
    /// Print migrctl and migrd version information
    Version,
    /// Validate that migrd's required environment is present
    Health,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run => {
            let status = run::run_foreground().await?;
            std::process::exit(status);
        }
        Commands::Version => run::print_version(),
        Commands::Health => health::check()?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
