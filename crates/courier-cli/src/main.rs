//! Courier CLI
//!
//! Sends the file named in the transfer descriptor to the server named there,
//! registering or reconnecting as needed.
//!
//! Exits 0 when the session completes, including when the server's checksum
//! never matched, and 1 on any fatal error.

use anyhow::Context;
use clap::Parser;
use courier_core::config::{DEFAULT_IDENTITY_PATH, DEFAULT_TRANSFER_PATH};
use courier_core::{ClientConfig, Session, TransferOutcome};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Courier - send one file to a Courier server over an encrypted session
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Transfer descriptor: "address:port", username and file path, one per line
    #[arg(short, long, default_value = DEFAULT_TRANSFER_PATH)]
    transfer: PathBuf,

    /// Identity record, read to reconnect and written on registration
    #[arg(short, long, default_value = DEFAULT_IDENTITY_PATH)]
    identity: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output (implies --verbose)
    #[arg(short, long)]
    debug: bool,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.debug {
            "trace"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    fn config(&self) -> ClientConfig {
        ClientConfig {
            transfer_path: self.transfer.clone(),
            identity_path: self.identity.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the flags when set
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut session = Session::from_config(cli.config()).with_context(|| {
        format!(
            "Failed to load transfer inputs from {}",
            cli.transfer.display()
        )
    })?;

    match session.run().context("Session failed")? {
        TransferOutcome::Verified { attempts } => {
            tracing::info!(attempts, "File sent and verified");
        }
        TransferOutcome::Unverified { attempts } => {
            tracing::warn!(attempts, "File sent but the server never reported a matching checksum");
        }
    }

    Ok(())
}
