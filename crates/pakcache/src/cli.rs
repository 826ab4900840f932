//! Command line interface definition.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// pakcache: a token-gated HTTP cache for binary build artifacts.
#[derive(Parser)]
#[command(name = "pakcache")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the server.
    Serve(ServeArgs),
    /// Print version information.
    Version,
}

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the bind address from the configuration.
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// Override the store root directory from the configuration.
    #[arg(short, long)]
    pub root: Option<PathBuf>,
}
