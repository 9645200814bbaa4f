use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "keeper", version, about = "Scheduled archival and idempotent file transfer jobs")]
pub struct Cli {
    /// Config file (TOML, YAML or JSON). Defaults to the first `settings.*`
    /// found in the working directory, then the user config directory.
    #[arg(short, long, env = "KEEPER_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    /// Discover and log what would happen without touching any file.
    #[arg(long, global = true)]
    pub dry_run: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compress aged files into dated backup folders.
    Archive,
    /// Copy or move date-stamped files, at most once each.
    Transfer {
        /// Date to substitute into file patterns instead of today, as
        /// `YYYYMMDD` or `YYMMDD`.
        #[arg(short, long)]
        date: Option<String>,
    },
}
