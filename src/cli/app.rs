//! Command-line interface definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "adclone", version, about = "Replicate ad campaigns across ad accounts")]
pub struct Cli {
    /// Config file path (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clone a live campaign into one or more destination accounts
    Clone {
        /// Source campaign id
        campaign: String,
        /// Destination ad account id (repeatable)
        #[arg(long = "to", required = true)]
        to: Vec<String>,
    },
    /// Extract a campaign and write its sanitized template as JSON
    Export {
        /// Source campaign id
        campaign: String,
        /// Output file
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Replay a saved template (JSON) or spreadsheet export (CSV) into accounts
    Import {
        /// Template file (.json or .csv)
        file: PathBuf,
        /// Destination ad account id (repeatable)
        #[arg(long = "to", required = true)]
        to: Vec<String>,
    },
    /// List ad accounts reachable with the configured token
    Accounts,
}
