//! CLI argument definitions using clap
//!
//! Commands:
//! - awesome-blog serve --config <path> [--override <path>] [--port <port>]
//! - awesome-blog init-db --config <path> [--override <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// awesome-blog - a small blog backend
#[derive(Parser, Debug)]
#[command(name = "awesome-blog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to the default configuration file
        #[arg(long, default_value = "./config_default.json")]
        config: PathBuf,

        /// Path to a configuration file merged over the defaults
        #[arg(long = "override")]
        overrides: Option<PathBuf>,

        /// Port to listen on, overriding the configuration
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create the database tables
    InitDb {
        /// Path to the default configuration file
        #[arg(long, default_value = "./config_default.json")]
        config: PathBuf,

        /// Path to a configuration file merged over the defaults
        #[arg(long = "override")]
        overrides: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
