//! CLI module for awesome-blog
//!
//! Provides command-line interface for:
//! - serve: Start the HTTP server
//! - init-db: Create the database tables

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init_db, init_logging, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
