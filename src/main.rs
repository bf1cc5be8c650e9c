//! awesome-blog CLI entry point
//!
//! Parses arguments and dispatches to the CLI module, printing errors to
//! stderr and exiting non-zero on failure.

use awesome_blog::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
