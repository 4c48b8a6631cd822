pub mod cli;
pub mod commands;
pub mod midi;
pub mod session;

use clap::Parser;

/// Entry point for the command line binary
pub fn run() -> std::process::ExitCode {
    cli::run_with(cli::Cli::parse())
}
