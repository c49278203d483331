//! storm-clean CLI.

use clap::Parser;
use std::io::{self, IsTerminal};
use storm_cli::logging::{LogConfig, init_logging};

mod cli;
mod commands;
mod summary;
mod types;

use crate::cli::{Cli, Command};
use crate::commands::{run_check, run_clean, run_preprocess};
use crate::summary::{print_check_summary, print_preprocess_summary, print_run_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = LogConfig::from_flags(cli.log_flags(), io::stderr().is_terminal());
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let outcome = match &cli.command {
        Command::Run(args) => run_clean(args).map(|result| print_run_summary(&result)),
        Command::Preprocess(args) => {
            run_preprocess(args).map(|result| print_preprocess_summary(&result))
        }
        Command::Check(args) => run_check(args).map(|result| print_check_summary(&result)),
    };
    let exit_code = match outcome {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}
