mod cli;
mod config;
mod convert;
mod cube_io;
mod logging;
mod percentiles_cmd;
mod realizations_cmd;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Realizations(args) => realizations_cmd::run(args),
        Command::Percentiles(args) => percentiles_cmd::run(args),
    }
}
