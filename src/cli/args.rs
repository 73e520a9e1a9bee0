use clap::{command, Parser};

use super::{commands::DnpCommand, verbosity::MyVerbosity};

/// Arguments to dnp-publish
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Command passed
    #[command(subcommand)]
    pub command: DnpCommand,
    /// Verbosity level.
    #[arg(short, long, help = "verbosity level", default_value = "normal")]
    pub verbose: MyVerbosity,
}
