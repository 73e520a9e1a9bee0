/// Arguments consist of Command an Verbosity
pub mod args;
/// Commands to run
pub mod commands;
/// Debug level
pub mod verbosity;

mod error;

pub use error::CliError;
