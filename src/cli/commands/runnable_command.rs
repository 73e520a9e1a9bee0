use std::fmt::{Debug, Display};

use async_trait::async_trait;
use clap::Subcommand;
use colored::Colorize;
use tracing::{error, info};

/// Async function for running a command
#[async_trait(?Send)]
pub trait RunnableCommand<ErrorType>: Subcommand
where
    ErrorType: Debug + Display,
{
    /// The internal running operation
    async fn run_internal(self) -> Result<String, ErrorType>;

    /// Run the internal command, logging its outcome
    async fn run(self) -> Result<(), ErrorType> {
        let result = self.run_internal().await;

        // Provide output based on that
        match result {
            Ok(message) => {
                info!("{}", message);
                Ok(())
            }
            Err(error) => {
                error!("{}", format!("{}", error).red());
                Err(error)
            }
        }
    }
}
