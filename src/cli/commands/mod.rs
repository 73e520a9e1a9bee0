mod config;
mod ownership;
mod publish;
mod resolve;
mod runnable_command;
mod sign;

pub use config::ConfigCommand;
pub use ownership::OwnershipCommand;
pub use runnable_command::RunnableCommand;

use async_trait::async_trait;
use clap::Subcommand;

use super::CliError;
use crate::config::GlobalConfig;

/// Defines the types of commands that can be executed from the CLI.
#[derive(Debug, Subcommand, Clone)]
pub enum DnpCommand {
    /// Sign a release directory and upload the signed copy
    Sign {
        /// Release hash, bare or as /ipfs/<cid>
        #[arg(short, long)]
        release: String,
        /// IPFS API URLs, primary first. Defaults to the configured list
        #[arg(long, value_delimiter = ',')]
        ipfs: Vec<String>,
        /// Environment variable holding a hex private key to sign with
        #[arg(long, required_unless_present = "rpc")]
        private_key_env: Option<String>,
        /// Sign with the first account of the configured JSON-RPC wallet
        #[arg(long, conflicts_with = "private_key_env")]
        rpc: bool,
    },
    /// Find the registry and repo of a package
    Resolve {
        /// Package name, e.g. geth.dnp.dappnode.eth
        dnp_name: String,
    },
    /// Print the transaction that would publish a release
    BuildTx {
        #[command(flatten)]
        release: ReleaseArgs,
    },
    /// Publish a release through the configured JSON-RPC wallet
    Publish {
        #[command(flatten)]
        release: ReleaseArgs,
    },
    /// Inspect or change who may publish a package
    Ownership {
        /// Subcommand
        #[clap(subcommand)]
        command: OwnershipCommand,
    },
    /// Show or change settings
    Config {
        /// Subcommand
        #[clap(subcommand)]
        command: ConfigCommand,
    },
}

/// The release being published
#[derive(Debug, Clone, clap::Args)]
pub struct ReleaseArgs {
    /// Package name
    #[arg(short, long)]
    pub name: String,
    /// Semantic version of the release
    #[arg(long)]
    pub version: String,
    /// Signed release hash
    #[arg(long)]
    pub hash: String,
    /// Developer allowed to publish further versions, required for new packages
    #[arg(short, long)]
    pub developer: Option<String>,
}

#[async_trait(?Send)]
impl RunnableCommand<CliError> for DnpCommand {
    async fn run_internal(self) -> Result<String, CliError> {
        let global = GlobalConfig::from_disk()?;
        match self {
            DnpCommand::Sign {
                release,
                ipfs,
                private_key_env,
                rpc,
            } => sign::sign(&global, &release, ipfs, private_key_env, rpc).await,
            DnpCommand::Resolve { dnp_name } => resolve::resolve(&global, &dnp_name).await,
            DnpCommand::BuildTx { release } => publish::build_tx(&global, release).await,
            DnpCommand::Publish { release } => publish::publish(&global, release).await,
            DnpCommand::Ownership { command } => command.run_internal().await,
            DnpCommand::Config { command } => command.run_internal().await,
        }
    }
}
