#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]

//! Command line entry point of dnp-publish

use clap::Parser;
use dnp_publish::cli::{args::Args, commands::RunnableCommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments. see args.rs
    let cli = Args::parse();

    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(cli.verbose).into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(non_blocking_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();

    cli.command.run().await?;
    Ok(())
}
