use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::checkout::TokioSleeper;
use crate::contract::CancelFlag;
use crate::generator::ApiContentGenerator;
use crate::gitcli::CliGit;
use crate::github::GitHubClient;
use crate::load_config::load_config;
use crate::publish::{publish, PublishOutcome};

/// CLI for blog-pilot: generate a post and open a pull request.
#[derive(Parser)]
#[clap(
    name = "blog-pilot",
    version,
    about = "Generate a blog post with an LLM and publish it to the content repository as a pull request"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate one post and open a pull request using the given config file
    Publish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<PublishOutcome> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Publish { config } => {
            let config = load_config(config)?;
            config.trace_loaded();

            let generator = ApiContentGenerator::new(config.generator.clone());
            let host = GitHubClient::new(
                &config.repository.owner,
                &config.repository.name,
                &config.repository.token,
            );
            let outcome = publish(
                &config,
                &generator,
                &CliGit,
                &host,
                &TokioSleeper,
                &CancelFlag::new(),
            )
            .await?;
            Ok(outcome)
        }
    }
}
