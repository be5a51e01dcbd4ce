use clap::Parser;

use blog_pilot::cli::{run, Cli};
use blog_pilot::publish::PublishOutcome;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(PublishOutcome::PullRequestOpened { url }) => {
            println!("Pull request opened: {url}");
            std::process::exit(0);
        }
        Ok(PublishOutcome::Rejected { reason }) => {
            eprintln!("Publish rejected: {reason}");
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("[ERROR] Publish failed: {e:#}");
            std::process::exit(1);
        }
    }
}
