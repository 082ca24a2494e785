use clap::Parser;

use stockdesk_client::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockdesk_observability::init();

    let cli = Cli::parse();
    cli::run(cli).await
}
